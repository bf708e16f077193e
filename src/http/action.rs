//! Actions, middlewares and the panic handler.
//!
//! Actions and middlewares take the request [`Context`] by value and hand it
//! back when done, so they can `.await` freely without borrowing across
//! suspension points. Any `async fn(Context) -> Context` is an action and
//! any `async fn(Context) -> (Context, Flow)` is a middleware.

use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::http::context::Context;

/// Whether the middleware chain goes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Run the next middleware, then the action.
    Continue,
    /// Skip the rest of the chain; the buffered response is still sent.
    Stop,
}

/// The final handler of a route.
pub trait Action: Send + Sync + 'static {
    fn call(&self, c: Context) -> BoxFuture<'static, Context>;
}

impl<F, Fut> Action for F
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Context> + Send + 'static,
{
    fn call(&self, c: Context) -> BoxFuture<'static, Context> {
        Box::pin(self(c))
    }
}

/// A step run before the action.
pub trait Middleware: Send + Sync + 'static {
    fn call(&self, c: Context) -> BoxFuture<'static, (Context, Flow)>;
}

impl<F, Fut> Middleware for F
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (Context, Flow)> + Send + 'static,
{
    fn call(&self, c: Context) -> BoxFuture<'static, (Context, Flow)> {
        Box::pin(self(c))
    }
}

pub type SharedAction = Arc<dyn Action>;
pub type SharedMiddleware = Arc<dyn Middleware>;

/// Called with a fresh context and the panic message when an action or
/// middleware panics.
pub type PanicHandler = Arc<dyn Fn(&mut Context, &str) + Send + Sync>;

/// Box a middleware for [`RouteHandle::middlewares`](crate::routing::RouteHandle::middlewares)
/// and friends, which take several middlewares of different types.
pub fn middleware(m: impl Middleware) -> SharedMiddleware {
    Arc::new(m)
}
