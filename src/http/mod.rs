//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum serve, graceful shutdown)
//!     → tower-http layers (request id, trace, timeout, trailing slash)
//!     → axum Router (path + method matching, 404/405 fallbacks)
//!     → dispatch.rs (buffer body, run middlewares and action, recover panics)
//!     → context.rs (buffered response, sessions saved)
//!     → Send to client
//! ```

pub mod action;
pub mod app;
pub mod context;
pub(crate) mod dispatch;
pub mod server;
pub(crate) mod state;

use thiserror::Error;

use crate::routing::RouteError;

pub use action::{middleware, Action, Flow, Middleware, PanicHandler, SharedAction, SharedMiddleware};
pub use app::{App, Module, ModuleError};
pub use context::Context;
pub use server::{AppService, Server, ServerError};

/// Failures while writing to the response buffer.
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("invalid header: {0}")]
    Header(#[from] axum::http::Error),

    #[error("cannot encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Route(#[from] RouteError),
}
