//! Request dispatch: from an axum request to a buffered response.
//!
//! # Data Flow
//! ```text
//! axum handler (path params, request)
//!     → buffer body (413 when over the configured limit)
//!     → Context
//!     → global middlewares → group middlewares → route middlewares → action
//!       (any middleware may stop the chain)
//!     → panic? → panic handler on a fresh Context, or 500
//!     → Context::into_response (sessions saved, headers set)
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::rejection::RawPathParamsRejection;
use axum::extract::RawPathParams;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::FutureExt;

use crate::http::action::{Flow, SharedAction, SharedMiddleware};
use crate::http::context::Context;
use crate::http::state::AppState;
use crate::observability::metrics;

/// What a request resolved to.
#[derive(Clone)]
pub(crate) struct Target {
    /// Route pattern, used as the metrics label.
    pub(crate) label: Arc<str>,
    pub(crate) action: SharedAction,
    /// Route middlewares; the global ones are added when `with_global` is set.
    pub(crate) middlewares: Vec<SharedMiddleware>,
    pub(crate) with_global: bool,
    /// Status the response starts with.
    pub(crate) status: StatusCode,
}

/// Run a request through its target.
pub(crate) async fn dispatch(
    state: Arc<AppState>,
    target: Target,
    params: Result<RawPathParams, RawPathParamsRejection>,
    request: Request<Body>,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();

    let params: HashMap<String, String> = params
        .map(|params| {
            params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        })
        .unwrap_or_default();

    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, state.body_limit).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(route = %target.label, error = %e, "Request body rejected");
            metrics::record_request(&method, 413, &target.label, start);
            return (StatusCode::PAYLOAD_TOO_LARGE, "request body too large").into_response();
        }
    };

    tracing::debug!(method = %method, route = %target.label, path = %parts.uri.path(), "Dispatching request");

    let mut context = Context::new(parts, body, params, target.label.clone(), state.clone());
    context.status(target.status);
    let mut snapshot = context.fresh();
    snapshot.status(StatusCode::INTERNAL_SERVER_ERROR);

    let response = match AssertUnwindSafe(run_chain(&state, &target, context))
        .catch_unwind()
        .await
    {
        Ok(context) => context.into_response(),
        Err(panic) => recover(&state, snapshot, panic_message(panic.as_ref())),
    };

    metrics::record_request(&method, response.status().as_u16(), &target.label, start);
    response
}

async fn run_chain(state: &AppState, target: &Target, mut context: Context) -> Context {
    let global: &[SharedMiddleware] = if target.with_global { &state.global } else { &[] };

    for middleware in global.iter().chain(&target.middlewares) {
        let (next, flow) = middleware.call(context).await;
        context = next;
        if flow == Flow::Stop {
            tracing::debug!(route = %target.label, "Middleware stopped the request");
            return context;
        }
    }

    target.action.call(context).await
}

fn recover(state: &AppState, mut context: Context, message: String) -> Response {
    match &state.panic_handler {
        Some(handler) => {
            tracing::warn!(route = %context.matched_route(), panic = %message, "Recovered from panic");
            let handled = std::panic::catch_unwind(AssertUnwindSafe(|| {
                (handler.as_ref())(&mut context, &message);
            }));
            match handled {
                Ok(()) => context.into_response(),
                Err(_) => {
                    tracing::error!(route = %context.matched_route(), "Panic handler panicked");
                    internal_error()
                }
            }
        }
        None => {
            tracing::error!(
                route = %context.matched_route(),
                method = %context.method(),
                path = %context.uri().path(),
                panic = %message,
                "Panic while handling request"
            );
            internal_error()
        }
    }
}

fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
