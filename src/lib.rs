//! velum: a thin web framework on axum with rule-based form validation.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ tower-http layers ──▶ axum Router ──▶ dispatch
//!                     (request id, trace,   (verb + path,   (global, group and
//!                      timeout, trailing     404 / 405)      route middlewares,
//!                      slash)                                then the action)
//!                                                               │
//!                                                               ▼
//!     Client Response                                        Context
//!     ◀────────────── sessions saved, buffered body ◀─────── (params, forms,
//!                                                            sessions, response)
//!
//!     Cross-cutting: config (YAML) · observability (tracing, metrics)
//!                    lifecycle (graceful shutdown) · testing (in-process client)
//! ```
//!
//! Forms are validated with declarative rules:
//!
//! ```no_run
//! use axum::http::StatusCode;
//! use velum::{Context, Overrides, Rules, Validated};
//!
//! async fn signup(mut ctx: Context) -> Context {
//!     let rules = Rules::new()
//!         .field("email", "required|email")
//!         .field("age", "required|int|min:18");
//!     match ctx.form().validate(&rules, &Overrides::new()) {
//!         Ok(Validated::Valid(_)) => {
//!             ctx.text(StatusCode::OK, "welcome");
//!         }
//!         Ok(Validated::Invalid(errors)) => {
//!             let _ = ctx.json(StatusCode::UNPROCESSABLE_ENTITY, &errors);
//!         }
//!         Err(e) => {
//!             ctx.text(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
//!         }
//!     }
//!     ctx
//! }
//! ```

// Core subsystems
pub mod config;
pub mod form;
pub mod http;
pub mod routing;
pub mod session;
pub mod validation;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod testing;

pub use config::{load_config, AppConfig};
pub use form::{Form, FormData, FormFile, MultipartForm, Value};
pub use http::{middleware, App, Context, Flow, Server, ServerError};
pub use lifecycle::shutdown::Shutdown;
pub use routing::{Group, Verb};
pub use session::{CookieStore, Session};
pub use validation::{FieldErrors, Overrides, RuleError, Rules, Validated};
