//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Declaration (before startup):
//!     app.get/post/... → route.rs (RouteDef, RouteHandle)
//!     app.group(..)    → group.rs (Group tree)
//!
//! Route Compilation (at startup):
//!     Group tree
//!     → flatten (prefix paths, prefix names, stack middlewares)
//!     → table.rs (name → path pattern, for reversal)
//!     → axum Router (path matching)
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Path matching is delegated to axum; this module only shapes routes
//! - Group names and middlewares are applied when flattening, so they can
//!   be set after the group's routes are declared

pub mod group;
pub mod route;
pub mod table;

use thiserror::Error;

pub use group::{Group, GroupHandle};
pub use route::{ResolvedRoute, RouteDef, RouteHandle, Verb};
pub use table::RouteTable;

/// Route reversal failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("no route named `{0}`")]
    UnknownRoute(String),

    #[error("route `{route}` requires parameter `{param}`")]
    MissingParam { route: String, param: String },

    #[error("route name `{0}` is used for different paths")]
    DuplicateName(String),
}
