//! State shared by every request of a built application.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::http::action::{PanicHandler, SharedAction, SharedMiddleware};
use crate::routing::RouteTable;
use crate::session::CookieStore;

/// Immutable after `App::build`.
pub(crate) struct AppState {
    pub(crate) config: Arc<AppConfig>,
    pub(crate) routes: RouteTable,
    pub(crate) sessions: Option<CookieStore>,
    pub(crate) global: Vec<SharedMiddleware>,
    pub(crate) panic_handler: Option<PanicHandler>,
    pub(crate) not_found: Option<SharedAction>,
    pub(crate) method_not_allowed: Option<SharedAction>,
    pub(crate) body_limit: usize,
}
