//! Application builder.
//!
//! # Responsibilities
//! - Collect routes, groups, global middlewares and special actions
//! - Initialize modules with the loaded configuration
//! - Compile everything into an axum router wrapped in the tower-http stack
//!
//! # Design Decisions
//! - Declaration order is irrelevant; routes are compiled once in `build`
//! - The 404 and 405 actions run without middlewares
//! - Sessions are enabled only when `keys.sessions` is set

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::rejection::RawPathParamsRejection;
use axum::extract::{DefaultBodyLimit, RawPathParams};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::routing::{on, MethodRouter};
use axum::Router;
use futures_util::future::BoxFuture;
use tower::Layer;
use tower_http::normalize_path::NormalizePathLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::{load_config, AppConfig};
use crate::http::action::{Action, Middleware, PanicHandler, SharedAction, SharedMiddleware};
use crate::http::context::Context;
use crate::http::dispatch::{dispatch, Target};
use crate::http::server::{Server, ServerError};
use crate::http::state::AppState;
use crate::observability::logging;
use crate::routing::{Group, GroupHandle, ResolvedRoute, RouteHandle, RouteTable};
use crate::session::CookieStore;

pub type ModuleError = Box<dyn std::error::Error + Send + Sync>;

/// Something initialized with the configuration before the server starts.
pub trait Module: Send + 'static {
    fn init(&mut self, config: &AppConfig) -> Result<(), ModuleError>;
}

impl<F> Module for F
where
    F: FnMut(&AppConfig) -> Result<(), ModuleError> + Send + 'static,
{
    fn init(&mut self, config: &AppConfig) -> Result<(), ModuleError> {
        self(config)
    }
}

/// Builder for a web application.
#[derive(Default)]
pub struct App {
    root: Group,
    global: Vec<SharedMiddleware>,
    not_found: Option<SharedAction>,
    method_not_allowed: Option<SharedAction>,
    panic_handler: Option<PanicHandler>,
    modules: Vec<Box<dyn Module>>,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, path: &str, action: impl Action) -> RouteHandle<'_> {
        self.root.get(path, action)
    }

    pub fn post(&mut self, path: &str, action: impl Action) -> RouteHandle<'_> {
        self.root.post(path, action)
    }

    pub fn put(&mut self, path: &str, action: impl Action) -> RouteHandle<'_> {
        self.root.put(path, action)
    }

    pub fn delete(&mut self, path: &str, action: impl Action) -> RouteHandle<'_> {
        self.root.delete(path, action)
    }

    pub fn patch(&mut self, path: &str, action: impl Action) -> RouteHandle<'_> {
        self.root.patch(path, action)
    }

    /// Declare a group of routes under `prefix`.
    pub fn group(&mut self, prefix: &str, build: impl FnOnce(&mut Group)) -> GroupHandle<'_> {
        self.root.group(prefix, build)
    }

    /// Middlewares run first for every route.
    pub fn global_middlewares(&mut self, middlewares: impl IntoIterator<Item = SharedMiddleware>) -> &mut Self {
        self.global.extend(middlewares);
        self
    }

    pub fn global_middleware(&mut self, middleware: impl Middleware) -> &mut Self {
        self.global.push(Arc::new(middleware));
        self
    }

    /// Action for unmatched paths. Its response starts as `404`.
    pub fn not_found(&mut self, action: impl Action) -> &mut Self {
        self.not_found = Some(Arc::new(action));
        self
    }

    /// Action for matched paths with an unsupported method. Its response
    /// starts as `405`.
    pub fn method_not_allowed(&mut self, action: impl Action) -> &mut Self {
        self.method_not_allowed = Some(Arc::new(action));
        self
    }

    /// Handler for panics in actions and middlewares.
    pub fn panic_handler(&mut self, handler: impl Fn(&mut Context, &str) + Send + Sync + 'static) -> &mut Self {
        self.panic_handler = Some(Arc::new(handler));
        self
    }

    pub fn module(&mut self, module: impl Module) -> &mut Self {
        self.modules.push(Box::new(module));
        self
    }

    pub fn modules(&mut self, modules: impl IntoIterator<Item = Box<dyn Module>>) -> &mut Self {
        self.modules.extend(modules);
        self
    }

    /// Load the YAML config at `path` and build.
    pub fn load(self, path: impl AsRef<Path>) -> Result<Server, ServerError> {
        let config = load_config(path.as_ref())?;
        self.build(config)
    }

    /// Load the config, install logging, build and serve until Ctrl+C.
    pub async fn serve(self, path: impl AsRef<Path>) -> Result<(), ServerError> {
        let config = load_config(path.as_ref())?;
        logging::init(&config.observability.log_level);
        self.build(config)?.run().await
    }

    /// Initialize modules and compile the routes.
    pub fn build(self, config: AppConfig) -> Result<Server, ServerError> {
        let App {
            root,
            global,
            not_found,
            method_not_allowed,
            panic_handler,
            mut modules,
        } = self;

        for (index, module) in modules.iter_mut().enumerate() {
            module
                .init(&config)
                .map_err(|source| ServerError::Module { index, source })?;
        }

        let routes = root.resolve();
        let table = RouteTable::from_routes(&routes)?;

        let sessions = if config.keys.sessions.is_empty() {
            None
        } else {
            Some(CookieStore::new(&config.keys.sessions))
        };

        let state = Arc::new(AppState {
            body_limit: config.limits.body_bytes,
            config: Arc::new(config),
            routes: table,
            sessions,
            global,
            panic_handler,
            not_found,
            method_not_allowed,
        });

        let router = build_router(&state, &routes)?;
        let service = NormalizePathLayer::trim_trailing_slash().layer(router);

        tracing::info!(routes = routes.len(), "Application built");
        Ok(Server::new(service, state))
    }
}

type RouteParams = Result<RawPathParams, RawPathParamsRejection>;

fn handler(
    state: &Arc<AppState>,
    target: Target,
) -> impl Fn(RouteParams, Request<Body>) -> BoxFuture<'static, Response> + Clone + Send + Sync + 'static {
    let state = state.clone();
    move |params: RouteParams, request: Request<Body>| -> BoxFuture<'static, Response> {
        Box::pin(dispatch(state.clone(), target.clone(), params, request))
    }
}

/// Route paths use axum's `{param}` syntax; `:param` is refused up front.
fn check_path(path: &str) -> Result<(), ServerError> {
    if path.split('/').any(|segment| segment.starts_with(':')) {
        return Err(ServerError::InvalidPath(path.to_string()));
    }
    Ok(())
}

#[allow(deprecated)]
fn build_router(state: &Arc<AppState>, routes: &[ResolvedRoute]) -> Result<Router, ServerError> {
    let mut by_path: BTreeMap<String, MethodRouter> = BTreeMap::new();
    let mut seen = HashSet::new();

    for route in routes {
        check_path(&route.path)?;
        if !seen.insert((route.path.clone(), route.verb)) {
            return Err(ServerError::DuplicateRoute {
                verb: route.verb,
                path: route.path.clone(),
            });
        }

        let target = Target {
            label: Arc::from(route.path.as_str()),
            action: route.action.clone(),
            middlewares: route.middlewares.clone(),
            with_global: true,
            status: StatusCode::OK,
        };
        let filter = route.verb.method_filter();
        let method_router = match by_path.remove(&route.path) {
            Some(existing) => existing.on(filter, handler(state, target)),
            None => on(filter, handler(state, target)),
        };
        by_path.insert(route.path.clone(), method_router);

        tracing::debug!(method = %route.verb, path = %route.path, name = %route.name, "Route registered");
    }

    let mut router = Router::new();
    for (path, method_router) in by_path {
        let not_allowed = Target {
            label: Arc::from(path.as_str()),
            action: state
                .method_not_allowed
                .clone()
                .unwrap_or_else(|| Arc::new(default_method_not_allowed)),
            middlewares: Vec::new(),
            with_global: false,
            status: StatusCode::METHOD_NOT_ALLOWED,
        };
        router = router.route(&path, method_router.fallback(handler(state, not_allowed)));
    }

    let config = &state.config;
    if config.serves_static() {
        let mount = config.static_files.path.trim_end_matches('/');
        router = router.nest_service(mount, ServeDir::new(&config.static_files.dir));
        tracing::info!(path = %mount, dir = %config.static_files.dir, "Serving static files");
    }

    let not_found = Target {
        label: Arc::from("none"),
        action: state
            .not_found
            .clone()
            .unwrap_or_else(|| Arc::new(default_not_found)),
        middlewares: Vec::new(),
        with_global: false,
        status: StatusCode::NOT_FOUND,
    };
    router = router.fallback(handler(state, not_found));

    let timeout = config.limits.request_timeout_secs;
    if timeout > 0 {
        router = router.layer(TimeoutLayer::new(Duration::from_secs(timeout)));
    }

    Ok(router
        .layer(DefaultBodyLimit::disable())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid)))
}

async fn default_not_found(mut c: Context) -> Context {
    c.text(StatusCode::NOT_FOUND, "404 page not found\n");
    c
}

async fn default_method_not_allowed(mut c: Context) -> Context {
    c.text(StatusCode::METHOD_NOT_ALLOWED, "405 method not allowed\n");
    c
}
