//! Single route declarations.

use axum::routing::MethodFilter;

use crate::http::action::{Middleware, SharedAction, SharedMiddleware};

/// HTTP methods a route can answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl Verb {
    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Delete => "DELETE",
            Verb::Patch => "PATCH",
        }
    }

    pub fn method_filter(self) -> MethodFilter {
        match self {
            Verb::Get => MethodFilter::GET,
            Verb::Post => MethodFilter::POST,
            Verb::Put => MethodFilter::PUT,
            Verb::Delete => MethodFilter::DELETE,
            Verb::Patch => MethodFilter::PATCH,
        }
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A route as declared, relative to its group.
#[derive(Clone)]
pub struct RouteDef {
    pub(crate) verb: Verb,
    pub(crate) path: String,
    pub(crate) name: String,
    pub(crate) action: SharedAction,
    pub(crate) middlewares: Vec<SharedMiddleware>,
}

impl RouteDef {
    pub(crate) fn new(verb: Verb, path: impl Into<String>, action: SharedAction) -> Self {
        Self {
            verb,
            path: path.into(),
            name: String::new(),
            action,
            middlewares: Vec::new(),
        }
    }
}

impl std::fmt::Debug for RouteDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteDef")
            .field("verb", &self.verb)
            .field("path", &self.path)
            .field("name", &self.name)
            .field("middlewares", &self.middlewares.len())
            .finish()
    }
}

/// Returned by `get`, `post`, ... to name a route or attach middlewares.
pub struct RouteHandle<'a> {
    route: &'a mut RouteDef,
}

impl<'a> RouteHandle<'a> {
    pub(crate) fn new(route: &'a mut RouteDef) -> Self {
        Self { route }
    }

    /// Name the route for reversal. Enclosing group names are prepended.
    pub fn name(self, name: impl Into<String>) -> Self {
        self.route.name = name.into();
        self
    }

    /// Add middlewares, run after the global and group ones.
    pub fn middlewares(self, middlewares: impl IntoIterator<Item = SharedMiddleware>) -> Self {
        self.route.middlewares.extend(middlewares);
        self
    }

    /// Add one middleware.
    pub fn middleware(self, middleware: impl Middleware) -> Self {
        self.middlewares([crate::http::action::middleware(middleware)])
    }
}

/// A route after flattening: absolute path, full name, complete chain.
#[derive(Clone)]
pub struct ResolvedRoute {
    pub verb: Verb,
    pub path: String,
    pub name: String,
    pub action: SharedAction,
    /// Group middlewares (outer to inner), then the route's own.
    pub middlewares: Vec<SharedMiddleware>,
}

impl std::fmt::Debug for ResolvedRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedRoute")
            .field("verb", &self.verb)
            .field("path", &self.path)
            .field("name", &self.name)
            .field("middlewares", &self.middlewares.len())
            .finish()
    }
}
