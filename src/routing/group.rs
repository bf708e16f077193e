//! Route groups.
//!
//! A group is a node in a tree of route declarations. The application's
//! root is a group with an empty prefix.

use std::sync::Arc;

use crate::http::action::{Action, Middleware, SharedMiddleware};
use crate::routing::route::{ResolvedRoute, RouteDef, RouteHandle, Verb};

/// Routes and subgroups sharing a path prefix, a name prefix and middlewares.
#[derive(Clone, Default)]
pub struct Group {
    prefix: String,
    name: String,
    middlewares: Vec<SharedMiddleware>,
    routes: Vec<RouteDef>,
    groups: Vec<Group>,
}

impl std::fmt::Debug for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Group")
            .field("prefix", &self.prefix)
            .field("name", &self.name)
            .field("middlewares", &self.middlewares.len())
            .field("routes", &self.routes)
            .field("groups", &self.groups)
            .finish()
    }
}

impl Group {
    pub(crate) fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::default()
        }
    }

    /// Declare a route for `verb` at `path`, relative to this group.
    pub fn route(&mut self, verb: Verb, path: &str, action: impl Action) -> RouteHandle<'_> {
        self.routes.push(RouteDef::new(verb, path, Arc::new(action)));
        let index = self.routes.len() - 1;
        RouteHandle::new(&mut self.routes[index])
    }

    pub fn get(&mut self, path: &str, action: impl Action) -> RouteHandle<'_> {
        self.route(Verb::Get, path, action)
    }

    pub fn post(&mut self, path: &str, action: impl Action) -> RouteHandle<'_> {
        self.route(Verb::Post, path, action)
    }

    pub fn put(&mut self, path: &str, action: impl Action) -> RouteHandle<'_> {
        self.route(Verb::Put, path, action)
    }

    pub fn delete(&mut self, path: &str, action: impl Action) -> RouteHandle<'_> {
        self.route(Verb::Delete, path, action)
    }

    pub fn patch(&mut self, path: &str, action: impl Action) -> RouteHandle<'_> {
        self.route(Verb::Patch, path, action)
    }

    /// Declare a subgroup. Its routes are declared inside `build`.
    pub fn group(&mut self, prefix: &str, build: impl FnOnce(&mut Group)) -> GroupHandle<'_> {
        let mut group = Group::with_prefix(prefix);
        build(&mut group);
        self.groups.push(group);
        let index = self.groups.len() - 1;
        GroupHandle {
            group: &mut self.groups[index],
        }
    }

    /// Flatten the tree into absolute routes.
    pub fn resolve(&self) -> Vec<ResolvedRoute> {
        let mut resolved = Vec::new();
        self.resolve_into("", "", &[], &mut resolved);
        resolved
    }

    fn resolve_into(
        &self,
        path_prefix: &str,
        name_prefix: &str,
        inherited: &[SharedMiddleware],
        out: &mut Vec<ResolvedRoute>,
    ) {
        let path_prefix = format!("{}{}", path_prefix, self.prefix);
        let name_prefix = format!("{}{}", name_prefix, self.name);
        let mut chain = inherited.to_vec();
        chain.extend(self.middlewares.iter().cloned());

        for route in &self.routes {
            let mut middlewares = chain.clone();
            middlewares.extend(route.middlewares.iter().cloned());
            out.push(ResolvedRoute {
                verb: route.verb,
                path: join_path(&path_prefix, &route.path),
                name: if route.name.is_empty() {
                    String::new()
                } else {
                    format!("{}{}", name_prefix, route.name)
                },
                action: route.action.clone(),
                middlewares,
            });
        }

        for group in &self.groups {
            group.resolve_into(&path_prefix, &name_prefix, &chain, out);
        }
    }
}

/// Returned by `group` to name the group or attach middlewares.
pub struct GroupHandle<'a> {
    group: &'a mut Group,
}

impl<'a> GroupHandle<'a> {
    /// Prefix for the names of every named route in the group and its
    /// subgroups, e.g. `"admin."`.
    pub fn name(self, name: impl Into<String>) -> Self {
        self.group.name = name.into();
        self
    }

    /// Middlewares for every route in the group and its subgroups.
    pub fn middlewares(self, middlewares: impl IntoIterator<Item = SharedMiddleware>) -> Self {
        self.group.middlewares.extend(middlewares);
        self
    }

    pub fn middleware(self, middleware: impl Middleware) -> Self {
        self.middlewares([crate::http::action::middleware(middleware)])
    }
}

fn join_path(prefix: &str, path: &str) -> String {
    let joined = format!("{}{}", prefix.trim_end_matches('/'), path);
    if joined.is_empty() {
        "/".to_string()
    } else if joined.starts_with('/') {
        joined
    } else {
        format!("/{}", joined)
    }
}
