//! Named route reversal.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::routing::route::ResolvedRoute;
use crate::routing::RouteError;

/// `{name}` and `{*name}` path placeholders.
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\*?([^{}]+)\}").expect("placeholder regex"));

/// Path patterns of every named route.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    paths: HashMap<String, String>,
}

impl RouteTable {
    /// Index the named routes. A name may be shared by several methods of
    /// the same path, but not by different paths.
    pub fn from_routes<'r>(routes: impl IntoIterator<Item = &'r ResolvedRoute>) -> Result<Self, RouteError> {
        let mut paths: HashMap<String, String> = HashMap::new();
        for route in routes {
            if route.name.is_empty() {
                continue;
            }
            match paths.get(&route.name) {
                Some(existing) if *existing != route.path => {
                    return Err(RouteError::DuplicateName(route.name.clone()));
                }
                Some(_) => {}
                None => {
                    paths.insert(route.name.clone(), route.path.clone());
                }
            }
        }
        Ok(Self { paths })
    }

    /// Path pattern of a named route.
    pub fn pattern(&self, name: &str) -> Option<&str> {
        self.paths.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.paths.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.paths.keys().map(String::as_str)
    }

    /// Build the path of a named route, filling its placeholders.
    pub fn url_for(&self, name: &str, params: &[(&str, &str)]) -> Result<String, RouteError> {
        let pattern = self
            .pattern(name)
            .ok_or_else(|| RouteError::UnknownRoute(name.to_string()))?;

        let mut missing = None;
        let url = PLACEHOLDER.replace_all(pattern, |caps: &Captures<'_>| {
            let key = &caps[1];
            match params.iter().find(|(k, _)| *k == key) {
                Some((_, value)) => value.to_string(),
                None => {
                    missing.get_or_insert_with(|| key.to_string());
                    String::new()
                }
            }
        });

        match missing {
            Some(param) => Err(RouteError::MissingParam {
                route: name.to_string(),
                param,
            }),
            None => Ok(url.into_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Context;
    use crate::routing::Group;

    async fn noop(c: Context) -> Context {
        c
    }

    fn table() -> RouteTable {
        let mut root = Group::default();
        root.get("/", noop).name("home");
        root.get("/users/{id}/posts/{post}", noop).name("post");
        root.get("/files/{*rest}", noop).name("files");
        root.post("/users/{id}/posts/{post}", noop).name("post");
        RouteTable::from_routes(&root.resolve()).unwrap()
    }

    #[test]
    fn test_url_for() {
        let table = table();
        assert_eq!(table.url_for("home", &[]).unwrap(), "/");
        assert_eq!(
            table.url_for("post", &[("id", "7"), ("post", "42")]).unwrap(),
            "/users/7/posts/42"
        );
        assert_eq!(
            table.url_for("files", &[("rest", "a/b.txt")]).unwrap(),
            "/files/a/b.txt"
        );
    }

    #[test]
    fn test_url_for_errors() {
        let table = table();
        assert_eq!(
            table.url_for("nope", &[]),
            Err(RouteError::UnknownRoute("nope".into()))
        );
        assert_eq!(
            table.url_for("post", &[("id", "7")]),
            Err(RouteError::MissingParam {
                route: "post".into(),
                param: "post".into()
            })
        );
    }

    #[test]
    fn test_duplicate_names_for_different_paths() {
        let mut root = Group::default();
        root.get("/a", noop).name("x");
        root.get("/b", noop).name("x");
        assert_eq!(
            RouteTable::from_routes(&root.resolve()).unwrap_err(),
            RouteError::DuplicateName("x".into())
        );
    }
}
