//! Routing: parameters, named routes, groups and fallbacks.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use velum::http::ServerError;
use velum::routing::RouteError;
use velum::{App, Context};

mod common;

async fn show_user(mut c: Context) -> Context {
    let body = format!("user {} via {}", c.param("id"), c.matched_route());
    c.text(StatusCode::OK, body);
    c
}

async fn link_to_user(mut c: Context) -> Context {
    let link = c.route("users.show", &[("id", "42")]).unwrap();
    c.text(StatusCode::OK, link);
    c
}

async fn go_home(mut c: Context) -> Context {
    c.redirect_to_route("home", &[], StatusCode::SEE_OTHER).unwrap();
    c
}

#[tokio::test]
async fn test_path_params_and_matched_route() {
    let mut app = App::new();
    app.get("/users/{id}", show_user);
    let client = common::client(app, common::config(""));

    let response = client.get("/users/7").await.unwrap();
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), "user 7 via /users/{id}");
}

#[tokio::test]
async fn test_named_routes_resolve_inside_groups() {
    let mut app = App::new();
    app.get("/", common::hello).name("home");
    app.group("/users", |users| {
        users.get("/{id}", show_user).name("show");
        users.get("/link", link_to_user);
    })
    .name("users.");
    app.get("/away", go_home);
    let client = common::client(app, common::config(""));

    assert_eq!(client.get("/users/link").await.unwrap().text(), "/users/42");

    let redirect = client.get("/away").await.unwrap();
    assert_eq!(redirect.status, StatusCode::SEE_OTHER);
    assert_eq!(redirect.header("location"), Some("/"));

    assert!(client.route_ok("home").await);
    assert!(!client.route_ok("users.show").await, "needs a parameter");
    assert!(!client.route_ok("missing").await);
    assert!(client.url_ok("/users/1").await);
}

#[tokio::test]
async fn test_same_path_different_verbs() {
    let mut app = App::new();
    app.get("/items", common::hello);
    app.post("/items", |mut c: Context| async move {
        c.text(StatusCode::CREATED, "created");
        c
    });
    let client = common::client(app, common::config(""));

    assert_eq!(client.get("/items").await.unwrap().text(), "hello");
    let created = client.post_form("/items", &[]).await.unwrap();
    assert_eq!(created.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_trailing_slash_is_ignored() {
    let mut app = App::new();
    app.get("/about", common::hello);
    let client = common::client(app, common::config(""));

    assert!(client.url_ok("/about").await);
    assert!(client.url_ok("/about/").await);
}

#[tokio::test]
async fn test_default_not_found_and_method_not_allowed() {
    let mut app = App::new();
    app.get("/only-get", common::hello);
    let client = common::client(app, common::config(""));

    let missing = client.get("/nowhere").await.unwrap();
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.text(), "404 page not found\n");

    let request = Request::delete("/only-get").body(Body::empty()).unwrap();
    let wrong_verb = client.request(request).await.unwrap();
    assert_eq!(wrong_verb.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(wrong_verb.text(), "405 method not allowed\n");
}

#[tokio::test]
async fn test_custom_fallbacks_start_with_their_status() {
    let mut app = App::new();
    app.get("/only-get", common::hello);
    app.global_middleware(common::mark("global"));
    app.not_found(|mut c: Context| async move {
        // Global middlewares do not run for fallbacks.
        let ran = c.shared().get::<common::Trail>().is_some();
        let body = format!("no page at {} (middlewares: {})", c.uri().path(), ran);
        c.text(c.current_status(), body);
        c
    });
    app.method_not_allowed(|mut c: Context| async move {
        let body = format!("{} not allowed", c.method());
        let status = c.current_status();
        c.text(status, body);
        c
    });
    let client = common::client(app, common::config(""));

    let missing = client.get("/nope").await.unwrap();
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.text(), "no page at /nope (middlewares: false)");

    let request = Request::put("/only-get").body(Body::empty()).unwrap();
    let wrong_verb = client.request(request).await.unwrap();
    assert_eq!(wrong_verb.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(wrong_verb.text(), "PUT not allowed");
}

#[test]
fn test_duplicate_route_is_rejected() {
    let mut app = App::new();
    app.get("/twice", common::hello);
    app.get("/twice", common::hello);

    assert!(matches!(
        app.build(common::config("")),
        Err(ServerError::DuplicateRoute { .. })
    ));
}

#[test]
fn test_duplicate_name_is_rejected() {
    let mut app = App::new();
    app.get("/a", common::hello).name("page");
    app.get("/b", common::hello).name("page");

    assert!(matches!(
        app.build(common::config("")),
        Err(ServerError::Route(RouteError::DuplicateName(_)))
    ));
}

#[test]
fn test_colon_params_are_rejected() {
    let mut app = App::new();
    app.get("/users/:id", common::hello);

    assert!(matches!(
        app.build(common::config("")),
        Err(ServerError::InvalidPath(path)) if path == "/users/:id"
    ));
}
