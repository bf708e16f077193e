//! Middleware chains and panic recovery.

use axum::http::StatusCode;
use velum::http::middleware;
use velum::{App, Context, Flow};

mod common;

use common::{mark, report_trail};

async fn deny(mut c: Context) -> (Context, Flow) {
    if c.get_header("authorization").is_empty() {
        c.text(StatusCode::UNAUTHORIZED, "denied");
        return (c, Flow::Stop);
    }
    (c, Flow::Continue)
}

async fn explode(_c: Context) -> Context {
    panic!("boom");
}

async fn partial(mut c: Context) -> Context {
    c.text(StatusCode::OK, "half written");
    c.set_header("x-partial", "yes").unwrap();
    panic!("halfway");
}

async fn explode_in_middleware(_c: Context) -> (Context, Flow) {
    panic!("middleware boom");
}

#[tokio::test]
async fn test_global_then_groups_then_route() {
    let mut app = App::new();
    app.global_middlewares([middleware(mark("global-1")), middleware(mark("global-2"))]);
    app.group("/outer", |outer| {
        outer
            .group("/inner", |inner| {
                inner
                    .get("/leaf", report_trail)
                    .middlewares([middleware(mark("route-1")), middleware(mark("route-2"))]);
            })
            .middleware(mark("inner"));
    })
    .middleware(mark("outer"));
    app.get("/plain", report_trail);
    let client = common::client(app, common::config(""));

    let leaf = client.get("/outer/inner/leaf").await.unwrap();
    assert_eq!(leaf.text(), "global-1,global-2,outer,inner,route-1,route-2");

    let plain = client.get("/plain").await.unwrap();
    assert_eq!(plain.text(), "global-1,global-2");
}

#[tokio::test]
async fn test_stop_skips_the_rest_and_keeps_the_response() {
    let mut app = App::new();
    app.get("/secret", report_trail)
        .middleware(deny)
        .middleware(mark("after"));
    let client = common::client(app, common::config(""));

    let denied = client.get("/secret").await.unwrap();
    assert_eq!(denied.status, StatusCode::UNAUTHORIZED);
    assert_eq!(denied.text(), "denied");

    let request = axum::http::Request::get("/secret")
        .header("authorization", "Bearer yes")
        .body(axum::body::Body::empty())
        .unwrap();
    let allowed = client.request(request).await.unwrap();
    assert_eq!(allowed.status, StatusCode::OK);
    assert_eq!(allowed.text(), "after");
}

#[tokio::test]
async fn test_panic_without_handler_is_a_500() {
    let mut app = App::new();
    app.get("/explode", explode);
    app.get("/fine", common::hello);
    let client = common::client(app, common::config(""));

    let response = client.get("/explode").await.unwrap();
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text(), "internal server error");

    // The server keeps serving.
    assert!(client.url_ok("/fine").await);
}

#[tokio::test]
async fn test_panic_handler_gets_the_message() {
    let mut app = App::new();
    app.get("/explode", explode);
    app.get("/guarded", common::hello).middleware(explode_in_middleware);
    app.panic_handler(|c: &mut Context, message: &str| {
        let body = format!("recovered {} on {}", message, c.uri().path());
        let status = c.current_status();
        c.text(status, body);
    });
    let client = common::client(app, common::config(""));

    let response = client.get("/explode").await.unwrap();
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text(), "recovered boom on /explode");

    let response = client.get("/guarded").await.unwrap();
    assert_eq!(response.text(), "recovered middleware boom on /guarded");
}

#[tokio::test]
async fn test_panic_handler_response_is_fresh() {
    let mut app = App::new();
    app.get("/partial", partial);
    app.panic_handler(|c: &mut Context, _message: &str| {
        c.text(StatusCode::SERVICE_UNAVAILABLE, "try later");
    });
    let client = common::client(app, common::config(""));

    let response = client.get("/partial").await.unwrap();
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.text(), "try later");
    assert!(response.header("x-partial").is_none());
}

#[tokio::test]
async fn test_shared_values_reach_the_action() {
    #[derive(Clone)]
    struct User(&'static str);

    let mut app = App::new();
    app.get("/me", |mut c: Context| async move {
        let name = c.shared().get::<User>().map(|u| u.0).unwrap_or("nobody");
        c.text(StatusCode::OK, name);
        c
    })
    .middleware(|mut c: Context| async move {
        c.shared_mut().insert(User("ana"));
        (c, Flow::Continue)
    });
    let client = common::client(app, common::config(""));

    assert_eq!(client.get("/me").await.unwrap().text(), "ana");
}
