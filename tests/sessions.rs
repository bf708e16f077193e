//! Cookie sessions across requests.

use axum::body::Body;
use axum::http::header::COOKIE;
use axum::http::{Request, StatusCode};
use velum::session::SessionError;
use velum::{App, Context};

mod common;

async fn count(mut c: Context) -> Context {
    let session = c.session("visits").unwrap();
    let visits = session.get_as::<i64>("count").unwrap_or(0) + 1;
    session.set("count", visits);
    c.text(StatusCode::OK, visits.to_string());
    c
}

async fn flash_set(mut c: Context) -> Context {
    c.session("ui").unwrap().set_flash("notice", "saved");
    c.redirect("/flash/show", StatusCode::SEE_OTHER).unwrap();
    c
}

async fn flash_show(mut c: Context) -> Context {
    let notice = c
        .session("ui")
        .unwrap()
        .get_flash("notice")
        .and_then(|v| v.as_str().map(str::to_owned))
        .unwrap_or_else(|| "none".to_string());
    c.text(StatusCode::OK, notice);
    c
}

async fn logout(mut c: Context) -> Context {
    c.session("visits").unwrap().expire();
    c.text(StatusCode::OK, "bye");
    c
}

async fn inspect(mut c: Context) -> Context {
    let session = c.session("visits").unwrap();
    let body = format!("new={} error={:?}", session.is_new(), session.load_error());
    c.text(StatusCode::OK, body);
    c
}

fn app() -> App {
    let mut app = App::new();
    app.get("/count", count);
    app.get("/flash/set", flash_set);
    app.get("/flash/show", flash_show);
    app.get("/logout", logout);
    app.get("/inspect", inspect);
    app
}

#[tokio::test]
async fn test_session_survives_requests() {
    let client = common::client(app(), common::session_config());

    assert_eq!(client.get("/count").await.unwrap().text(), "1");
    assert_eq!(client.get("/count").await.unwrap().text(), "2");
    assert_eq!(client.get("/count").await.unwrap().text(), "3");

    let cookie = client.cookie("visits").unwrap();
    assert!(cookie.contains('.'), "signed cookie: {}", cookie);
}

#[tokio::test]
async fn test_unmodified_session_sends_no_cookie() {
    let client = common::client(app(), common::session_config());

    let response = client.get("/inspect").await.unwrap();
    assert_eq!(response.text(), "new=true error=None");
    assert!(response.header("set-cookie").is_none());
}

#[tokio::test]
async fn test_flash_is_read_once() {
    let client = common::client(app(), common::session_config());

    let redirect = client.get("/flash/set").await.unwrap();
    assert_eq!(redirect.status, StatusCode::SEE_OTHER);

    assert_eq!(client.get("/flash/show").await.unwrap().text(), "saved");
    assert_eq!(client.get("/flash/show").await.unwrap().text(), "none");
}

#[tokio::test]
async fn test_expire_deletes_the_cookie() {
    let client = common::client(app(), common::session_config());

    client.get("/count").await.unwrap();
    let response = client.get("/logout").await.unwrap();
    let set_cookie = response.header("set-cookie").unwrap();
    assert!(set_cookie.starts_with("visits=;"), "{}", set_cookie);
    assert!(set_cookie.contains("Max-Age=0"));

    assert!(client.cookie("visits").is_none());
    assert_eq!(client.get("/count").await.unwrap().text(), "1");
}

#[tokio::test]
async fn test_tampered_cookie_starts_a_new_session() {
    let client = common::client(app(), common::session_config());

    client.get("/count").await.unwrap();
    let cookie = client.cookie("visits").unwrap();
    let (payload, _) = cookie.split_once('.').unwrap();
    let forged = format!("visits={}.AAAA", payload);

    let request = Request::get("/inspect")
        .header(COOKIE, forged)
        .body(Body::empty())
        .unwrap();
    let response = client.request(request).await.unwrap();
    assert_eq!(
        response.text(),
        format!("new=true error={:?}", Some(&SessionError::InvalidSignature))
    );
}

#[tokio::test]
async fn test_cookie_signed_with_another_key_is_rejected() {
    let first = common::client(app(), common::session_config());
    first.get("/count").await.unwrap();
    let cookie = first.cookie("visits").unwrap();

    let other_config = common::config("keys:\n  sessions: a-completely-different-key\n");
    let second = common::client(app(), other_config);
    let request = Request::get("/count")
        .header(COOKIE, format!("visits={}", cookie))
        .body(Body::empty())
        .unwrap();
    assert_eq!(second.request(request).await.unwrap().text(), "1");
}

#[tokio::test]
async fn test_sessions_need_a_key() {
    let mut app = App::new();
    app.get("/", |mut c: Context| async move {
        let outcome = match c.session("sid") {
            Err(SessionError::StoreNotConfigured) => "no store",
            Err(_) => "other error",
            Ok(_) => "session",
        };
        c.text(StatusCode::OK, outcome);
        c
    });
    let client = common::client(app, common::config(""));

    assert_eq!(client.get("/").await.unwrap().text(), "no store");
}
