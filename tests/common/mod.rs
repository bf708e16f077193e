//! Shared utilities for integration testing.

#![allow(dead_code)]

use axum::http::StatusCode;
use velum::config::loader::parse_config;
use velum::http::{Flow, Middleware};
use velum::testing::TestClient;
use velum::{App, AppConfig, Context};

/// Key used by tests that enable sessions.
pub const SESSION_KEY: &str = "integration-test-session-key";

/// A valid config with `extra` YAML appended.
pub fn config(extra: &str) -> AppConfig {
    parse_config(&format!("port: 8080\n{}", extra)).expect("test config")
}

/// A config with sessions enabled.
pub fn session_config() -> AppConfig {
    config(&format!("keys:\n  sessions: {}\n", SESSION_KEY))
}

/// Build `app` with `config` and wrap it in an in-process client.
pub fn client(app: App, config: AppConfig) -> TestClient {
    let server = app.build(config).expect("app builds");
    TestClient::new(&server)
}

/// Names of the middlewares a request went through, in order.
#[derive(Debug, Clone, Default)]
pub struct Trail(pub Vec<&'static str>);

/// A middleware that appends `name` to the request's [`Trail`].
pub fn mark(name: &'static str) -> impl Middleware {
    move |mut c: Context| async move {
        let shared = c.shared_mut();
        match shared.get_mut::<Trail>() {
            Some(trail) => trail.0.push(name),
            None => {
                shared.insert(Trail(vec![name]));
            }
        }
        (c, Flow::Continue)
    }
}

/// An action that answers with the request's trail joined by commas.
pub async fn report_trail(mut c: Context) -> Context {
    let trail = c
        .shared()
        .get::<Trail>()
        .map(|t| t.0.join(","))
        .unwrap_or_default();
    c.text(StatusCode::OK, trail);
    c
}

pub async fn hello(mut c: Context) -> Context {
    c.text(StatusCode::OK, "hello");
    c
}
