//! Helpers for testing applications in-process.
//!
//! [`TestClient`] sends requests straight into the built service with
//! `tower::ServiceExt::oneshot`, so no socket is opened. Cookies set by
//! responses are remembered and sent back, which keeps sessions alive
//! across requests.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::body::{Body, Bytes};
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tower::ServiceExt;
use url::form_urlencoded;

use crate::config::AppConfig;
use crate::http::{AppService, Server};
use crate::routing::RouteTable;

const BOUNDARY: &str = "velum-test-boundary-7MA4YWxkTrZu0gW";

#[derive(Debug, Error)]
pub enum TestError {
    #[error("cannot build request: {0}")]
    Request(#[from] axum::http::Error),

    #[error("cannot read response body: {0}")]
    Body(String),

    #[error("cannot read file: {0}")]
    Io(#[from] std::io::Error),
}

/// In-process client for a built application.
#[derive(Clone)]
pub struct TestClient {
    service: AppService,
    routes: RouteTable,
    config: Arc<AppConfig>,
    cookies: Arc<Mutex<HashMap<String, String>>>,
}

impl TestClient {
    pub fn new(server: &Server) -> Self {
        Self {
            service: server.service(),
            routes: server.routes().clone(),
            config: Arc::new(server.config().clone()),
            cookies: Arc::default(),
        }
    }

    /// Send any request. Remembered cookies are added unless the request
    /// already has a `Cookie` header.
    pub async fn request(&self, mut request: Request<Body>) -> Result<TestResponse, TestError> {
        if !request.headers().contains_key(COOKIE) {
            if let Some(cookie) = self.cookie_header() {
                request.headers_mut().insert(COOKIE, cookie.parse().map_err(axum::http::Error::from)?);
            }
        }

        let response = match self.service.clone().oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        };

        let (parts, body) = response.into_parts();
        let body = axum::body::to_bytes(body, usize::MAX)
            .await
            .map_err(|e| TestError::Body(e.to_string()))?;

        self.remember(&parts.headers);
        Ok(TestResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }

    pub async fn get(&self, uri: &str) -> Result<TestResponse, TestError> {
        self.request(Request::get(uri).body(Body::empty())?).await
    }

    /// Submit a url-encoded form.
    pub async fn post_form(&self, uri: &str, fields: &[(&str, &str)]) -> Result<TestResponse, TestError> {
        self.send_form(Method::POST, uri, fields).await
    }

    pub async fn send_form(
        &self,
        method: Method,
        uri: &str,
        fields: &[(&str, &str)],
    ) -> Result<TestResponse, TestError> {
        let body = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))?;
        self.request(request).await
    }

    /// Submit a multipart form.
    pub async fn post_multipart(&self, uri: &str, form: TestMultipart) -> Result<TestResponse, TestError> {
        let request = Request::post(uri)
            .header(CONTENT_TYPE, form.content_type())
            .body(Body::from(form.into_body()))?;
        self.request(request).await
    }

    /// `GET uri` answers 200.
    pub async fn url_ok(&self, uri: &str) -> bool {
        matches!(self.get(uri).await, Ok(response) if response.status == StatusCode::OK)
    }

    /// The named route exists, needs no parameters and answers `GET` with 200.
    pub async fn route_ok(&self, name: &str) -> bool {
        match self.routes.url_for(name, &[]) {
            Ok(url) => self.url_ok(&url).await,
            Err(_) => false,
        }
    }

    /// Values under the config's `testing` key.
    pub fn config(&self) -> TestConfig {
        TestConfig {
            config: self.config.clone(),
        }
    }

    /// Value of a remembered cookie.
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.cookies.lock().ok()?.get(name).cloned()
    }

    fn cookie_header(&self) -> Option<String> {
        let cookies = self.cookies.lock().ok()?;
        if cookies.is_empty() {
            return None;
        }
        Some(
            cookies
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    fn remember(&self, headers: &HeaderMap) {
        let Ok(mut cookies) = self.cookies.lock() else {
            return;
        };
        for header in headers.get_all(SET_COOKIE) {
            let Some((name, value)) = header
                .to_str()
                .ok()
                .and_then(|h| h.split(';').next())
                .and_then(|pair| pair.split_once('='))
            else {
                continue;
            };
            if value.is_empty() {
                cookies.remove(name);
            } else {
                cookies.insert(name.to_string(), value.to_string());
            }
        }
    }
}

/// A fully buffered response.
#[derive(Debug, Clone)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Builder for a `multipart/form-data` body.
#[derive(Debug, Clone, Default)]
pub struct TestMultipart {
    body: Vec<u8>,
}

impl TestMultipart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &str, value: &str) -> Self {
        self.part(name, None, None, value.as_bytes());
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, content: impl AsRef<[u8]>) -> Self {
        self.part(name, Some(filename), Some(content_type), content.as_ref());
        self
    }

    /// Attach a file read from disk, sent as `application/octet-stream`.
    pub fn file_from_path(self, name: &str, path: impl AsRef<Path>) -> Result<Self, TestError> {
        let path = path.as_ref();
        let content = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.to_string());
        Ok(self.file(name, &filename, "application/octet-stream", content))
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", BOUNDARY)
    }

    pub fn into_body(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        self.body
    }

    fn part(&mut self, name: &str, filename: Option<&str>, content_type: Option<&str>, content: &[u8]) {
        let mut head = format!("--{}\r\nContent-Disposition: form-data; name=\"{}\"", BOUNDARY, name);
        if let Some(filename) = filename {
            head.push_str(&format!("; filename=\"{}\"", filename));
        }
        head.push_str("\r\n");
        if let Some(content_type) = content_type {
            head.push_str(&format!("Content-Type: {}\r\n", content_type));
        }
        head.push_str("\r\n");

        self.body.extend_from_slice(head.as_bytes());
        self.body.extend_from_slice(content);
        self.body.extend_from_slice(b"\r\n");
    }
}

/// Read access to the config's `testing` map.
#[derive(Debug, Clone)]
pub struct TestConfig {
    config: Arc<AppConfig>,
}

impl TestConfig {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// The value at `testing.<key>`.
    pub fn from_testing_key(&self, key: &str) -> TestingValue {
        let value = self
            .config
            .get_key("testing")
            .and_then(|testing| testing.as_mapping())
            .and_then(|testing| testing.get(key))
            .cloned();
        TestingValue {
            key: key.to_string(),
            value,
        }
    }
}

/// One value from the `testing` map; absent when the key is missing.
#[derive(Debug, Clone, PartialEq)]
pub struct TestingValue {
    key: String,
    value: Option<serde_yaml::Value>,
}

impl TestingValue {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn as_str(&self) -> Option<&str> {
        self.value.as_ref()?.as_str()
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.value.as_ref()?.as_i64()
    }

    pub fn raw(&self) -> Option<&serde_yaml::Value> {
        self.value.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::parse_config;

    #[test]
    fn test_testing_values() {
        let config = parse_config("port: 8080\ntesting:\n  user: ana\n  visits: 3\n").unwrap();
        let testing = TestConfig::new(config);

        assert_eq!(testing.from_testing_key("user").as_str(), Some("ana"));
        assert_eq!(testing.from_testing_key("visits").as_i64(), Some(3));
        assert_eq!(testing.from_testing_key("visits").as_str(), None);
        assert!(testing.from_testing_key("missing").raw().is_none());
    }

    #[test]
    fn test_multipart_body_layout() {
        let body = TestMultipart::new()
            .field("title", "cat")
            .file("avatar", "a.png", "image/png", b"PNG")
            .into_body();
        let body = String::from_utf8(body).unwrap();

        assert!(body.starts_with(&format!("--{}\r\n", BOUNDARY)));
        assert!(body.contains("name=\"title\"\r\n\r\ncat\r\n"));
        assert!(body.contains("name=\"avatar\"; filename=\"a.png\"\r\nContent-Type: image/png\r\n\r\nPNG\r\n"));
        assert!(body.ends_with(&format!("--{}--\r\n", BOUNDARY)));
    }
}
