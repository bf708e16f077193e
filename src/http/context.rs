//! The per-request context.
//!
//! # Responsibilities
//! - Expose the request: method, uri, headers, path params, query, body
//! - Buffer the response: status, headers, body
//! - Build forms from the buffered body
//! - Load sessions lazily and send the modified ones back as cookies
//! - Carry request-scoped values between middlewares and the action
//!
//! # Design Decisions
//! - The body is read once by the dispatcher; forms parse from the buffer
//! - Nothing is written until the chain returns, so a middleware that
//!   stops the chain still gets its buffered response sent

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::ConnectInfo;
use axum::http::header::{HeaderName, HeaderValue, CONTENT_TYPE, LOCATION};
use axum::http::request::Parts;
use axum::http::{Extensions, HeaderMap, Method, Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use url::form_urlencoded;

use crate::config::AppConfig;
use crate::form::{sniff, Form, FormError, MultipartForm};
use crate::http::state::AppState;
use crate::http::ResponseError;
use crate::routing::RouteError;
use crate::session::{Session, SessionError};

/// Everything an action or middleware sees of one request.
pub struct Context {
    parts: Parts,
    body: Bytes,
    params: HashMap<String, String>,
    route: Arc<str>,
    shared: Extensions,
    status: StatusCode,
    headers: HeaderMap,
    buffer: Vec<u8>,
    sessions: Vec<Session>,
    state: Arc<AppState>,
}

impl Context {
    pub(crate) fn new(
        parts: Parts,
        body: Bytes,
        params: HashMap<String, String>,
        route: Arc<str>,
        state: Arc<AppState>,
    ) -> Self {
        Self {
            parts,
            body,
            params,
            route,
            shared: Extensions::new(),
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            buffer: Vec::new(),
            sessions: Vec::new(),
            state,
        }
    }

    // Response

    /// Append text to the response body.
    pub fn text(&mut self, status: StatusCode, text: impl AsRef<str>) -> &mut Self {
        self.status = status;
        self.buffer.extend_from_slice(text.as_ref().as_bytes());
        self
    }

    /// Append raw bytes to the response body.
    pub fn bytes(&mut self, status: StatusCode, bytes: impl AsRef<[u8]>) -> &mut Self {
        self.status = status;
        self.buffer.extend_from_slice(bytes.as_ref());
        self
    }

    /// Append `value` as a line of JSON and set the JSON content type.
    pub fn json<T: Serialize + ?Sized>(&mut self, status: StatusCode, value: &T) -> Result<(), ResponseError> {
        self.status = status;
        self.raw_json(value)
    }

    /// Like [`Context::json`] but keeps the current status.
    pub fn raw_json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), ResponseError> {
        serde_json::to_writer(&mut self.buffer, value)?;
        self.buffer.push(b'\n');
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(())
    }

    pub fn status(&mut self, status: StatusCode) -> &mut Self {
        self.status = status;
        self
    }

    pub fn current_status(&self) -> StatusCode {
        self.status
    }

    pub fn content_type(&mut self, content_type: &str) -> Result<(), ResponseError> {
        self.set_header(CONTENT_TYPE.as_str(), content_type)
    }

    /// Set a response header, replacing any previous value.
    pub fn set_header(&mut self, name: &str, value: &str) -> Result<(), ResponseError> {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(axum::http::Error::from)?;
        let value = HeaderValue::from_str(value).map_err(axum::http::Error::from)?;
        self.headers.insert(name, value);
        Ok(())
    }

    pub fn response_headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Body buffered so far.
    pub fn response_body(&self) -> &[u8] {
        &self.buffer
    }

    pub fn redirect(&mut self, url: &str, status: StatusCode) -> Result<(), ResponseError> {
        self.set_header(LOCATION.as_str(), url)?;
        self.status = status;
        Ok(())
    }

    /// Redirect to a named route.
    pub fn redirect_to_route(
        &mut self,
        name: &str,
        params: &[(&str, &str)],
        status: StatusCode,
    ) -> Result<(), ResponseError> {
        let url = self.route(name, params)?;
        self.redirect(&url, status)
    }

    // Request

    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// First value of a request header, or `""`.
    pub fn get_header(&self, name: &str) -> &str {
        self.parts
            .headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
    }

    /// The raw request body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// A path parameter, or `""`.
    pub fn param(&self, key: &str) -> &str {
        self.params.get(key).map(String::as_str).unwrap_or("")
    }

    /// First query string value for `key`, or `""`.
    pub fn query(&self, key: &str) -> String {
        self.parts
            .uri
            .query()
            .and_then(|query| {
                form_urlencoded::parse(query.as_bytes())
                    .find(|(k, _)| k == key)
                    .map(|(_, v)| v.into_owned())
            })
            .unwrap_or_default()
    }

    /// Peer address, when served over a socket.
    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0)
    }

    /// Pattern of the matched route, e.g. `/users/{id}`.
    pub fn matched_route(&self) -> &str {
        &self.route
    }

    /// Values shared between middlewares and the action of this request.
    pub fn shared(&self) -> &Extensions {
        &self.shared
    }

    pub fn shared_mut(&mut self) -> &mut Extensions {
        &mut self.shared
    }

    pub fn config(&self) -> &AppConfig {
        &self.state.config
    }

    // Forms

    /// The url-encoded form: body values (for url-encoded bodies) followed
    /// by query string values.
    pub fn form(&self) -> Form {
        let body = self
            .get_header(CONTENT_TYPE.as_str())
            .starts_with("application/x-www-form-urlencoded")
            .then_some(&self.body[..]);
        Form::parse(body, self.parts.uri.query())
    }

    /// The multipart form, refusing bodies over `max_bytes`.
    pub async fn multipart_form(&self, max_bytes: usize) -> Result<MultipartForm, FormError> {
        if !self
            .get_header(CONTENT_TYPE.as_str())
            .starts_with("multipart/form-data")
        {
            return Err(FormError::NotMultipart);
        }
        if self.body.len() > max_bytes {
            return Err(FormError::TooLarge {
                size: self.body.len(),
                limit: max_bytes,
            });
        }

        let request = Request::from_parts(self.parts.clone(), Body::from(self.body.clone()));
        MultipartForm::from_request(request).await
    }

    // Sessions and routes

    /// The session stored in cookie `name`, loaded on first use.
    ///
    /// A cookie that fails verification gives a new session whose
    /// [`Session::load_error`] says why.
    pub fn session(&mut self, name: &str) -> Result<&mut Session, SessionError> {
        let store = self
            .state
            .sessions
            .as_ref()
            .ok_or(SessionError::StoreNotConfigured)?;

        let index = match self.sessions.iter().position(|s| s.name() == name) {
            Some(index) => index,
            None => {
                self.sessions.push(store.load(name, &self.parts.headers));
                self.sessions.len() - 1
            }
        };
        Ok(&mut self.sessions[index])
    }

    /// Path of a named route with its parameters filled in.
    pub fn route(&self, name: &str, params: &[(&str, &str)]) -> Result<String, RouteError> {
        self.state.routes.url_for(name, params)
    }

    /// A context for the same request with an empty response.
    pub(crate) fn fresh(&self) -> Self {
        Self::new(
            self.parts.clone(),
            self.body.clone(),
            self.params.clone(),
            self.route.clone(),
            self.state.clone(),
        )
    }
}

impl IntoResponse for Context {
    fn into_response(self) -> Response {
        let Context {
            status,
            mut headers,
            buffer,
            sessions,
            state,
            ..
        } = self;

        if let Some(store) = &state.sessions {
            if let Err(e) = store.save_all(&sessions, &mut headers) {
                tracing::error!(error = %e, "Failed to save session");
            }
        }

        if !buffer.is_empty() && !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(sniff::detect(&buffer)));
        }

        let mut response = Response::new(Body::from(buffer));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}
