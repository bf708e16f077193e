//! A single named session.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value as Json};

use crate::session::cookie::{CookieOptions, SameSite};
use crate::session::SessionError;

const FLASH_SUFFIX: &str = "_flash";

/// Values and cookie options of one session.
///
/// Changes are only sent back to the client when the values or the options
/// differ from what was loaded.
#[derive(Debug, Clone)]
pub struct Session {
    name: String,
    values: Map<String, Json>,
    options: CookieOptions,
    original_values: Map<String, Json>,
    original_options: CookieOptions,
    is_new: bool,
    load_error: Option<SessionError>,
}

impl Session {
    pub(crate) fn fresh(name: &str, options: CookieOptions, load_error: Option<SessionError>) -> Self {
        Self {
            name: name.to_string(),
            values: Map::new(),
            original_values: Map::new(),
            original_options: options.clone(),
            options,
            is_new: true,
            load_error,
        }
    }

    pub(crate) fn loaded(name: &str, values: Map<String, Json>, options: CookieOptions) -> Self {
        Self {
            name: name.to_string(),
            original_values: values.clone(),
            values,
            original_options: options.clone(),
            options,
            is_new: false,
            load_error: None,
        }
    }

    /// Cookie name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, key: &str) -> Option<&Json> {
        self.values.get(key)
    }

    /// Get a value converted to `T`; `None` when missing or of another shape.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Json>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn delete(&mut self, key: &str) {
        self.values.remove(key);
    }

    /// Store a value readable once through [`Session::get_flash`].
    pub fn set_flash(&mut self, key: &str, value: impl Into<Json>) {
        self.set(format!("{}{}", key, FLASH_SUFFIX), value);
    }

    /// Take a flash value, removing it from the session.
    pub fn get_flash(&mut self, key: &str) -> Option<Json> {
        self.values.remove(&format!("{}{}", key, FLASH_SUFFIX))
    }

    pub fn values(&self) -> &Map<String, Json> {
        &self.values
    }

    /// No valid cookie came with the request.
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// Why the request's cookie was discarded, if it was.
    pub fn load_error(&self) -> Option<&SessionError> {
        self.load_error.as_ref()
    }

    /// Delete the cookie at the end of the request.
    pub fn expire(&mut self) {
        self.max_age(-1);
    }

    pub fn domain(&mut self, domain: impl Into<String>) {
        self.options.domain = Some(domain.into());
    }

    pub fn path(&mut self, path: impl Into<String>) {
        self.options.path = path.into();
    }

    /// Cookie lifetime in seconds. Negative deletes the cookie.
    pub fn max_age(&mut self, seconds: i64) {
        self.options.max_age = seconds;
    }

    /// Set the `Secure` flag. Always turns `HttpOnly` on.
    pub fn secure(&mut self, secure: bool) {
        self.options.secure = secure;
        self.options.http_only = true;
    }

    pub fn same_site(&mut self, same_site: SameSite) {
        self.options.same_site = same_site;
    }

    pub fn options(&self) -> &CookieOptions {
        &self.options
    }

    /// Values or options differ from what was loaded.
    pub fn is_modified(&self) -> bool {
        self.values != self.original_values || self.options != self.original_options
    }
}
