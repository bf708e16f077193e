//! Signed cookie store.
//!
//! A cookie value is `payload.signature`, both base64url without padding.
//! The payload is JSON `{"t": <unix seconds>, "v": {..values..}}`; the
//! signature is HMAC-SHA256 over `name|payload`, so a value signed for one
//! cookie name is rejected under another.

use std::sync::Arc;

use axum::http::header::{HeaderValue, COOKIE, SET_COOKIE};
use axum::http::HeaderMap;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};
use sha2::Sha256;

use crate::session::cookie::{self, CookieOptions};
use crate::session::{Session, SessionError};

type HmacSha256 = Hmac<Sha256>;

#[derive(Serialize, Deserialize)]
struct Payload {
    t: i64,
    v: Map<String, Json>,
}

/// Creates, verifies and signs session cookies.
#[derive(Clone)]
pub struct CookieStore {
    key: Arc<[u8]>,
    defaults: CookieOptions,
}

impl std::fmt::Debug for CookieStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieStore")
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

impl CookieStore {
    /// Store signing with `key`.
    pub fn new(key: impl AsRef<[u8]>) -> Self {
        Self {
            key: Arc::from(key.as_ref()),
            defaults: CookieOptions::default(),
        }
    }

    /// Options given to every new session.
    pub fn with_defaults(mut self, defaults: CookieOptions) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn defaults(&self) -> &CookieOptions {
        &self.defaults
    }

    /// Load the session `name` from request headers.
    ///
    /// A missing cookie gives a new session. A cookie that cannot be
    /// verified also gives a new session, carrying the reason in
    /// [`Session::load_error`].
    pub fn load(&self, name: &str, headers: &HeaderMap) -> Session {
        let cookies = headers.get_all(COOKIE).iter().filter_map(|v| v.to_str().ok());

        let Some(value) = cookie::find(cookies, name) else {
            return Session::fresh(name, self.defaults.clone(), None);
        };

        match self.decode(name, value, Utc::now().timestamp()) {
            Ok(values) => Session::loaded(name, values, self.defaults.clone()),
            Err(e) => {
                tracing::debug!(session = %name, error = %e, "Discarding session cookie");
                Session::fresh(name, self.defaults.clone(), Some(e))
            }
        }
    }

    /// `Set-Cookie` header for a session, or `None` when it was not modified.
    pub fn save(&self, session: &Session) -> Result<Option<HeaderValue>, SessionError> {
        if !session.is_modified() {
            return Ok(None);
        }

        let now = Utc::now();
        let value = if session.options().max_age < 0 {
            String::new()
        } else {
            self.encode(session.name(), session.values(), now.timestamp())?
        };

        let header = session.options().render(session.name(), &value, now);
        HeaderValue::from_str(&header)
            .map(Some)
            .map_err(|_| SessionError::InvalidHeader)
    }

    /// Append `Set-Cookie` headers for every modified session.
    pub fn save_all<'s>(
        &self,
        sessions: impl IntoIterator<Item = &'s Session>,
        headers: &mut HeaderMap,
    ) -> Result<(), SessionError> {
        for session in sessions {
            if let Some(value) = self.save(session)? {
                headers.append(SET_COOKIE, value);
            }
        }
        Ok(())
    }

    /// Sign `values` for cookie `name`, timestamped `now`.
    pub fn encode(&self, name: &str, values: &Map<String, Json>, now: i64) -> Result<String, SessionError> {
        let payload = serde_json::to_vec(&Payload {
            t: now,
            v: values.clone(),
        })
        .map_err(|e| SessionError::Serialize(e.to_string()))?;

        let payload = URL_SAFE_NO_PAD.encode(payload);
        let signature = URL_SAFE_NO_PAD.encode(self.mac(name, &payload).finalize().into_bytes());
        Ok(format!("{}.{}", payload, signature))
    }

    /// Verify and decode a cookie value for cookie `name` at time `now`.
    pub fn decode(&self, name: &str, value: &str, now: i64) -> Result<Map<String, Json>, SessionError> {
        let (payload, signature) = value.split_once('.').ok_or(SessionError::Malformed)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| SessionError::Malformed)?;

        self.mac(name, payload)
            .verify_slice(&signature)
            .map_err(|_| SessionError::InvalidSignature)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| SessionError::Malformed)?;
        let payload: Payload = serde_json::from_slice(&payload).map_err(|_| SessionError::Malformed)?;

        let max_age = self.defaults.max_age;
        if max_age > 0 && now.saturating_sub(payload.t) > max_age {
            return Err(SessionError::Expired);
        }

        Ok(payload.v)
    }

    fn mac(&self, name: &str, payload: &str) -> HmacSha256 {
        let mut mac = match HmacSha256::new_from_slice(&self.key) {
            Ok(mac) => mac,
            Err(_) => unreachable!("HMAC-SHA256 takes keys of any length"),
        };
        mac.update(name.as_bytes());
        mac.update(b"|");
        mac.update(payload.as_bytes());
        mac
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values() -> Map<String, Json> {
        let mut values = Map::new();
        values.insert("user".into(), Json::from("ana"));
        values.insert("visits".into(), Json::from(3));
        values
    }

    #[test]
    fn test_signed_value_verifies() {
        let store = CookieStore::new("secret");
        let cookie = store.encode("sid", &values(), 1_000).unwrap();
        assert_eq!(store.decode("sid", &cookie, 1_010).unwrap(), values());
    }

    #[test]
    fn test_tampering_is_detected() {
        let store = CookieStore::new("secret");
        let cookie = store.encode("sid", &values(), 1_000).unwrap();

        let (_, signature) = cookie.split_once('.').unwrap();
        let forged = URL_SAFE_NO_PAD.encode(br#"{"t":1000,"v":{"user":"admin"}}"#);
        assert_eq!(
            store.decode("sid", &format!("{}.{}", forged, signature), 1_010),
            Err(SessionError::InvalidSignature)
        );
        assert_eq!(
            CookieStore::new("other").decode("sid", &cookie, 1_010),
            Err(SessionError::InvalidSignature)
        );
        assert_eq!(store.decode("other", &cookie, 1_010), Err(SessionError::InvalidSignature));
        assert_eq!(store.decode("sid", "garbage", 1_010), Err(SessionError::Malformed));
    }

    #[test]
    fn test_old_cookies_expire() {
        let store = CookieStore::new("secret").with_defaults(CookieOptions {
            max_age: 60,
            ..CookieOptions::default()
        });
        let cookie = store.encode("sid", &values(), 1_000).unwrap();
        assert!(store.decode("sid", &cookie, 1_060).is_ok());
        assert_eq!(store.decode("sid", &cookie, 1_061), Err(SessionError::Expired));
    }

    #[test]
    fn test_load_and_save() {
        let store = CookieStore::new("secret");
        let mut session = store.load("sid", &HeaderMap::new());
        assert!(session.is_new());
        assert_eq!(store.save(&session), Ok(None));

        session.set("user", "ana");
        let header = store.save(&session).unwrap().unwrap();
        let header = header.to_str().unwrap();
        assert!(header.starts_with("sid="));

        let cookie = header.split(';').next().unwrap();
        let mut request = HeaderMap::new();
        request.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());

        let loaded = store.load("sid", &request);
        assert!(!loaded.is_new());
        assert!(loaded.load_error().is_none());
        assert_eq!(loaded.get("user"), Some(&Json::from("ana")));
        assert_eq!(store.save(&loaded), Ok(None));
    }

    #[test]
    fn test_bad_cookie_gives_new_session_with_reason() {
        let store = CookieStore::new("secret");
        let mut request = HeaderMap::new();
        request.insert(COOKIE, HeaderValue::from_static("sid=abc.AAAA"));

        let session = store.load("sid", &request);
        assert!(session.is_new());
        assert_eq!(session.load_error(), Some(&SessionError::InvalidSignature));
    }
}
