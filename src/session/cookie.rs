//! Cookie attributes and `Set-Cookie` rendering.

use chrono::{DateTime, Duration, Utc};

/// Default lifetime of a session cookie: 30 days.
pub const DEFAULT_MAX_AGE: i64 = 86400 * 30;

/// The `SameSite` cookie attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    /// Attribute omitted; the browser decides.
    #[default]
    Default,
    Lax,
    Strict,
    None,
}

/// Attributes sent with a session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
    pub path: String,
    pub domain: Option<String>,
    /// Seconds the cookie lives. Zero makes it a browser-session cookie;
    /// negative deletes it.
    pub max_age: i64,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            domain: None,
            max_age: DEFAULT_MAX_AGE,
            secure: false,
            http_only: true,
            same_site: SameSite::Default,
        }
    }
}

impl CookieOptions {
    /// Render a `Set-Cookie` header value for `name=value` at time `now`.
    pub fn render(&self, name: &str, value: &str, now: DateTime<Utc>) -> String {
        let mut header = if self.max_age < 0 {
            format!("{}=", name)
        } else {
            format!("{}={}", name, value)
        };

        if !self.path.is_empty() {
            header.push_str("; Path=");
            header.push_str(&self.path);
        }
        if let Some(domain) = self.domain.as_deref().filter(|d| !d.is_empty()) {
            header.push_str("; Domain=");
            header.push_str(domain);
        }

        if self.max_age > 0 {
            let expires = now + Duration::seconds(self.max_age);
            header.push_str(&format!(
                "; Expires={}; Max-Age={}",
                expires.format("%a, %d %b %Y %H:%M:%S GMT"),
                self.max_age
            ));
        } else if self.max_age < 0 {
            header.push_str("; Expires=Thu, 01 Jan 1970 00:00:01 GMT; Max-Age=0");
        }

        if self.http_only {
            header.push_str("; HttpOnly");
        }
        if self.secure {
            header.push_str("; Secure");
        }
        match self.same_site {
            SameSite::Default => {}
            SameSite::Lax => header.push_str("; SameSite=Lax"),
            SameSite::Strict => header.push_str("; SameSite=Strict"),
            SameSite::None => header.push_str("; SameSite=None"),
        }

        header
    }
}

/// Find a cookie's value in `Cookie` request header values.
pub fn find<'h>(headers: impl IntoIterator<Item = &'h str>, name: &str) -> Option<&'h str> {
    headers
        .into_iter()
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"'))
}
