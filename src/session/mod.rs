//! Cookie-backed sessions.
//!
//! # Data Flow
//! ```text
//! Cookie header
//!     → store.rs (verify HMAC, check age, decode values)
//!     → Session (read and changed by middlewares and actions)
//!     → store.rs (re-sign if modified)
//!     → cookie.rs (Set-Cookie header with the session options)
//! ```
//!
//! # Design Decisions
//! - The whole session lives in the cookie; the server keeps nothing
//! - Cookies are signed, not encrypted: values are readable by the client
//! - A cookie that fails verification is dropped and a new session starts;
//!   the reason is kept on the session instead of failing the request

pub mod cookie;
pub mod handle;
pub mod store;

use thiserror::Error;

pub use cookie::{CookieOptions, SameSite};
pub use handle::Session;
pub use store::CookieStore;

/// Session failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session store is not configured; set `keys.sessions`")]
    StoreNotConfigured,

    #[error("session cookie is malformed")]
    Malformed,

    #[error("session cookie signature does not match")]
    InvalidSignature,

    #[error("session cookie has expired")]
    Expired,

    #[error("session values cannot be encoded: {0}")]
    Serialize(String),

    #[error("session cookie cannot be sent as a header")]
    InvalidHeader,
}
