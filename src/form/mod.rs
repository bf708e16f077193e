//! Form data sources.
//!
//! # Data Flow
//! ```text
//! Request body (buffered by the dispatcher)
//!     → urlencoded.rs (application/x-www-form-urlencoded + query string)
//!     → multipart.rs  (multipart/form-data, values + uploaded files)
//!     → FormSource    (the capability set the validation pipeline reads)
//!     → value.rs      (typed values produced by validation)
//! ```
//!
//! # Design Decisions
//! - Both adapters expose the same minimal trait: `get` and `get_file`
//! - Uploaded files are held in memory as `Bytes`, so reading one never
//!   consumes it
//! - Missing keys read as the empty string, like an empty form field

pub mod file;
pub mod multipart;
pub mod sniff;
pub mod urlencoded;
pub mod value;

use thiserror::Error;

pub use file::FormFile;
pub use multipart::MultipartForm;
pub use urlencoded::Form;
pub use value::{FormData, Value};

/// Errors raised while reading a form from a request.
#[derive(Debug, Error)]
pub enum FormError {
    /// No file was uploaded under the given field name.
    #[error("no file uploaded for field `{0}`")]
    MissingFile(String),

    /// The request body is larger than the caller allows.
    #[error("form body of {size} bytes exceeds the limit of {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    /// The request does not carry a multipart body.
    #[error("request content type is not multipart/form-data")]
    NotMultipart,

    /// The multipart body could not be decoded.
    #[error("invalid multipart body: {0}")]
    Multipart(String),
}

/// The capability set the validation pipeline depends on.
///
/// Implemented by [`Form`] and [`MultipartForm`].
pub trait FormSource: Send + Sync {
    /// First value submitted under `key`, or `""` when absent.
    fn get(&self, key: &str) -> &str;

    /// First file uploaded under `key`.
    fn get_file(&self, key: &str) -> Result<&FormFile, FormError> {
        Err(FormError::MissingFile(key.to_string()))
    }
}
