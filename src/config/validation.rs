//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (port present, limits > 0)
//! - Detect half-configured sections (static path without dir)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::AppConfig;

/// One semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending key.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.port == 0 {
        errors.push(ValidationError::new("port", "the port is required"));
    }

    let static_files = &config.static_files;
    if static_files.path.is_empty() != static_files.dir.is_empty() {
        errors.push(ValidationError::new(
            "static",
            "both `path` and `dir` must be set to serve static files",
        ));
    }
    if !static_files.path.is_empty() && !static_files.path.starts_with('/') {
        errors.push(ValidationError::new("static.path", "must start with `/`"));
    } else if !static_files.path.is_empty() && static_files.path.trim_end_matches('/').is_empty() {
        errors.push(ValidationError::new(
            "static.path",
            "cannot be the root path, routes would be shadowed",
        ));
    }

    if config.limits.body_bytes == 0 {
        errors.push(ValidationError::new("limits.body_bytes", "must be greater than zero"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("`{}` is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
