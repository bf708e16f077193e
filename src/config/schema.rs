//! Configuration schema definitions.
//!
//! Typed sections for the keys the framework understands. The whole YAML
//! document is also kept as-is so applications can read their own keys.

use serde::{Deserialize, Serialize};
use serde_yaml::Value as Yaml;

/// Root configuration of an application.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Port to listen on. Required; zero means missing.
    pub port: u16,

    /// Database connection settings, passed through to modules.
    pub sql: SqlConfig,

    /// Static file serving.
    #[serde(rename = "static")]
    pub static_files: StaticConfig,

    /// Secret keys.
    pub keys: KeysConfig,

    /// Request limits.
    pub limits: LimitsConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,

    /// The full document, including keys not modeled above.
    #[serde(skip)]
    pub(crate) raw: Yaml,
}

impl AppConfig {
    /// Look up any key of the document. Dots separate nested mapping keys;
    /// an empty key returns the whole document.
    pub fn get_key(&self, key: &str) -> Option<&Yaml> {
        if key.is_empty() {
            return Some(&self.raw);
        }
        key.split('.')
            .try_fold(&self.raw, |node, part| node.as_mapping()?.get(part))
    }

    /// The full document as loaded.
    pub fn raw(&self) -> &Yaml {
        &self.raw
    }

    /// Whether static files should be served.
    pub fn serves_static(&self) -> bool {
        !self.static_files.path.is_empty() && !self.static_files.dir.is_empty()
    }
}

/// Database connection settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SqlConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub driver: String,
}

/// Static file serving: files under `dir` answer requests under `path`.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct StaticConfig {
    pub path: String,
    pub dir: String,
}

/// Secret keys.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct KeysConfig {
    /// Signing key for session cookies. Sessions are disabled when empty.
    pub sessions: String,
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum request body size in bytes.
    pub body_bytes: usize,

    /// Whole request timeout in seconds. Zero disables the timeout.
    pub request_timeout_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            body_bytes: 10 * 1024 * 1024,
            request_timeout_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
