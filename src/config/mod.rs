//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (YAML)
//!     → loader.rs (parse & deserialize, keep the raw document)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → shared via Arc with every request context and module
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - Every section has defaults; only `port` is required
//! - Unknown keys are kept in the raw document for `get_key` and modules
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::AppConfig;
pub use schema::KeysConfig;
pub use schema::LimitsConfig;
pub use schema::ObservabilityConfig;
pub use schema::SqlConfig;
pub use schema::StaticConfig;
