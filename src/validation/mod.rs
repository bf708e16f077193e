//! Rule-based form validation.
//!
//! # Data Flow
//! ```text
//! Rules { field → "required|int|min:18" | ["required", "int"] }
//!     → rules.rs    (split into RuleToken { name, argument })
//!     → registry.rs (resolve names against the Form or Multipart vocabulary)
//!     → pipeline.rs (per field: run tokens against a fresh FieldState)
//!     → errors.rs   (override lookup: field+rule, field+"*", default)
//!     → Validated::Valid(FormData) | Validated::Invalid(FieldErrors)
//! ```
//!
//! # Design Decisions
//! - Vocabularies are immutable statics, built once
//! - Broken rule declarations are `Err(RuleError)`, never collected
//! - User input failures are collected, first failure per field
//! - A field that failed contributes nothing to the data map, and any
//!   failure discards the whole data map

pub mod errors;
pub mod pipeline;
pub mod registry;
pub mod rules;
pub mod validators;

pub use errors::{FieldErrors, Overrides, RuleError, Validated, WILDCARD};
pub use pipeline::{FieldState, RuleContext, Schema};
pub use registry::{Rule, Vocabulary};
pub use rules::{RuleSpec, RuleToken, Rules, RULE_DELIMITER};
pub use validators::{Failure, ValidatorError, ValidatorFn};
