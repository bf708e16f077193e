//! Validator functions.
//!
//! Every validator has the same shape: it receives the field name, the
//! value (the trimmed field input, or the rule argument for `name:arg`
//! rules) and a [`RuleContext`] through which it reads the form and reads
//! or replaces the field's working value.

pub mod date;
pub mod email;
pub mod file;
pub mod general;

use thiserror::Error;

use crate::validation::errors::RuleError;
use crate::validation::pipeline::RuleContext;

/// Signature shared by all validators.
pub type ValidatorFn = fn(&mut RuleContext<'_>, &str, &str) -> Result<(), ValidatorError>;

/// The user's input did not satisfy a rule.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct Failure {
    message: String,
}

impl Failure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn into_message(self) -> String {
        self.message
    }
}

/// Why a validator stopped a field.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidatorError {
    /// Bad input; reported to the user.
    #[error(transparent)]
    Invalid(#[from] Failure),

    /// Bad rule declaration; aborts the validation call.
    #[error(transparent)]
    Misconfigured(#[from] RuleError),
}

/// Shorthand for a failing check with the given message.
pub(crate) fn fail(message: impl Into<String>) -> Result<(), ValidatorError> {
    Err(Failure::new(message).into())
}
