//! Validation outcomes, error messages and overrides.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::form::FormData;

/// Override key that applies to every rule of a field.
pub const WILDCARD: &str = "*";

/// A mistake in how rules were declared.
///
/// These come from the program, not the user, so they abort the whole
/// validation call instead of being collected per field.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuleError {
    /// A `name:argument` token that does not split into exactly two parts.
    #[error("rule `{0}` is not valid")]
    MalformedRule(String),

    /// A rule name outside the vocabulary in use.
    #[error("rule `{0}` not found")]
    UnknownRule(String),

    /// A rule argument that must be numeric but is not.
    #[error("`{argument}` is not a valid argument for `{rule}` on field `{field}`")]
    InvalidArgument {
        rule: &'static str,
        field: String,
        argument: String,
    },

    /// A rule applied to a working value it cannot handle.
    #[error("rule `{rule}` cannot be applied to field `{field}` holding {found}")]
    UnsupportedValue {
        rule: &'static str,
        field: String,
        found: &'static str,
    },
}

/// Custom messages: field → rule name (or `*`) → message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Overrides(HashMap<String, HashMap<String, String>>);

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Message shown when `rule` fails on `field`.
    pub fn message(
        mut self,
        field: impl Into<String>,
        rule: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.0
            .entry(field.into())
            .or_default()
            .insert(rule.into(), message.into());
        self
    }

    /// Message shown when any rule without its own override fails on `field`.
    pub fn fallback(self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.message(field, WILDCARD, message)
    }

    /// Look up the message for `field`/`rule`, falling back to the field wildcard.
    pub fn resolve(&self, field: &str, rule: &str) -> Option<&str> {
        let messages = self.0.get(field)?;
        messages
            .get(rule)
            .or_else(|| messages.get(WILDCARD))
            .map(String::as_str)
    }
}

impl From<HashMap<String, HashMap<String, String>>> for Overrides {
    fn from(overrides: HashMap<String, HashMap<String, String>>) -> Self {
        Self(overrides)
    }
}

/// One message per failing field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(HashMap<String, String>);

impl FieldErrors {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    pub fn into_inner(self) -> HashMap<String, String> {
        self.0
    }

    pub(crate) fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fields: Vec<_> = self.0.iter().collect();
        fields.sort();
        for (i, (field, message)) in fields.into_iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", field, message)?;
        }
        Ok(())
    }
}

/// Result of validating a form: data or errors, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum Validated {
    Valid(FormData),
    Invalid(FieldErrors),
}

impl Validated {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validated::Valid(_))
    }

    pub fn data(&self) -> Option<&FormData> {
        match self {
            Validated::Valid(data) => Some(data),
            Validated::Invalid(_) => None,
        }
    }

    pub fn errors(&self) -> Option<&FieldErrors> {
        match self {
            Validated::Valid(_) => None,
            Validated::Invalid(errors) => Some(errors),
        }
    }

    pub fn into_result(self) -> Result<FormData, FieldErrors> {
        match self {
            Validated::Valid(data) => Ok(data),
            Validated::Invalid(errors) => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_precedence() {
        let overrides = Overrides::new()
            .message("age", "int", "must be numeric")
            .fallback("age", "age is wrong");

        assert_eq!(overrides.resolve("age", "int"), Some("must be numeric"));
        assert_eq!(overrides.resolve("age", "min"), Some("age is wrong"));
        assert_eq!(overrides.resolve("name", "required"), None);
    }

    #[test]
    fn test_overrides_from_yaml() {
        let overrides: Overrides =
            serde_yaml::from_str("email:\n  required: tell us your email\n  \"*\": bad email\n")
                .unwrap();
        assert_eq!(overrides.resolve("email", "required"), Some("tell us your email"));
        assert_eq!(overrides.resolve("email", "email"), Some("bad email"));
    }

    #[test]
    fn test_field_errors_display_is_sorted() {
        let mut errors = FieldErrors::default();
        errors.insert("name", "name is required");
        errors.insert("age", "age value must be an integer");
        assert_eq!(
            errors.to_string(),
            "age: age value must be an integer, name: name is required"
        );
    }
}
