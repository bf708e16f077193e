//! Rule vocabularies.
//!
//! # Responsibilities
//! - Name every rule the engine knows
//! - Map each rule to its validator function
//! - Expose the plain-form and multipart vocabularies as immutable tables
//!
//! # Design Decisions
//! - Tables are built once on first use and never mutated
//! - Unknown names are configuration errors, not validation failures

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::validation::errors::RuleError;
use crate::validation::validators::{date, email, file, general, ValidatorFn};

/// Every rule the engine can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    Required,
    Int,
    String,
    Min,
    Max,
    Email,
    Optional,
    Url,
    Date,
    True,
    Boolean,
    Confirm,
    AlphaNum,
    OptionalFile,
    RequiredFile,
    ContentType,
    MaxBytes,
}

/// Rules available to every form.
const BASE: &[Rule] = &[
    Rule::Required,
    Rule::Int,
    Rule::String,
    Rule::Min,
    Rule::Max,
    Rule::Email,
    Rule::Optional,
    Rule::Url,
    Rule::Date,
    Rule::True,
    Rule::Boolean,
    Rule::Confirm,
    Rule::AlphaNum,
];

/// Rules that need uploaded files.
const FILE: &[Rule] = &[
    Rule::OptionalFile,
    Rule::RequiredFile,
    Rule::ContentType,
    Rule::MaxBytes,
];

static FORM_RULES: Lazy<HashMap<&'static str, Rule>> =
    Lazy::new(|| BASE.iter().map(|rule| (rule.name(), *rule)).collect());

static MULTIPART_RULES: Lazy<HashMap<&'static str, Rule>> = Lazy::new(|| {
    BASE.iter()
        .chain(FILE)
        .map(|rule| (rule.name(), *rule))
        .collect()
});

impl Rule {
    /// Name used in rule specifications and override maps.
    pub const fn name(self) -> &'static str {
        match self {
            Rule::Required => "required",
            Rule::Int => "int",
            Rule::String => "string",
            Rule::Min => "min",
            Rule::Max => "max",
            Rule::Email => "email",
            Rule::Optional => "optional",
            Rule::Url => "url",
            Rule::Date => "date",
            Rule::True => "true",
            Rule::Boolean => "boolean",
            Rule::Confirm => "confirm",
            Rule::AlphaNum => "alpha_num",
            Rule::OptionalFile => "optionalFile",
            Rule::RequiredFile => "requiredFile",
            Rule::ContentType => "contentType",
            Rule::MaxBytes => "maxBytes",
        }
    }

    pub fn validator(self) -> ValidatorFn {
        match self {
            Rule::Required => general::required,
            Rule::Int => general::int,
            Rule::String => general::string,
            Rule::Min => general::min,
            Rule::Max => general::max,
            Rule::Email => email::email,
            Rule::Optional => general::optional,
            Rule::Url => general::url,
            Rule::Date => date::date,
            Rule::True => general::is_true,
            Rule::Boolean => general::boolean,
            Rule::Confirm => general::confirm,
            Rule::AlphaNum => general::alpha_num,
            Rule::OptionalFile => file::optional_file,
            Rule::RequiredFile => file::required_file,
            Rule::ContentType => file::content_type,
            Rule::MaxBytes => file::max_bytes,
        }
    }
}

/// Which set of rules a form may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vocabulary {
    /// Url-encoded forms.
    Form,
    /// Multipart forms: the form rules plus the file rules.
    Multipart,
}

impl Vocabulary {
    pub fn table(self) -> &'static HashMap<&'static str, Rule> {
        match self {
            Vocabulary::Form => &FORM_RULES,
            Vocabulary::Multipart => &MULTIPART_RULES,
        }
    }

    /// Resolve a rule name.
    pub fn resolve(self, name: &str) -> Result<Rule, RuleError> {
        self.table()
            .get(name)
            .copied()
            .ok_or_else(|| RuleError::UnknownRule(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multipart_is_superset() {
        for name in Vocabulary::Form.table().keys() {
            assert!(Vocabulary::Multipart.table().contains_key(name));
        }
        assert_eq!(Vocabulary::Form.table().len(), 13);
        assert_eq!(Vocabulary::Multipart.table().len(), 17);
    }

    #[test]
    fn test_file_rules_need_multipart() {
        assert_eq!(
            Vocabulary::Form.resolve("requiredFile"),
            Err(RuleError::UnknownRule("requiredFile".into()))
        );
        assert_eq!(Vocabulary::Multipart.resolve("requiredFile"), Ok(Rule::RequiredFile));
    }

    #[test]
    fn test_names_round_trip() {
        for rule in BASE.iter().chain(FILE) {
            assert_eq!(Vocabulary::Multipart.resolve(rule.name()), Ok(*rule));
        }
    }

    #[test]
    fn test_names_are_case_sensitive() {
        assert!(Vocabulary::Form.resolve("Required").is_err());
        assert!(Vocabulary::Form.resolve("").is_err());
    }
}
