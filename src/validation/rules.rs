//! Rule specifications and their tokens.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::validation::errors::RuleError;

/// Separator between rules in the string form.
pub const RULE_DELIMITER: char = '|';

/// `name:argument`, where the argument holds no colon or newline.
static PARAMETERIZED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z]+:[^:\n]*$").expect("rule pattern is valid"));

/// The rules of one field, either piped (`"required|min:3"`) or listed.
///
/// Deserializes from a string or a list of strings; any other shape is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RuleSpec {
    Piped(String),
    List(Vec<String>),
}

impl RuleSpec {
    /// Split into tokens in declaration order.
    pub fn tokens(&self) -> Result<Vec<RuleToken>, RuleError> {
        match self {
            RuleSpec::Piped(rules) => rules.split(RULE_DELIMITER).map(RuleToken::parse).collect(),
            RuleSpec::List(rules) => rules.iter().map(|r| RuleToken::parse(r)).collect(),
        }
    }
}

impl From<&str> for RuleSpec {
    fn from(rules: &str) -> Self {
        RuleSpec::Piped(rules.to_string())
    }
}

impl From<String> for RuleSpec {
    fn from(rules: String) -> Self {
        RuleSpec::Piped(rules)
    }
}

impl From<Vec<String>> for RuleSpec {
    fn from(rules: Vec<String>) -> Self {
        RuleSpec::List(rules)
    }
}

impl From<Vec<&str>> for RuleSpec {
    fn from(rules: Vec<&str>) -> Self {
        RuleSpec::List(rules.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for RuleSpec {
    fn from(rules: [&str; N]) -> Self {
        RuleSpec::List(rules.iter().map(|r| r.to_string()).collect())
    }
}

/// One rule name with its optional argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleToken {
    name: String,
    argument: Option<String>,
}

impl RuleToken {
    /// Parse `name` or `name:argument`.
    pub fn parse(raw: &str) -> Result<Self, RuleError> {
        if !PARAMETERIZED.is_match(raw) {
            return Ok(Self {
                name: raw.to_string(),
                argument: None,
            });
        }

        match raw.split(':').collect::<Vec<_>>().as_slice() {
            [name, argument] => Ok(Self {
                name: name.to_string(),
                argument: Some(argument.to_string()),
            }),
            _ => Err(RuleError::MalformedRule(raw.to_string())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }
}

/// Rules keyed by field name. Field order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Rules(HashMap<String, RuleSpec>);

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the rules of `field`.
    pub fn field(mut self, field: impl Into<String>, spec: impl Into<RuleSpec>) -> Self {
        self.0.insert(field.into(), spec.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&RuleSpec> {
        self.0.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RuleSpec)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<HashMap<String, RuleSpec>> for Rules {
    fn from(rules: HashMap<String, RuleSpec>) -> Self {
        Self(rules)
    }
}

impl<K: Into<String>, S: Into<RuleSpec>> FromIterator<(K, S)> for Rules {
    fn from_iter<I: IntoIterator<Item = (K, S)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(field, spec)| (field.into(), spec.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(name: &str, argument: Option<&str>) -> RuleToken {
        RuleToken {
            name: name.into(),
            argument: argument.map(Into::into),
        }
    }

    #[test]
    fn test_piped_and_listed_forms_agree() {
        let piped = RuleSpec::from("required|int|min:18|date:year-month-day");
        let listed = RuleSpec::from(["required", "int", "min:18", "date:year-month-day"]);

        let expected = vec![
            token("required", None),
            token("int", None),
            token("min", Some("18")),
            token("date", Some("year-month-day")),
        ];
        assert_eq!(piped.tokens().unwrap(), expected);
        assert_eq!(listed.tokens().unwrap(), expected);
    }

    #[test]
    fn test_argument_may_be_empty() {
        assert_eq!(RuleToken::parse("min:").unwrap(), token("min", Some("")));
    }

    #[test]
    fn test_extra_colon_is_a_bare_name() {
        // Does not match the parameterized shape, so the whole text is the name
        // and fails later as an unknown rule.
        assert_eq!(RuleToken::parse("min:1:2").unwrap(), token("min:1:2", None));
        assert_eq!(RuleToken::parse("min_len:3").unwrap(), token("min_len:3", None));
    }

    #[test]
    fn test_content_type_argument() {
        let t = RuleToken::parse("contentType:image/png,image/jpeg").unwrap();
        assert_eq!(t.name(), "contentType");
        assert_eq!(t.argument(), Some("image/png,image/jpeg"));
    }

    #[test]
    fn test_deserialize_rule_specs() {
        let rules: Rules = serde_yaml::from_str(
            "email: required|email\ntags: [required, string]\n",
        )
        .unwrap();
        assert_eq!(rules.get("email"), Some(&RuleSpec::from("required|email")));
        assert_eq!(rules.get("tags"), Some(&RuleSpec::from(["required", "string"])));

        let bad: Result<Rules, _> = serde_yaml::from_str("age: {min: 18}\n");
        assert!(bad.is_err());
    }
}
