//! `application/x-www-form-urlencoded` forms.

use std::collections::HashMap;

use url::form_urlencoded;

use crate::form::FormSource;
use crate::validation::{Overrides, RuleError, Rules, Schema, Validated, Vocabulary};

/// Fields of a url-encoded form.
///
/// Body values come before query string values, so `get` prefers the body.
#[derive(Debug, Clone, Default)]
pub struct Form {
    values: HashMap<String, Vec<String>>,
}

impl Form {
    /// Parse a form from an optional body and an optional query string.
    pub fn parse(body: Option<&[u8]>, query: Option<&str>) -> Self {
        let mut form = Self::default();
        if let Some(body) = body {
            form.extend(form_urlencoded::parse(body));
        }
        if let Some(query) = query {
            form.extend(form_urlencoded::parse(query.as_bytes()));
        }
        form
    }

    /// Build a form from literal pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut form = Self::default();
        for (key, value) in pairs {
            form.values.entry(key.into()).or_default().push(value.into());
        }
        form
    }

    fn extend<'a>(&mut self, pairs: impl Iterator<Item = (std::borrow::Cow<'a, str>, std::borrow::Cow<'a, str>)>) {
        for (key, value) in pairs {
            self.values
                .entry(key.into_owned())
                .or_default()
                .push(value.into_owned());
        }
    }

    /// First value for `key`, or `""`.
    pub fn get(&self, key: &str) -> &str {
        self.values
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Every value submitted for `key`.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.values.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn values(&self) -> &HashMap<String, Vec<String>> {
        &self.values
    }

    /// Validate against `rules` using the plain form vocabulary.
    pub fn validate(&self, rules: &Rules, overrides: &Overrides) -> Result<Validated, RuleError> {
        Schema::compile(rules, Vocabulary::Form)?
            .with_overrides(overrides.clone())
            .validate(self)
    }
}

impl FormSource for Form {
    fn get(&self, key: &str) -> &str {
        Form::get(self, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_precedes_query() {
        let form = Form::parse(Some(b"name=Ana&tag=a&tag=b"), Some("name=Bob&page=2"));
        assert_eq!(form.get("name"), "Ana");
        assert_eq!(form.get_all("name"), ["Ana".to_string(), "Bob".to_string()]);
        assert_eq!(form.get_all("tag").len(), 2);
        assert_eq!(form.get("page"), "2");
        assert_eq!(form.get("missing"), "");
    }

    #[test]
    fn test_percent_decoding() {
        let form = Form::parse(Some(b"email=ana%40example.com&note=hello+world"), None);
        assert_eq!(form.get("email"), "ana@example.com");
        assert_eq!(form.get("note"), "hello world");
    }

    #[test]
    fn test_files_are_never_present() {
        let form = Form::from_pairs([("avatar", "x")]);
        assert!(FormSource::get_file(&form, "avatar").is_err());
    }
}
