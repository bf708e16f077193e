//! Typed values produced by validation.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::form::FormFile;

/// The value threaded between the rules of one field.
///
/// Starts as the raw string and is replaced by rules that convert it
/// (`int`, `boolean`, `date`, `url`, `requiredFile`, ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Int(i64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Url(Url),
    File(FormFile),
}

impl Value {
    /// Name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::String(_) => "a string",
            Value::Int(_) => "an integer",
            Value::Bool(_) => "a boolean",
            Value::DateTime(_) => "a date",
            Value::Url(_) => "a url",
            Value::File(_) => "a file",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<&NaiveDateTime> {
        match self {
            Value::DateTime(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_url(&self) -> Option<&Url> {
        match self {
            Value::Url(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&FormFile> {
        match self {
            Value::File(f) => Some(f),
            _ => None,
        }
    }
}

/// Validated values keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FormData(HashMap<String, Value>);

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
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

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Remove and return a value, e.g. to take ownership of an uploaded file.
    pub fn take(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    pub fn into_inner(self) -> HashMap<String, Value> {
        self.0
    }

    pub(crate) fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    /// Map the validated values onto a struct whose field names match the form keys.
    ///
    /// Dates serialize as `%Y-%m-%dT%H:%M:%S`, urls as strings and files as
    /// their metadata, so target fields should use compatible types.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        let json = serde_json::to_value(&self.0)?;
        serde_json::from_value(json)
    }
}

impl FromIterator<(String, Value)> for FormData {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Signup {
        name: String,
        age: u32,
        newsletter: bool,
        birthday: NaiveDateTime,
        homepage: Url,
    }

    #[test]
    fn test_deserialize_into_struct() {
        let birthday = chrono::NaiveDate::from_ymd_opt(1990, 5, 17)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let homepage = Url::parse("https://example.com/").unwrap();

        let data: FormData = vec![
            ("name".to_string(), Value::String("Ana".into())),
            ("age".to_string(), Value::Int(31)),
            ("newsletter".to_string(), Value::Bool(true)),
            ("birthday".to_string(), Value::DateTime(birthday)),
            ("homepage".to_string(), Value::Url(homepage.clone())),
        ]
        .into_iter()
        .collect();

        let signup: Signup = data.deserialize().unwrap();
        assert_eq!(
            signup,
            Signup {
                name: "Ana".into(),
                age: 31,
                newsletter: true,
                birthday,
                homepage,
            }
        );
    }

    #[test]
    fn test_deserialize_rejects_wrong_type() {
        let data: FormData = vec![("age".to_string(), Value::String("old".into()))]
            .into_iter()
            .collect();

        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Age {
            age: u32,
        }

        assert!(data.deserialize::<Age>().is_err());
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Int(4).as_int(), Some(4));
        assert_eq!(Value::Int(4).as_str(), None);
        assert_eq!(Value::Bool(false).kind(), "a boolean");
    }
}
