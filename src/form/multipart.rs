//! `multipart/form-data` forms.

use std::collections::HashMap;

use axum::body::Body;
use axum::extract::{FromRequest, Multipart};
use axum::http::Request;
use url::form_urlencoded;

use crate::form::{FormError, FormFile, FormSource};
use crate::validation::{Overrides, RuleError, Rules, Schema, Validated, Vocabulary};

/// Values and files of a multipart form.
#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    values: HashMap<String, Vec<String>>,
    files: HashMap<String, Vec<FormFile>>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every part of a multipart request into memory.
    ///
    /// Parts with a non-empty file name become files; the rest become
    /// values. An untouched file input arrives with `filename=""` and is
    /// therefore not a file. Query string values are appended after the
    /// body values.
    pub async fn from_request(request: Request<Body>) -> Result<Self, FormError> {
        let query = request.uri().query().map(str::to_owned);

        let mut multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| FormError::Multipart(e.body_text()))?;

        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| FormError::Multipart(e.body_text()))?
        {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            let filename = field.file_name().map(str::to_owned);
            let content_type = field.content_type().map(str::to_owned);
            let content = field
                .bytes()
                .await
                .map_err(|e| FormError::Multipart(e.body_text()))?;

            match filename.filter(|f| !f.is_empty()) {
                Some(filename) => {
                    form = form.with_file(name, FormFile::new(Some(filename), content_type, content));
                }
                None => {
                    let value = String::from_utf8_lossy(&content).into_owned();
                    form = form.with_value(name, value);
                }
            }
        }

        if let Some(query) = query {
            for (key, value) in form_urlencoded::parse(query.as_bytes()) {
                form = form.with_value(key, value);
            }
        }

        tracing::debug!(
            values = form.values.len(),
            files = form.files.len(),
            "Multipart form parsed"
        );
        Ok(form)
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.entry(key.into()).or_default().push(value.into());
        self
    }

    pub fn with_file(mut self, key: impl Into<String>, file: FormFile) -> Self {
        self.files.entry(key.into()).or_default().push(file);
        self
    }

    /// First value for `key`, or `""`. Files are not included.
    pub fn get(&self, key: &str) -> &str {
        self.values
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.values.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First file uploaded under `key`.
    pub fn get_file(&self, key: &str) -> Result<&FormFile, FormError> {
        self.files
            .get(key)
            .and_then(|files| files.first())
            .ok_or_else(|| FormError::MissingFile(key.to_string()))
    }

    pub fn get_files(&self, key: &str) -> &[FormFile] {
        self.files.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn values(&self) -> &HashMap<String, Vec<String>> {
        &self.values
    }

    /// Validate against `rules` using the multipart vocabulary, which adds
    /// the file rules to the plain form rules.
    pub fn validate(&self, rules: &Rules, overrides: &Overrides) -> Result<Validated, RuleError> {
        Schema::compile(rules, Vocabulary::Multipart)?
            .with_overrides(overrides.clone())
            .validate(self)
    }
}

impl FormSource for MultipartForm {
    fn get(&self, key: &str) -> &str {
        MultipartForm::get(self, key)
    }

    fn get_file(&self, key: &str) -> Result<&FormFile, FormError> {
        MultipartForm::get_file(self, key)
    }
}
