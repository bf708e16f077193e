//! Uploaded files.

use axum::body::Bytes;
use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::form::sniff;

/// A file received in a multipart form.
///
/// The content is buffered, so it can be read any number of times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormFile {
    filename: Option<String>,
    content_type: Option<String>,
    content: Bytes,
}

impl FormFile {
    /// Create a file from its parts.
    pub fn new(
        filename: Option<String>,
        content_type: Option<String>,
        content: impl Into<Bytes>,
    ) -> Self {
        Self {
            filename,
            content_type,
            content: content.into(),
        }
    }

    /// File name sent by the client, if any.
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Content type declared by the client. Not trustworthy; see [`FormFile::sniff`].
    pub fn declared_content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Size of the content in bytes.
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    pub fn bytes(&self) -> &Bytes {
        &self.content
    }

    /// Media type detected from the content itself.
    pub fn sniff(&self) -> &'static str {
        sniff::detect(&self.content)
    }
}

impl Serialize for FormFile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FormFile", 3)?;
        state.serialize_field("filename", &self.filename)?;
        state.serialize_field("content_type", &self.content_type)?;
        state.serialize_field("size", &self.size())?;
        state.end()
    }
}
