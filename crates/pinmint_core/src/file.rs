use bytes::Bytes;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Media types compare case-insensitively, parameters such as `charset` are ignored.
pub fn is_json_content_type(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains(JSON_CONTENT_TYPE)
}

/// A named, immutable blob handed to a [`Pinner`](crate::traits::Pinner).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericFile {
    buffer: Bytes,
    file_name: String,
    content_type: Option<String>,
}

impl GenericFile {
    pub fn new(
        buffer: impl Into<Bytes>,
        file_name: impl Into<String>,
        content_type: Option<String>,
    ) -> Self {
        Self {
            buffer: buffer.into(),
            file_name: file_name.into(),
            content_type,
        }
    }

    /// Serializes `value` into a JSON document named `file_name`.
    pub fn from_json<T: Serialize>(
        value: &T,
        file_name: impl Into<String>,
    ) -> Result<Self, serde_json::Error> {
        let buffer = serde_json::to_vec(value)?;
        Ok(Self::new(
            buffer,
            file_name,
            Some(JSON_CONTENT_TYPE.to_string()),
        ))
    }

    /// Reads a local file. The file name is the last path component.
    pub async fn from_path(path: &Path, content_type: Option<String>) -> std::io::Result<Self> {
        let buffer = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unknown".to_string());

        Ok(Self::new(buffer, file_name, content_type))
    }

    pub fn bytes(&self) -> &Bytes {
        &self.buffer
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn is_json(&self) -> bool {
        self.content_type().is_some_and(is_json_content_type)
    }

    /// SHA256 of the contents, hex encoded.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.buffer);
        hex::encode(hasher.finalize())
    }
}

/// Handle returned by the pinning service for a pinned file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    pub fn new(cid: impl Into<String>) -> Self {
        Self(cid.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `<gateway>/<cid>`.
    pub fn gateway_uri(&self, gateway: &str) -> String {
        format!("{}/{}", gateway.trim_end_matches('/'), self.0)
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
