use std::fmt;

use serde::{Deserialize, Serialize};

/// Key of a source document inside the upload bucket, e.g. `uploads/cv.pdf`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectKey(String);

impl ObjectKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Decodes a key as it appears in storage event payloads, where spaces
    /// arrive as `+` and everything else is percent-encoded.
    pub fn from_event(raw: &str) -> Result<Self, ObjectKeyError> {
        let spaced = raw.replace('+', " ");
        let decoded = percent_encoding::percent_decode_str(&spaced)
            .decode_utf8()
            .map_err(|e| ObjectKeyError::InvalidEncoding(format!("{raw}: {e}")))?;
        Ok(Self(decoded.into_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the key lives under `prefix` and ends with `extension`
    /// (extension comparison ignores case).
    pub fn is_eligible(&self, prefix: &str, extension: &str) -> bool {
        self.0.starts_with(prefix)
            && self
                .0
                .to_lowercase()
                .ends_with(&extension.to_lowercase())
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ObjectKeyError {
    #[error("invalid object key encoding: {0}")]
    InvalidEncoding(String),
}
