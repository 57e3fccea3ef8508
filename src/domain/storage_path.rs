use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};

use super::{JobId, ObjectKey};

pub const BY_JOB_PREFIX: &str = "maps/by-job/";
pub const BY_UPLOAD_PREFIX: &str = "maps/by-upload/";
pub const EXTRACTED_PREFIX: &str = "extracted/";
pub const CHECKPOINT_PREFIX: &str = "checkpoints/";

/// Everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`, the set left alone by
/// URI component encoding.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Flat key of an object inside the pipeline bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoragePath(String);

impl StoragePath {
    pub fn by_job(job_id: &JobId) -> Self {
        Self(format!("{}{}.json", BY_JOB_PREFIX, job_id))
    }

    /// Object keys contain `/`, so they are percent-encoded into a single
    /// path segment.
    pub fn by_upload(object_key: &ObjectKey) -> Self {
        Self(format!(
            "{}{}.json",
            BY_UPLOAD_PREFIX,
            utf8_percent_encode(object_key.as_str(), URI_COMPONENT)
        ))
    }

    pub fn extracted(job_id: &JobId) -> Self {
        Self(format!("{}{}.json", EXTRACTED_PREFIX, job_id))
    }

    pub fn checkpoint(job_id: &JobId) -> Self {
        Self(format!("{}{}.json", CHECKPOINT_PREFIX, job_id))
    }

    pub fn upload(object_key: &ObjectKey) -> Self {
        Self(object_key.as_str().to_string())
    }

    pub fn from_raw(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Accepts a caller-supplied key only when it points at a harvested
    /// document.
    pub fn parse_extracted(raw: &str) -> Option<Self> {
        let name = raw.strip_prefix(EXTRACTED_PREFIX)?;
        if name.is_empty() || name.contains('/') || name.contains("..") {
            return None;
        }
        Some(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
