use serde::{Deserialize, Serialize};

use super::{JobId, ObjectKey};

/// Text harvested from one extraction job, one entry per detected line in
/// the order the engine returned them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExtractedDocument {
    pub job_id: JobId,
    #[serde(default)]
    pub source_object_key: ObjectKey,
    #[serde(default)]
    pub lines: Vec<String>,
}

impl ExtractedDocument {
    pub fn new(job_id: JobId, source_object_key: ObjectKey, lines: Vec<String>) -> Self {
        Self {
            job_id,
            source_object_key,
            lines,
        }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}
