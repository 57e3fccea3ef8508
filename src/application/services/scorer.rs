use std::sync::Arc;

use serde::Serialize;

use crate::domain::{JobStatus, MatchScore, ObjectKey, StoragePath};

use super::{JobStore, JobStoreError, score_overlap};

pub const PENDING_STATUS: &str = "PENDING";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStatus {
    Pending {
        status: String,
        reason: Option<String>,
    },
    Completed {
        extracted_key: StoragePath,
    },
}

#[derive(Debug, Clone, Default)]
pub struct ScoreRequest {
    pub key: Option<StoragePath>,
    pub object_key: Option<ObjectKey>,
    pub job_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreReport {
    pub key: StoragePath,
    pub score: u32,
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreOutcome {
    Pending {
        status: String,
        reason: Option<String>,
    },
    Scored(ScoreReport),
}

/// Read-only queries over the index records and harvested documents.
pub struct Scorer {
    job_store: Arc<JobStore>,
}

impl Scorer {
    pub fn new(job_store: Arc<JobStore>) -> Self {
        Self { job_store }
    }

    #[tracing::instrument(skip(self))]
    pub async fn poll(&self, object_key: &ObjectKey) -> Result<PollStatus, ScorerError> {
        let record = match self.job_store.get_by_upload(object_key).await {
            Ok(record) => record.map(|r| r.value),
            Err(JobStoreError::Malformed { path, source }) => {
                tracing::warn!(path = %path, error = %source, "Unreadable by-upload record; reporting pending");
                None
            }
            Err(e) => return Err(e.into()),
        };

        let Some(record) = record else {
            return Ok(PollStatus::Pending {
                status: PENDING_STATUS.to_string(),
                reason: None,
            });
        };

        match (record.status, record.extracted_key) {
            (JobStatus::Completed, Some(extracted_key)) => {
                Ok(PollStatus::Completed { extracted_key })
            }
            (status, _) => Ok(PollStatus::Pending {
                status: status.as_str().to_string(),
                reason: record.reason,
            }),
        }
    }

    /// Resolves the harvested document (directly or through the by-upload
    /// record), then scores it against the job text.
    #[tracing::instrument(skip(self, request), fields(key = ?request.key, object_key = ?request.object_key))]
    pub async fn score(&self, request: ScoreRequest) -> Result<ScoreOutcome, ScorerError> {
        let key = match (request.key, request.object_key) {
            (Some(key), _) => key,
            (None, Some(object_key)) => match self.poll(&object_key).await? {
                PollStatus::Completed { extracted_key } => extracted_key,
                PollStatus::Pending { status, reason } => {
                    return Ok(ScoreOutcome::Pending { status, reason });
                }
            },
            (None, None) => return Err(ScorerError::MissingKey),
        };

        let job_text = request
            .job_text
            .filter(|t| !t.is_empty())
            .ok_or(ScorerError::MissingJobText)?;

        let document = self
            .job_store
            .get_extracted(&key)
            .await?
            .ok_or_else(|| ScorerError::DocumentNotFound(key.to_string()))?;

        let MatchScore { score, missing } = score_overlap(&document.text(), &job_text);
        tracing::info!(score, missing = missing.len(), lines = document.lines.len(), "Scored document");

        Ok(ScoreOutcome::Scored(ScoreReport {
            key,
            score,
            missing,
        }))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScorerError {
    #[error("Provide ?key=extracted/<JobId>.json or POST {{objectKey, jobText}}")]
    MissingKey,
    #[error("jobText body is required")]
    MissingJobText,
    #[error("extracted document not found: {0}")]
    DocumentNotFound(String),
    #[error("job store: {0}")]
    Store(#[from] JobStoreError),
}
