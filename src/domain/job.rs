use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{JobId, JobStatus, ObjectKey, StoragePath};

/// Index record of one extraction job. The same shape is stored twice, once
/// under `maps/by-job/` and once under `maps/by-upload/`; the two copies are
/// written independently and may disagree for a while.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub job_id: JobId,
    pub status: JobStatus,
    #[serde(default)]
    pub object_key: ObjectKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_key: Option<StoragePath>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
    pub ts: DateTime<Utc>,
}

impl JobRecord {
    pub fn started(job_id: JobId, object_key: ObjectKey, idempotency_key: Option<String>) -> Self {
        Self {
            job_id,
            status: JobStatus::Started,
            object_key,
            extracted_key: None,
            reason: None,
            idempotency_key,
            ts: Utc::now(),
        }
    }

    pub fn mark_completed(&self, extracted_key: StoragePath) -> Result<Self, InvalidTransition> {
        self.ensure_transition(JobStatus::Completed)?;
        Ok(Self {
            status: JobStatus::Completed,
            extracted_key: Some(extracted_key),
            reason: None,
            ts: Utc::now(),
            ..self.clone()
        })
    }

    pub fn mark_failed(&self, reason: impl Into<String>) -> Result<Self, InvalidTransition> {
        self.ensure_transition(JobStatus::Failed)?;
        Ok(Self {
            status: JobStatus::Failed,
            extracted_key: None,
            reason: Some(reason.into()),
            ts: Utc::now(),
            ..self.clone()
        })
    }

    /// Moves this projection onto the terminal state carried by `terminal`,
    /// keeping this record's own `job_id` and `idempotency_key`.
    pub fn converge_to(&self, terminal: &JobRecord) -> Result<Self, InvalidTransition> {
        self.ensure_transition(terminal.status)?;
        Ok(Self {
            job_id: self.job_id.clone(),
            idempotency_key: self.idempotency_key.clone(),
            ..terminal.clone()
        })
    }

    pub fn is_completed(&self) -> bool {
        self.status == JobStatus::Completed && self.extracted_key.is_some()
    }

    fn ensure_transition(&self, next: JobStatus) -> Result<(), InvalidTransition> {
        if self.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(InvalidTransition {
                job_id: self.job_id.clone(),
                from: self.status,
                to: next,
            })
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("job {job_id} cannot move from {from} to {to}")]
pub struct InvalidTransition {
    pub job_id: JobId,
    pub from: JobStatus,
    pub to: JobStatus,
}
