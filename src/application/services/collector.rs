use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::application::ports::{ExtractionEngine, ExtractionEngineError};
use crate::domain::{
    ExtractedDocument, HarvestCheckpoint, InvalidTransition, JobId, JobRecord, JobStatus,
    ObjectKey, StoragePath,
};

use super::{ConditionalWrite, JobStore, JobStoreError};

pub const SUCCESS_STATUS: &str = "SUCCEEDED";
pub const FAILURE_STATUSES: [&str; 2] = ["FAILED", "ERROR"];
pub const MAX_UPLOAD_WRITE_ATTEMPTS: u32 = 3;

/// Fields of an engine completion notification the collector acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionNotice {
    pub job_id: JobId,
    pub status: String,
    pub status_message: Option<String>,
    pub document_location: Option<ObjectKey>,
}

#[derive(Debug, Clone, Copy)]
pub struct HarvestBudget {
    pub page_size: i32,
    pub max_pages_per_invocation: u32,
    pub invocation_budget: Duration,
}

impl Default for HarvestBudget {
    fn default() -> Self {
        Self {
            page_size: 1000,
            max_pages_per_invocation: 200,
            invocation_budget: Duration::from_secs(240),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectOutcome {
    Ignored {
        reason: &'static str,
    },
    Completed {
        job_id: JobId,
        extracted_key: StoragePath,
        line_count: usize,
    },
    AlreadyCompleted {
        job_id: JobId,
        extracted_key: StoragePath,
    },
    Failed {
        job_id: JobId,
    },
    /// The harvest ran out of budget; progress is checkpointed and a
    /// redelivered notification resumes it.
    Suspended {
        job_id: JobId,
        pages_fetched: u32,
    },
}

enum Harvest {
    Finished(HarvestCheckpoint),
    Suspended(HarvestCheckpoint),
}

/// Drains finished extraction jobs into harvested documents and moves both
/// index records to their terminal state.
pub struct Collector {
    job_store: Arc<JobStore>,
    engine: Arc<dyn ExtractionEngine>,
    budget: HarvestBudget,
}

impl Collector {
    pub fn new(
        job_store: Arc<JobStore>,
        engine: Arc<dyn ExtractionEngine>,
        budget: HarvestBudget,
    ) -> Self {
        Self {
            job_store,
            engine,
            budget,
        }
    }

    #[tracing::instrument(skip(self, notice), fields(job_id = %notice.job_id, status = %notice.status))]
    pub async fn collect(&self, notice: CompletionNotice) -> Result<CollectOutcome, CollectError> {
        if notice.job_id.is_empty() {
            tracing::info!("Notification carries no job id");
            return Ok(CollectOutcome::Ignored {
                reason: "missing job id",
            });
        }

        if notice.status == SUCCESS_STATUS {
            self.harvest_and_finalize(notice).await
        } else if FAILURE_STATUSES.contains(&notice.status.as_str()) {
            self.record_failure(notice).await
        } else {
            tracing::info!("Job not in a terminal state; nothing to collect");
            Ok(CollectOutcome::Ignored {
                reason: "not succeeded",
            })
        }
    }

    async fn harvest_and_finalize(
        &self,
        notice: CompletionNotice,
    ) -> Result<CollectOutcome, CollectError> {
        let job_id = notice.job_id.clone();
        let by_job = self.load_by_job(&job_id).await;

        if let Some(record) = &by_job {
            match record.status {
                JobStatus::Failed => {
                    tracing::warn!("Job already marked failed; ignoring late success");
                    return Ok(CollectOutcome::Ignored {
                        reason: "job already failed",
                    });
                }
                JobStatus::Completed => {
                    if let Some(outcome) = self.repair_completed(record).await? {
                        return Ok(outcome);
                    }
                }
                JobStatus::Started => {}
            }
        }

        let object_key = resolve_object_key(by_job.as_ref(), &notice);
        if object_key.is_none() {
            tracing::warn!("Source document unknown; index by-upload will not be updated");
        }

        let progress = match self.harvest(&job_id).await? {
            Harvest::Finished(progress) => progress,
            Harvest::Suspended(progress) => {
                tracing::warn!(
                    pages_fetched = progress.pages_fetched,
                    "Harvest budget exhausted; checkpoint saved"
                );
                return Ok(CollectOutcome::Suspended {
                    job_id,
                    pages_fetched: progress.pages_fetched,
                });
            }
        };

        let line_count = progress.lines.len();
        let document = ExtractedDocument::new(
            job_id.clone(),
            object_key.clone().unwrap_or_default(),
            progress.lines,
        );
        let extracted_key = self.job_store.put_extracted(&document).await?;
        tracing::info!(extracted_key = %extracted_key, lines = line_count, "Saved extracted document");

        let base = by_job.unwrap_or_else(|| {
            JobRecord::started(job_id.clone(), object_key.clone().unwrap_or_default(), None)
        });
        let completed = base.mark_completed(extracted_key.clone())?;
        self.job_store.put_by_job(&completed).await?;
        tracing::debug!("Finalized by-job record");

        if let Err(e) = self.job_store.delete_checkpoint(&job_id).await {
            tracing::warn!(error = %e, "Failed to delete harvest checkpoint");
        }

        if let Some(key) = &object_key {
            self.finalize_by_upload(key, &completed).await?;
        }

        Ok(CollectOutcome::Completed {
            job_id,
            extracted_key,
            line_count,
        })
    }

    /// A redelivered success for a job whose by-job record is already final:
    /// skip the harvest and only bring by-upload up to date.
    async fn repair_completed(
        &self,
        record: &JobRecord,
    ) -> Result<Option<CollectOutcome>, CollectError> {
        let Some(extracted_key) = record.extracted_key.clone() else {
            return Ok(None);
        };
        if !self.job_store.extracted_exists(&extracted_key).await? {
            tracing::warn!(extracted_key = %extracted_key, "Completed job lost its document; harvesting again");
            return Ok(None);
        }

        if !record.object_key.is_empty() {
            self.finalize_by_upload(&record.object_key, record).await?;
        }
        tracing::info!("Job already completed; index records reconciled");

        Ok(Some(CollectOutcome::AlreadyCompleted {
            job_id: record.job_id.clone(),
            extracted_key,
        }))
    }

    async fn record_failure(&self, notice: CompletionNotice) -> Result<CollectOutcome, CollectError> {
        let job_id = notice.job_id.clone();
        let by_job = self.load_by_job(&job_id).await;

        if by_job.as_ref().is_some_and(|r| r.status == JobStatus::Completed) {
            tracing::warn!("Job already completed; ignoring failure notification");
            return Ok(CollectOutcome::Ignored {
                reason: "job already completed",
            });
        }

        let object_key = resolve_object_key(by_job.as_ref(), &notice);
        let reason = notice
            .status_message
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| notice.status.clone());

        let base = by_job.unwrap_or_else(|| {
            JobRecord::started(job_id.clone(), object_key.clone().unwrap_or_default(), None)
        });
        let failed = base.mark_failed(reason)?;
        self.job_store.put_by_job(&failed).await?;

        if let Some(key) = &object_key {
            self.finalize_by_upload(key, &failed).await?;
        }
        tracing::warn!(reason = failed.reason.as_deref().unwrap_or_default(), "Job marked failed");

        Ok(CollectOutcome::Failed { job_id })
    }

    async fn load_by_job(&self, job_id: &JobId) -> Option<JobRecord> {
        match self.job_store.get_by_job(job_id).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "by-job record unreadable; using notification payload");
                None
            }
        }
    }

    /// Drives the engine's pagination from the last checkpoint (or the first
    /// page) until no continuation token is returned or the invocation
    /// budget runs out.
    async fn harvest(&self, job_id: &JobId) -> Result<Harvest, CollectError> {
        let started = Instant::now();
        let mut progress = match self.job_store.get_checkpoint(job_id).await? {
            Some(checkpoint) => {
                tracing::info!(
                    pages_fetched = checkpoint.pages_fetched,
                    "Resuming harvest from checkpoint"
                );
                checkpoint
            }
            None => HarvestCheckpoint::new(job_id.clone()),
        };

        let mut pages_this_invocation = 0u32;
        while !progress.is_finished() {
            let remaining = self
                .budget
                .invocation_budget
                .saturating_sub(started.elapsed());
            if pages_this_invocation >= self.budget.max_pages_per_invocation
                || remaining.is_zero()
            {
                self.job_store.put_checkpoint(&progress).await?;
                return Ok(Harvest::Suspended(progress));
            }

            let fetch = self.engine.fetch_page(
                job_id,
                progress.next_token.as_deref(),
                self.budget.page_size,
            );
            let page = match tokio::time::timeout(remaining, fetch).await {
                Ok(page) => page?,
                Err(_) => {
                    self.job_store.put_checkpoint(&progress).await?;
                    return Ok(Harvest::Suspended(progress));
                }
            };

            progress.absorb(page);
            pages_this_invocation += 1;
            tracing::debug!(
                page = progress.pages_fetched,
                lines = progress.lines.len(),
                has_more = progress.next_token.is_some(),
                "Fetched result page"
            );
        }

        Ok(Harvest::Finished(progress))
    }

    /// Read-modify-write of the by-upload record, guarded by the version it
    /// was read at. A record that belongs to a different job is left alone.
    async fn finalize_by_upload(
        &self,
        object_key: &ObjectKey,
        terminal: &JobRecord,
    ) -> Result<(), CollectError> {
        for attempt in 1..=MAX_UPLOAD_WRITE_ATTEMPTS {
            let current = match self.job_store.get_by_upload(object_key).await {
                Ok(current) => current,
                Err(JobStoreError::Malformed { path, source }) => {
                    tracing::warn!(path = %path, error = %source, "Replacing unreadable by-upload record");
                    let fresh = JobRecord {
                        object_key: object_key.clone(),
                        ..terminal.clone()
                    };
                    self.job_store.put_by_upload(&fresh).await?;
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };

            let next = match &current {
                Some(stored) if stored.value.job_id != terminal.job_id => {
                    tracing::warn!(
                        other_job_id = %stored.value.job_id,
                        "by-upload record belongs to another job; leaving it untouched"
                    );
                    return Ok(());
                }
                Some(stored) => match stored.value.converge_to(terminal) {
                    Ok(next) => next,
                    Err(e) => {
                        tracing::warn!(error = %e, "by-upload record already terminal");
                        return Ok(());
                    }
                },
                None => JobRecord {
                    object_key: object_key.clone(),
                    ..terminal.clone()
                },
            };

            let expected = current.as_ref().map(|c| &c.version);
            match self.job_store.replace_by_upload(&next, expected).await? {
                ConditionalWrite::Applied => {
                    tracing::debug!(attempt, "Finalized by-upload record");
                    return Ok(());
                }
                ConditionalWrite::Conflict => {
                    tracing::debug!(attempt, "by-upload record changed concurrently; retrying");
                }
            }
        }

        Err(CollectError::Contention(object_key.to_string()))
    }
}

fn resolve_object_key(by_job: Option<&JobRecord>, notice: &CompletionNotice) -> Option<ObjectKey> {
    by_job
        .map(|r| r.object_key.clone())
        .filter(|k| !k.is_empty())
        .or_else(|| notice.document_location.clone().filter(|k| !k.is_empty()))
}

#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("job store: {0}")]
    Store(#[from] JobStoreError),
    #[error("extraction engine: {0}")]
    Engine(#[from] ExtractionEngineError),
    #[error("status transition: {0}")]
    Transition(#[from] InvalidTransition),
    #[error("by-upload record for {0} kept changing while finalizing")]
    Contention(String),
}
