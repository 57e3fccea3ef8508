use std::sync::Arc;

use uuid::Uuid;

use crate::application::ports::{
    ExtractionEngine, ExtractionEngineError, NotificationTarget, ObjectVersion, SubmitRequest,
};
use crate::domain::{JobId, JobRecord, ObjectKey};

use super::{JobStore, JobStoreError};

#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Bucket served by the job store; uploads elsewhere cannot be versioned.
    pub bucket: String,
    pub upload_prefix: String,
    pub accepted_extension: String,
    pub notification: Option<NotificationTarget>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedObject {
    pub bucket: String,
    pub object_key: ObjectKey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Ignored,
    Started { job_id: JobId },
    AlreadyTracked { job_id: JobId },
}

/// Starts an extraction job for each eligible upload and seeds both index
/// records.
pub struct Dispatcher {
    job_store: Arc<JobStore>,
    engine: Arc<dyn ExtractionEngine>,
    config: DispatcherConfig,
}

impl Dispatcher {
    pub fn new(
        job_store: Arc<JobStore>,
        engine: Arc<dyn ExtractionEngine>,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            job_store,
            engine,
            config,
        }
    }

    #[tracing::instrument(
        skip(self, upload),
        fields(bucket = %upload.bucket, object_key = %upload.object_key)
    )]
    pub async fn dispatch(&self, upload: UploadedObject) -> Result<DispatchOutcome, DispatchError> {
        if !upload
            .object_key
            .is_eligible(&self.config.upload_prefix, &self.config.accepted_extension)
        {
            tracing::info!("Ignoring upload outside the accepted namespace or type");
            return Ok(DispatchOutcome::Ignored);
        }

        let version = if upload.bucket == self.config.bucket {
            self.job_store.upload_version(&upload.object_key).await?
        } else {
            tracing::warn!(
                configured_bucket = %self.config.bucket,
                "Upload is outside the configured bucket; idempotency falls back to the key alone"
            );
            None
        };
        let idempotency_key = idempotency_key(&upload.object_key, version.as_ref());

        if let Some(job_id) = self
            .tracked_job(&upload.object_key, &idempotency_key)
            .await?
        {
            tracing::info!(job_id = %job_id, "Upload already dispatched; skipping submission");
            return Ok(DispatchOutcome::AlreadyTracked { job_id });
        }

        let request = SubmitRequest {
            bucket: upload.bucket,
            object_key: upload.object_key.clone(),
            notification: self.config.notification.clone(),
            client_token: idempotency_key.clone(),
        };
        let job_id = self.engine.submit(&request).await?;
        tracing::info!(job_id = %job_id, "Started extraction job");

        let record = JobRecord::started(job_id.clone(), upload.object_key, Some(idempotency_key));
        self.job_store.put_by_upload(&record).await?;
        self.job_store.put_by_job(&record).await?;
        tracing::debug!(job_id = %job_id, "Seeded index records");

        Ok(DispatchOutcome::Started { job_id })
    }

    async fn tracked_job(
        &self,
        object_key: &ObjectKey,
        idempotency_key: &str,
    ) -> Result<Option<JobId>, DispatchError> {
        match self.job_store.get_by_upload(object_key).await {
            Ok(Some(existing))
                if existing.value.idempotency_key.as_deref() == Some(idempotency_key) =>
            {
                Ok(Some(existing.value.job_id))
            }
            Ok(_) => Ok(None),
            Err(JobStoreError::Malformed { path, source }) => {
                tracing::warn!(path = %path, error = %source, "Ignoring unreadable by-upload record");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Deterministic submission token for one version of one upload. The same
/// object delivered twice maps to the same token; a new upload under the same
/// key carries a new version id (or, unversioned, a new entity tag) and
/// therefore a new token.
pub fn idempotency_key(object_key: &ObjectKey, version: Option<&ObjectVersion>) -> String {
    let tag = version
        .and_then(|v| v.version.as_deref().or(v.e_tag.as_deref()))
        .unwrap_or_default();
    let name = format!("{}#{}", object_key, tag);
    Uuid::new_v5(&Uuid::NAMESPACE_URL, name.as_bytes()).to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("job store: {0}")]
    Store(#[from] JobStoreError),
    #[error("extraction engine: {0}")]
    Engine(#[from] ExtractionEngineError),
}
