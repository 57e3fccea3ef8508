use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::application::ports::{ObjectStorage, ObjectVersion, StorageError, WriteMode};
use crate::domain::{
    ExtractedDocument, HarvestCheckpoint, JobId, JobRecord, ObjectKey, StoragePath,
};

/// A decoded record together with the version it was read at.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub value: T,
    pub version: ObjectVersion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionalWrite {
    Applied,
    Conflict,
}

/// Typed access to the pipeline's JSON objects: the two index record
/// families, harvested documents and harvest checkpoints.
pub struct JobStore {
    storage: Arc<dyn ObjectStorage>,
}

impl JobStore {
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        Self { storage }
    }

    pub async fn get_by_job(&self, job_id: &JobId) -> Result<Option<JobRecord>, JobStoreError> {
        let record = self.read_json(&StoragePath::by_job(job_id)).await?;
        Ok(record.map(|r| r.value))
    }

    pub async fn put_by_job(&self, record: &JobRecord) -> Result<(), JobStoreError> {
        self.write_json(&StoragePath::by_job(&record.job_id), record, WriteMode::Overwrite)
            .await
            .map(|_| ())
    }

    pub async fn get_by_upload(
        &self,
        object_key: &ObjectKey,
    ) -> Result<Option<Versioned<JobRecord>>, JobStoreError> {
        self.read_json(&StoragePath::by_upload(object_key)).await
    }

    pub async fn put_by_upload(&self, record: &JobRecord) -> Result<(), JobStoreError> {
        self.write_json(
            &StoragePath::by_upload(&record.object_key),
            record,
            WriteMode::Overwrite,
        )
        .await
        .map(|_| ())
    }

    /// Compare-and-swap on the by-upload record. `expected` is the version
    /// the caller read, or `None` when it found no record. Backends that
    /// cannot honour the condition get an unconditional write.
    #[tracing::instrument(skip(self, record), fields(object_key = %record.object_key))]
    pub async fn replace_by_upload(
        &self,
        record: &JobRecord,
        expected: Option<&ObjectVersion>,
    ) -> Result<ConditionalWrite, JobStoreError> {
        let path = StoragePath::by_upload(&record.object_key);
        let mode = match expected {
            Some(version) => WriteMode::Update(version.clone()),
            None => WriteMode::Create,
        };

        match self.write_json(&path, record, mode).await {
            Ok(_) => Ok(ConditionalWrite::Applied),
            Err(JobStoreError::Storage(
                StorageError::PreconditionFailed(_) | StorageError::AlreadyExists(_),
            )) => Ok(ConditionalWrite::Conflict),
            Err(JobStoreError::Storage(StorageError::ConditionalWriteUnsupported(reason))) => {
                tracing::warn!(
                    path = %path,
                    reason = %reason,
                    "Backend lacks conditional writes; falling back to overwrite"
                );
                self.write_json(&path, record, WriteMode::Overwrite).await?;
                Ok(ConditionalWrite::Applied)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn put_extracted(
        &self,
        document: &ExtractedDocument,
    ) -> Result<StoragePath, JobStoreError> {
        let path = StoragePath::extracted(&document.job_id);
        self.write_json(&path, document, WriteMode::Overwrite)
            .await?;
        Ok(path)
    }

    pub async fn get_extracted(
        &self,
        path: &StoragePath,
    ) -> Result<Option<ExtractedDocument>, JobStoreError> {
        Ok(self.read_json(path).await?.map(|d| d.value))
    }

    pub async fn extracted_exists(&self, path: &StoragePath) -> Result<bool, JobStoreError> {
        Ok(self.storage.head(path).await?.is_some())
    }

    pub async fn get_checkpoint(
        &self,
        job_id: &JobId,
    ) -> Result<Option<HarvestCheckpoint>, JobStoreError> {
        Ok(self
            .read_json(&StoragePath::checkpoint(job_id))
            .await?
            .map(|c| c.value))
    }

    pub async fn put_checkpoint(&self, checkpoint: &HarvestCheckpoint) -> Result<(), JobStoreError> {
        self.write_json(
            &StoragePath::checkpoint(&checkpoint.job_id),
            checkpoint,
            WriteMode::Overwrite,
        )
        .await
        .map(|_| ())
    }

    pub async fn delete_checkpoint(&self, job_id: &JobId) -> Result<(), JobStoreError> {
        self.storage
            .delete(&StoragePath::checkpoint(job_id))
            .await
            .map_err(JobStoreError::Storage)
    }

    /// Version of the uploaded source document, used to tell a redelivered
    /// upload event apart from a re-upload with new content.
    pub async fn upload_version(
        &self,
        object_key: &ObjectKey,
    ) -> Result<Option<ObjectVersion>, JobStoreError> {
        Ok(self.storage.head(&StoragePath::upload(object_key)).await?)
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        path: &StoragePath,
    ) -> Result<Option<Versioned<T>>, JobStoreError> {
        let Some(object) = self.storage.get(path).await? else {
            return Ok(None);
        };

        let value = serde_json::from_slice(&object.body).map_err(|e| JobStoreError::Malformed {
            path: path.to_string(),
            source: e,
        })?;

        Ok(Some(Versioned {
            value,
            version: object.version,
        }))
    }

    async fn write_json<T: Serialize>(
        &self,
        path: &StoragePath,
        value: &T,
        mode: WriteMode,
    ) -> Result<ObjectVersion, JobStoreError> {
        let body = serde_json::to_vec(value).map_err(JobStoreError::Serialization)?;
        tracing::debug!(path = %path, bytes = body.len(), "Writing object");
        Ok(self.storage.put(path, body, mode).await?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JobStoreError {
    #[error("storage: {0}")]
    Storage(#[from] StorageError),
    #[error("malformed object at {path}: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("serialization failed: {0}")]
    Serialization(serde_json::Error),
}
