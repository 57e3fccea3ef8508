use std::path::PathBuf;
use std::sync::Arc;

use object_store::aws::{AmazonS3Builder, S3ConditionalPut};
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as StorePath;
use object_store::{ObjectStore, PutMode, PutOptions, PutPayload, UpdateVersion};

use crate::application::ports::{
    ObjectStorage, ObjectVersion, StorageError, StoredObject, WriteMode,
};
use crate::domain::StoragePath;

/// [`ObjectStorage`] over any `object_store` backend.
pub struct ObjectStoreStorage {
    inner: Arc<dyn ObjectStore>,
    backend: &'static str,
}

impl ObjectStoreStorage {
    /// Credentials come from the standard AWS environment variables.
    pub fn s3(
        bucket: &str,
        region: Option<&str>,
        endpoint: Option<&str>,
    ) -> Result<Self, StorageError> {
        let mut builder = AmazonS3Builder::from_env()
            .with_bucket_name(bucket)
            .with_conditional_put(S3ConditionalPut::ETagMatch);
        if let Some(region) = region {
            builder = builder.with_region(region);
        }
        if let Some(endpoint) = endpoint {
            builder = builder.with_endpoint(endpoint).with_allow_http(true);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::Configuration(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(store),
            backend: "s3",
        })
    }

    pub fn local(base_path: PathBuf) -> Result<Self, StorageError> {
        std::fs::create_dir_all(&base_path)
            .map_err(|e| StorageError::Configuration(e.to_string()))?;
        let fs = LocalFileSystem::new_with_prefix(base_path)
            .map_err(|e| StorageError::Configuration(e.to_string()))?;
        Ok(Self {
            inner: Arc::new(fs),
            backend: "local",
        })
    }

    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(InMemory::new()),
            backend: "memory",
        }
    }

    pub fn backend(&self) -> &'static str {
        self.backend
    }
}

/// Bucket keys are taken as already encoded; `object_store` only validates
/// the segments instead of escaping `%` a second time.
fn store_path(path: &StoragePath) -> Result<StorePath, StorageError> {
    StorePath::parse(path.as_str()).map_err(|e| StorageError::InvalidPath(e.to_string()))
}

fn version_of(e_tag: Option<String>, version: Option<String>) -> ObjectVersion {
    ObjectVersion { e_tag, version }
}

fn put_options(mode: WriteMode) -> PutOptions {
    let mode = match mode {
        WriteMode::Overwrite => PutMode::Overwrite,
        WriteMode::Create => PutMode::Create,
        WriteMode::Update(v) => PutMode::Update(UpdateVersion {
            e_tag: v.e_tag,
            version: v.version,
        }),
    };
    PutOptions::from(mode)
}

fn map_write_error(backend: &str, e: object_store::Error) -> StorageError {
    match e {
        object_store::Error::AlreadyExists { path, .. } => StorageError::AlreadyExists(path),
        object_store::Error::Precondition { path, .. } => StorageError::PreconditionFailed(path),
        object_store::Error::NotImplemented | object_store::Error::NotSupported { .. } => {
            StorageError::ConditionalWriteUnsupported(backend.to_string())
        }
        other => StorageError::WriteFailed(other.to_string()),
    }
}

#[async_trait::async_trait]
impl ObjectStorage for ObjectStoreStorage {
    async fn get(&self, path: &StoragePath) -> Result<Option<StoredObject>, StorageError> {
        let location = store_path(path)?;
        let result = match self.inner.get(&location).await {
            Ok(result) => result,
            Err(object_store::Error::NotFound { .. }) => return Ok(None),
            Err(e) => return Err(StorageError::ReadFailed(e.to_string())),
        };

        let version = version_of(result.meta.e_tag.clone(), result.meta.version.clone());
        let bytes = result
            .bytes()
            .await
            .map_err(|e| StorageError::ReadFailed(e.to_string()))?;

        Ok(Some(StoredObject {
            body: bytes.to_vec(),
            version,
        }))
    }

    async fn put(
        &self,
        path: &StoragePath,
        body: Vec<u8>,
        mode: WriteMode,
    ) -> Result<ObjectVersion, StorageError> {
        let location = store_path(path)?;
        let result = self
            .inner
            .put_opts(&location, PutPayload::from(body), put_options(mode))
            .await
            .map_err(|e| map_write_error(self.backend, e))?;

        Ok(version_of(result.e_tag, result.version))
    }

    async fn head(&self, path: &StoragePath) -> Result<Option<ObjectVersion>, StorageError> {
        let location = store_path(path)?;
        match self.inner.head(&location).await {
            Ok(meta) => Ok(Some(version_of(meta.e_tag, meta.version))),
            Err(object_store::Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(StorageError::ReadFailed(e.to_string())),
        }
    }

    async fn delete(&self, path: &StoragePath) -> Result<(), StorageError> {
        let location = store_path(path)?;
        match self.inner.delete(&location).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed(e.to_string())),
        }
    }
}
