use async_trait::async_trait;

use crate::domain::StoragePath;

use super::StorageError;

/// Version token reported by the backend for a stored object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectVersion {
    pub e_tag: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub version: ObjectVersion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteMode {
    Overwrite,
    /// Fails with [`StorageError::AlreadyExists`] when the key is taken.
    Create,
    /// Fails with [`StorageError::PreconditionFailed`] when the stored
    /// version no longer matches.
    Update(ObjectVersion),
}

/// Single-key object storage. There is no multi-key atomicity; callers that
/// need to coordinate use conditional writes on one key at a time.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn get(&self, path: &StoragePath) -> Result<Option<StoredObject>, StorageError>;

    async fn put(
        &self,
        path: &StoragePath,
        body: Vec<u8>,
        mode: WriteMode,
    ) -> Result<ObjectVersion, StorageError>;

    async fn head(&self, path: &StoragePath) -> Result<Option<ObjectVersion>, StorageError>;

    async fn delete(&self, path: &StoragePath) -> Result<(), StorageError>;
}
