use std::path::PathBuf;
use std::sync::Arc;

use crate::application::ports::{ObjectStorage, StorageError};
use crate::presentation::config::{StorageProviderSetting, StorageSettings};

use super::object_store_storage::ObjectStoreStorage;

pub struct ObjectStorageFactory;

impl ObjectStorageFactory {
    pub fn create(settings: &StorageSettings) -> Result<Arc<dyn ObjectStorage>, StorageError> {
        let storage = match settings.provider {
            StorageProviderSetting::Local => {
                ObjectStoreStorage::local(PathBuf::from(&settings.local_path))?
            }
            StorageProviderSetting::S3 => {
                if settings.bucket.trim().is_empty() {
                    return Err(StorageError::Configuration(
                        "storage.bucket required for the s3 provider".into(),
                    ));
                }
                ObjectStoreStorage::s3(
                    &settings.bucket,
                    settings.region.as_deref(),
                    settings.endpoint.as_deref(),
                )?
            }
            StorageProviderSetting::Memory => ObjectStoreStorage::in_memory(),
        };

        tracing::info!(backend = storage.backend(), "Object storage ready");
        Ok(Arc::new(storage))
    }
}
