mod extraction_engine;
mod object_storage;
mod storage_error;

pub use extraction_engine::{
    ExtractionEngine, ExtractionEngineError, NotificationTarget, SubmitRequest,
};
pub use object_storage::{ObjectStorage, ObjectVersion, StoredObject, WriteMode};
pub use storage_error::StorageError;
