#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("read failed: {0}")]
    ReadFailed(String),
    #[error("write failed: {0}")]
    WriteFailed(String),
    #[error("delete failed: {0}")]
    DeleteFailed(String),
    #[error("object already exists: {0}")]
    AlreadyExists(String),
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),
    #[error("conditional write not supported by backend: {0}")]
    ConditionalWriteUnsupported(String),
    #[error("invalid object path: {0}")]
    InvalidPath(String),
    #[error("backend configuration invalid: {0}")]
    Configuration(String),
}
