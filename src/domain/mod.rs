mod extracted_document;
mod harvest_checkpoint;
mod job;
mod job_id;
mod job_status;
mod match_score;
mod object_key;
mod result_page;
mod storage_path;

pub use extracted_document::ExtractedDocument;
pub use harvest_checkpoint::HarvestCheckpoint;
pub use job::{InvalidTransition, JobRecord};
pub use job_id::JobId;
pub use job_status::JobStatus;
pub use match_score::MatchScore;
pub use object_key::{ObjectKey, ObjectKeyError};
pub use result_page::{BlockType, ResultPage, TextBlock};
pub use storage_path::{
    BY_JOB_PREFIX, BY_UPLOAD_PREFIX, CHECKPOINT_PREFIX, EXTRACTED_PREFIX, StoragePath,
};
