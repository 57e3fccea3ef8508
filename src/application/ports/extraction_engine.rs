use async_trait::async_trait;

use crate::domain::{JobId, ObjectKey, ResultPage};

/// Where the engine publishes its completion notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationTarget {
    pub topic_arn: String,
    pub role_arn: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub bucket: String,
    pub object_key: ObjectKey,
    pub notification: Option<NotificationTarget>,
    /// Submissions carrying the same token resolve to the same engine job.
    pub client_token: String,
}

/// Asynchronous text-detection job engine.
#[async_trait]
pub trait ExtractionEngine: Send + Sync {
    async fn submit(&self, request: &SubmitRequest) -> Result<JobId, ExtractionEngineError>;

    async fn fetch_page(
        &self,
        job_id: &JobId,
        page_token: Option<&str>,
        page_size: i32,
    ) -> Result<ResultPage, ExtractionEngineError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractionEngineError {
    #[error("submit failed: {0}")]
    SubmitFailed(String),
    #[error("engine response missing job id")]
    MissingJobId,
    #[error("result fetch failed: {0}")]
    FetchFailed(String),
    #[error("engine configuration invalid: {0}")]
    Configuration(String),
}
