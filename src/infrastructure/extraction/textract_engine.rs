use async_trait::async_trait;
use aws_sdk_textract::Client;
use aws_sdk_textract::config::Region;
use aws_sdk_textract::error::DisplayErrorContext;
use aws_sdk_textract::types::{DocumentLocation, JobStatus, NotificationChannel, S3Object};

use crate::application::ports::{
    ExtractionEngine, ExtractionEngineError, SubmitRequest,
};
use crate::domain::{BlockType, JobId, ResultPage, TextBlock};

/// Asynchronous text detection on Amazon Textract.
pub struct TextractEngine {
    client: Client,
}

impl TextractEngine {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn from_env(region: Option<String>, endpoint: Option<String>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        if let Some(endpoint) = endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let cfg = loader.load().await;
        Self::new(Client::new(&cfg))
    }
}

#[async_trait]
impl ExtractionEngine for TextractEngine {
    #[tracing::instrument(skip(self, request), fields(bucket = %request.bucket, object_key = %request.object_key))]
    async fn submit(&self, request: &SubmitRequest) -> Result<JobId, ExtractionEngineError> {
        let location = DocumentLocation::builder()
            .s3_object(
                S3Object::builder()
                    .bucket(&request.bucket)
                    .name(request.object_key.as_str())
                    .build(),
            )
            .build();

        let mut call = self
            .client
            .start_document_text_detection()
            .document_location(location)
            .client_request_token(&request.client_token);

        if let Some(target) = &request.notification {
            let channel = NotificationChannel::builder()
                .sns_topic_arn(&target.topic_arn)
                .role_arn(&target.role_arn)
                .build()
                .map_err(|e| ExtractionEngineError::Configuration(e.to_string()))?;
            call = call.notification_channel(channel);
        }

        let output = call.send().await.map_err(|e| {
            ExtractionEngineError::SubmitFailed(DisplayErrorContext(&e).to_string())
        })?;

        output
            .job_id()
            .filter(|id| !id.is_empty())
            .map(JobId::new)
            .ok_or(ExtractionEngineError::MissingJobId)
    }

    #[tracing::instrument(skip(self, job_id), fields(job_id = %job_id))]
    async fn fetch_page(
        &self,
        job_id: &JobId,
        page_token: Option<&str>,
        page_size: i32,
    ) -> Result<ResultPage, ExtractionEngineError> {
        let output = self
            .client
            .get_document_text_detection()
            .job_id(job_id.as_str())
            .max_results(page_size)
            .set_next_token(page_token.map(str::to_string))
            .send()
            .await
            .map_err(|e| ExtractionEngineError::FetchFailed(DisplayErrorContext(&e).to_string()))?;

        if output.job_status() == Some(&JobStatus::Failed) {
            return Err(ExtractionEngineError::FetchFailed(format!(
                "job {} failed: {}",
                job_id,
                output.status_message().unwrap_or("no status message")
            )));
        }

        let blocks = output
            .blocks()
            .iter()
            .map(|block| TextBlock {
                block_type: block
                    .block_type()
                    .map(|t| BlockType::from_engine(t.as_str()))
                    .unwrap_or(BlockType::Other),
                text: block.text().map(str::to_string),
            })
            .collect();

        Ok(ResultPage {
            blocks,
            next_token: output.next_token().map(str::to_string),
        })
    }
}
