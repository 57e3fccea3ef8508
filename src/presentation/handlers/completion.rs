use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::application::services::CollectOutcome;
use crate::presentation::handlers::event_types::{CompletionMessage, NotificationEnvelope};
use crate::presentation::state::AppState;

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResponse {
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages_fetched: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

impl CompletionResponse {
    fn ignored(reason: &'static str) -> Self {
        Self {
            outcome: "ignored",
            reason: Some(reason),
            ..Default::default()
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[tracing::instrument(skip(state, body))]
pub async fn completion_handler(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let envelope: NotificationEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!(error = %e, "Notification envelope is not valid JSON");
            return (StatusCode::OK, Json(CompletionResponse::ignored("unparseable envelope")))
                .into_response();
        }
    };

    let Some(raw_message) = envelope.message() else {
        tracing::info!("Notification carries no message");
        return (StatusCode::OK, Json(CompletionResponse::ignored("no message"))).into_response();
    };

    let message: CompletionMessage = match serde_json::from_str(raw_message) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!(error = %e, "Notification message is not valid JSON");
            return (StatusCode::OK, Json(CompletionResponse::ignored("unparseable message")))
                .into_response();
        }
    };

    match state.collector.collect(message.into_notice()).await {
        Ok(outcome) => {
            let status = match outcome {
                CollectOutcome::Suspended { .. } => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::OK,
            };
            (status, Json(CompletionResponse::from(outcome))).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to collect extraction results");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

impl From<CollectOutcome> for CompletionResponse {
    fn from(outcome: CollectOutcome) -> Self {
        match outcome {
            CollectOutcome::Ignored { reason } => Self::ignored(reason),
            CollectOutcome::Completed {
                job_id,
                extracted_key,
                line_count,
            } => Self {
                outcome: "completed",
                job_id: Some(job_id.to_string()),
                extracted_key: Some(extracted_key.to_string()),
                line_count: Some(line_count),
                ..Default::default()
            },
            CollectOutcome::AlreadyCompleted {
                job_id,
                extracted_key,
            } => Self {
                outcome: "already completed",
                job_id: Some(job_id.to_string()),
                extracted_key: Some(extracted_key.to_string()),
                ..Default::default()
            },
            CollectOutcome::Failed { job_id } => Self {
                outcome: "failed",
                job_id: Some(job_id.to_string()),
                ..Default::default()
            },
            CollectOutcome::Suspended {
                job_id,
                pages_fetched,
            } => Self {
                outcome: "suspended",
                job_id: Some(job_id.to_string()),
                pages_fetched: Some(pages_fetched),
                ..Default::default()
            },
        }
    }
}
