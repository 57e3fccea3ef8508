use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::services::{DispatchOutcome, UploadedObject};
use crate::domain::ObjectKey;
use crate::presentation::handlers::event_types::UploadEvent;
use crate::presentation::state::AppState;

#[tracing::instrument(skip(state, body))]
pub async fn upload_event_handler(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let event: UploadEvent = serde_json::from_slice(&body).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Upload event is not valid JSON");
        UploadEvent::default()
    });

    let Some((bucket, raw_key)) = event.location(&state.default_bucket) else {
        tracing::warn!("Upload event without bucket/key");
        return (StatusCode::BAD_REQUEST, "missing bucket/key".to_string());
    };

    let object_key = match ObjectKey::from_event(raw_key) {
        Ok(key) => key,
        Err(e) => {
            tracing::warn!(error = %e, "Upload event key is not decodable");
            return (StatusCode::BAD_REQUEST, "missing bucket/key".to_string());
        }
    };

    let upload = UploadedObject {
        bucket: bucket.to_string(),
        object_key,
    };

    match state.dispatcher.dispatch(upload).await {
        Ok(DispatchOutcome::Ignored) => (StatusCode::OK, "ignored".to_string()),
        Ok(DispatchOutcome::Started { job_id }) => (StatusCode::OK, format!("started {}", job_id)),
        Ok(DispatchOutcome::AlreadyTracked { job_id }) => {
            (StatusCode::OK, format!("already tracked {}", job_id))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to start extraction");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "textract-start-failed".to_string(),
            )
        }
    }
}
