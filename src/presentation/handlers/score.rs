use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ORIGIN, VARY,
};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::application::services::{PollStatus, ScoreOutcome, ScoreRequest, ScorerError};
use crate::domain::{ObjectKey, StoragePath};
use crate::presentation::state::AppState;

pub const ALLOWED_METHODS: &str = "POST,OPTIONS,GET";
pub const ALLOWED_HEADERS: &str = "Content-Type";

#[derive(Debug, Default, Deserialize)]
pub struct ScoreQuery {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(rename = "objectKey", default)]
    pub object_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ScoreBody {
    #[serde(rename = "objectKey", default)]
    object_key: Option<String>,
    #[serde(rename = "jobText", default)]
    job_text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_key: Option<String>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Single entry point for poll and score; routing is by method and by which
/// parameters are present.
#[tracing::instrument(skip(state, method, headers, query, body), fields(method = %method))]
pub async fn score_handler(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    query: Result<Query<ScoreQuery>, QueryRejection>,
    body: Bytes,
) -> Response {
    let origin = headers.get(ORIGIN).cloned();
    let params = match query {
        Ok(Query(params)) => params,
        Err(e) => {
            tracing::debug!(error = %e, "Unreadable query string; treating as empty");
            ScoreQuery::default()
        }
    };

    let response = match method {
        Method::OPTIONS => StatusCode::NO_CONTENT.into_response(),
        Method::GET => handle_get(&state, params).await,
        Method::POST => handle_post(&state, params, &body).await,
        _ => method_not_allowed(),
    };

    with_cors(origin, response)
}

async fn handle_get(state: &AppState, params: ScoreQuery) -> Response {
    if present(params.key.as_deref()).is_some() {
        tracing::debug!("GET with ?key; scoring requires POST");
        return method_not_allowed();
    }

    let Some(object_key) = present(params.object_key.as_deref()) else {
        return bad_request(ScorerError::MissingKey.to_string());
    };

    match state.scorer.poll(&ObjectKey::new(object_key)).await {
        Ok(PollStatus::Completed { extracted_key }) => (
            StatusCode::OK,
            Json(StatusResponse {
                status: "COMPLETED".to_string(),
                reason: None,
                extracted_key: Some(extracted_key.to_string()),
            }),
        )
            .into_response(),
        Ok(PollStatus::Pending { status, reason }) => pending(status, reason),
        Err(e) => internal_error(&e),
    }
}

async fn handle_post(state: &AppState, params: ScoreQuery, body: &[u8]) -> Response {
    let key = match present(params.key.as_deref()) {
        Some(raw) => match StoragePath::parse_extracted(raw) {
            Some(key) => Some(key),
            None => {
                tracing::warn!(key = raw, "Rejected key outside the extracted namespace");
                return bad_request(format!(
                    "key must name an extracted document (extracted/<JobId>.json): {}",
                    raw
                ));
            }
        },
        None => None,
    };

    let payload: ScoreBody = if body.is_empty() {
        ScoreBody::default()
    } else {
        serde_json::from_slice(body).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "Score body is not a JSON object; treating as empty");
            ScoreBody::default()
        })
    };

    let request = ScoreRequest {
        key,
        object_key: present(payload.object_key.as_deref()).map(ObjectKey::new),
        job_text: payload.job_text,
    };

    match state.scorer.score(request).await {
        Ok(ScoreOutcome::Scored(report)) => (StatusCode::OK, Json(report)).into_response(),
        Ok(ScoreOutcome::Pending { status, reason }) => pending(status, reason),
        Err(e @ (ScorerError::MissingKey | ScorerError::MissingJobText)) => {
            bad_request(e.to_string())
        }
        Err(e) => internal_error(&e),
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn pending(status: String, reason: Option<String>) -> Response {
    (
        StatusCode::ACCEPTED,
        Json(StatusResponse {
            status,
            reason,
            extracted_key: None,
        }),
    )
        .into_response()
}

fn bad_request(error: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error })).into_response()
}

fn method_not_allowed() -> Response {
    (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed").into_response()
}

fn internal_error(e: &ScorerError) -> Response {
    tracing::error!(error = %e, "Score request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, "error").into_response()
}

fn with_cors(origin: Option<HeaderValue>, mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        ACCESS_CONTROL_ALLOW_ORIGIN,
        origin.unwrap_or_else(|| HeaderValue::from_static("*")),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    headers.insert(VARY, HeaderValue::from_static("Origin"));
    response
}
