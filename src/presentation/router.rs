use axum::Router;
use axum::middleware;
use axum::routing::{any, get, post};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    completion_handler, health_handler, score_handler, upload_event_handler,
};
use crate::presentation::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // `/score` answers its own preflight and CORS headers, so no CorsLayer.
    Router::new()
        .route("/health", get(health_handler))
        .route("/events/upload", post(upload_event_handler))
        .route("/events/completion", post(completion_handler))
        .route("/score", any(score_handler))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .with_state(state)
}
