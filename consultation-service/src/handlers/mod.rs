//! HTTP handlers for the consultation service.

use crate::config::ResponseMode;
use crate::models::Visit;
use crate::services::prompt::build_messages;
use crate::services::sse::sse_body;
use crate::startup::AppState;
use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use service_core::error::AppError;

/// Summarize a visit: `POST /api/consultation`.
///
/// Streams SSE frames or returns one JSON body, depending on the configured
/// response mode.
pub async fn consultation_summary(
    State(state): State<AppState>,
    Json(visit): Json<Visit>,
) -> Result<Response, AppError> {
    tracing::info!(
        patient = %visit.patient_name,
        date = %visit.date_of_visit,
        notes_len = visit.notes.len(),
        "Consultation summary requested"
    );

    match state.config.server.response_mode {
        ResponseMode::Streaming => stream_summary(state, visit).await,
        ResponseMode::Buffered => buffered_summary(state, visit).await,
    }
}

/// Streaming path: reframe the provider's delta stream into SSE frames,
/// flushed as produced. Provider failures after the stream has started
/// surface as a terminal `data: Error: ...` frame, not an HTTP error.
async fn stream_summary(state: AppState, visit: Visit) -> Result<Response, AppError> {
    let messages = build_messages(&visit);

    let deltas = state
        .provider
        .chat_stream(&messages)
        .await
        .map_err(|e| AppError::UpstreamError(e.to_string()))?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        // Keeps reverse proxies from buffering the stream.
        .header("x-accel-buffering", "no")
        .body(Body::from_stream(sse_body(deltas)))
        .map_err(|e| AppError::InternalError(anyhow::Error::new(e)))?;

    Ok(response)
}

/// Buffered path: wait for the full completion and return it as one JSON
/// object. The credential check happens before any provider call.
async fn buffered_summary(state: AppState, visit: Visit) -> Result<Response, AppError> {
    if !state.config.has_api_key() {
        return Err(AppError::MissingCredential(
            "OPENAI_API_KEY is not set".to_string(),
        ));
    }

    let messages = build_messages(&visit);

    let content = state
        .provider
        .chat(&messages)
        .await
        .map_err(|e| AppError::UpstreamError(e.to_string()))?;

    Ok(Json(json!({ "content": content })).into_response())
}

/// Health check endpoint for container probes: `GET /health`.
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "consultation-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Root status endpoint: `GET /` (only when no static directory is served).
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "Consultation API is running",
        "status": "ok"
    }))
}
