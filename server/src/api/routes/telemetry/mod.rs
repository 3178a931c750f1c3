//! Telemetry ingestion endpoint

pub mod types;

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};

use types::IngestResponse;

use crate::core::constants::{INGEST_BODY_LIMIT, INGEST_PATH};
use crate::domain::telemetry::{IngestHandler, TelemetryRecord};

/// Shared state for the ingestion endpoint
#[derive(Clone)]
pub struct TelemetryApiState {
    pub handler: Arc<IngestHandler>,
}

/// Build telemetry ingestion routes
pub fn routes(handler: Arc<IngestHandler>) -> Router<()> {
    let state = TelemetryApiState { handler };

    Router::new()
        .route(INGEST_PATH, post(log_telemetry))
        .layer(DefaultBodyLimit::max(INGEST_BODY_LIMIT))
        .with_state(state)
}

/// Forward one API call record to the telemetry backend
#[utoipa::path(
    post,
    path = "/api/telemetry/log",
    tag = "telemetry",
    request_body = TelemetryRecord,
    responses(
        (status = 200, description = "Record handled (check `success`)", body = IngestResponse),
        (status = 500, description = "Forwarding failed")
    )
)]
pub async fn log_telemetry(
    State(state): State<TelemetryApiState>,
    Json(record): Json<TelemetryRecord>,
) -> Response {
    match state.handler.submit(&record).await {
        Ok(outcome) => {
            let response = IngestResponse::from_outcome(outcome, state.handler.is_configured());
            (StatusCode::OK, Json(response)).into_response()
        }
        // Already logged and reported by the handler
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}
