//! Health check endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::telemetry::IngestHandler;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Whether a backend connection string is configured
    pub telemetry_configured: bool,
}

/// Build health routes
pub fn routes(handler: Arc<IngestHandler>) -> Router<()> {
    Router::new()
        .route("/api/v1/health", get(health))
        .with_state(handler)
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health(State(handler): State<Arc<IngestHandler>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
            telemetry_configured: handler.is_configured(),
        }),
    )
}
