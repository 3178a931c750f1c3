//! OpenAPI specification and Swagger UI

use axum::http::header;
use axum::response::{Html, IntoResponse, Json};
use utoipa::OpenApi;

use crate::api::routes::{health, telemetry};
use crate::domain::telemetry::TelemetryRecord;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "TelemetryRelay API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Relays API call telemetry to Application Insights"
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "telemetry", description = "API call telemetry ingestion")
    ),
    paths(health::health, telemetry::log_telemetry),
    components(schemas(
        health::HealthResponse,
        TelemetryRecord,
        telemetry::types::IngestResponse,
    ))
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
pub async fn openapi_json() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        Json(ApiDoc::openapi()),
    )
}

/// Serve Swagger UI from CDN
pub async fn swagger_ui_html() -> Html<&'static str> {
    Html(SWAGGER_UI_HTML)
}

const SWAGGER_UI_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>TelemetryRelay API Documentation</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        html { box-sizing: border-box; overflow-y: scroll; }
        *, *:before, *:after { box-sizing: inherit; }
        body { margin: 0; background: #fafafa; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        window.onload = () => {
            window.ui = SwaggerUIBundle({
                url: "/api/openapi.json",
                dom_id: '#swagger-ui',
                deepLinking: true
            });
        };
    </script>
</body>
</html>"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_documents_ingestion_and_health() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/telemetry/log"));
        assert!(doc.paths.paths.contains_key("/api/v1/health"));

        let schemas = &doc.components.as_ref().unwrap().schemas;
        assert!(schemas.contains_key("TelemetryRecord"));
        assert!(schemas.contains_key("IngestResponse"));
    }
}
