//! Telemetry ingestion API types

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::telemetry::IngestOutcome;

const MSG_EXCLUDED: &str = "Telemetry endpoint excluded from logging";
const MSG_NOT_CONFIGURED: &str = "Application Insights connection string not configured";
const MSG_CLIENT_UNAVAILABLE: &str = "Telemetry client not available";
const MSG_LOGGED: &str = "Telemetry logged successfully";

/// Response body for a handled telemetry record
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngestResponse {
    pub success: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_string_configured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties_count: Option<usize>,
}

impl IngestResponse {
    fn message(success: bool, message: &'static str) -> Self {
        Self {
            success,
            message,
            endpoint: None,
            method: None,
            status_code: None,
            connection_string_configured: None,
            properties_count: None,
        }
    }

    pub fn from_outcome(outcome: IngestOutcome, connection_string_configured: bool) -> Self {
        match outcome {
            IngestOutcome::Excluded => Self::message(true, MSG_EXCLUDED),
            IngestOutcome::NotConfigured => Self::message(false, MSG_NOT_CONFIGURED),
            IngestOutcome::ClientUnavailable { endpoint } => Self {
                endpoint: Some(endpoint),
                ..Self::message(false, MSG_CLIENT_UNAVAILABLE)
            },
            IngestOutcome::Logged {
                endpoint,
                method,
                status_code,
                properties_count,
            } => Self {
                endpoint: Some(endpoint),
                method: Some(method),
                status_code: Some(status_code),
                connection_string_configured: Some(connection_string_configured),
                properties_count: Some(properties_count),
                ..Self::message(true, MSG_LOGGED)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_excluded_response_has_only_success_and_message() {
        let response = IngestResponse::from_outcome(IngestOutcome::Excluded, true);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "success": true,
                "message": "Telemetry endpoint excluded from logging"
            })
        );
    }

    #[test]
    fn test_not_configured_response() {
        let response = IngestResponse::from_outcome(IngestOutcome::NotConfigured, false);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "success": false,
                "message": "Application Insights connection string not configured"
            })
        );
    }

    #[test]
    fn test_client_unavailable_response_names_endpoint() {
        let response = IngestResponse::from_outcome(
            IngestOutcome::ClientUnavailable {
                endpoint: "/api/orders".to_string(),
            },
            true,
        );
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "success": false,
                "message": "Telemetry client not available",
                "endpoint": "/api/orders"
            })
        );
    }

    #[test]
    fn test_logged_response_uses_camel_case_diagnostics() {
        let response = IngestResponse::from_outcome(
            IngestOutcome::Logged {
                endpoint: "/api/orders".to_string(),
                method: "POST".to_string(),
                status_code: 201,
                properties_count: 8,
            },
            true,
        );
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "success": true,
                "message": "Telemetry logged successfully",
                "endpoint": "/api/orders",
                "method": "POST",
                "statusCode": 201,
                "connectionStringConfigured": true,
                "propertiesCount": 8
            })
        );
    }
}
