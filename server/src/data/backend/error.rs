//! Telemetry backend error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Invalid connection string: {0}")]
    InvalidConnectionString(String),

    #[error("Telemetry queue is full ({capacity} items)")]
    QueueFull { capacity: usize },

    #[error("Telemetry channel is closed")]
    Closed,

    #[error("Telemetry client construction failed: {0}")]
    Construction(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_connection_string_display() {
        let err = BackendError::InvalidConnectionString("missing InstrumentationKey".into());
        assert_eq!(
            err.to_string(),
            "Invalid connection string: missing InstrumentationKey"
        );
    }

    #[test]
    fn test_queue_full_display() {
        let err = BackendError::QueueFull { capacity: 10 };
        assert_eq!(err.to_string(), "Telemetry queue is full (10 items)");
    }

    #[test]
    fn test_closed_display() {
        assert_eq!(BackendError::Closed.to_string(), "Telemetry channel is closed");
    }

    #[test]
    fn test_serialization_from() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: BackendError = json_err.into();
        assert!(err.to_string().starts_with("Serialization error:"));
    }
}
