//! Application Insights connection string parsing

use std::fmt;
use std::str::FromStr;

use super::error::BackendError;
use crate::core::constants::{DEFAULT_INGESTION_ENDPOINT, TRACK_API_PATH};

const KEY_INSTRUMENTATION_KEY: &str = "instrumentationkey";
const KEY_INGESTION_ENDPOINT: &str = "ingestionendpoint";

/// Parsed `Key=Value;Key=Value` connection string.
///
/// Keys are case-insensitive. `InstrumentationKey` is required,
/// `IngestionEndpoint` defaults to the public ingestion host. Other keys
/// (`LiveEndpoint`, `ApplicationId`, ...) are accepted and ignored.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionString {
    instrumentation_key: String,
    ingestion_endpoint: String,
}

impl ConnectionString {
    pub fn parse(raw: &str) -> Result<Self, BackendError> {
        let mut instrumentation_key = None;
        let mut ingestion_endpoint = None;

        for segment in raw.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            let (key, value) = segment.split_once('=').ok_or_else(|| {
                BackendError::InvalidConnectionString(format!(
                    "segment '{}' is not a key=value pair",
                    segment
                ))
            })?;
            let value = value.trim();

            match key.trim().to_lowercase().as_str() {
                KEY_INSTRUMENTATION_KEY if !value.is_empty() => {
                    instrumentation_key = Some(value.to_string());
                }
                KEY_INGESTION_ENDPOINT if !value.is_empty() => {
                    ingestion_endpoint = Some(value.trim_end_matches('/').to_string());
                }
                _ => {}
            }
        }

        let instrumentation_key = instrumentation_key.ok_or_else(|| {
            BackendError::InvalidConnectionString("missing InstrumentationKey".to_string())
        })?;

        let ingestion_endpoint =
            ingestion_endpoint.unwrap_or_else(|| DEFAULT_INGESTION_ENDPOINT.to_string());
        if !ingestion_endpoint.starts_with("http://") && !ingestion_endpoint.starts_with("https://")
        {
            return Err(BackendError::InvalidConnectionString(format!(
                "IngestionEndpoint '{}' must be an http(s) URL",
                ingestion_endpoint
            )));
        }

        Ok(Self {
            instrumentation_key,
            ingestion_endpoint,
        })
    }

    pub fn instrumentation_key(&self) -> &str {
        &self.instrumentation_key
    }

    pub fn ingestion_endpoint(&self) -> &str {
        &self.ingestion_endpoint
    }

    /// Full URL of the track API
    pub fn track_url(&self) -> String {
        format!("{}{}", self.ingestion_endpoint, TRACK_API_PATH)
    }
}

impl FromStr for ConnectionString {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// Keep the instrumentation key out of logs
impl fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let visible: String = self.instrumentation_key.chars().take(8).collect();
        f.debug_struct("ConnectionString")
            .field("instrumentation_key", &format!("{}***", visible))
            .field("ingestion_endpoint", &self.ingestion_endpoint)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IKEY: &str = "00000000-1111-2222-3333-444444444444";

    #[test]
    fn test_parse_full() {
        let raw = format!(
            "InstrumentationKey={};IngestionEndpoint=https://westeurope-5.in.applicationinsights.azure.com/;LiveEndpoint=https://westeurope.livediagnostics.monitor.azure.com/",
            IKEY
        );
        let cs = ConnectionString::parse(&raw).unwrap();

        assert_eq!(cs.instrumentation_key(), IKEY);
        assert_eq!(
            cs.ingestion_endpoint(),
            "https://westeurope-5.in.applicationinsights.azure.com"
        );
        assert_eq!(
            cs.track_url(),
            "https://westeurope-5.in.applicationinsights.azure.com/v2/track"
        );
    }

    #[test]
    fn test_parse_key_only_uses_default_endpoint() {
        let cs = ConnectionString::parse(&format!("InstrumentationKey={}", IKEY)).unwrap();
        assert_eq!(cs.ingestion_endpoint(), DEFAULT_INGESTION_ENDPOINT);
    }

    #[test]
    fn test_parse_case_insensitive_keys_any_order() {
        let raw = format!(
            " ingestionendpoint = http://localhost:9000 ; INSTRUMENTATIONKEY = {} ; ",
            IKEY
        );
        let cs = ConnectionString::parse(&raw).unwrap();
        assert_eq!(cs.instrumentation_key(), IKEY);
        assert_eq!(cs.ingestion_endpoint(), "http://localhost:9000");
    }

    #[test]
    fn test_parse_missing_key_rejected() {
        let err = ConnectionString::parse("IngestionEndpoint=https://example.com").unwrap_err();
        assert!(matches!(err, BackendError::InvalidConnectionString(_)));
    }

    #[test]
    fn test_parse_empty_key_rejected() {
        assert!(ConnectionString::parse("InstrumentationKey=").is_err());
        assert!(ConnectionString::parse("").is_err());
    }

    #[test]
    fn test_parse_malformed_segment_rejected() {
        let err = ConnectionString::parse("not-a-connection-string").unwrap_err();
        assert!(err.to_string().contains("not a key=value pair"));
    }

    #[test]
    fn test_parse_non_http_endpoint_rejected() {
        let raw = format!("InstrumentationKey={};IngestionEndpoint=ftp://x", IKEY);
        assert!(ConnectionString::parse(&raw).is_err());
    }

    #[test]
    fn test_from_str() {
        let cs: ConnectionString = format!("InstrumentationKey={}", IKEY).parse().unwrap();
        assert_eq!(cs.instrumentation_key(), IKEY);
    }

    #[test]
    fn test_debug_masks_key() {
        let cs = ConnectionString::parse(&format!("InstrumentationKey={}", IKEY)).unwrap();
        let debug = format!("{:?}", cs);
        assert!(debug.contains("00000000***"));
        assert!(!debug.contains(IKEY));
    }
}
