// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "TelemetryRelay";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "telemetry_relay";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".telemetry-relay";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "telemetry-relay.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "TELEMETRY_RELAY_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "TELEMETRY_RELAY_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "TELEMETRY_RELAY_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "TELEMETRY_RELAY_LOG";

// =============================================================================
// Environment Variables - Telemetry Backend
// =============================================================================

/// Environment variable for the backend connection string
pub const ENV_CONNECTION_STRING: &str = "TELEMETRY_RELAY_CONNECTION_STRING";

/// Standard Application Insights connection string variable, used as a fallback
pub const ENV_APPINSIGHTS_CONNECTION_STRING: &str = "APPLICATIONINSIGHTS_CONNECTION_STRING";

/// Environment variable for the self-exclusion match mode
pub const ENV_EXCLUSION_MATCH: &str = "TELEMETRY_RELAY_EXCLUSION_MATCH";

/// Environment variable to enable or disable fallback client construction
pub const ENV_FALLBACK_CLIENT: &str = "TELEMETRY_RELAY_FALLBACK_CLIENT";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5080;

/// Body limit for general API requests (1 MB)
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Body limit for the ingestion endpoint (4 MB - request bodies are forwarded up to the property limit)
pub const INGEST_BODY_LIMIT: usize = 4 * 1024 * 1024;

/// Timeout for background tasks during graceful shutdown
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// Ingestion
// =============================================================================

/// Path of the ingestion endpoint
pub const INGEST_PATH: &str = "/api/telemetry/log";

/// Name of the custom event forwarded to the backend
pub const EVENT_NAME: &str = "ApiCallTelemetry";

/// Maximum length (in characters) of a single forwarded property value
pub const MAX_PROPERTY_LENGTH: usize = 8000;

/// Suffix appended to a property value cut to `MAX_PROPERTY_LENGTH`
pub const TRUNCATION_MARKER: &str = "...[truncated]";

// =============================================================================
// Backend Client Defaults
// =============================================================================

/// Ingestion endpoint used when the connection string does not name one
pub const DEFAULT_INGESTION_ENDPOINT: &str = "https://dc.services.visualstudio.com";

/// Track API path appended to the ingestion endpoint
pub const TRACK_API_PATH: &str = "/v2/track";

/// Default capacity of the in-memory envelope queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 10_000;

/// Default maximum number of envelopes per HTTP request
pub const DEFAULT_MAX_BATCH_SIZE: usize = 500;

/// Default interval between scheduled flushes
pub const DEFAULT_FLUSH_INTERVAL_MS: u64 = 5_000;

/// Timeout for a single track request
pub const TRACK_REQUEST_TIMEOUT_SECS: u64 = 30;
