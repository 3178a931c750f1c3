use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::backend::{AppInsightsOptions, ConnectionString};
use crate::domain::telemetry::ExclusionMatch;
use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_FLUSH_INTERVAL_MS, DEFAULT_HOST,
    DEFAULT_MAX_BATCH_SIZE, DEFAULT_PORT, DEFAULT_QUEUE_CAPACITY,
};

// =============================================================================
// File Config Structs (all optional for merging)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Telemetry backend configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct TelemetryFileConfig {
    pub connection_string: Option<String>,
    pub exclusion_match: Option<ExclusionMatch>,
    pub fallback_client: Option<bool>,
    pub queue_capacity: Option<usize>,
    pub max_batch_size: Option<usize>,
    pub flush_interval_ms: Option<u64>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub telemetry: Option<TelemetryFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                current.host = server.host;
            }
            if server.port.is_some() {
                current.port = server.port;
            }
        }

        if let Some(telemetry) = other.telemetry {
            let current = self
                .telemetry
                .get_or_insert_with(TelemetryFileConfig::default);
            if telemetry.connection_string.is_some() {
                current.connection_string = telemetry.connection_string;
            }
            if telemetry.exclusion_match.is_some() {
                current.exclusion_match = telemetry.exclusion_match;
            }
            if telemetry.fallback_client.is_some() {
                current.fallback_client = telemetry.fallback_client;
            }
            if telemetry.queue_capacity.is_some() {
                current.queue_capacity = telemetry.queue_capacity;
            }
            if telemetry.max_batch_size.is_some() {
                current.max_batch_size = telemetry.max_batch_size;
            }
            if telemetry.flush_interval_ms.is_some() {
                current.flush_interval_ms = telemetry.flush_interval_ms;
            }
        }
    }
}

// =============================================================================
// Runtime Config Structs (final merged configuration)
// =============================================================================

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Telemetry backend configuration
#[derive(Clone)]
pub struct TelemetryConfig {
    /// `None` when unset or blank; the relay then answers "not configured"
    pub connection_string: Option<String>,
    pub exclusion_match: ExclusionMatch,
    /// Build a client on first use when none could be created at startup
    pub fallback_client: bool,
    pub queue_capacity: usize,
    pub max_batch_size: usize,
    pub flush_interval: Duration,
}

impl std::fmt::Debug for TelemetryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryConfig")
            .field("connection_string_configured", &self.connection_string.is_some())
            .field("exclusion_match", &self.exclusion_match)
            .field("fallback_client", &self.fallback_client)
            .field("queue_capacity", &self.queue_capacity)
            .field("max_batch_size", &self.max_batch_size)
            .field("flush_interval", &self.flush_interval)
            .finish()
    }
}

impl TelemetryConfig {
    pub fn appinsights_options(&self) -> AppInsightsOptions {
        AppInsightsOptions {
            queue_capacity: self.queue_capacity,
            max_batch_size: self.max_batch_size,
            flush_interval: self.flush_interval,
        }
    }
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.telemetry-relay/telemetry-relay.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let config = Self::from_sources(cli, file_config);
        config.validate()?;

        tracing::debug!(config = ?config, "Configuration loaded");
        Ok(config)
    }

    /// Layer configs: defaults -> file config -> CLI/env overrides
    fn from_sources(cli: &CliConfig, file_config: FileConfig) -> Self {
        let file_server = file_config.server.unwrap_or_default();
        let file_telemetry = file_config.telemetry.unwrap_or_default();

        let host = cli
            .host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT);

        // Blank values count as absent, wherever they come from
        let connection_string = non_blank(cli.connection_string.clone())
            .or_else(|| non_blank(file_telemetry.connection_string));

        let telemetry = TelemetryConfig {
            connection_string,
            exclusion_match: cli
                .exclusion_match
                .or(file_telemetry.exclusion_match)
                .unwrap_or_default(),
            fallback_client: cli
                .fallback_client
                .or(file_telemetry.fallback_client)
                .unwrap_or(true),
            queue_capacity: file_telemetry
                .queue_capacity
                .unwrap_or(DEFAULT_QUEUE_CAPACITY),
            max_batch_size: file_telemetry
                .max_batch_size
                .unwrap_or(DEFAULT_MAX_BATCH_SIZE),
            flush_interval: Duration::from_millis(
                file_telemetry
                    .flush_interval_ms
                    .unwrap_or(DEFAULT_FLUSH_INTERVAL_MS),
            ),
        };

        Self {
            server: ServerConfig { host, port },
            telemetry,
        }
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }
        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }
        if self.telemetry.queue_capacity == 0 {
            anyhow::bail!("Configuration error: telemetry.queue_capacity must be greater than 0");
        }
        if self.telemetry.max_batch_size == 0 {
            anyhow::bail!("Configuration error: telemetry.max_batch_size must be greater than 0");
        }
        if self.telemetry.flush_interval.is_zero() {
            anyhow::bail!(
                "Configuration error: telemetry.flush_interval_ms must be greater than 0"
            );
        }

        // A bad connection string is reported per request, not at startup
        if let Some(cs) = &self.telemetry.connection_string
            && let Err(e) = ConnectionString::parse(cs)
        {
            tracing::warn!(error = %e, "Telemetry connection string is invalid");
        }

        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Get the profile config path (~/.telemetry-relay/telemetry-relay.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Check if host binds to all network interfaces
pub(crate) fn is_all_interfaces(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::" | "[::]")
}
