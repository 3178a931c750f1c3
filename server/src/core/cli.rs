use clap::Parser;

use std::path::PathBuf;

use crate::domain::telemetry::ExclusionMatch;

use super::constants::{
    ENV_APPINSIGHTS_CONNECTION_STRING, ENV_CONFIG, ENV_CONNECTION_STRING, ENV_EXCLUSION_MATCH,
    ENV_FALLBACK_CLIENT, ENV_HOST, ENV_PORT,
};

#[derive(Parser)]
#[command(name = "telemetry-relay")]
#[command(version, about = "API call telemetry relay", long_about = None)]
pub struct Cli {
    /// Server host address
    #[arg(long, short = 'H', env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', env = ENV_PORT)]
    pub port: Option<u16>,

    /// Path to config file
    #[arg(long, short = 'c', env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Application Insights connection string
    /// (falls back to APPLICATIONINSIGHTS_CONNECTION_STRING)
    #[arg(long, env = ENV_CONNECTION_STRING, hide_env_values = true)]
    pub connection_string: Option<String>,

    /// How endpoints are matched against the ingestion path (contains, prefix or exact)
    #[arg(long, env = ENV_EXCLUSION_MATCH, value_parser = parse_exclusion_match)]
    pub exclusion_match: Option<ExclusionMatch>,

    /// Build a client on first request when none was created at startup
    #[arg(long, env = ENV_FALLBACK_CLIENT)]
    pub fallback_client: Option<bool>,
}

/// Parse exclusion match mode from CLI/env string
fn parse_exclusion_match(s: &str) -> Result<ExclusionMatch, String> {
    match s.to_lowercase().as_str() {
        "contains" => Ok(ExclusionMatch::Contains),
        "prefix" => Ok(ExclusionMatch::Prefix),
        "exact" => Ok(ExclusionMatch::Exact),
        _ => Err(format!(
            "Invalid exclusion match '{}'. Valid options: contains, prefix, exact",
            s
        )),
    }
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
    pub connection_string: Option<String>,
    pub exclusion_match: Option<ExclusionMatch>,
    pub fallback_client: Option<bool>,
}

impl From<Cli> for CliConfig {
    fn from(cli: Cli) -> Self {
        Self {
            host: cli.host,
            port: cli.port,
            config: cli.config,
            connection_string: cli.connection_string,
            exclusion_match: cli.exclusion_match,
            fallback_client: cli.fallback_client,
        }
    }
}

/// Parse CLI arguments
pub fn parse() -> CliConfig {
    let mut config = CliConfig::from(Cli::parse());
    config.connection_string = connection_string_or_fallback(
        config.connection_string.take(),
        std::env::var(ENV_APPINSIGHTS_CONNECTION_STRING).ok(),
    );
    config
}

/// Prefer the explicit connection string, skipping blank values from either source
fn connection_string_or_fallback(
    explicit: Option<String>,
    fallback: Option<String>,
) -> Option<String> {
    explicit
        .filter(|s| !s.trim().is_empty())
        .or_else(|| fallback.filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exclusion_match() {
        assert_eq!(
            parse_exclusion_match("contains").unwrap(),
            ExclusionMatch::Contains
        );
        assert_eq!(
            parse_exclusion_match("PREFIX").unwrap(),
            ExclusionMatch::Prefix
        );
        assert_eq!(parse_exclusion_match("Exact").unwrap(), ExclusionMatch::Exact);

        let err = parse_exclusion_match("regex").unwrap_err();
        assert!(err.contains("contains, prefix, exact"));
    }

    #[test]
    fn test_cli_flags_map_to_config() {
        let cli = Cli::try_parse_from([
            "telemetry-relay",
            "--host",
            "0.0.0.0",
            "-p",
            "9000",
            "--connection-string",
            "InstrumentationKey=abc",
            "--exclusion-match",
            "prefix",
            "--fallback-client",
            "false",
        ])
        .unwrap();
        let config = CliConfig::from(cli);

        assert_eq!(config.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(config.port, Some(9000));
        assert_eq!(
            config.connection_string.as_deref(),
            Some("InstrumentationKey=abc")
        );
        assert_eq!(config.exclusion_match, Some(ExclusionMatch::Prefix));
        assert_eq!(config.fallback_client, Some(false));
        assert!(config.config.is_none());
    }

    #[test]
    fn test_blank_connection_string_uses_fallback() {
        let fallback = Some("InstrumentationKey=env".to_string());

        assert_eq!(
            connection_string_or_fallback(Some(String::new()), fallback.clone()).as_deref(),
            Some("InstrumentationKey=env")
        );
        assert_eq!(
            connection_string_or_fallback(Some("   ".to_string()), fallback.clone()).as_deref(),
            Some("InstrumentationKey=env")
        );
        assert_eq!(
            connection_string_or_fallback(Some("InstrumentationKey=cli".to_string()), fallback)
                .as_deref(),
            Some("InstrumentationKey=cli")
        );
        assert!(connection_string_or_fallback(None, Some(" ".to_string())).is_none());
    }

    #[test]
    fn test_cli_rejects_unknown_exclusion_match() {
        let result = Cli::try_parse_from(["telemetry-relay", "--exclusion-match", "glob"]);
        assert!(result.is_err());
    }
}
