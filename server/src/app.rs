//! Core application

use std::sync::Arc;

use anyhow::Result;

use crate::api::ApiServer;
use crate::core::banner;
use crate::core::cli::{self, CliConfig};
use crate::core::config::{AppConfig, TelemetryConfig};
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG, INGEST_PATH};
use crate::core::shutdown::ShutdownService;
use crate::data::backend::{
    AppInsightsClient, AppInsightsFactory, ClientResolver, ConnectionString, SinkFactory,
    TelemetrySink,
};
use crate::domain::telemetry::{IngestHandler, SelfExclusion};

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub ingest: Arc<IngestHandler>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let cli_config = cli::parse();
        let app = Self::init(&cli_config).await?;
        Self::start_server(app).await
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;
        let shutdown = ShutdownService::new();

        let ingest = Arc::new(Self::init_ingest(&config.telemetry, &shutdown).await);

        Ok(Self {
            shutdown,
            config,
            ingest,
        })
    }

    /// Wire the ingestion handler to its backend.
    ///
    /// A client is started eagerly when the connection string parses. When it
    /// does not, or startup fails, requests fall back to on-demand
    /// construction (if enabled), which reports the failure per request.
    async fn init_ingest(telemetry: &TelemetryConfig, shutdown: &ShutdownService) -> IngestHandler {
        let options = telemetry.appinsights_options();

        let injected: Option<Arc<dyn TelemetrySink>> = match telemetry
            .connection_string
            .as_deref()
            .map(ConnectionString::parse)
        {
            Some(Ok(parsed)) => match AppInsightsClient::start(&parsed, &options, shutdown).await {
                Ok(client) => Some(Arc::new(client) as Arc<dyn TelemetrySink>),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to start telemetry client");
                    None
                }
            },
            // Already reported during config validation
            Some(Err(_)) => None,
            None => {
                tracing::info!("Application Insights connection string not configured");
                None
            }
        };

        let factory: Option<Arc<dyn SinkFactory>> = if telemetry.fallback_client {
            Some(Arc::new(AppInsightsFactory::new(options, shutdown.clone())) as Arc<dyn SinkFactory>)
        } else {
            None
        };

        let exclusion = SelfExclusion::new(INGEST_PATH, telemetry.exclusion_match);
        tracing::debug!(
            path = INGEST_PATH,
            mode = %exclusion.mode(),
            fallback_client = telemetry.fallback_client,
            "Ingestion handler ready"
        );

        IngestHandler::new(
            telemetry.connection_string.clone(),
            exclusion,
            ClientResolver::new(injected, factory),
        )
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        banner::print_banner(
            &app.config.server.host,
            app.config.server.port,
            app.ingest.is_configured(),
            app.config.telemetry.fallback_client,
        );

        let server = ApiServer::new(app);
        let app = server.start().await?;
        app.shutdown.shutdown().await;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::telemetry::{ExclusionMatch, IngestOutcome, TelemetryRecord};
    use std::time::Duration;

    fn telemetry_config(connection_string: Option<&str>, fallback_client: bool) -> TelemetryConfig {
        TelemetryConfig {
            connection_string: connection_string.map(str::to_string),
            exclusion_match: ExclusionMatch::Contains,
            fallback_client,
            queue_capacity: 16,
            max_batch_size: 10,
            flush_interval: Duration::from_secs(3600),
        }
    }

    fn record() -> TelemetryRecord {
        TelemetryRecord {
            method: "GET".to_string(),
            end_point: "/api/orders".to_string(),
            response_status_code: 200,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_valid_connection_string_starts_client() {
        let shutdown = ShutdownService::new();
        let handler = CoreApp::init_ingest(
            &telemetry_config(
                Some("InstrumentationKey=abc;IngestionEndpoint=http://127.0.0.1:9"),
                false,
            ),
            &shutdown,
        )
        .await;

        assert!(handler.is_configured());
        let outcome = handler.submit(&record()).await.unwrap();
        assert!(matches!(outcome, IngestOutcome::Logged { .. }));

        shutdown.shutdown().await;
    }

    #[tokio::test]
    async fn test_invalid_connection_string_fails_per_request() {
        let shutdown = ShutdownService::new();
        let handler =
            CoreApp::init_ingest(&telemetry_config(Some("garbage"), true), &shutdown).await;

        assert!(handler.is_configured());
        assert!(handler.submit(&record()).await.is_err());
    }

    #[tokio::test]
    async fn test_invalid_connection_string_without_fallback_is_unavailable() {
        let shutdown = ShutdownService::new();
        let handler =
            CoreApp::init_ingest(&telemetry_config(Some("garbage"), false), &shutdown).await;

        let outcome = handler.submit(&record()).await.unwrap();
        assert_eq!(
            outcome,
            IngestOutcome::ClientUnavailable {
                endpoint: "/api/orders".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_missing_connection_string_is_not_configured() {
        let shutdown = ShutdownService::new();
        let handler = CoreApp::init_ingest(&telemetry_config(None, true), &shutdown).await;

        assert!(!handler.is_configured());
        assert_eq!(
            handler.submit(&record()).await.unwrap(),
            IngestOutcome::NotConfigured
        );
    }
}
