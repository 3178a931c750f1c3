//! Application Insights track API client
//!
//! `track_*` calls only enqueue; a background task batches and delivers the
//! envelopes, so ingestion requests never wait on the network.

mod envelope;
mod sender;

use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};

pub use envelope::Envelope;

use self::sender::{Command, SenderOptions};
use super::{BackendError, ConnectionString, SinkFactory, TelemetrySink};
use crate::core::ShutdownService;
use crate::core::constants::{
    APP_NAME_LOWER, DEFAULT_FLUSH_INTERVAL_MS, DEFAULT_MAX_BATCH_SIZE, DEFAULT_QUEUE_CAPACITY,
    TRACK_REQUEST_TIMEOUT_SECS,
};
use crate::domain::telemetry::PropertySet;

const TAG_CLOUD_ROLE: &str = "ai.cloud.role";
const TAG_SDK_VERSION: &str = "ai.internal.sdkVersion";

/// Queue and batching options for the delivery task
#[derive(Debug, Clone)]
pub struct AppInsightsOptions {
    pub queue_capacity: usize,
    pub max_batch_size: usize,
    pub flush_interval: Duration,
}

impl Default for AppInsightsOptions {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            flush_interval: Duration::from_millis(DEFAULT_FLUSH_INTERVAL_MS),
        }
    }
}

/// Cheaply cloneable handle onto the delivery queue
#[derive(Clone)]
pub struct AppInsightsClient {
    tx: mpsc::Sender<Command>,
    instrumentation_key: Arc<str>,
    tags: Arc<BTreeMap<String, String>>,
    capacity: usize,
}

impl std::fmt::Debug for AppInsightsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppInsightsClient")
            .field("capacity", &self.capacity)
            .field("queued", &(self.capacity - self.tx.capacity()))
            .finish()
    }
}

impl AppInsightsClient {
    /// Build a client and start its delivery task.
    ///
    /// The task is registered with `shutdown`, which drains the queue before
    /// the process exits. Fails with [`BackendError::Closed`] once shutdown
    /// has been triggered.
    pub async fn start(
        connection_string: &ConnectionString,
        options: &AppInsightsOptions,
        shutdown: &ShutdownService,
    ) -> Result<Self, BackendError> {
        // Tasks registered after shutdown began would never be awaited
        if shutdown.is_triggered() {
            return Err(BackendError::Closed);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(TRACK_REQUEST_TIMEOUT_SECS))
            .build()?;

        let capacity = options.queue_capacity.max(1);
        let (tx, rx) = mpsc::channel(capacity);

        let handle = sender::spawn(
            http,
            SenderOptions {
                track_url: connection_string.track_url(),
                max_batch_size: options.max_batch_size.max(1),
                flush_interval: options.flush_interval.max(Duration::from_millis(1)),
            },
            rx,
            shutdown.subscribe(),
        );
        shutdown.register(handle).await;

        tracing::debug!(
            endpoint = connection_string.ingestion_endpoint(),
            capacity,
            "Application Insights client started"
        );

        let mut tags = BTreeMap::new();
        tags.insert(TAG_CLOUD_ROLE.to_string(), APP_NAME_LOWER.to_string());
        tags.insert(
            TAG_SDK_VERSION.to_string(),
            format!("rust:{}:{}", APP_NAME_LOWER, env!("CARGO_PKG_VERSION")),
        );

        Ok(Self {
            tx,
            instrumentation_key: Arc::from(connection_string.instrumentation_key()),
            tags: Arc::new(tags),
            capacity,
        })
    }

    fn enqueue(&self, envelope: Envelope) -> Result<(), BackendError> {
        self.tx
            .try_send(Command::Track(Box::new(envelope)))
            .map_err(|e| match e {
                TrySendError::Full(_) => BackendError::QueueFull {
                    capacity: self.capacity,
                },
                TrySendError::Closed(_) => BackendError::Closed,
            })
    }

    /// Deliver everything queued so far and wait for the request to finish
    pub async fn flush(&self) -> Result<(), BackendError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(Command::Flush(ack_tx))
            .await
            .map_err(|_| BackendError::Closed)?;
        ack_rx.await.map_err(|_| BackendError::Closed)
    }
}

impl TelemetrySink for AppInsightsClient {
    fn track_event(&self, name: &str, properties: &PropertySet) -> Result<(), BackendError> {
        self.enqueue(Envelope::event(
            &self.instrumentation_key,
            &self.tags,
            name,
            properties.to_string_map(),
        ))
    }

    fn track_exception(&self, error: &(dyn StdError + 'static)) -> Result<(), BackendError> {
        self.enqueue(Envelope::exception(
            &self.instrumentation_key,
            &self.tags,
            error,
        ))
    }

    fn backend_name(&self) -> &'static str {
        "appinsights"
    }
}

/// Builds fallback clients from the configured connection string
pub struct AppInsightsFactory {
    options: AppInsightsOptions,
    shutdown: ShutdownService,
}

impl AppInsightsFactory {
    pub fn new(options: AppInsightsOptions, shutdown: ShutdownService) -> Self {
        Self { options, shutdown }
    }
}

#[async_trait]
impl SinkFactory for AppInsightsFactory {
    async fn build(&self, connection_string: &str) -> Result<Arc<dyn TelemetrySink>, BackendError> {
        let parsed: ConnectionString = connection_string.parse()?;
        let client = AppInsightsClient::start(&parsed, &self.options, &self.shutdown).await?;
        Ok(Arc::new(client))
    }
}
