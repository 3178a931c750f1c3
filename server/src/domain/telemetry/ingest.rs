//! Ingestion pipeline: filter, check configuration, acquire client, shape, submit

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use thiserror::Error;

use super::exclusion::SelfExclusion;
use super::properties::PropertySet;
use super::record::TelemetryRecord;
use crate::core::constants::EVENT_NAME;
use crate::data::backend::{BackendError, ClientResolver, TelemetrySink};

/// Non-failure results of one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The record described the ingestion endpoint itself
    Excluded,
    /// No connection string configured
    NotConfigured,
    /// No client injected and fallback construction disabled
    ClientUnavailable { endpoint: String },
    /// Event accepted for delivery
    Logged {
        endpoint: String,
        method: String,
        status_code: i32,
        properties_count: usize,
    },
}

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Failed to acquire telemetry client: {0}")]
    Acquire(#[source] BackendError),

    #[error("Failed to track event: {0}")]
    Track(#[source] BackendError),

    #[error("Ingestion pipeline panicked: {0}")]
    Panicked(String),
}

/// Relays telemetry records to the backend as `ApiCallTelemetry` events.
///
/// Holds no per-request state; share it behind an `Arc`.
pub struct IngestHandler {
    connection_string: Option<String>,
    exclusion: SelfExclusion,
    resolver: ClientResolver,
}

impl IngestHandler {
    pub fn new(
        connection_string: Option<String>,
        exclusion: SelfExclusion,
        resolver: ClientResolver,
    ) -> Self {
        Self {
            connection_string,
            exclusion,
            resolver,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.connection_string.is_some()
    }

    /// Run the pipeline for one record.
    ///
    /// Errors and panics are contained here. When a client was already
    /// acquired the failure is reported to it on a best-effort basis; if that
    /// report fails too, it is only logged.
    pub async fn submit(&self, record: &TelemetryRecord) -> Result<IngestOutcome, IngestError> {
        let mut acquired: Option<Arc<dyn TelemetrySink>> = None;

        let result = AssertUnwindSafe(self.run(record, &mut acquired))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(IngestError::Panicked(panic_message(panic.as_ref()))));

        if let Err(e) = &result {
            tracing::error!(error = %e, endpoint = %record.end_point, "Telemetry ingestion failed");
            if let Some(sink) = &acquired {
                report_failure(sink.as_ref(), e);
            }
        }

        result
    }

    async fn run(
        &self,
        record: &TelemetryRecord,
        acquired: &mut Option<Arc<dyn TelemetrySink>>,
    ) -> Result<IngestOutcome, IngestError> {
        if self.exclusion.is_excluded(&record.end_point) {
            tracing::trace!(endpoint = %record.end_point, "Skipping self-reported telemetry");
            return Ok(IngestOutcome::Excluded);
        }

        let Some(connection_string) = self.connection_string.as_deref() else {
            tracing::debug!("Telemetry backend not configured, dropping record");
            return Ok(IngestOutcome::NotConfigured);
        };

        let Some(sink) = self
            .resolver
            .resolve(connection_string)
            .await
            .map_err(IngestError::Acquire)?
        else {
            tracing::warn!(endpoint = %record.end_point, "Telemetry client not available");
            return Ok(IngestOutcome::ClientUnavailable {
                endpoint: record.end_point.clone(),
            });
        };
        *acquired = Some(Arc::clone(&sink));

        let properties = PropertySet::from_record(record);

        tracing::debug!(
            endpoint = %record.end_point,
            method = %record.method,
            status_code = record.response_status_code,
            user_id = %record.user_id,
            tenant_id = %record.tenant_id,
            "Telemetry received"
        );

        sink.track_event(EVENT_NAME, &properties).map_err(|e| {
            tracing::warn!(error = %e, backend = sink.backend_name(), "TrackEvent failed");
            IngestError::Track(e)
        })?;

        tracing::debug!(
            event = EVENT_NAME,
            properties = properties.len(),
            "Event queued for delivery"
        );

        Ok(IngestOutcome::Logged {
            endpoint: record.end_point.clone(),
            method: record.method.clone(),
            status_code: record.response_status_code,
            properties_count: properties.len(),
        })
    }
}

fn report_failure(sink: &dyn TelemetrySink, error: &IngestError) {
    if let Err(track_err) = sink.track_exception(error) {
        tracing::warn!(
            error = %track_err,
            original = %error,
            "Failed to report ingestion failure to telemetry backend"
        );
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
