//! Telemetry backend collaborators
//!
//! - `TelemetrySink` - event submission interface consumed by the ingestion handler
//! - `SinkFactory` - builds a sink from a connection string
//! - `ClientResolver` - injected sink first, cached fallback second
//! - `appinsights` - Application Insights track API implementation

pub mod appinsights;
mod connection_string;
mod error;
#[cfg(test)]
pub(crate) mod mock;
mod resolver;

use std::error::Error as StdError;
use std::sync::Arc;

use async_trait::async_trait;

pub use appinsights::{AppInsightsClient, AppInsightsFactory, AppInsightsOptions};
pub use connection_string::ConnectionString;
pub use error::BackendError;
pub use resolver::ClientResolver;

use crate::domain::telemetry::PropertySet;

/// Event submission interface.
///
/// Implementations must be safe for concurrent use. Both calls are
/// fire-and-forget: they return once the item is accepted for delivery,
/// not once the backend has stored it.
pub trait TelemetrySink: Send + Sync {
    /// Submit a named custom event
    fn track_event(&self, name: &str, properties: &PropertySet) -> Result<(), BackendError>;

    /// Report an error, including its `source()` chain
    fn track_exception(&self, error: &(dyn StdError + 'static)) -> Result<(), BackendError>;

    /// Backend name for debugging/logging
    fn backend_name(&self) -> &'static str;
}

/// Builds a sink when none was injected at startup
#[async_trait]
pub trait SinkFactory: Send + Sync {
    async fn build(&self, connection_string: &str) -> Result<Arc<dyn TelemetrySink>, BackendError>;
}
