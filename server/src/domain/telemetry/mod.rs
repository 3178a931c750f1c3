//! API-call telemetry relay
//!
//! - `record` - incoming `TelemetryRecord`
//! - `properties` - bounded `PropertySet` forwarded with each event
//! - `exclusion` - keeps the relay from reporting on itself
//! - `ingest` - the ingestion pipeline

mod exclusion;
mod ingest;
mod properties;
mod record;

pub use exclusion::{ExclusionMatch, SelfExclusion};
pub use ingest::{IngestError, IngestHandler, IngestOutcome};
pub use properties::{PropertyKey, PropertySet};
pub use record::TelemetryRecord;
