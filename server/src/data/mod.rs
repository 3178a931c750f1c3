//! Data layer
//!
//! - `backend` - telemetry backends that receive forwarded events

pub mod backend;
