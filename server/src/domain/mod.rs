//! Domain logic

pub mod telemetry;
