//! Incoming API-call telemetry record

use std::fmt;

use serde::de::value::MapAccessDeserializer;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use utoipa::ToSchema;

/// One caller-submitted description of an API call.
///
/// Every field is optional on the wire. Missing strings and JSON `null`
/// become empty strings; a missing status code becomes `0`. Only a JSON
/// object is accepted, never a positional array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(remote = "Self", rename_all = "camelCase", default)]
pub struct TelemetryRecord {
    #[serde(deserialize_with = "null_as_empty")]
    pub method: String,
    #[serde(alias = "endpoint", deserialize_with = "null_as_empty")]
    pub end_point: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub request_body: String,
    /// Opaque credential, forwarded verbatim
    #[serde(deserialize_with = "null_as_empty")]
    pub token: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub response_time: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub request_time: String,
    pub response_status_code: i32,
    #[serde(deserialize_with = "null_as_empty")]
    pub user_id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub tenant_id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub error_message: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub error_code: String,
}

impl<'de> Deserialize<'de> for TelemetryRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(RecordVisitor)
    }
}

struct RecordVisitor;

impl<'de> Visitor<'de> for RecordVisitor {
    type Value = TelemetryRecord;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a JSON object")
    }

    fn visit_map<A>(self, map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        TelemetryRecord::deserialize(MapAccessDeserializer::new(map))
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
