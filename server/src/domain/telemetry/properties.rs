//! Bounded property set attached to a forwarded event

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::record::TelemetryRecord;
use crate::core::constants::{MAX_PROPERTY_LENGTH, TRUNCATION_MARKER};
use crate::utils::string::{truncate_at_limit_with_marker, truncate_with_marker};

/// Fixed vocabulary of forwarded property names
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PropertyKey {
    Method,
    Endpoint,
    RequestTime,
    ResponseTime,
    StatusCode,
    UserId,
    TenantId,
    Token,
    ErrorMessage,
    ErrorCode,
    RequestBody,
}

impl PropertyKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Method => "Method",
            Self::Endpoint => "Endpoint",
            Self::RequestTime => "RequestTime",
            Self::ResponseTime => "ResponseTime",
            Self::StatusCode => "StatusCode",
            Self::UserId => "UserId",
            Self::TenantId => "TenantId",
            Self::Token => "Token",
            Self::ErrorMessage => "ErrorMessage",
            Self::ErrorCode => "ErrorCode",
            Self::RequestBody => "RequestBody",
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PropertyKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Property name to string value mapping for one event.
///
/// Values are capped at `MAX_PROPERTY_LENGTH` characters; longer values are
/// cut and suffixed with `TRUNCATION_MARKER`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PropertySet {
    values: BTreeMap<PropertyKey, String>,
}

impl PropertySet {
    /// Shape a record into its forwarded property set.
    ///
    /// The eight base keys are always present. `ErrorMessage`, `ErrorCode`
    /// and `RequestBody` only appear when the source field is non-empty.
    pub fn from_record(record: &TelemetryRecord) -> Self {
        let mut set = Self::default();

        set.insert(PropertyKey::Method, &record.method);
        set.insert(PropertyKey::Endpoint, &record.end_point);
        set.insert(PropertyKey::RequestTime, &record.request_time);
        set.insert(PropertyKey::ResponseTime, &record.response_time);
        set.insert(
            PropertyKey::StatusCode,
            &record.response_status_code.to_string(),
        );
        set.insert(PropertyKey::UserId, &record.user_id);
        set.insert(PropertyKey::TenantId, &record.tenant_id);
        set.insert(PropertyKey::Token, &record.token);

        if !record.error_message.is_empty() {
            set.insert(PropertyKey::ErrorMessage, &record.error_message);
        }
        if !record.error_code.is_empty() {
            set.insert(PropertyKey::ErrorCode, &record.error_code);
        }
        // Bodies of exactly the limit are marked too
        if !record.request_body.is_empty() {
            set.values.insert(
                PropertyKey::RequestBody,
                truncate_at_limit_with_marker(
                    &record.request_body,
                    MAX_PROPERTY_LENGTH,
                    TRUNCATION_MARKER,
                ),
            );
        }

        set
    }

    fn insert(&mut self, key: PropertyKey, value: &str) {
        self.values.insert(
            key,
            truncate_with_marker(value, MAX_PROPERTY_LENGTH, TRUNCATION_MARKER),
        );
    }

    pub fn get(&self, key: PropertyKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }

    pub fn contains(&self, key: PropertyKey) -> bool {
        self.values.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PropertyKey, &str)> {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Owned string-keyed copy for wire serialization
    pub fn to_string_map(&self) -> BTreeMap<String, String> {
        self.iter()
            .map(|(k, v)| (k.as_str().to_string(), v.to_string()))
            .collect()
    }
}
