//! Track API wire models

use std::collections::BTreeMap;
use std::error::Error as StdError;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

const EVENT_ENVELOPE_NAME: &str = "Microsoft.ApplicationInsights.Event";
const EXCEPTION_ENVELOPE_NAME: &str = "Microsoft.ApplicationInsights.Exception";

/// Backend limit on event names
const MAX_EVENT_NAME_LEN: usize = 512;

/// Backend limit on exception messages
const MAX_EXCEPTION_MESSAGE_LEN: usize = 32_768;

/// Error severity level
const SEVERITY_ERROR: i32 = 3;

/// Deepest `source()` chain recorded per exception
const MAX_EXCEPTION_CHAIN: usize = 10;

/// One telemetry item as accepted by the track API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Type name of the telemetry item
    pub name: &'static str,
    /// UTC ISO 8601 creation time with trailing `Z`
    pub time: String,
    pub i_key: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    pub data: Data,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Data {
    pub base_type: &'static str,
    pub base_data: BaseData,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum BaseData {
    Event(EventData),
    Exception(ExceptionData),
}

/// Custom event with string properties
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventData {
    pub ver: i32,
    pub name: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionData {
    pub ver: i32,
    pub exceptions: Vec<ExceptionDetails>,
    pub severity_level: i32,
}

/// One link of an error chain; `outer_id` points at the wrapping error
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionDetails {
    pub id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outer_id: Option<i32>,
    pub type_name: String,
    pub message: String,
    pub has_full_stack: bool,
}

impl Envelope {
    pub fn event(
        i_key: &str,
        tags: &BTreeMap<String, String>,
        name: &str,
        properties: BTreeMap<String, String>,
    ) -> Self {
        Self {
            name: EVENT_ENVELOPE_NAME,
            time: now(),
            i_key: i_key.to_string(),
            tags: tags.clone(),
            data: Data {
                base_type: "EventData",
                base_data: BaseData::Event(EventData {
                    ver: 2,
                    name: name.chars().take(MAX_EVENT_NAME_LEN).collect(),
                    properties,
                }),
            },
        }
    }

    pub fn exception(
        i_key: &str,
        tags: &BTreeMap<String, String>,
        error: &(dyn StdError + 'static),
    ) -> Self {
        Self {
            name: EXCEPTION_ENVELOPE_NAME,
            time: now(),
            i_key: i_key.to_string(),
            tags: tags.clone(),
            data: Data {
                base_type: "ExceptionData",
                base_data: BaseData::Exception(ExceptionData {
                    ver: 2,
                    exceptions: exception_chain(error),
                    severity_level: SEVERITY_ERROR,
                }),
            },
        }
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn exception_chain(error: &(dyn StdError + 'static)) -> Vec<ExceptionDetails> {
    let mut details = Vec::new();
    let mut current = Some(error);
    let mut id = 0;

    while let Some(err) = current {
        if details.len() >= MAX_EXCEPTION_CHAIN {
            break;
        }
        details.push(ExceptionDetails {
            id,
            outer_id: (id > 0).then(|| id - 1),
            type_name: type_name_of(err),
            message: err.to_string().chars().take(MAX_EXCEPTION_MESSAGE_LEN).collect(),
            has_full_stack: false,
        });
        id += 1;
        current = err.source();
    }

    details
}

/// Debug output's leading identifier, e.g. `Http` for `Http(..)`
fn type_name_of(err: &dyn StdError) -> String {
    let debug = format!("{:?}", err);
    let name: String = debug
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == ':')
        .collect();
    if name.is_empty() {
        "Error".to_string()
    } else {
        name
    }
}
