//! Self-exclusion: the relay never forwards telemetry about its own endpoint

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a reported endpoint is compared against the ingestion path
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExclusionMatch {
    /// Ingestion path appears anywhere in the endpoint (also catches proxied or suffixed paths)
    #[default]
    Contains,
    /// Endpoint path starts with the ingestion path at a segment boundary
    Prefix,
    /// Endpoint path equals the ingestion path (query string and trailing slash ignored)
    Exact,
}

impl fmt::Display for ExclusionMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionMatch::Contains => write!(f, "contains"),
            ExclusionMatch::Prefix => write!(f, "prefix"),
            ExclusionMatch::Exact => write!(f, "exact"),
        }
    }
}

/// Decides whether a reported endpoint refers to the relay itself
#[derive(Debug, Clone)]
pub struct SelfExclusion {
    /// Lowercased ingestion path without the leading slash
    path: String,
    mode: ExclusionMatch,
}

impl SelfExclusion {
    pub fn new(ingest_path: &str, mode: ExclusionMatch) -> Self {
        Self {
            path: ingest_path.trim_start_matches('/').to_lowercase(),
            mode,
        }
    }

    pub fn mode(&self) -> ExclusionMatch {
        self.mode
    }

    /// Case-insensitive check of `endpoint` against the ingestion path
    pub fn is_excluded(&self, endpoint: &str) -> bool {
        if self.path.is_empty() {
            return false;
        }
        let endpoint = endpoint.trim().to_lowercase();

        match self.mode {
            ExclusionMatch::Contains => endpoint.contains(&self.path),
            ExclusionMatch::Prefix => {
                let path = request_path(&endpoint);
                path.strip_prefix(self.path.as_str())
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with(['/', '?', '#']))
            }
            ExclusionMatch::Exact => {
                let path = request_path(&endpoint);
                let path = path.split(['?', '#']).next().unwrap_or_default();
                path.trim_end_matches('/') == self.path
            }
        }
    }
}

/// Path part of an endpoint, without scheme, authority or leading slash
fn request_path(endpoint: &str) -> &str {
    let without_scheme = endpoint
        .strip_prefix("https://")
        .or_else(|| endpoint.strip_prefix("http://"));
    let path = match without_scheme {
        Some(rest) => rest.find('/').map_or("", |i| &rest[i..]),
        None => endpoint,
    };
    path.trim_start_matches('/')
}
