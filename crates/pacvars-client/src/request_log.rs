//! Append-only record of issued requests.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// One issued request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestRecord {
    pub method: &'static str,
    pub path: String,
    pub at: DateTime<Utc>,
}

impl fmt::Display for RequestRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Request telemetry owned by a controller. Never read by the engine itself.
#[derive(Debug, Default)]
pub struct RequestLog {
    entries: Vec<RequestRecord>,
}

impl RequestLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, method: &'static str, path: &str) {
        self.entries.push(RequestRecord {
            method,
            path: path.to_string(),
            at: Utc::now(),
        });
    }

    /// Number of requests issued, including failed ones.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[RequestRecord] {
        &self.entries
    }

    /// Human-readable descriptors, oldest first.
    pub fn descriptors(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }
}
