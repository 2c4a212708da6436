//! Remote channel: transport plus request telemetry and error reporting.

use pacvars_core::Result;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::debug;

use crate::error_log::ErrorLog;
use crate::request_log::RequestLog;
use crate::transport::Transport;

/// Every request goes through here, so each one is counted and logged exactly
/// once. Failures are returned to the caller unchanged; there is no retry.
pub struct RemoteChannel {
    transport: Arc<dyn Transport>,
    log: RequestLog,
    errors: ErrorLog,
}

impl RemoteChannel {
    pub fn new(transport: Arc<dyn Transport>, errors: ErrorLog) -> Self {
        Self {
            transport,
            log: RequestLog::new(),
            errors,
        }
    }

    pub async fn get_json(&mut self, path: &str) -> Result<JsonValue> {
        self.log.record("GET", path);
        debug!(path, "GET");
        let result = self.transport.get(path).await;
        if let Err(e) = &result {
            self.errors.report(e);
        }
        result
    }

    pub async fn post_json(&mut self, path: &str, payload: &JsonValue) -> Result<()> {
        self.log.record("POST", path);
        debug!(path, payload = %payload, "POST");
        let result = self.transport.post(path, payload).await;
        if let Err(e) = &result {
            self.errors.report(e);
        }
        result
    }

    pub fn url(&self, path: &str) -> String {
        self.transport.url(path)
    }

    pub fn log(&self) -> &RequestLog {
        &self.log
    }
}
