//! Transport seam for controller REST requests.
//!
//! The engine only needs two operations: read a JSON document and post a JSON
//! payload. [`HttpTransport`] implements them over HTTPS with basic
//! credentials; [`crate::memory::MemoryTransport`] implements them in memory.

use async_trait::async_trait;
use pacvars_core::Result;
use serde_json::Value as JsonValue;

#[cfg(feature = "http")]
pub use http::HttpTransport;

/// JSON request transport.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Absolute URL for a path, used in error reports.
    fn url(&self, path: &str) -> String;

    /// GET `path` and decode the body as JSON.
    async fn get(&self, path: &str) -> Result<JsonValue>;

    /// POST `payload` as JSON to `path`.
    async fn post(&self, path: &str, payload: &JsonValue) -> Result<()>;
}

#[cfg(feature = "http")]
mod http {
    use super::Transport;
    use crate::config::ControllerConfig;
    use async_trait::async_trait;
    use pacvars_core::{PacError, Result};
    use reqwest::{Client, RequestBuilder, Response};
    use serde_json::Value as JsonValue;
    use std::time::Duration;

    /// HTTP(S) transport with basic authentication on every request.
    pub struct HttpTransport {
        client: Client,
        base_url: String,
        username: String,
        password: String,
    }

    impl HttpTransport {
        /// Build a transport from controller configuration.
        pub fn new(config: &ControllerConfig) -> Result<Self> {
            let client = Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .danger_accept_invalid_certs(config.accept_invalid_certs)
                .build()
                .map_err(|e| PacError::Transport(format!("Failed to build HTTP client: {}", e)))?;

            Ok(Self {
                client,
                base_url: config.base_url(),
                username: config.username.clone(),
                password: config.password.clone(),
            })
        }

        fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
            request
                .basic_auth(&self.username, Some(&self.password))
                .header("Accept", "application/json")
        }

        fn check(&self, method: &str, url: String, response: Response) -> Result<Response> {
            let status = response.status();
            if status.is_success() {
                Ok(response)
            } else {
                Err(PacError::RemoteError {
                    status: status.as_u16(),
                    method: method.to_string(),
                    url,
                })
            }
        }
    }

    #[async_trait]
    impl Transport for HttpTransport {
        fn url(&self, path: &str) -> String {
            format!("{}{}", self.base_url, path)
        }

        async fn get(&self, path: &str) -> Result<JsonValue> {
            let url = self.url(path);
            let response = self
                .authorize(self.client.get(&url))
                .send()
                .await
                .map_err(|e| PacError::Transport(format!("GET {} failed: {}", url, e)))?;
            let response = self.check("GET", url.clone(), response)?;
            response
                .json()
                .await
                .map_err(|e| PacError::Decode(format!("GET {}: {}", url, e)))
        }

        async fn post(&self, path: &str, payload: &JsonValue) -> Result<()> {
            let url = self.url(path);
            let response = self
                .authorize(self.client.post(&url))
                .json(payload)
                .send()
                .await
                .map_err(|e| PacError::Transport(format!("POST {} failed: {}", url, e)))?;
            self.check("POST", url, response).map(|_| ())
        }
    }

}
