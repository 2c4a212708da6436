//! Controller connection configuration.
//!
//! ```toml
//! host = "10.0.0.5"
//! username = "kid"
//! password = "secret"
//! accept_invalid_certs = true
//! eager_load = true
//!
//! [prefixes]
//! n = "Integer"
//!
//! [log]
//! sink = "file:/var/log/pac-errors.csv"
//! format = "csv"
//! ```

use pacvars_core::{Category, EndpointTable, PacError, PrefixTable, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error_log::LogConfig;

/// Environment variable names
pub mod env_vars {
    pub const HOST: &str = "PACVARS_HOST";
    pub const USERNAME: &str = "PACVARS_USERNAME";
    pub const PASSWORD: &str = "PACVARS_PASSWORD";
}

/// Connection and engine configuration for one controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Host name or address of the controller
    #[serde(default)]
    pub host: String,
    /// API key id, sent as the basic-auth user
    #[serde(default)]
    pub username: String,
    /// API key value, sent as the basic-auth password
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_scheme")]
    pub scheme: String,
    pub port: Option<u16>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Accept self-signed controller certificates
    #[serde(default)]
    pub accept_invalid_certs: bool,
    /// Read device and strategy metadata on connect
    #[serde(default)]
    pub eager_load: bool,
    /// Prefix overrides applied on top of the defaults
    #[serde(default)]
    pub prefixes: BTreeMap<String, Category>,
    /// Endpoint table override
    pub endpoints: Option<EndpointTable>,
    #[serde(default)]
    pub log: LogConfig,
}

fn default_scheme() -> String {
    "https".to_string()
}

fn default_timeout() -> u64 {
    10
}

impl ControllerConfig {
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password: password.into(),
            scheme: default_scheme(),
            port: None,
            timeout_secs: default_timeout(),
            accept_invalid_certs: false,
            eager_load: false,
            prefixes: BTreeMap::new(),
            endpoints: None,
            log: LogConfig::default(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn with_eager_load(mut self, eager: bool) -> Self {
        self.eager_load = eager;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>, category: Category) -> Self {
        self.prefixes.insert(prefix.into(), category);
        self
    }

    pub fn with_endpoints(mut self, endpoints: EndpointTable) -> Self {
        self.endpoints = Some(endpoints);
        self
    }

    pub fn with_log(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    /// Parse a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| PacError::Config(e.to_string()))
    }

    /// Load a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| PacError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// Override connection parameters from `PACVARS_*` environment variables.
    pub fn apply_env(mut self) -> Self {
        if let Ok(host) = std::env::var(env_vars::HOST) {
            self.host = host;
        }
        if let Ok(username) = std::env::var(env_vars::USERNAME) {
            self.username = username;
        }
        if let Ok(password) = std::env::var(env_vars::PASSWORD) {
            self.password = password;
        }
        self
    }

    /// Reject blank connection parameters.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("host", &self.host),
            ("username", &self.username),
            ("password", &self.password),
        ] {
            if value.trim().is_empty() {
                return Err(PacError::BlankParameter(field.to_string()));
            }
        }
        Ok(())
    }

    pub fn base_url(&self) -> String {
        match self.port {
            Some(port) => format!("{}://{}:{}", self.scheme, self.host, port),
            None => format!("{}://{}", self.scheme, self.host),
        }
    }

    /// Default prefixes with this configuration's overrides applied.
    pub fn prefix_table(&self) -> Result<PrefixTable> {
        PrefixTable::default().merged(&self.prefixes)
    }

    pub fn endpoint_table(&self) -> EndpointTable {
        self.endpoints.clone().unwrap_or_default()
    }
}
