//! Stateful client for a controller's variable space over REST.
//!
//! ## Features
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `http` | ✅ | reqwest-based HTTPS transport |
//!
//! ## Architecture
//!
//! - **PacController**: name-keyed `get`/`set` dispatch, metadata, telemetry
//! - **VariableCache**: bulk-fetched scalar collections and table mirrors
//! - **TableHandle**: write-through access to one table variable
//! - **RemoteChannel**: counts, logs and reports every request
//! - **Transport**: the request seam (`HttpTransport`, `MemoryTransport`)
//!
//! ```rust,ignore
//! use pacvars_client::{ControllerConfig, PacController};
//! use serde_json::json;
//!
//! let config = ControllerConfig::new("10.0.0.5", "kid", "secret");
//! let mut pac = PacController::connect(config).await?;
//!
//! let ready = pac.get("bReady").await?;
//! pac.set("fSetpoint", &json!(72.5)).await?;
//! pac.table("itCounts").await?.set_index(1, &json!(9)).await?;
//! ```

pub mod cache;
pub mod channel;
pub mod config;
pub mod controller;
pub mod error_log;
pub mod memory;
pub mod request_log;
pub mod table;
pub mod transport;

pub use cache::VariableCache;
pub use channel::RemoteChannel;
pub use config::ControllerConfig;
pub use controller::{ControllerId, PacController};
pub use error_log::{ErrorLog, LogConfig, LogFormat, LogSink};
pub use memory::{Call, MemoryTransport};
pub use request_log::{RequestLog, RequestRecord};
pub use table::{Table, TableHandle};
pub use transport::Transport;

#[cfg(feature = "http")]
pub use transport::HttpTransport;

pub use pacvars_core::{Category, ErrorKind, PacError, Result, Value};
