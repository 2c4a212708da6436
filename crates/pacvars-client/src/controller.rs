//! Controller front end.
//!
//! [`PacController`] owns the cache and the remote channel and dispatches
//! name-keyed `get`/`set` calls:
//!
//! ```text
//! name ──▶ PrefixTable ──▶ Category ──┬─▶ scalar: VariableCache ──▶ RemoteChannel
//!                                     └─▶ table:  TableHandle   ──▶ RemoteChannel
//! ```
//!
//! Every call awaits at most one request. Mutating calls take `&mut self`, so
//! one controller serves one caller at a time; wrap it in a lock to share it.

use pacvars_core::value::{decode_table, encode};
use pacvars_core::{
    conform, validate, Category, EndpointTable, PacError, PrefixTable, Result, Value,
};
use serde_json::{json, Value as JsonValue};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::cache::VariableCache;
use crate::channel::RemoteChannel;
use crate::config::ControllerConfig;
use crate::error_log::ErrorLog;
use crate::request_log::RequestRecord;
use crate::table::{Table, TableHandle};
use crate::transport::Transport;

/// Identity of one controller instance; stamped on the tables it creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControllerId(Uuid);

impl ControllerId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ControllerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stateful client for one controller's variable space.
pub struct PacController {
    id: ControllerId,
    config: ControllerConfig,
    prefixes: Arc<PrefixTable>,
    endpoints: Arc<EndpointTable>,
    channel: RemoteChannel,
    cache: VariableCache,
    device: Option<JsonValue>,
    strategy: Option<JsonValue>,
}

impl PacController {
    /// Create a controller over HTTPS. No request is made.
    #[cfg(feature = "http")]
    pub fn new(config: ControllerConfig) -> Result<Self> {
        config.validate()?;
        let transport = crate::transport::HttpTransport::new(&config)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a controller over an arbitrary transport. No request is made.
    pub fn with_transport(config: ControllerConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        let prefixes = Arc::new(config.prefix_table()?);
        let endpoints = Arc::new(config.endpoint_table());
        let channel = RemoteChannel::new(transport, ErrorLog::new(config.log.clone()));
        let cache = VariableCache::new(Arc::clone(&prefixes), Arc::clone(&endpoints));

        Ok(Self {
            id: ControllerId::new(),
            config,
            prefixes,
            endpoints,
            channel,
            cache,
            device: None,
            strategy: None,
        })
    }

    /// Create a controller over HTTPS, loading metadata if `eager_load` is set.
    #[cfg(feature = "http")]
    pub async fn connect(config: ControllerConfig) -> Result<Self> {
        let mut controller = Self::new(config)?;
        controller.eager_load().await?;
        Ok(controller)
    }

    /// Like [`PacController::connect`] over an arbitrary transport.
    pub async fn connect_with(
        config: ControllerConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        let mut controller = Self::with_transport(config, transport)?;
        controller.eager_load().await?;
        Ok(controller)
    }

    async fn eager_load(&mut self) -> Result<()> {
        if !self.config.eager_load {
            return Ok(());
        }
        self.device = Some(self.device_info().await?);
        self.strategy = Some(self.strategy_info().await?);
        info!(host = %self.config.host, "Controller metadata loaded");
        Ok(())
    }

    pub fn id(&self) -> ControllerId {
        self.id
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn prefixes(&self) -> &PrefixTable {
        &self.prefixes
    }

    pub fn endpoints(&self) -> &EndpointTable {
        &self.endpoints
    }

    /// Resolve a variable name to its category.
    pub fn resolve(&self, name: &str) -> Result<Category> {
        self.prefixes.resolve(name)
    }

    /// Device identity, read with one GET.
    pub async fn device_info(&mut self) -> Result<JsonValue> {
        let path = self.endpoints.device_path();
        self.channel.get_json(&path).await
    }

    /// Running strategy metadata, read with one GET.
    pub async fn strategy_info(&mut self) -> Result<JsonValue> {
        let path = self.endpoints.strategy_path();
        self.channel.get_json(&path).await
    }

    /// Device identity loaded on connect, if any.
    pub fn device(&self) -> Option<&JsonValue> {
        self.device.as_ref()
    }

    /// Strategy metadata loaded on connect, if any.
    pub fn strategy(&self) -> Option<&JsonValue> {
        self.strategy.as_ref()
    }

    /// Read a variable. Tables are returned as `Value::Table` snapshots; use
    /// [`PacController::table`] for write-through access.
    pub async fn get(&mut self, name: &str) -> Result<Value> {
        let category = self.prefixes.resolve(name)?;
        if category.is_table() {
            let table = self.table(name).await?;
            return Ok(Value::Table(table.values().to_vec()));
        }
        self.cache
            .get_scalar(&mut self.channel, category, name)
            .await
    }

    /// Validate and write a variable, then update the cache.
    pub async fn set(&mut self, name: &str, value: &JsonValue) -> Result<()> {
        let category = self.prefixes.resolve(name)?;
        if category.is_read_only() {
            return Err(PacError::ReadOnly {
                name: name.to_string(),
                category,
            });
        }

        match validate(category, name, value)? {
            Value::Table(values) => self.assign(category, name, values).await,
            scalar => {
                let path = self.endpoints.scalar_write_path(category, name);
                let payload = json!({ "value": encode(category, &scalar) });
                self.channel.post_json(&path, &payload).await?;
                debug!(name, category = %category, "Variable written");
                self.cache.set_scalar(category, name, scalar);
                Ok(())
            }
        }
    }

    /// Write-through access to a table variable, loading it on first use.
    pub async fn table(&mut self, name: &str) -> Result<TableHandle<'_>> {
        let category = self.table_category(name)?;
        if self.cache.table(name).is_none() {
            let path = self.endpoints.table_path(category, name);
            let body = self.channel.get_json(&path).await?;
            let values = decode_table(category, name, &body)?;
            info!(table = name, len = values.len(), "Loaded table");
            self.cache
                .insert_table(Table::new(self.id, name, category, values));
        }

        let endpoints = Arc::clone(&self.endpoints);
        match self.cache.table_mut(name) {
            Some(table) => Ok(TableHandle::new(&mut self.channel, endpoints, table)),
            None => Err(PacError::UnknownVariable(name.to_string())),
        }
    }

    /// Detached copy of a table's mirror, loading it on first use.
    pub async fn snapshot_table(&mut self, name: &str) -> Result<Table> {
        Ok(self.table(name).await?.snapshot())
    }

    /// Write a detached table in full and adopt it as the mirror.
    ///
    /// Only tables stamped by this controller are accepted.
    pub async fn assign_table(&mut self, table: Table) -> Result<()> {
        if table.owner() != self.id {
            return Err(PacError::InvalidTableOwner(table.name().to_string()));
        }
        let name = table.name().to_string();
        let category = self.table_category(&name)?;
        if category != table.category() {
            return Err(PacError::invalid(
                &name,
                table.category(),
                format!("name resolves to {}", category),
            ));
        }
        let values = table
            .into_values()
            .into_iter()
            .enumerate()
            .map(|(i, v)| conform(category, &name, v).map_err(|e| e.at_index(i)))
            .collect::<Result<Vec<_>>>()?;
        self.assign(category, &name, values).await
    }

    /// Sorted names of the scalar variables in a category.
    pub async fn list(&mut self, category: Category) -> Result<Vec<String>> {
        if category.is_table() {
            return Err(PacError::invalid(
                category.as_str(),
                category,
                "listing is only available for scalar categories",
            ));
        }
        self.cache.names(&mut self.channel, category).await
    }

    /// Discard every cached collection and table.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Number of requests issued so far.
    pub fn request_count(&self) -> usize {
        self.channel.log().count()
    }

    /// Every request issued so far, oldest first.
    pub fn requests(&self) -> &[RequestRecord] {
        self.channel.log().entries()
    }

    /// Full URL for a request path.
    pub fn url(&self, path: &str) -> String {
        self.channel.url(path)
    }

    fn table_category(&self, name: &str) -> Result<Category> {
        let category = self.prefixes.resolve(name)?;
        if !category.is_table() {
            return Err(PacError::invalid(
                name,
                category,
                "not a table variable",
            ));
        }
        Ok(category)
    }

    /// Full assignment of an already validated table.
    async fn assign(&mut self, category: Category, name: &str, values: Vec<Value>) -> Result<()> {
        let fresh = match self.cache.table(name) {
            Some(table) if table.len() != values.len() => {
                return Err(PacError::invalid(
                    name,
                    Value::Table(values.clone()),
                    format!("table length is fixed at {}, got {}", table.len(), values.len()),
                ));
            }
            Some(_) => false,
            None => {
                // No local history needed: the written contents become the mirror
                self.cache
                    .insert_table(Table::new(self.id, name, category, Vec::new()));
                true
            }
        };

        let endpoints = Arc::clone(&self.endpoints);
        let result = match self.cache.table_mut(name) {
            Some(table) => {
                TableHandle::new(&mut self.channel, endpoints, table)
                    .write_all(values)
                    .await
            }
            None => Err(PacError::UnknownVariable(name.to_string())),
        };
        if result.is_err() && fresh {
            self.cache.remove_table(name);
        }
        result
    }
}
