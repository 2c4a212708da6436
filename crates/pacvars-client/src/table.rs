//! Write-through table variables.
//!
//! A [`Table`] is the local mirror of one table variable. Its length is fixed
//! by the controller. A [`TableHandle`] borrows the mirror together with the
//! owning controller's channel, and every mutation through it is written to the
//! controller as part of the same call.

use pacvars_core::value::{encode, normalize};
use pacvars_core::{validate, validate_element, Category, EndpointTable, PacError, Result, Value};
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use tracing::debug;

use crate::channel::RemoteChannel;
use crate::controller::ControllerId;

/// Local mirror of one table variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    owner: ControllerId,
    name: String,
    category: Category,
    values: Vec<Value>,
}

impl Table {
    /// Build a table from existing values. Nothing is read or written.
    pub fn new(
        owner: ControllerId,
        name: impl Into<String>,
        category: Category,
        values: Vec<Value>,
    ) -> Self {
        Self {
            owner,
            name: name.into(),
            category,
            values,
        }
    }

    pub fn owner(&self) -> ControllerId {
        self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

/// Write-through access to a cached table.
pub struct TableHandle<'a> {
    channel: &'a mut RemoteChannel,
    endpoints: Arc<EndpointTable>,
    table: &'a mut Table,
}

impl<'a> TableHandle<'a> {
    pub(crate) fn new(
        channel: &'a mut RemoteChannel,
        endpoints: Arc<EndpointTable>,
        table: &'a mut Table,
    ) -> Self {
        Self {
            channel,
            endpoints,
            table,
        }
    }

    pub fn name(&self) -> &str {
        self.table.name()
    }

    pub fn category(&self) -> Category {
        self.table.category()
    }

    pub fn values(&self) -> &[Value] {
        self.table.values()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.table.get(index)
    }

    /// Detached copy of the current mirror.
    pub fn snapshot(&self) -> Table {
        self.table.clone()
    }

    /// Replace the whole table: validate, POST every element, then update the
    /// mirror. The length must match the controller's table.
    pub async fn replace(&mut self, new_values: &JsonValue) -> Result<()> {
        let values = match validate(self.category(), self.name(), new_values)? {
            Value::Table(values) => values,
            other => vec![other],
        };
        if values.len() != self.len() {
            return Err(PacError::invalid(
                self.name(),
                new_values,
                format!("table length is fixed at {}, got {}", self.len(), values.len()),
            ));
        }
        self.write_all(values).await
    }

    /// Set one element. Only that element is written to the controller.
    ///
    /// The mirror is updated first and restored if the write fails.
    pub async fn set_index(&mut self, index: usize, value: &JsonValue) -> Result<()> {
        if index >= self.len() {
            return Err(PacError::invalid(
                self.name(),
                value,
                format!("index out of bounds for table of length {}", self.len()),
            )
            .at_index(index));
        }
        let element = validate_element(self.category(), self.name(), value)
            .map(|v| normalize(self.category(), v))
            .map_err(|e| e.at_index(index))?;

        let mut updated = self.table.values.clone();
        updated[index] = element.clone();
        let previous = self.replace_local(updated);

        let path = self
            .endpoints
            .element_path(self.category(), self.name(), index);
        let payload = json!({ "value": encode(self.category(), &element) });
        if let Err(e) = self.channel.post_json(&path, &payload).await {
            self.replace_local(previous);
            return Err(e);
        }
        debug!(table = %self.name(), index, "Table element written");
        Ok(())
    }

    /// POST an already validated full sequence and adopt it as the mirror.
    pub(crate) async fn write_all(&mut self, values: Vec<Value>) -> Result<()> {
        let category = self.category();
        let values: Vec<Value> = values
            .into_iter()
            .map(|v| normalize(category, v))
            .collect();
        let path = self.endpoints.table_path(category, self.name());
        let payload = JsonValue::Array(
            values
                .iter()
                .map(|v| encode(self.category(), v))
                .collect(),
        );
        self.channel.post_json(&path, &payload).await?;
        self.replace_local(values);
        debug!(table = %self.name(), len = self.len(), "Table written");
        Ok(())
    }

    /// Swap the mirror contents without any transport call.
    fn replace_local(&mut self, values: Vec<Value>) -> Vec<Value> {
        std::mem::replace(&mut self.table.values, values)
    }
}
