//! In-memory simulated controller.
//!
//! Implements the REST surface the engine uses (bulk collection reads, scalar
//! writes including the `/eu` and `/state` sub-paths, whole-table and
//! per-element table writes) against plain maps, and records every call.
//! Failures can be injected per method and path.

use async_trait::async_trait;
use pacvars_core::{Category, EndpointTable, PacError, Result};
use parking_lot::Mutex;
use serde_json::{json, Value as JsonValue};
use std::collections::HashMap;

use crate::transport::Transport;

/// A request received by the simulator.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: &'static str,
    pub path: String,
    pub payload: Option<JsonValue>,
}

#[derive(Debug, Default)]
struct DeviceState {
    /// Collection path -> ordered (name, raw value)
    collections: HashMap<String, Vec<(String, JsonValue)>>,
    /// Table path -> raw values
    tables: HashMap<String, Vec<JsonValue>>,
    /// Fixed documents such as device and strategy info
    documents: HashMap<String, JsonValue>,
    /// (method, path) -> status to answer with
    failures: HashMap<(&'static str, String), u16>,
    calls: Vec<Call>,
}

/// Simulated controller used by tests and offline runs.
pub struct MemoryTransport {
    base_url: String,
    endpoints: EndpointTable,
    state: Mutex<DeviceState>,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new(EndpointTable::default())
    }
}

impl MemoryTransport {
    pub fn new(endpoints: EndpointTable) -> Self {
        Self {
            base_url: "memory://pac".to_string(),
            endpoints,
            state: Mutex::new(DeviceState::default()),
        }
    }

    /// Add or overwrite a scalar variable in its category's collection.
    pub fn insert_scalar(&self, category: Category, name: &str, raw: JsonValue) {
        let path = self.endpoints.collection_path(category);
        let mut state = self.state.lock();
        let collection = state.collections.entry(path).or_default();
        match collection.iter_mut().find(|(n, _)| n == name) {
            Some((_, value)) => *value = raw,
            None => collection.push((name.to_string(), raw)),
        }
    }

    /// Add or overwrite a table variable.
    pub fn insert_table(&self, category: Category, name: &str, raw: Vec<JsonValue>) {
        let path = self.endpoints.table_path(category, name);
        self.state.lock().tables.insert(path, raw);
    }

    pub fn set_device_info(&self, info: JsonValue) {
        let path = self.endpoints.device_path();
        self.state.lock().documents.insert(path, info);
    }

    pub fn set_strategy_info(&self, info: JsonValue) {
        let path = self.endpoints.strategy_path();
        self.state.lock().documents.insert(path, info);
    }

    /// Answer `method` on `path` with `status` until [`MemoryTransport::heal`].
    pub fn fail(&self, method: &'static str, path: impl Into<String>, status: u16) {
        self.state.lock().failures.insert((method, path.into()), status);
    }

    pub fn heal(&self) {
        self.state.lock().failures.clear();
    }

    pub fn scalar(&self, category: Category, name: &str) -> Option<JsonValue> {
        let path = self.endpoints.collection_path(category);
        let state = self.state.lock();
        state
            .collections
            .get(&path)?
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    pub fn table(&self, category: Category, name: &str) -> Option<Vec<JsonValue>> {
        let path = self.endpoints.table_path(category, name);
        self.state.lock().tables.get(&path).cloned()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().calls.len()
    }

    /// Number of recorded calls with this method and path.
    pub fn count(&self, method: &str, path: &str) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| c.method == method && c.path == path)
            .count()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    fn reject(&self, method: &str, path: &str, status: u16) -> PacError {
        PacError::RemoteError {
            status,
            method: method.to_string(),
            url: self.url(path),
        }
    }

    fn write_scalar(state: &mut DeviceState, path: &str, value: JsonValue) -> Option<()> {
        let target = path
            .strip_suffix("/eu")
            .or_else(|| path.strip_suffix("/state"))
            .unwrap_or(path);
        let (collection, name) = target.rsplit_once('/')?;
        let slot = state
            .collections
            .get_mut(collection)?
            .iter_mut()
            .find(|(n, _)| n == name)?;
        slot.1 = value;
        Some(())
    }

    fn write_element(state: &mut DeviceState, path: &str, value: JsonValue) -> Option<()> {
        let (table, index) = path.rsplit_once('/')?;
        let index: usize = index.parse().ok()?;
        let slot = state.tables.get_mut(table)?.get_mut(index)?;
        *slot = value;
        Some(())
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> Result<JsonValue> {
        let mut state = self.state.lock();
        state.calls.push(Call {
            method: "GET",
            path: path.to_string(),
            payload: None,
        });
        if let Some(status) = state.failures.get(&("GET", path.to_string())) {
            return Err(self.reject("GET", path, *status));
        }

        if let Some(document) = state.documents.get(path) {
            return Ok(document.clone());
        }
        if let Some(collection) = state.collections.get(path) {
            return Ok(JsonValue::Array(
                collection
                    .iter()
                    .map(|(name, value)| json!({ "name": name, "value": value }))
                    .collect(),
            ));
        }
        if let Some(table) = state.tables.get(path) {
            return Ok(JsonValue::Array(table.clone()));
        }
        Err(self.reject("GET", path, 404))
    }

    async fn post(&self, path: &str, payload: &JsonValue) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.push(Call {
            method: "POST",
            path: path.to_string(),
            payload: Some(payload.clone()),
        });
        if let Some(status) = state.failures.get(&("POST", path.to_string())) {
            return Err(self.reject("POST", path, *status));
        }

        match payload {
            JsonValue::Array(values) => {
                // Table length is fixed once the table exists
                let resized = state
                    .tables
                    .get(path)
                    .is_some_and(|existing| existing.len() != values.len());
                if resized {
                    return Err(self.reject("POST", path, 400));
                }
                state.tables.insert(path.to_string(), values.clone());
                Ok(())
            }
            JsonValue::Object(body) => {
                let value = body
                    .get("value")
                    .cloned()
                    .ok_or_else(|| self.reject("POST", path, 400))?;
                Self::write_element(&mut state, path, value.clone())
                    .or_else(|| Self::write_scalar(&mut state, path, value))
                    .ok_or_else(|| self.reject("POST", path, 404))
            }
            _ => Err(self.reject("POST", path, 400)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bulk_read_shape() {
        let device = MemoryTransport::default();
        device.insert_scalar(Category::Integer, "iCount", json!(4));
        device.insert_scalar(Category::Integer, "bReady", json!(1));

        let body = device
            .get("/api/v1/device/strategy/vars/int32s")
            .await
            .unwrap();
        assert_eq!(
            body,
            json!([{"name": "iCount", "value": 4}, {"name": "bReady", "value": 1}])
        );
    }

    #[tokio::test]
    async fn test_writes_by_path() {
        let device = MemoryTransport::default();
        device.insert_scalar(Category::AnalogOutput, "aoValve", json!(0.0));
        device.insert_table(Category::IntegerTable, "itCounts", vec![json!(1), json!(2)]);

        device
            .post(
                "/api/v1/device/strategy/ios/analogOutputs/aoValve/eu",
                &json!({"value": 42.5}),
            )
            .await
            .unwrap();
        device
            .post(
                "/api/v1/device/strategy/tables/int32s/itCounts/1",
                &json!({"value": 7}),
            )
            .await
            .unwrap();

        assert_eq!(device.scalar(Category::AnalogOutput, "aoValve"), Some(json!(42.5)));
        assert_eq!(
            device.table(Category::IntegerTable, "itCounts"),
            Some(vec![json!(1), json!(7)])
        );
        assert_eq!(device.call_count(), 2);
    }

    #[tokio::test]
    async fn test_unknown_targets_are_rejected() {
        let device = MemoryTransport::default();
        device.insert_table(Category::IntegerTable, "itCounts", vec![json!(1)]);

        let err = device
            .post(
                "/api/v1/device/strategy/tables/int32s/itCounts/5",
                &json!({"value": 7}),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PacError::RemoteError { status: 404, .. }));

        let err = device
            .post(
                "/api/v1/device/strategy/tables/int32s/itCounts",
                &json!([1, 2]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PacError::RemoteError { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let device = MemoryTransport::default();
        device.set_device_info(json!({"controllerType": "groov EPIC"}));
        device.fail("GET", "/api/v1/device", 503);

        let err = device.get("/api/v1/device").await.unwrap_err();
        assert_eq!(
            err,
            PacError::RemoteError {
                status: 503,
                method: "GET".to_string(),
                url: "memory://pac/api/v1/device".to_string(),
            }
        );
        device.heal();
        assert!(device.get("/api/v1/device").await.is_ok());
    }
}
