//! Variable cache.
//!
//! Scalar variables are cached per collection endpoint: the first read of any
//! variable in a collection fetches the whole collection once, and later reads
//! of any name in it are served locally until [`VariableCache::clear`]. Writes
//! update an existing entry in place and never trigger a fetch.
//!
//! Table variables are cached per name as [`Table`] mirrors.

use pacvars_core::value::{decode, normalize};
use pacvars_core::{BaseType, Category, EndpointTable, PacError, PrefixTable, Result, Value};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::channel::RemoteChannel;
use crate::table::Table;

/// One entry of a bulk collection read.
#[derive(Debug, Deserialize)]
struct NamedValue {
    name: String,
    #[serde(default)]
    value: JsonValue,
}

type ScalarEntry = HashMap<String, Value>;

/// Per-controller cache of scalar collections and table mirrors.
#[derive(Debug)]
pub struct VariableCache {
    prefixes: Arc<PrefixTable>,
    endpoints: Arc<EndpointTable>,
    /// Collection path -> variable name -> value
    scalars: HashMap<String, ScalarEntry>,
    /// Table name -> mirror
    tables: HashMap<String, Table>,
}

impl VariableCache {
    pub fn new(prefixes: Arc<PrefixTable>, endpoints: Arc<EndpointTable>) -> Self {
        Self {
            prefixes,
            endpoints,
            scalars: HashMap::new(),
            tables: HashMap::new(),
        }
    }

    /// True when the collection backing `category` has been fetched.
    pub fn is_loaded(&self, category: Category) -> bool {
        self.scalars
            .contains_key(&self.endpoints.collection_path(category))
    }

    /// Read a scalar variable, fetching its whole collection on first access.
    pub async fn get_scalar(
        &mut self,
        channel: &mut RemoteChannel,
        category: Category,
        name: &str,
    ) -> Result<Value> {
        let entry = self.load(channel, category).await?;
        entry
            .get(name)
            .cloned()
            .ok_or_else(|| PacError::UnknownVariable(name.to_string()))
    }

    /// Names in the collection of `category` that resolve to `category`.
    pub async fn names(
        &mut self,
        channel: &mut RemoteChannel,
        category: Category,
    ) -> Result<Vec<String>> {
        let prefixes = Arc::clone(&self.prefixes);
        let entry = self.load(channel, category).await?;
        let mut names: Vec<String> = entry
            .keys()
            .filter(|name| prefixes.resolve(name).ok() == Some(category))
            .cloned()
            .collect();
        names.sort();
        Ok(names)
    }

    /// Record a confirmed write. A collection that was never fetched stays
    /// absent.
    pub fn set_scalar(&mut self, category: Category, name: &str, value: Value) {
        let key = self.endpoints.collection_path(category);
        if let Some(entry) = self.scalars.get_mut(&key) {
            entry.insert(name.to_string(), normalize(category, value));
        }
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.get_mut(name)
    }

    pub fn insert_table(&mut self, table: Table) -> &mut Table {
        match self.tables.entry(table.name().to_string()) {
            Entry::Occupied(mut slot) => {
                slot.insert(table);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(table),
        }
    }

    pub fn remove_table(&mut self, name: &str) -> Option<Table> {
        self.tables.remove(name)
    }

    /// Drop every cached collection and table.
    pub fn clear(&mut self) {
        let collections = self.scalars.len();
        let tables = self.tables.len();
        self.scalars.clear();
        self.tables.clear();
        info!(collections, tables, "Variable cache cleared");
    }

    async fn load(
        &mut self,
        channel: &mut RemoteChannel,
        category: Category,
    ) -> Result<&ScalarEntry> {
        let key = self.endpoints.collection_path(category);
        match self.scalars.entry(key) {
            Entry::Occupied(slot) => Ok(&*slot.into_mut()),
            Entry::Vacant(slot) => {
                let body = channel.get_json(slot.key()).await?;
                let entry = decode_collection(&self.prefixes, category, body)?;
                info!(
                    category = %category,
                    path = %slot.key(),
                    count = entry.len(),
                    "Loaded variable collection"
                );
                Ok(&*slot.insert(entry))
            }
        }
    }
}

/// Decode a bulk `[{name, value}]` body.
///
/// Integer collections are shared by the boolean overlay: any name whose
/// prefix resolves to a boolean category is recast from 0/1 to a bool.
fn decode_collection(
    prefixes: &PrefixTable,
    category: Category,
    body: JsonValue,
) -> Result<ScalarEntry> {
    let items: Vec<NamedValue> = serde_json::from_value(body)?;
    let element_category = if category == Category::BooleanScalar {
        Category::Integer
    } else {
        category
    };

    let mut entry = HashMap::with_capacity(items.len());
    for item in items {
        let mut value = decode(element_category, &item.name, &item.value)?;
        if element_category.base_type() == BaseType::Integer
            && prefixes
                .resolve(&item.name)
                .is_ok_and(|c| c.is_boolean())
        {
            value = value.into_bool();
        }
        entry.insert(item.name, value);
    }
    Ok(entry)
}
