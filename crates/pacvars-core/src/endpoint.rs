//! Endpoint paths for each category.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::category::Category;

/// Default base path of the device REST API.
pub const DEFAULT_BASE_PATH: &str = "/api/v1/device";

/// Category to path mapping, rooted at a base path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointTable {
    /// Root of every path below.
    pub base: String,
    /// Device identity, relative to `base`.
    pub device: String,
    /// Running strategy metadata, relative to `base`.
    pub strategy: String,
    /// Collection path per category, relative to `base`.
    pub categories: BTreeMap<Category, String>,
}

impl Default for EndpointTable {
    fn default() -> Self {
        let categories = Category::ALL
            .iter()
            .map(|c| (*c, default_suffix(*c).to_string()))
            .collect();
        Self {
            base: DEFAULT_BASE_PATH.to_string(),
            device: String::new(),
            strategy: "/strategy".to_string(),
            categories,
        }
    }
}

fn default_suffix(category: Category) -> &'static str {
    match category {
        Category::AnalogInput => "/strategy/ios/analogInputs",
        Category::AnalogOutput => "/strategy/ios/analogOutputs",
        Category::DigitalInput => "/strategy/ios/digitalInputs",
        Category::DigitalOutput => "/strategy/ios/digitalOutputs",
        Category::DownTimer => "/strategy/vars/downTimers",
        Category::UpTimer => "/strategy/vars/upTimers",
        Category::Integer | Category::BooleanScalar => "/strategy/vars/int32s",
        Category::IntegerTable | Category::BooleanTable => "/strategy/tables/int32s",
        Category::Float => "/strategy/vars/floats",
        Category::FloatTable => "/strategy/tables/floats",
        Category::String => "/strategy/vars/strings",
        Category::StringTable => "/strategy/tables/strings",
    }
}

impl EndpointTable {
    pub fn device_path(&self) -> String {
        format!("{}{}", self.base, self.device)
    }

    pub fn strategy_path(&self) -> String {
        format!("{}{}", self.base, self.strategy)
    }

    /// Path of the whole collection of a category.
    ///
    /// Categories missing from an overridden table fall back to the default
    /// suffix.
    pub fn collection_path(&self, category: Category) -> String {
        let suffix = self
            .categories
            .get(&category)
            .map(String::as_str)
            .unwrap_or_else(|| default_suffix(category));
        format!("{}{}", self.base, suffix)
    }

    /// Write path of a scalar variable.
    pub fn scalar_write_path(&self, category: Category, name: &str) -> String {
        let path = format!("{}/{}", self.collection_path(category), name);
        match category {
            Category::AnalogOutput => format!("{}/eu", path),
            Category::DigitalOutput => format!("{}/state", path),
            _ => path,
        }
    }

    /// Path of a whole table.
    pub fn table_path(&self, category: Category, name: &str) -> String {
        format!("{}/{}", self.collection_path(category), name)
    }

    /// Path of one table element.
    pub fn element_path(&self, category: Category, name: &str, index: usize) -> String {
        format!("{}/{}", self.table_path(category, name), index)
    }
}
