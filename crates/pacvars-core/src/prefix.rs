//! Prefix table and name resolution.
//!
//! A variable name is split into its maximal leading run of lowercase ASCII
//! letters (the prefix) and the remainder (the identifier). The prefix must be
//! an exact key of the [`PrefixTable`]; there is no fallback to shorter runs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::category::Category;
use crate::error::{PacError, Result};

/// Default prefix bindings.
pub const DEFAULT_PREFIXES: [(&str, Category); 14] = [
    ("ai", Category::AnalogInput),
    ("ao", Category::AnalogOutput),
    ("b", Category::BooleanScalar),
    ("bt", Category::BooleanTable),
    ("di", Category::DigitalInput),
    ("do", Category::DigitalOutput),
    ("dt", Category::DownTimer),
    ("f", Category::Float),
    ("ft", Category::FloatTable),
    ("i", Category::Integer),
    ("it", Category::IntegerTable),
    ("s", Category::String),
    ("st", Category::StringTable),
    ("ut", Category::UpTimer),
];

/// Immutable mapping from lowercase prefix to category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrefixTable {
    entries: BTreeMap<String, Category>,
}

impl Default for PrefixTable {
    fn default() -> Self {
        Self {
            entries: DEFAULT_PREFIXES
                .iter()
                .map(|(p, c)| (p.to_string(), *c))
                .collect(),
        }
    }
}

impl PrefixTable {
    /// An empty table; every name resolves to `UnknownPrefix`.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Bind `prefix` to `category`, replacing any existing binding.
    ///
    /// Prefixes that are not all-lowercase can never be produced by
    /// [`split_prefix`] and are rejected.
    pub fn with_prefix(mut self, prefix: impl Into<String>, category: Category) -> Result<Self> {
        let prefix = prefix.into();
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_lowercase()) {
            return Err(PacError::Config(format!(
                "Prefix '{}' must be non-empty lowercase ASCII",
                prefix
            )));
        }
        self.entries.insert(prefix, category);
        Ok(self)
    }

    /// Apply a set of overrides on top of this table.
    pub fn merged(self, overrides: &BTreeMap<String, Category>) -> Result<Self> {
        overrides
            .iter()
            .try_fold(self, |table, (p, c)| table.with_prefix(p.clone(), *c))
    }

    pub fn get(&self, prefix: &str) -> Option<Category> {
        self.entries.get(prefix).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Category)> {
        self.entries.iter().map(|(p, c)| (p.as_str(), *c))
    }

    /// Resolve a variable name to its category.
    pub fn resolve(&self, name: &str) -> Result<Category> {
        let prefix = split_prefix(name);
        if prefix.is_empty() {
            return Err(PacError::NoPrefix(name.to_string()));
        }
        self.get(prefix).ok_or_else(|| PacError::UnknownPrefix {
            name: name.to_string(),
            prefix: prefix.to_string(),
        })
    }
}

/// Maximal leading run of lowercase ASCII letters.
pub fn split_prefix(name: &str) -> &str {
    let end = name
        .char_indices()
        .find(|(_, c)| !c.is_ascii_lowercase())
        .map(|(i, _)| i)
        .unwrap_or(name.len());
    &name[..end]
}
