//! Stored entities
//!
//! An [`Entity`] is the unit the store reads and writes: a key plus a
//! flat property map. `exclude_from_indexes` lists properties the store
//! should skip when building its per-property indexes (large blobs,
//! free-text fields).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::key::Key;
use crate::value::Value;

/// A stored document: key, properties and indexing hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// The entity's key (may be incomplete before insertion)
    pub key: Key,
    /// Property map
    pub properties: BTreeMap<String, Value>,
    /// Property names excluded from the store's indexes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_from_indexes: Vec<String>,
}

impl Entity {
    /// Create an entity with no properties.
    pub fn new(key: Key) -> Entity {
        Entity {
            key,
            properties: BTreeMap::new(),
            exclude_from_indexes: Vec::new(),
        }
    }

    /// Create an entity from a key and a property map.
    pub fn with_properties(key: Key, properties: BTreeMap<String, Value>) -> Entity {
        Entity {
            key,
            properties,
            exclude_from_indexes: Vec::new(),
        }
    }

    /// Set the list of unindexed properties.
    pub fn exclude_from_indexes(mut self, properties: Vec<String>) -> Entity {
        self.exclude_from_indexes = properties;
        self
    }

    /// Read a property.
    pub fn get(&self, property: &str) -> Option<&Value> {
        self.properties.get(property)
    }

    /// Write a property, returning the previous value if any.
    pub fn set(&mut self, property: impl Into<String>, value: Value) -> Option<Value> {
        self.properties.insert(property.into(), value)
    }
}
