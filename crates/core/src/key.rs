//! Kind-scoped entity keys
//!
//! A [`Key`] names one entity inside a kind (the store's collection
//! notion). Keys may be *incomplete* (no identifier yet): the store
//! completes them at insert time by allocating a numeric id. The
//! completed key's final path segment is the authoritative identifier
//! for the entity, and is the value the connector injects back into
//! responses.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::value::Value;

/// An entity identifier: either a caller-chosen name or a store-assigned
/// numeric id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Id {
    /// Caller-supplied string identifier
    Name(String),
    /// Numeric identifier (usually store-assigned)
    Numeric(i64),
}

impl Id {
    /// Build an identifier from a scalar value.
    ///
    /// Strings become names, integers become numeric ids. Any other
    /// variant is rejected: the backend only keys on those two types.
    pub fn from_value(value: &Value) -> Result<Id, KeyError> {
        match value {
            Value::String(s) => Ok(Id::Name(s.clone())),
            Value::Int(i) => Ok(Id::Numeric(*i)),
            other => Err(KeyError::UnsupportedIdType {
                type_name: other.type_name(),
            }),
        }
    }

    /// Render the identifier as a JSON scalar (string or number).
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Id::Name(s) => serde_json::Value::String(s.clone()),
            Id::Numeric(i) => serde_json::Value::Number((*i).into()),
        }
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Name(s) => write!(f, "{}", s),
            Id::Numeric(i) => write!(f, "{}", i),
        }
    }
}

/// A key addressing one entity within a kind.
///
/// `id == None` marks an incomplete key; the store assigns a numeric id
/// when such a key is inserted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key {
    /// Kind (collection) name
    pub kind: String,
    /// Identifier, absent for incomplete keys
    pub id: Option<Id>,
}

impl Key {
    /// Create an incomplete key for `kind`.
    pub fn incomplete(kind: impl Into<String>) -> Key {
        Key {
            kind: kind.into(),
            id: None,
        }
    }

    /// Create a complete key from a kind and an identifier.
    pub fn new(kind: impl Into<String>, id: Id) -> Key {
        Key {
            kind: kind.into(),
            id: Some(id),
        }
    }

    /// Create a complete key from a kind and a scalar identifier value.
    pub fn from_value(kind: impl Into<String>, value: &Value) -> Result<Key, KeyError> {
        Ok(Key::new(kind, Id::from_value(value)?))
    }

    /// Whether this key still needs a store-assigned identifier.
    pub fn is_incomplete(&self) -> bool {
        self.id.is_none()
    }

    /// The final path segment of the key: its identifier.
    ///
    /// This is the single identifier-extraction rule used everywhere a
    /// result id is produced.
    pub fn path_end(&self) -> Option<&Id> {
        self.id.as_ref()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{}/{}", self.kind, id),
            None => write!(f, "{}/<incomplete>", self.kind),
        }
    }
}

/// Key construction errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    /// Identifier value is neither a string nor an integer
    #[error("unsupported identifier type: {type_name}")]
    UnsupportedIdType {
        /// Type name of the rejected value
        type_name: &'static str,
    },
}
