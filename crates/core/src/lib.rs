//! # Kindling Core
//!
//! Shared data model for the Kindling connector:
//! - [`Value`] - canonical value type for entity properties and filters
//! - [`Key`]/[`Id`] - kind-scoped entity identifiers
//! - [`Entity`] - a stored document (key + property map)
//!
//! This crate deliberately has no store or connector logic; it only
//! defines the vocabulary the other crates speak.

#![warn(missing_docs)]

pub mod entity;
pub mod key;
pub mod value;

pub use entity::Entity;
pub use key::{Id, Key, KeyError};
pub use value::Value;
