//! # Kindling Connector
//!
//! Translates generic query/mutation payloads from a resolver pipeline
//! into operations against a kind-based document store, and the store's
//! results back into the generic response shape.
//!
//! - [`Connector`] - the facade every payload goes through
//! - [`ConnectionRegistry`] - one cached store handle per parameter set
//! - [`filter`] - compiles filter descriptors into predicate clauses
//! - [`resolver`] - builds, runs and reshapes queries
//! - [`mutation`] - the create/update/upsert/delete/bypass state machine
//!
//! ## Quick Start
//!
//! ```ignore
//! use kindling_connector::{Connector, ConnectionRegistry, Payload};
//! use kindling_connector::store::{MemoryStore, StoreClient};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(ConnectionRegistry::new(|_params| {
//!     Ok(Arc::new(MemoryStore::new()) as Arc<dyn StoreClient>)
//! }));
//! let connector = Connector::new(registry);
//!
//! let payload: Payload = serde_json::from_value(request)?;
//! let payload = connector.invoke(payload)?;
//! ```

#![warn(missing_docs)]

mod config;
mod connection;
mod connector;
mod error;
pub mod filter;
pub mod mutation;
mod payload;
pub mod resolver;

// Test modules
#[cfg(test)]
mod tests;

// =============================================================================
// Public API - Everything users need is re-exported here
// =============================================================================

pub use config::{Config, ConfigMap, DEFAULT_ID_FIELD};
pub use connection::{ClientFactory, ConnectionParams, ConnectionRegistry, DEFAULT_REGISTRY};
pub use connector::Connector;
pub use error::{Error, Result};
pub use filter::CompiledFilters;
pub use mutation::Method;
pub use payload::{
    ArgSpec, ArgType, BetweenFilter, FilterSet, Payload, PipelineParams, ScalarFilter,
};

// Re-export the shared data model so users don't need kindling-core
pub use kindling_core::{Entity, Id, Key, Value};

// Re-export the store surface for driver implementations and tests
pub use kindling_store as store;
