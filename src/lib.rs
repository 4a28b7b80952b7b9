//! Kindling - a pipeline-to-datastore connector
//!
//! Kindling sits between a resolver pipeline (which speaks in generic
//! query/mutation payloads) and a schema-less, kind-based document store.
//! It compiles declarative filter descriptors into store-native queries,
//! runs CRUD mutations (with a transactional read-modify-write for
//! partial updates), and reshapes store entities back into the generic
//! response shape.
//!
//! # Quick Start
//!
//! ```ignore
//! use kindling::{Connector, ConnectionRegistry, Payload};
//! use kindling::store::MemoryStore;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(ConnectionRegistry::new(|_params| {
//!     Ok(Arc::new(MemoryStore::new()) as Arc<dyn kindling::store::StoreClient>)
//! }));
//! let connector = Connector::new(registry);
//!
//! let payload: Payload = serde_json::from_value(request_json)?;
//! let payload = connector.invoke(payload)?;
//! // payload.response now holds the record(s), or null
//! ```
//!
//! # Architecture
//!
//! All traffic goes through the [`Connector`] facade, which dispatches to
//! the filter compiler + query resolver for reads and to the mutation
//! executor for writes. Store access is abstracted behind the
//! `StoreClient` capability trait; connections are cached per parameter
//! set by the [`ConnectionRegistry`].

// Re-export the public API from kindling-connector
pub use kindling_connector::*;
