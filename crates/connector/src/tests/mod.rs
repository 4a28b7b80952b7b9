//! Test modules for the connector crate.

use std::sync::Arc;

use crate::store::{MemoryStore, StoreClient};
use crate::{ConnectionRegistry, Connector, Payload};

pub mod queries;

/// Create a connector over a fresh registry of in-memory stores.
///
/// Payloads with equal connection parameters hit the same store, which
/// is what lets one invocation read what another wrote.
pub fn test_connector() -> Connector {
    Connector::new(Arc::new(ConnectionRegistry::new(|_params| {
        Ok(Arc::new(MemoryStore::new()) as Arc<dyn StoreClient>)
    })))
}

/// Parse a payload from literal JSON.
pub fn payload(json: serde_json::Value) -> Payload {
    serde_json::from_value(json).expect("test payload must deserialize")
}

/// Invoke and unwrap the response value.
pub fn respond(connector: &Connector, json: serde_json::Value) -> serde_json::Value {
    connector
        .invoke(payload(json))
        .expect("invocation must succeed")
        .response
        .expect("response must be populated")
}
