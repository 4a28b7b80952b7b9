//! Connection registry
//!
//! Caches one live store-client handle per distinct set of connection
//! parameters. The cache key is the deterministic serialization of the
//! parameter map (structural equality, not identity), and entries are
//! never evicted: a handle lives for the rest of the process.
//!
//! First construction for a key happens while the registry lock is held,
//! so concurrent first requests for the same parameters cannot race two
//! handles into existence; the loser of the lock reuses the winner's
//! handle instead of constructing an orphan.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing::info;

use kindling_store::{MemoryStore, StoreClient};

use crate::error::Result;

/// Backend connection identifiers (project id, namespace id, ...).
///
/// Ordered so that equal parameter sets always serialize to the same
/// cache key. Immutable by convention once handed to the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionParams(BTreeMap<String, String>);

impl ConnectionParams {
    /// Create an empty parameter set.
    pub fn new() -> ConnectionParams {
        ConnectionParams(BTreeMap::new())
    }

    /// Set one identifier.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Read one identifier.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Deterministic serialization used as the registry cache key.
    pub fn cache_key(&self) -> String {
        let mut key = String::new();
        for (name, value) in &self.0 {
            key.push_str(name);
            key.push('=');
            key.push_str(value);
            key.push(';');
        }
        key
    }
}

/// Constructor for new store-client handles.
pub type ClientFactory =
    dyn Fn(&ConnectionParams) -> Result<Arc<dyn StoreClient>> + Send + Sync;

/// Process-wide cache of store-client handles, one per parameter set.
pub struct ConnectionRegistry {
    factory: Box<ClientFactory>,
    connections: Mutex<HashMap<String, Arc<dyn StoreClient>>>,
}

impl ConnectionRegistry {
    /// Create a registry that builds handles with `factory`.
    pub fn new<F>(factory: F) -> ConnectionRegistry
    where
        F: Fn(&ConnectionParams) -> Result<Arc<dyn StoreClient>> + Send + Sync + 'static,
    {
        ConnectionRegistry {
            factory: Box::new(factory),
            connections: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached handle for `params`, constructing it on first
    /// use.
    ///
    /// The lock is held across construction so exactly one handle ever
    /// exists per key. Factory failures surface unchanged and leave no
    /// cache entry behind.
    pub fn get(&self, params: &ConnectionParams) -> Result<Arc<dyn StoreClient>> {
        let key = params.cache_key();
        let mut connections = self.connections.lock();
        if let Some(client) = connections.get(&key) {
            return Ok(Arc::clone(client));
        }
        info!(target: "kindling::connection", params = %key, "opening new store connection");
        let client = (self.factory)(params)?;
        connections.insert(key, Arc::clone(&client));
        Ok(client)
    }

    /// Number of cached handles.
    pub fn len(&self) -> usize {
        self.connections.lock().len()
    }

    /// Whether the registry holds no handles yet.
    pub fn is_empty(&self) -> bool {
        self.connections.lock().is_empty()
    }
}

/// Ambient process-wide registry backed by in-memory stores.
///
/// Embedders that want the singleton ergonomics of a global connection
/// cache can share this; each distinct parameter set gets its own
/// isolated [`MemoryStore`]. Deployments targeting a real backend build
/// their own [`ConnectionRegistry`] with a driver factory instead.
pub static DEFAULT_REGISTRY: Lazy<Arc<ConnectionRegistry>> = Lazy::new(|| {
    Arc::new(ConnectionRegistry::new(|_params| {
        Ok(Arc::new(MemoryStore::new()) as Arc<dyn StoreClient>)
    }))
});

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_registry() -> ConnectionRegistry {
        ConnectionRegistry::new(|_params| Ok(Arc::new(MemoryStore::new()) as Arc<dyn StoreClient>))
    }

    fn params(pairs: &[(&str, &str)]) -> ConnectionParams {
        let mut p = ConnectionParams::new();
        for (name, value) in pairs {
            p.set(*name, *value);
        }
        p
    }

    #[test]
    fn test_cache_key_is_order_independent() {
        let mut a = ConnectionParams::new();
        a.set("projectId", "p1");
        a.set("namespaceId", "n1");
        let mut b = ConnectionParams::new();
        b.set("namespaceId", "n1");
        b.set("projectId", "p1");
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_equal_params_share_a_handle() {
        let registry = memory_registry();
        let first = registry.get(&params(&[("projectId", "p1")])).unwrap();
        let second = registry.get(&params(&[("projectId", "p1")])).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_distinct_params_get_distinct_handles() {
        let registry = memory_registry();
        let first = registry.get(&params(&[("projectId", "p1")])).unwrap();
        let second = registry.get(&params(&[("projectId", "p2")])).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_factory_failure_leaves_no_entry() {
        let registry = ConnectionRegistry::new(|_params| {
            Err(crate::Error::usage("backend unreachable"))
        });
        assert!(registry.get(&ConnectionParams::new()).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_concurrent_first_use_constructs_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        static CONSTRUCTIONS: AtomicUsize = AtomicUsize::new(0);
        let registry = Arc::new(ConnectionRegistry::new(|_params| {
            CONSTRUCTIONS.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(MemoryStore::new()) as Arc<dyn StoreClient>)
        }));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.get(&ConnectionParams::new()).unwrap())
            })
            .collect();
        let clients: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(CONSTRUCTIONS.load(Ordering::SeqCst), 1);
        for client in &clients[1..] {
            assert!(Arc::ptr_eq(&clients[0], client));
        }
    }
}
