//! Store driver traits
//!
//! [`StoreClient`] is the seam between the connector and a concrete
//! backend SDK. It is dyn-safe so connections can be cached and shared
//! as `Arc<dyn StoreClient>` regardless of the backend behind them.
//!
//! Implementations must be safe for concurrent use: one client handle is
//! shared by every connector built with equal connection parameters.

use kindling_core::{Entity, Key};

use crate::error::Result;
use crate::query::Query;

/// A live connection to one backend store.
pub trait StoreClient: Send + Sync {
    /// Run a query and return the matching entities.
    fn run_query(&self, query: &Query) -> Result<Vec<Entity>>;

    /// Insert a new entity.
    ///
    /// Fails with [`StoreError::AlreadyExists`](crate::StoreError::AlreadyExists)
    /// when an entity with the same complete key is present. Incomplete
    /// keys are completed with a store-assigned numeric id; the returned
    /// key always carries the final identifier.
    fn insert(&self, entity: Entity) -> Result<Key>;

    /// Insert or replace an entity. Never fails on an existing key.
    fn upsert(&self, entity: Entity) -> Result<Key>;

    /// Delete the entity at `key`. Deleting an absent entity is not an
    /// error.
    fn delete(&self, key: &Key) -> Result<()>;

    /// Open a transaction for an atomic read-modify-write sequence.
    fn begin(&self) -> Result<Box<dyn StoreTransaction>>;
}

/// An open store transaction.
///
/// Reads performed through [`lookup`](StoreTransaction::lookup) form the
/// transaction's read set; [`commit`](StoreTransaction::commit) must fail
/// with a conflict if any read entity changed in the meantime, so that
/// two concurrent read-modify-write sequences on the same key can never
/// both commit against stale reads.
pub trait StoreTransaction {
    /// Read an entity inside the transaction.
    fn lookup(&mut self, key: &Key) -> Result<Option<Entity>>;

    /// Stage an insert-or-replace write.
    fn upsert(&mut self, entity: Entity) -> Result<()>;

    /// Atomically validate the read set and apply staged writes.
    fn commit(self: Box<Self>) -> Result<()>;
}
