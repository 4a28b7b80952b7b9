//! In-memory reference store
//!
//! [`MemoryStore`] implements the driver traits over a process-local map.
//! It exists for hermetic tests and as the executable definition of the
//! backend's structural rules:
//!
//! - at most one property may carry inequality clauses in a query
//! - when one does, the first ordering key must be that property
//! - key predicates support equality only
//!
//! Entities are versioned; transactions validate their read set against
//! current versions at commit time, so a concurrent write between a
//! transactional lookup and its commit fails the commit with
//! [`StoreError::Conflict`] instead of silently losing the update.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use kindling_core::{Entity, Id, Key};

use crate::client::{StoreClient, StoreTransaction};
use crate::error::{Result, StoreError};
use crate::query::{CompareOp, Direction, FilterValue, PropertyFilter, Query, KEY_PROPERTY};

/// One stored entity plus its modification version.
#[derive(Debug, Clone)]
struct Stored {
    entity: Entity,
    version: u64,
}

/// Shared state behind every handle and open transaction.
struct Inner {
    /// kind -> id -> stored entity
    kinds: RwLock<HashMap<String, BTreeMap<Id, Stored>>>,
    /// Allocator for store-assigned numeric ids
    next_id: AtomicI64,
    /// Global modification counter used for conflict detection
    next_version: AtomicU64,
}

impl Inner {
    fn allocate_id(&self) -> Id {
        Id::Numeric(self.next_id.fetch_add(1, AtomicOrdering::SeqCst))
    }

    fn bump_version(&self) -> u64 {
        self.next_version.fetch_add(1, AtomicOrdering::SeqCst)
    }

    /// Complete an incomplete key, and keep the allocator ahead of any
    /// caller-supplied numeric id so later allocations cannot collide.
    fn complete_key(&self, key: Key) -> Key {
        match key.id {
            Some(Id::Numeric(n)) => {
                self.next_id.fetch_max(n + 1, AtomicOrdering::SeqCst);
                Key {
                    kind: key.kind,
                    id: Some(Id::Numeric(n)),
                }
            }
            Some(id) => Key {
                kind: key.kind,
                id: Some(id),
            },
            None => Key {
                kind: key.kind,
                id: Some(self.allocate_id()),
            },
        }
    }
}

/// In-memory [`StoreClient`] implementation.
///
/// Cloning a `MemoryStore` yields another handle onto the same data,
/// which is how the connection registry shares one "connection" across
/// concurrent invocations.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> MemoryStore {
        MemoryStore {
            inner: Arc::new(Inner {
                kinds: RwLock::new(HashMap::new()),
                next_id: AtomicI64::new(1),
                next_version: AtomicU64::new(1),
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore::new()
    }
}

// =============================================================================
// Query evaluation
// =============================================================================

/// Reject queries that break the backend's structural rules.
fn validate_query(query: &Query) -> Result<()> {
    for filter in &query.filters {
        if filter.property == KEY_PROPERTY && filter.op != CompareOp::Eq {
            return Err(StoreError::InvalidQuery {
                reason: format!("only equality is supported on {}", KEY_PROPERTY),
            });
        }
    }
    if let Some(property) = query.inequality_property() {
        for filter in &query.filters {
            if filter.op.is_inequality() && filter.property != property {
                return Err(StoreError::InvalidQuery {
                    reason: format!(
                        "inequality filters on multiple properties: {} and {}",
                        property, filter.property
                    ),
                });
            }
        }
        if let Some(first_order) = query.orders.first() {
            if first_order.property != property {
                return Err(StoreError::InvalidQuery {
                    reason: format!(
                        "first ordering key must be the inequality-filtered property {}",
                        property
                    ),
                });
            }
        }
    }
    Ok(())
}

/// Whether `entity` satisfies one predicate clause.
fn matches(entity: &Entity, filter: &PropertyFilter) -> bool {
    if filter.property == KEY_PROPERTY {
        return match &filter.value {
            FilterValue::Key(key) => entity.key == *key,
            FilterValue::Value(_) => false,
        };
    }
    let value = match entity.get(&filter.property) {
        Some(v) => v,
        None => return false,
    };
    let operand = match &filter.value {
        FilterValue::Value(v) => v,
        FilterValue::Key(_) => return false,
    };
    match filter.op {
        CompareOp::Eq => value == operand,
        // Typed index semantics: cross-variant comparisons never match
        CompareOp::Lt => matches!(
            value.partial_cmp_typed(operand),
            Some(std::cmp::Ordering::Less)
        ),
        CompareOp::Le => matches!(
            value.partial_cmp_typed(operand),
            Some(std::cmp::Ordering::Less) | Some(std::cmp::Ordering::Equal)
        ),
        CompareOp::Gt => matches!(
            value.partial_cmp_typed(operand),
            Some(std::cmp::Ordering::Greater)
        ),
        CompareOp::Ge => matches!(
            value.partial_cmp_typed(operand),
            Some(std::cmp::Ordering::Greater) | Some(std::cmp::Ordering::Equal)
        ),
    }
}

/// Order entities by the query's ordering keys, tie-breaking on id.
///
/// Entities missing an ordered property sort first under ascending order.
fn sort_entities(entities: &mut [Entity], query: &Query) {
    entities.sort_by(|a, b| {
        for order in &query.orders {
            let av = a.get(&order.property);
            let bv = b.get(&order.property);
            let ord = match (av, bv) {
                (None, None) => std::cmp::Ordering::Equal,
                (None, Some(_)) => std::cmp::Ordering::Less,
                (Some(_), None) => std::cmp::Ordering::Greater,
                (Some(a), Some(b)) => {
                    a.partial_cmp_typed(b).unwrap_or(std::cmp::Ordering::Equal)
                }
            };
            let ord = match order.direction {
                Direction::Ascending => ord,
                Direction::Descending => ord.reverse(),
            };
            if ord != std::cmp::Ordering::Equal {
                return ord;
            }
        }
        a.key.id.cmp(&b.key.id)
    });
}

impl StoreClient for MemoryStore {
    fn run_query(&self, query: &Query) -> Result<Vec<Entity>> {
        validate_query(query)?;
        let kinds = self.inner.kinds.read();
        let mut results: Vec<Entity> = kinds
            .get(&query.kind)
            .map(|entities| {
                entities
                    .values()
                    .filter(|stored| query.filters.iter().all(|f| matches(&stored.entity, f)))
                    .map(|stored| stored.entity.clone())
                    .collect()
            })
            .unwrap_or_default();
        drop(kinds);

        sort_entities(&mut results, query);

        let offset = query.offset.unwrap_or(0);
        let mut results: Vec<Entity> = results.into_iter().skip(offset).collect();
        if let Some(limit) = query.limit {
            results.truncate(limit);
        }
        debug!(
            target: "kindling::store",
            kind = %query.kind,
            matched = results.len(),
            "query evaluated"
        );
        Ok(results)
    }

    fn insert(&self, mut entity: Entity) -> Result<Key> {
        let key = self.inner.complete_key(entity.key);
        entity.key = key.clone();
        let id = key.id.clone().ok_or_else(|| StoreError::Backend {
            message: "key completion produced no identifier".into(),
        })?;

        let mut kinds = self.inner.kinds.write();
        let entities = kinds.entry(key.kind.clone()).or_default();
        if entities.contains_key(&id) {
            return Err(StoreError::AlreadyExists {
                key: key.to_string(),
            });
        }
        let version = self.inner.bump_version();
        entities.insert(id, Stored { entity, version });
        Ok(key)
    }

    fn upsert(&self, mut entity: Entity) -> Result<Key> {
        let key = self.inner.complete_key(entity.key);
        entity.key = key.clone();
        let id = key.id.clone().ok_or_else(|| StoreError::Backend {
            message: "key completion produced no identifier".into(),
        })?;

        let mut kinds = self.inner.kinds.write();
        let version = self.inner.bump_version();
        kinds
            .entry(key.kind.clone())
            .or_default()
            .insert(id, Stored { entity, version });
        Ok(key)
    }

    fn delete(&self, key: &Key) -> Result<()> {
        let id = match &key.id {
            Some(id) => id,
            None => return Ok(()), // incomplete key addresses nothing
        };
        let mut kinds = self.inner.kinds.write();
        if let Some(entities) = kinds.get_mut(&key.kind) {
            entities.remove(id);
        }
        Ok(())
    }

    fn begin(&self) -> Result<Box<dyn StoreTransaction>> {
        Ok(Box::new(MemoryTransaction {
            inner: Arc::clone(&self.inner),
            reads: Vec::new(),
            writes: Vec::new(),
        }))
    }
}

// =============================================================================
// Transactions
// =============================================================================

/// Optimistic transaction: lookups record the version they observed
/// (or its absence); commit re-checks every recorded version under the
/// write lock before applying staged writes.
struct MemoryTransaction {
    inner: Arc<Inner>,
    /// (key, version observed at lookup; None = absent)
    reads: Vec<(Key, Option<u64>)>,
    writes: Vec<Entity>,
}

impl StoreTransaction for MemoryTransaction {
    fn lookup(&mut self, key: &Key) -> Result<Option<Entity>> {
        let id = match &key.id {
            Some(id) => id.clone(),
            None => return Ok(None),
        };
        let kinds = self.inner.kinds.read();
        let stored = kinds
            .get(&key.kind)
            .and_then(|entities| entities.get(&id))
            .cloned();
        drop(kinds);

        self.reads
            .push((key.clone(), stored.as_ref().map(|s| s.version)));
        Ok(stored.map(|s| s.entity))
    }

    fn upsert(&mut self, entity: Entity) -> Result<()> {
        self.writes.push(entity);
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<()> {
        let mut kinds = self.inner.kinds.write();

        // Validate the read set before touching anything
        for (key, observed) in &self.reads {
            let id = match &key.id {
                Some(id) => id,
                None => continue,
            };
            let current = kinds
                .get(&key.kind)
                .and_then(|entities| entities.get(id))
                .map(|s| s.version);
            if current != *observed {
                debug!(target: "kindling::store", key = %key, "commit rejected, read set changed");
                return Err(StoreError::Conflict {
                    reason: format!("entity {} changed during transaction", key),
                });
            }
        }

        // Apply staged writes atomically under the same lock
        for mut entity in self.writes {
            let key = self.inner.complete_key(entity.key);
            entity.key = key.clone();
            let id = key.id.clone().ok_or_else(|| StoreError::Backend {
                message: "key completion produced no identifier".into(),
            })?;
            let version = self.inner.bump_version();
            kinds
                .entry(key.kind)
                .or_default()
                .insert(id, Stored { entity, version });
        }
        Ok(())
    }
}
