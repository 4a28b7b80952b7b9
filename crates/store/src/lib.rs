//! # Kindling Store
//!
//! The store capability surface the connector programs against:
//! - [`Query`] - declarative kind-scoped query (filters, ordering, paging)
//! - [`StoreClient`]/[`StoreTransaction`] - dyn-safe driver traits
//! - [`StoreError`] - driver-level error taxonomy
//! - [`MemoryStore`] - in-memory reference implementation
//!
//! Real deployments implement [`StoreClient`] over their backend SDK;
//! [`MemoryStore`] exists so the connector can be exercised hermetically
//! and doubles as the executable definition of the backend's structural
//! query rules (single inequality property, inequality-first ordering).

#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod memory;
pub mod query;

pub use client::{StoreClient, StoreTransaction};
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use query::{CompareOp, Direction, FilterValue, Order, PropertyFilter, Query, KEY_PROPERTY};
