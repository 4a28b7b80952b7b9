//! Store-native query model
//!
//! A [`Query`] is the declarative shape the connector compiles payloads
//! into: a kind selector, predicate clauses, ordering keys and paging.
//! Drivers interpret it against their backend;
//! [`MemoryStore`](crate::MemoryStore) evaluates it directly.
//!
//! The backend's structural constraints live with the driver, not here:
//! a `Query` value can describe an invalid combination (two inequality
//! properties), which the driver rejects with
//! [`StoreError::InvalidQuery`](crate::StoreError::InvalidQuery).

use serde::{Deserialize, Serialize};

use kindling_core::{Key, Value};

/// Pseudo-property addressing the entity key in predicate clauses.
pub const KEY_PROPERTY: &str = "__key__";

/// Comparison operator for predicate clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    /// Equality
    Eq,
    /// Strictly less than
    Lt,
    /// Less than or equal
    Le,
    /// Strictly greater than
    Gt,
    /// Greater than or equal
    Ge,
}

impl CompareOp {
    /// Whether this operator constrains a range rather than a point.
    pub fn is_inequality(&self) -> bool {
        !matches!(self, CompareOp::Eq)
    }
}

/// Right-hand side of a predicate clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterValue {
    /// An ordinary property value
    Value(Value),
    /// An entity key (only meaningful on [`KEY_PROPERTY`])
    Key(Key),
}

/// One predicate clause: `property <op> value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyFilter {
    /// Property name (or [`KEY_PROPERTY`])
    pub property: String,
    /// Comparison operator
    pub op: CompareOp,
    /// Comparison operand
    pub value: FilterValue,
}

impl PropertyFilter {
    /// Clause on an ordinary property.
    pub fn property(property: impl Into<String>, op: CompareOp, value: Value) -> PropertyFilter {
        PropertyFilter {
            property: property.into(),
            op,
            value: FilterValue::Value(value),
        }
    }

    /// Equality clause on the entity key.
    pub fn key(key: Key) -> PropertyFilter {
        PropertyFilter {
            property: KEY_PROPERTY.into(),
            op: CompareOp::Eq,
            value: FilterValue::Key(key),
        }
    }
}

/// Sort direction for an ordering key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Smallest first
    Ascending,
    /// Largest first
    Descending,
}

/// One ordering key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Property to sort by
    pub property: String,
    /// Sort direction
    pub direction: Direction,
}

/// A kind-scoped store query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Kind (collection) to query
    pub kind: String,
    /// Predicate clauses, all conjunctive
    pub filters: Vec<PropertyFilter>,
    /// Ordering keys, applied in sequence
    pub orders: Vec<Order>,
    /// Number of matching entities to skip
    pub offset: Option<usize>,
    /// Maximum number of entities to return
    pub limit: Option<usize>,
}

impl Query {
    /// Create an unfiltered query over `kind`.
    pub fn new(kind: impl Into<String>) -> Query {
        Query {
            kind: kind.into(),
            filters: Vec::new(),
            orders: Vec::new(),
            offset: None,
            limit: None,
        }
    }

    /// Append a predicate clause.
    pub fn filter(mut self, filter: PropertyFilter) -> Query {
        self.filters.push(filter);
        self
    }

    /// Append an ordering key.
    pub fn order(mut self, property: impl Into<String>, direction: Direction) -> Query {
        self.orders.push(Order {
            property: property.into(),
            direction,
        });
        self
    }

    /// Skip the first `offset` matches.
    pub fn offset(mut self, offset: usize) -> Query {
        self.offset = Some(offset);
        self
    }

    /// Cap the result set at `limit` entities.
    pub fn limit(mut self, limit: usize) -> Query {
        self.limit = Some(limit);
        self
    }

    /// The single property carrying inequality clauses, if any.
    ///
    /// Returns the first such property; callers validating the backend's
    /// one-inequality-property rule compare the rest against it.
    pub fn inequality_property(&self) -> Option<&str> {
        self.filters
            .iter()
            .find(|f| f.op.is_inequality())
            .map(|f| f.property.as_str())
    }
}
