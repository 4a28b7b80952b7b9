//! Filter compiler
//!
//! Compiles the payload's declarative filter descriptors (args with
//! declared types, scalar filters, between filters) into the ordered
//! predicate clauses of a store query, while enforcing the backend's
//! structural constraint that at most one property may carry inequality
//! clauses.
//!
//! The gating policy is deliberately silent: once an inequality-filtered
//! property is chosen, later inequality clauses on *other* fields are
//! dropped (debug-logged, never an error), as are unsupported operator
//! names. Callers get every clause the backend can actually execute.

use serde_json::Value as JsonValue;
use tracing::debug;

use kindling_core::{Key, Value};
use kindling_store::{CompareOp, PropertyFilter};

use crate::error::Result;
use crate::payload::{ArgSpec, ArgType, FilterSet};
use std::collections::BTreeMap;

/// Compiler output: ordered clauses plus the chosen inequality property.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFilters {
    /// Predicate clauses in emission order: args, then scalar filters,
    /// then between filters
    pub clauses: Vec<PropertyFilter>,
    /// The single property carrying inequality clauses, if any
    pub inequality_property: Option<String>,
}

/// Tracks the single property allowed to carry inequality clauses.
#[derive(Default)]
struct InequalityGate {
    chosen: Option<String>,
}

impl InequalityGate {
    /// Whether an inequality clause on `field` may be emitted.
    ///
    /// The first field asked for becomes the chosen property; later
    /// distinct fields are refused.
    fn admit(&mut self, field: &str) -> bool {
        match &self.chosen {
            None => {
                self.chosen = Some(field.to_string());
                true
            }
            Some(chosen) => chosen == field,
        }
    }
}

/// Map a filter descriptor's operator name onto the store's operator.
///
/// Unknown names yield `None`; the caller skips those clauses.
fn parse_operator(operator: &str) -> Option<CompareOp> {
    match operator {
        "eq" => Some(CompareOp::Eq),
        "lt" => Some(CompareOp::Lt),
        "lte" => Some(CompareOp::Le),
        "gt" => Some(CompareOp::Gt),
        "gte" => Some(CompareOp::Ge),
        _ => None,
    }
}

/// Compile args and filter descriptors into store predicate clauses.
///
/// `kind` scopes key references built for ID-typed args. Arguments not
/// present in `definition` compile as plain equality filters.
pub fn compile(
    kind: &str,
    args: &serde_json::Map<String, JsonValue>,
    definition: &BTreeMap<String, ArgSpec>,
    filters: &FilterSet,
) -> Result<CompiledFilters> {
    let mut clauses = Vec::new();
    let mut gate = InequalityGate::default();

    // Args compile first, all as equality clauses
    for (field, json) in args {
        let value = Value::from_json(json);
        let arg_type = definition
            .get(field)
            .map(ArgSpec::arg_type)
            .unwrap_or(ArgType::Unknown);
        match arg_type {
            ArgType::Scalar | ArgType::Unknown => {
                clauses.push(PropertyFilter::property(field, CompareOp::Eq, value));
            }
            ArgType::Id => {
                clauses.push(PropertyFilter::key(Key::from_value(kind, &value)?));
            }
            ArgType::Relation(target) => {
                clauses.push(PropertyFilter::property(target, CompareOp::Eq, value));
            }
        }
    }

    // Scalar filters: eq always passes, inequalities go through the gate
    for filter in &filters.scalar_filters {
        let op = match parse_operator(&filter.operator) {
            Some(op) => op,
            None => {
                debug!(
                    target: "kindling::filter",
                    field = %filter.field,
                    operator = %filter.operator,
                    "dropping filter with unsupported operator"
                );
                continue;
            }
        };
        if op.is_inequality() && !gate.admit(&filter.field) {
            debug!(
                target: "kindling::filter",
                field = %filter.field,
                chosen = gate.chosen.as_deref().unwrap_or(""),
                "dropping inequality filter on a second property"
            );
            continue;
        }
        clauses.push(PropertyFilter::property(
            &filter.field,
            op,
            Value::from_json(&filter.value),
        ));
    }

    // Between filters expand to a >= / <= pair under the same gate
    for filter in &filters.between_filters {
        if filter.operator != "between" {
            debug!(
                target: "kindling::filter",
                field = %filter.field,
                operator = %filter.operator,
                "dropping between filter with unsupported operator"
            );
            continue;
        }
        if !gate.admit(&filter.field) {
            debug!(
                target: "kindling::filter",
                field = %filter.field,
                chosen = gate.chosen.as_deref().unwrap_or(""),
                "dropping between filter on a second property"
            );
            continue;
        }
        clauses.push(PropertyFilter::property(
            &filter.field,
            CompareOp::Ge,
            Value::from_json(&filter.min),
        ));
        clauses.push(PropertyFilter::property(
            &filter.field,
            CompareOp::Le,
            Value::from_json(&filter.max),
        ));
    }

    Ok(CompiledFilters {
        clauses,
        inequality_property: gate.chosen,
    })
}
