//! Payload model
//!
//! The [`Payload`] is the unit of work the pipeline hands the connector
//! and the shape it gets back: the same value with `response` populated.
//! Everything deserializes from camelCase JSON with lenient defaults,
//! matching what resolver pipelines actually emit.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::ConfigMap;

/// One unit of work flowing through a connector chain.
///
/// If `response` is already set the connector is a pure passthrough:
/// the payload has been handled by an earlier stage in the chain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Payload {
    /// Field arguments (equality filters for queries, field values for
    /// mutations)
    pub args: serde_json::Map<String, serde_json::Value>,
    /// Whether this invocation is a mutation
    pub is_mutation: bool,
    /// Mutation method: create, update, upsert, delete or bypass
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method_name: Option<String>,
    /// Whether the query expects a list of records
    pub multivalued: bool,
    /// Per-field configuration (higher precedence)
    pub configs: ConfigMap,
    /// Connector-base configuration (lower precedence)
    pub connector_base_config: ConfigMap,
    /// Pagination, ordering and filter descriptors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline_params: Option<PipelineParams>,
    /// The produced result; presence short-circuits processing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<serde_json::Value>,
}

/// Pagination, ordering and filter descriptors for a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineParams {
    /// Offset into the result set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u64>,
    /// Maximum result count (default 10; 0 counts as unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    /// Explicit ordering field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    /// "ASC" or "DESC"; anything else falls back to DESC
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by_direction: Option<String>,
    /// How each incoming argument is to be interpreted
    pub args_definition: BTreeMap<String, ArgSpec>,
    /// Structured filter descriptors
    pub filters: FilterSet,
}

impl PipelineParams {
    /// Result-set offset, defaulting to 0.
    pub fn start(&self) -> usize {
        self.start.unwrap_or(0) as usize
    }

    /// Result-set cap, defaulting to 10.
    ///
    /// An explicit 0 counts as unset: pipelines emit it for "no limit
    /// requested", not "return nothing", so the default applies.
    pub fn limit(&self) -> usize {
        match self.limit {
            Some(limit) if limit > 0 => limit as usize,
            _ => 10,
        }
    }
}

/// Declared interpretation of one argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgSpec {
    /// Declared type tag: Int, Float, Boolean, String, ID or a relation
    /// type name
    #[serde(rename = "type")]
    pub type_tag: String,
    /// Relation mapping for relation-typed arguments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<BTreeMap<String, String>>,
}

/// Resolved interpretation of an argument's type tag.
///
/// Scalar tags and `ID` are recognized explicitly; any other tag with a
/// relation mapping filters on the relation's target field; anything
/// else is treated as an opaque equality filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgType {
    /// Scalar equality filter (Int, Float, Boolean, String)
    Scalar,
    /// Identifier: filters on the entity key
    Id,
    /// Relation: filters on the relation's target field
    Relation(String),
    /// Undeclared or unrecognized: treated as an equality filter
    Unknown,
}

impl ArgSpec {
    /// Resolve the declared type tag into an [`ArgType`].
    pub fn arg_type(&self) -> ArgType {
        match self.type_tag.as_str() {
            "Int" | "Float" | "Boolean" | "String" => ArgType::Scalar,
            "ID" => ArgType::Id,
            _ => match &self.relation {
                // Filter on the relation's first target field
                Some(relation) => match relation.values().next() {
                    Some(target) => ArgType::Relation(target.clone()),
                    None => ArgType::Unknown,
                },
                None => ArgType::Unknown,
            },
        }
    }
}

/// Caller-supplied structured filters, independent of the args.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSet {
    /// Single-operand filters: eq, lt, lte, gt, gte
    pub scalar_filters: Vec<ScalarFilter>,
    /// Range filters: between
    pub between_filters: Vec<BetweenFilter>,
}

/// One single-operand filter descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalarFilter {
    /// Field to filter on
    pub field: String,
    /// Operator name; unsupported names are ignored
    pub operator: String,
    /// Comparison operand
    pub value: serde_json::Value,
}

/// One range filter descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetweenFilter {
    /// Field to filter on
    pub field: String,
    /// Operator name; anything but "between" is ignored
    pub operator: String,
    /// Inclusive lower bound
    pub min: serde_json::Value,
    /// Inclusive upper bound
    pub max: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_from_camel_case_json() {
        let payload: Payload = serde_json::from_value(serde_json::json!({
            "args": {"title": "Moby Dick"},
            "isMutation": false,
            "multivalued": true,
            "configs": {"kind": "Book"},
            "pipelineParams": {
                "limit": 5,
                "orderBy": "year",
                "orderByDirection": "ASC",
                "argsDefinition": {"title": {"type": "String"}}
            }
        }))
        .unwrap();
        assert!(!payload.is_mutation);
        assert!(payload.multivalued);
        assert_eq!(payload.configs.kind.as_deref(), Some("Book"));
        let params = payload.pipeline_params.unwrap();
        assert_eq!(params.limit(), 5);
        assert_eq!(params.start(), 0);
        assert_eq!(params.order_by.as_deref(), Some("year"));
    }

    #[test]
    fn test_missing_fields_default() {
        let payload: Payload = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(!payload.is_mutation);
        assert!(!payload.multivalued);
        assert!(payload.args.is_empty());
        assert!(payload.response.is_none());
    }

    #[test]
    fn test_default_limit_is_ten() {
        let params = PipelineParams::default();
        assert_eq!(params.limit(), 10);
    }

    #[test]
    fn test_zero_limit_counts_as_unset() {
        let params = PipelineParams {
            limit: Some(0),
            ..Default::default()
        };
        assert_eq!(params.limit(), 10);
    }

    #[test]
    fn test_arg_type_resolution() {
        let spec = |tag: &str| ArgSpec {
            type_tag: tag.into(),
            relation: None,
        };
        assert_eq!(spec("Int").arg_type(), ArgType::Scalar);
        assert_eq!(spec("Float").arg_type(), ArgType::Scalar);
        assert_eq!(spec("Boolean").arg_type(), ArgType::Scalar);
        assert_eq!(spec("String").arg_type(), ArgType::Scalar);
        assert_eq!(spec("ID").arg_type(), ArgType::Id);
        assert_eq!(spec("Widget").arg_type(), ArgType::Unknown);
    }

    #[test]
    fn test_relation_arg_targets_first_relation_field() {
        let mut relation = BTreeMap::new();
        relation.insert("author".to_string(), "authorId".to_string());
        let spec = ArgSpec {
            type_tag: "Author".into(),
            relation: Some(relation),
        };
        assert_eq!(spec.arg_type(), ArgType::Relation("authorId".into()));
    }

    #[test]
    fn test_filter_set_deserializes() {
        let filters: FilterSet = serde_json::from_value(serde_json::json!({
            "scalarFilters": [{"field": "year", "operator": "gte", "value": 1850}],
            "betweenFilters": [{"field": "pages", "operator": "between", "min": 100, "max": 900}]
        }))
        .unwrap();
        assert_eq!(filters.scalar_filters.len(), 1);
        assert_eq!(filters.between_filters.len(), 1);
    }
}
