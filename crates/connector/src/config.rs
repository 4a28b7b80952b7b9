//! Connector configuration
//!
//! Configuration arrives in two layers on the payload: the
//! connector-base config and the per-field config, the latter taking
//! precedence field by field. [`Config`] is the merged, validated
//! result every other component consumes.

use serde::{Deserialize, Serialize};

use crate::connection::ConnectionParams;
use crate::error::{Error, Result};

/// Default name of the logical identifier field.
pub const DEFAULT_ID_FIELD: &str = "id";

/// One raw configuration layer as it appears on the payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigMap {
    /// Kind (collection) name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Name of the logical identifier field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_field: Option<String>,
    /// Properties to exclude from the store's indexes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_from_indexes: Option<Vec<String>>,
    /// Backend project identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Backend namespace identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace_id: Option<String>,
}

/// Merged, validated connector configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Kind (collection) name; guaranteed present
    pub kind: String,
    /// Name of the logical identifier field (default `"id"`)
    pub id_field: String,
    /// Properties to exclude from the store's indexes
    pub exclude_from_indexes: Vec<String>,
    /// Backend project identifier
    pub project_id: Option<String>,
    /// Backend namespace identifier
    pub namespace_id: Option<String>,
}

impl Config {
    /// Merge the two configuration layers and validate the result.
    ///
    /// Per-field `configs` win over `base` field by field. Fails with a
    /// configuration error when no `kind` is present in either layer.
    pub fn merge(base: &ConfigMap, configs: &ConfigMap) -> Result<Config> {
        let kind = configs
            .kind
            .clone()
            .or_else(|| base.kind.clone())
            .ok_or_else(|| Error::configuration("kind name is required"))?;
        Ok(Config {
            kind,
            id_field: configs
                .id_field
                .clone()
                .or_else(|| base.id_field.clone())
                .unwrap_or_else(|| DEFAULT_ID_FIELD.to_string()),
            exclude_from_indexes: configs
                .exclude_from_indexes
                .clone()
                .or_else(|| base.exclude_from_indexes.clone())
                .unwrap_or_default(),
            project_id: configs.project_id.clone().or_else(|| base.project_id.clone()),
            namespace_id: configs
                .namespace_id
                .clone()
                .or_else(|| base.namespace_id.clone()),
        })
    }

    /// The connection-relevant subset of this config.
    ///
    /// Only these identifiers participate in connection-handle caching;
    /// two configs differing in any other field share a connection.
    pub fn connection_params(&self) -> ConnectionParams {
        let mut params = ConnectionParams::new();
        if let Some(project_id) = &self.project_id {
            params.set("projectId", project_id);
        }
        if let Some(namespace_id) = &self.namespace_id {
            params.set("namespaceId", namespace_id);
        }
        params
    }
}
