//! Query resolver
//!
//! Composes the store-native query from the compiled filter clauses plus
//! the payload's pagination and ordering descriptors, runs it, and
//! reshapes the returned entities into response records.
//!
//! Two semantics worth calling out:
//! - When an inequality-filtered property was chosen, the backend
//!   requires it as the first ordering key; the resolver forces that and
//!   demotes the caller's explicit `orderBy` to a secondary key.
//! - An empty result set is `null`, never `[]` - the pipeline
//!   distinguishes "no match" from "empty page" on exactly this.

use serde_json::Value as JsonValue;
use tracing::debug;

use kindling_core::Entity;
use kindling_store::{Direction, Query, StoreClient};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::filter::CompiledFilters;
use crate::payload::PipelineParams;

/// Map the payload's direction string onto the store's direction.
///
/// "ASC" ascends; "DESC", absence and anything unrecognized descend.
fn parse_direction(direction: Option<&str>) -> Direction {
    match direction {
        Some("ASC") => Direction::Ascending,
        _ => Direction::Descending,
    }
}

/// Reshape one entity into a response record.
///
/// Properties become a JSON object; the configured identifier field is
/// injected from the key's final path segment (overwriting any stored
/// property of the same name).
pub fn entity_to_record(entity: &Entity, id_field: &str) -> Result<JsonValue> {
    let mut record = serde_json::Map::new();
    for (property, value) in &entity.properties {
        record.insert(property.clone(), value.to_json());
    }
    let id = entity.key.path_end().ok_or_else(|| {
        Error::usage(format!(
            "store returned an entity without an identifier for kind {}",
            entity.key.kind
        ))
    })?;
    record.insert(id_field.to_string(), id.to_json());
    Ok(JsonValue::Object(record))
}

/// Build, execute and reshape a query.
///
/// Pagination and ordering apply only to multivalued queries; a
/// single-result query returns its first match.
pub fn resolve(
    client: &dyn StoreClient,
    config: &Config,
    compiled: CompiledFilters,
    multivalued: bool,
    params: &PipelineParams,
) -> Result<JsonValue> {
    let mut query = Query::new(&config.kind);
    for clause in compiled.clauses {
        query = query.filter(clause);
    }

    if multivalued {
        query = query.offset(params.start()).limit(params.limit());

        let direction = parse_direction(params.order_by_direction.as_deref());
        match (&compiled.inequality_property, &params.order_by) {
            // The backend requires the inequality property first; the
            // caller happens to order by it, so their direction applies.
            (Some(inequality), Some(order_by)) if inequality == order_by => {
                query = query.order(order_by, direction);
            }
            (Some(inequality), Some(order_by)) => {
                query = query
                    .order(inequality, Direction::Ascending)
                    .order(order_by, direction);
            }
            (Some(inequality), None) => {
                query = query.order(inequality, Direction::Ascending);
            }
            (None, Some(order_by)) => {
                query = query.order(order_by, direction);
            }
            (None, None) => {}
        }
    }

    let entities = client.run_query(&query)?;
    debug!(
        target: "kindling::query",
        kind = %config.kind,
        multivalued,
        results = entities.len(),
        "query resolved"
    );

    if multivalued {
        if entities.is_empty() {
            // No match is null, not an empty list
            return Ok(JsonValue::Null);
        }
        let records = entities
            .iter()
            .map(|entity| entity_to_record(entity, &config.id_field))
            .collect::<Result<Vec<_>>>()?;
        Ok(JsonValue::Array(records))
    } else {
        match entities.first() {
            Some(entity) => entity_to_record(entity, &config.id_field),
            None => Ok(JsonValue::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kindling_core::{Id, Key, Value};

    #[test]
    fn test_direction_defaults_to_descending() {
        assert_eq!(parse_direction(None), Direction::Descending);
        assert_eq!(parse_direction(Some("DESC")), Direction::Descending);
        assert_eq!(parse_direction(Some("sideways")), Direction::Descending);
        assert_eq!(parse_direction(Some("ASC")), Direction::Ascending);
    }

    #[test]
    fn test_entity_to_record_injects_id_field() {
        let mut entity = Entity::new(Key::new("Book", Id::Name("b1".into())));
        entity.set("title", Value::String("Moby Dick".into()));
        let record = entity_to_record(&entity, "bookId").unwrap();
        assert_eq!(
            record,
            serde_json::json!({"title": "Moby Dick", "bookId": "b1"})
        );
    }

    #[test]
    fn test_entity_to_record_numeric_id() {
        let entity = Entity::new(Key::new("Book", Id::Numeric(7)));
        let record = entity_to_record(&entity, "id").unwrap();
        assert_eq!(record, serde_json::json!({"id": 7}));
    }

    #[test]
    fn test_incomplete_key_is_a_usage_error() {
        let entity = Entity::new(Key::incomplete("Book"));
        let err = entity_to_record(&entity, "id").unwrap_err();
        assert!(matches!(err, Error::Usage { .. }));
    }
}
