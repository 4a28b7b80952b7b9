//! Query path tests: round trips, pagination, ordering and the
//! empty-vs-null distinction, all through the facade.

use super::{payload, respond, test_connector};
use crate::Connector;

/// Seed one book through the mutation path.
fn create_book(connector: &Connector, id: &str, title: &str, year: i64) {
    respond(
        connector,
        serde_json::json!({
            "isMutation": true,
            "methodName": "create",
            "args": {"id": id, "title": title, "year": year},
            "configs": {"kind": "Book"}
        }),
    );
}

#[test]
fn test_create_then_query_by_id_round_trip() {
    let connector = test_connector();
    create_book(&connector, "moby-dick", "Moby Dick", 1851);

    let response = respond(
        &connector,
        serde_json::json!({
            "args": {"id": "moby-dick"},
            "multivalued": false,
            "configs": {"kind": "Book"},
            "pipelineParams": {
                "argsDefinition": {"id": {"type": "ID"}}
            }
        }),
    );
    assert_eq!(
        response,
        serde_json::json!({"id": "moby-dick", "title": "Moby Dick", "year": 1851})
    );
}

#[test]
fn test_single_query_without_match_is_null() {
    let connector = test_connector();
    let response = respond(
        &connector,
        serde_json::json!({
            "args": {"title": "Nonexistent"},
            "multivalued": false,
            "configs": {"kind": "Book"}
        }),
    );
    assert_eq!(response, serde_json::Value::Null);
}

#[test]
fn test_multivalued_query_without_match_is_null_not_empty_list() {
    let connector = test_connector();
    let response = respond(
        &connector,
        serde_json::json!({
            "args": {},
            "multivalued": true,
            "configs": {"kind": "Book"}
        }),
    );
    assert_eq!(response, serde_json::Value::Null);
}

#[test]
fn test_multivalued_query_returns_records_with_ids() {
    let connector = test_connector();
    create_book(&connector, "a", "Typee", 1846);
    create_book(&connector, "b", "Moby Dick", 1851);

    let response = respond(
        &connector,
        serde_json::json!({
            "args": {},
            "multivalued": true,
            "configs": {"kind": "Book"}
        }),
    );
    let records = response.as_array().expect("expected a list");
    assert_eq!(records.len(), 2);
    for record in records {
        assert!(record.get("id").is_some());
        assert!(record.get("title").is_some());
    }
}

#[test]
fn test_explicit_order_by_with_direction() {
    let connector = test_connector();
    create_book(&connector, "a", "Typee", 1846);
    create_book(&connector, "b", "Moby Dick", 1851);
    create_book(&connector, "c", "Billy Budd", 1924);

    let response = respond(
        &connector,
        serde_json::json!({
            "args": {},
            "multivalued": true,
            "configs": {"kind": "Book"},
            "pipelineParams": {"orderBy": "year", "orderByDirection": "ASC"}
        }),
    );
    let years: Vec<i64> = response
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["year"].as_i64().unwrap())
        .collect();
    assert_eq!(years, vec![1846, 1851, 1924]);
}

#[test]
fn test_order_by_direction_defaults_to_descending() {
    let connector = test_connector();
    create_book(&connector, "a", "Typee", 1846);
    create_book(&connector, "b", "Moby Dick", 1851);

    let response = respond(
        &connector,
        serde_json::json!({
            "args": {},
            "multivalued": true,
            "configs": {"kind": "Book"},
            "pipelineParams": {"orderBy": "year"}
        }),
    );
    let years: Vec<i64> = response
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["year"].as_i64().unwrap())
        .collect();
    assert_eq!(years, vec![1851, 1846]);
}

#[test]
fn test_inequality_filter_forces_first_ordering_key() {
    let connector = test_connector();
    create_book(&connector, "a", "Typee", 1846);
    create_book(&connector, "b", "Moby Dick", 1851);
    create_book(&connector, "c", "Billy Budd", 1924);

    // orderBy a different property than the inequality-filtered one:
    // the store would reject the query unless the resolver forces the
    // inequality property first.
    let response = respond(
        &connector,
        serde_json::json!({
            "args": {},
            "multivalued": true,
            "configs": {"kind": "Book"},
            "pipelineParams": {
                "orderBy": "title",
                "orderByDirection": "ASC",
                "filters": {
                    "scalarFilters": [
                        {"field": "year", "operator": "gte", "value": 1850}
                    ]
                }
            }
        }),
    );
    let records = response.as_array().unwrap();
    assert_eq!(records.len(), 2);
    // Primary key is the forced ascending year
    assert_eq!(records[0]["year"], serde_json::json!(1851));
    assert_eq!(records[1]["year"], serde_json::json!(1924));
}

#[test]
fn test_pagination_offset_and_limit() {
    let connector = test_connector();
    for (id, year) in [("a", 1846), ("b", 1851), ("c", 1924), ("d", 1930)] {
        create_book(&connector, id, "Book", year);
    }

    let response = respond(
        &connector,
        serde_json::json!({
            "args": {},
            "multivalued": true,
            "configs": {"kind": "Book"},
            "pipelineParams": {
                "start": 1,
                "limit": 2,
                "orderBy": "year",
                "orderByDirection": "ASC"
            }
        }),
    );
    let years: Vec<i64> = response
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["year"].as_i64().unwrap())
        .collect();
    assert_eq!(years, vec![1851, 1924]);
}

#[test]
fn test_zero_limit_falls_back_to_default() {
    let connector = test_connector();
    create_book(&connector, "a", "Typee", 1846);
    create_book(&connector, "b", "Moby Dick", 1851);

    // A zero limit means "no limit requested", not "return nothing"
    let response = respond(
        &connector,
        serde_json::json!({
            "args": {},
            "multivalued": true,
            "configs": {"kind": "Book"},
            "pipelineParams": {"limit": 0}
        }),
    );
    assert_eq!(response.as_array().unwrap().len(), 2);
}

#[test]
fn test_single_result_query_ignores_pagination() {
    let connector = test_connector();
    create_book(&connector, "a", "Typee", 1846);

    // start beyond the result set would hide the record if pagination
    // applied to single-result queries
    let response = respond(
        &connector,
        serde_json::json!({
            "args": {"title": "Typee"},
            "multivalued": false,
            "configs": {"kind": "Book"},
            "pipelineParams": {"start": 5, "limit": 0}
        }),
    );
    assert_eq!(response["title"], serde_json::json!("Typee"));
}

#[test]
fn test_configured_id_field_used_in_response() {
    let connector = test_connector();
    respond(
        &connector,
        serde_json::json!({
            "isMutation": true,
            "methodName": "create",
            "args": {"bookId": "b1", "title": "Typee"},
            "configs": {"kind": "Book", "idField": "bookId"}
        }),
    );

    let response = respond(
        &connector,
        serde_json::json!({
            "args": {"bookId": "b1"},
            "multivalued": false,
            "configs": {"kind": "Book", "idField": "bookId"},
            "pipelineParams": {"argsDefinition": {"bookId": {"type": "ID"}}}
        }),
    );
    assert_eq!(response["bookId"], serde_json::json!("b1"));
    assert!(response.get("id").is_none());
}

#[test]
fn test_between_filter_through_facade() {
    let connector = test_connector();
    for (id, year) in [("a", 1846), ("b", 1851), ("c", 1924)] {
        create_book(&connector, id, "Book", year);
    }

    let response = respond(
        &connector,
        serde_json::json!({
            "args": {},
            "multivalued": true,
            "configs": {"kind": "Book"},
            "pipelineParams": {
                "filters": {
                    "betweenFilters": [
                        {"field": "year", "operator": "between", "min": 1850, "max": 1900}
                    ]
                }
            }
        }),
    );
    let records = response.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["year"], serde_json::json!(1851));
}
