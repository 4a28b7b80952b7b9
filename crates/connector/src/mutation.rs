//! Mutation executor
//!
//! A single-shot state machine over the mutation methods: create,
//! update, upsert, delete and bypass. Each invocation runs one method to
//! completion; the only state that persists is in the store itself.
//!
//! `update` is the delicate path: it must merge the supplied fields into
//! the *current* stored record without clobbering fields written by a
//! concurrent updater, so it runs as a transactional read-modify-write.
//! Commit conflicts are retried a bounded number of times and then
//! surfaced as a usage error; a conflict is never swallowed.

use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use tracing::debug;

use kindling_core::{Entity, Key, Value};
use kindling_store::StoreClient;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::resolver::entity_to_record;

/// How many times an update transaction is attempted before its commit
/// conflict is surfaced.
const UPDATE_ATTEMPTS: usize = 3;

/// Recognized mutation methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Insert a new record; fails if the identifier is taken
    Create,
    /// Merge fields into an existing record
    Update,
    /// Insert or replace a record
    Upsert,
    /// Remove a record
    Delete,
    /// No store interaction; echo the args
    Bypass,
}

impl Method {
    /// Parse a payload method name.
    pub fn parse(name: &str) -> Result<Method> {
        match name {
            "create" => Ok(Method::Create),
            "update" => Ok(Method::Update),
            "upsert" => Ok(Method::Upsert),
            "delete" => Ok(Method::Delete),
            "bypass" => Ok(Method::Bypass),
            other => Err(Error::UnknownMethod {
                method: other.to_string(),
            }),
        }
    }

    /// The method's payload name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Create => "create",
            Method::Update => "update",
            Method::Upsert => "upsert",
            Method::Delete => "delete",
            Method::Bypass => "bypass",
        }
    }
}

/// Execute one mutation and produce the response record.
///
/// Every branch except `bypass` ends with the identifier field set on
/// the result: the caller-supplied id when one was given, the
/// store-assigned id otherwise.
pub fn execute(
    client: &dyn StoreClient,
    config: &Config,
    method_name: Option<&str>,
    args: &serde_json::Map<String, JsonValue>,
) -> Result<JsonValue> {
    let method_name = method_name
        .ok_or_else(|| Error::configuration("a methodName is required for mutations"))?;
    let method = Method::parse(method_name)?;

    // JSON null counts as absent, matching the payload's lenient shape
    let id_value = args
        .get(&config.id_field)
        .filter(|v| !v.is_null())
        .map(Value::from_json);
    if id_value.is_none() && method != Method::Create {
        return Err(Error::argument(format!(
            "{} is required for operations other than create",
            config.id_field
        )));
    }

    // Everything but the identifier becomes record fields
    let properties: BTreeMap<String, Value> = args
        .iter()
        .filter(|(field, _)| *field != &config.id_field)
        .map(|(field, json)| (field.clone(), Value::from_json(json)))
        .collect();

    debug!(
        target: "kindling::mutation",
        kind = %config.kind,
        method = method.as_str(),
        "executing mutation"
    );

    match method {
        Method::Create => {
            let key = match &id_value {
                Some(value) => Key::from_value(&config.kind, value)?,
                None => Key::incomplete(&config.kind),
            };
            let entity = Entity::with_properties(key, properties.clone())
                .exclude_from_indexes(config.exclude_from_indexes.clone());
            let stored_key = client.insert(entity)?;
            entity_to_record(
                &Entity::with_properties(stored_key, properties),
                &config.id_field,
            )
        }

        Method::Upsert => {
            let key = match &id_value {
                Some(value) => Key::from_value(&config.kind, value)?,
                None => Key::incomplete(&config.kind),
            };
            let entity = Entity::with_properties(key, properties.clone())
                .exclude_from_indexes(config.exclude_from_indexes.clone());
            let stored_key = client.upsert(entity)?;
            entity_to_record(
                &Entity::with_properties(stored_key, properties),
                &config.id_field,
            )
        }

        Method::Update => {
            // id presence was checked above
            let id_value = id_value.as_ref().ok_or_else(|| {
                Error::argument(format!("{} is required for update", config.id_field))
            })?;
            let key = Key::from_value(&config.kind, id_value)?;
            update(client, config, &key, &properties)
        }

        Method::Delete => {
            let id_value = id_value.as_ref().ok_or_else(|| {
                Error::argument(format!("{} is required for delete", config.id_field))
            })?;
            let key = Key::from_value(&config.kind, id_value)?;
            client.delete(&key)?;
            let mut record = serde_json::Map::new();
            record.insert(config.id_field.clone(), id_value.to_json());
            Ok(JsonValue::Object(record))
        }

        // An upstream stage already computed the result; this connector
        // only normalizes the identifier, which the args carry already.
        Method::Bypass => Ok(JsonValue::Object(args.clone())),
    }
}

/// Transactional read-modify-write with bounded conflict retry.
fn update(
    client: &dyn StoreClient,
    config: &Config,
    key: &Key,
    properties: &BTreeMap<String, Value>,
) -> Result<JsonValue> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        let mut txn = client.begin()?;
        let mut entity = match txn.lookup(key)? {
            Some(entity) => entity,
            None => return Err(Error::usage(format!("record not found: {}", key))),
        };
        for (field, value) in properties {
            entity.set(field.clone(), value.clone());
        }
        txn.upsert(entity.clone())?;
        match txn.commit() {
            Ok(()) => return entity_to_record(&entity, &config.id_field),
            Err(err) if err.is_conflict() && attempt < UPDATE_ATTEMPTS => {
                debug!(
                    target: "kindling::mutation",
                    key = %key,
                    attempt,
                    "update commit conflicted, retrying"
                );
            }
            Err(err) => return Err(err.into()),
        }
    }
}
