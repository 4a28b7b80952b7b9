//! The Connector facade - single entry point for payload processing.
//!
//! The connector is a stateless dispatcher: it validates configuration,
//! obtains a connection from the registry, and routes the payload to the
//! query or mutation path. All state lives in the registry's connection
//! cache and the store behind it.

use std::sync::Arc;

use tracing::debug;

use crate::config::Config;
use crate::connection::{ConnectionRegistry, DEFAULT_REGISTRY};
use crate::error::Result;
use crate::payload::Payload;
use crate::{filter, mutation, resolver};

/// The payload-processing facade.
///
/// # Thread Safety
///
/// `Connector` is `Send + Sync`; concurrent invocations share the
/// registry's cached connection handles.
///
/// # Example
///
/// ```ignore
/// let connector = Connector::new(registry);
/// let payload = connector.invoke(payload)?;
/// // payload.response holds a record, a list of records, or null
/// ```
pub struct Connector {
    registry: Arc<ConnectionRegistry>,
}

impl Connector {
    /// Create a connector over an explicit connection registry.
    pub fn new(registry: Arc<ConnectionRegistry>) -> Connector {
        Connector { registry }
    }

    /// Create a connector over the ambient process-wide registry.
    pub fn with_default_registry() -> Connector {
        Connector {
            registry: Arc::clone(&DEFAULT_REGISTRY),
        }
    }

    /// Process one payload and return it with `response` populated.
    ///
    /// A payload that already carries a response is returned unchanged:
    /// in a connector chain only one stage acts, and the rest pass the
    /// payload through untouched. Failures abort the invocation; no
    /// partial payload is produced.
    pub fn invoke(&self, mut payload: Payload) -> Result<Payload> {
        if payload.response.is_some() {
            debug!(target: "kindling::connector", "payload already resolved, passing through");
            return Ok(payload);
        }

        let config = Config::merge(&payload.connector_base_config, &payload.configs)?;
        let client = self.registry.get(&config.connection_params())?;

        let response = if payload.is_mutation {
            mutation::execute(
                client.as_ref(),
                &config,
                payload.method_name.as_deref(),
                &payload.args,
            )?
        } else {
            let params = payload.pipeline_params.clone().unwrap_or_default();
            let compiled = filter::compile(
                &config.kind,
                &payload.args,
                &params.args_definition,
                &params.filters,
            )?;
            resolver::resolve(
                client.as_ref(),
                &config,
                compiled,
                payload.multivalued,
                &params,
            )?
        };

        payload.response = Some(response);
        Ok(payload)
    }

    /// The registry this connector resolves connections through.
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }
}
