//! Error types for connector invocations.
//!
//! Every failure an invocation can surface is represented by the
//! [`Error`] enum. Errors are structured and serializable so the calling
//! pipeline can route them without string matching.
//!
//! Driver failures ([`StoreError`]) are translated to [`Error::Usage`]
//! here, unwrapping JSON-shaped backend messages when possible. The only
//! conditions deliberately *not* surfaced as errors are the documented
//! silent drops in the filter compiler (unsupported operators, second
//! inequality fields).

use serde::{Deserialize, Serialize};

use kindling_core::KeyError;
use kindling_store::StoreError;

/// Result type alias for connector operations
pub type Result<T> = std::result::Result<T, Error>;

/// Connector invocation errors.
///
/// # Categories
///
/// | Variant | Meaning |
/// |---------|---------|
/// | `Configuration` | Required config key missing (no `kind`, no `methodName`) |
/// | `Argument` | Payload args unusable (missing id for a non-create mutation) |
/// | `Usage` | Store-reported failure during an operation |
/// | `UnknownMethod` | `methodName` outside the recognized set |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum Error {
    /// Required configuration is missing or malformed
    #[error("configuration error: {message}")]
    Configuration {
        /// What is missing
        message: String,
    },

    /// Payload arguments are unusable for the requested operation
    #[error("argument error: {message}")]
    Argument {
        /// What is wrong with the arguments
        message: String,
    },

    /// The store rejected the operation
    #[error("usage error: {message}")]
    Usage {
        /// Underlying driver message, unwrapped when JSON-shaped
        message: String,
    },

    /// Mutation method name outside {create, update, upsert, delete, bypass}
    #[error("unknown method: {method}")]
    UnknownMethod {
        /// The unrecognized method name
        method: String,
    },
}

impl Error {
    /// Configuration error from any displayable message.
    pub fn configuration(message: impl Into<String>) -> Error {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Argument error from any displayable message.
    pub fn argument(message: impl Into<String>) -> Error {
        Error::Argument {
            message: message.into(),
        }
    }

    /// Usage error from any displayable message.
    pub fn usage(message: impl Into<String>) -> Error {
        Error::Usage {
            message: message.into(),
        }
    }
}

/// Pull the inner message out of a JSON-shaped driver error body.
///
/// Backends that proxy HTTP APIs often report failures as
/// `{"error": {"message": "..."}}`; forward the inner message when the
/// body parses, the raw message otherwise.
fn unwrap_backend_message(message: &str) -> String {
    if let Ok(body) = serde_json::from_str::<serde_json::Value>(message) {
        if let Some(inner) = body
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return inner.to_string();
        }
    }
    message.to_string()
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        let message = match &err {
            StoreError::Backend { message } => unwrap_backend_message(message),
            other => other.to_string(),
        };
        Error::Usage { message }
    }
}

impl From<KeyError> for Error {
    fn from(err: KeyError) -> Self {
        Error::Argument {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_becomes_usage() {
        let err: Error = StoreError::NotFound {
            key: "Book/b1".into(),
        }
        .into();
        match err {
            Error::Usage { message } => assert!(message.contains("Book/b1")),
            _ => panic!("expected Usage"),
        }
    }

    #[test]
    fn test_json_shaped_backend_message_is_unwrapped() {
        let err: Error = StoreError::Backend {
            message: r#"{"error":{"message":"quota exceeded"}}"#.into(),
        }
        .into();
        assert_eq!(
            err,
            Error::Usage {
                message: "quota exceeded".into()
            }
        );
    }

    #[test]
    fn test_plain_backend_message_passes_through() {
        let err: Error = StoreError::Backend {
            message: "connection reset".into(),
        }
        .into();
        assert_eq!(
            err,
            Error::Usage {
                message: "connection reset".into()
            }
        );
    }

    #[test]
    fn test_key_error_becomes_argument() {
        let key_err = kindling_core::Id::from_value(&kindling_core::Value::Bool(true)).unwrap_err();
        let err: Error = key_err.into();
        assert!(matches!(err, Error::Argument { .. }));
    }
}
