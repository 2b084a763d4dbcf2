//! Error types for RestMirror core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in store, schema and namespace operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The type name is not declared in the schema registry.
    #[error("invalid type {name:?}; acceptable types are: {}", valid.join(", "))]
    UnknownType {
        /// The rejected type name.
        name: String,
        /// Every type name the registry declares.
        valid: Vec<String>,
    },

    /// A `find`/`find_all` argument has an unsupported shape.
    #[error("invalid query: {message}")]
    InvalidQuery {
        /// Description of the problem.
        message: String,
    },

    /// JSON text from the transport or the cache could not be decoded.
    #[error("malformed response: {message}")]
    MalformedResponse {
        /// Description of the decoding failure.
        message: String,
    },

    /// The reserved base namespace was used as a switch target.
    #[error("namespace {id:?} is reserved and cannot be used")]
    ReservedNamespace {
        /// The rejected namespace id.
        id: String,
    },

    /// Cache backend error.
    #[error("storage error: {0}")]
    Storage(#[from] restmirror_storage::StorageError),
}

impl CoreError {
    /// Creates an invalid query error.
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    /// Creates a malformed response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Creates a reserved namespace error.
    pub fn reserved_namespace(id: impl Into<String>) -> Self {
        Self::ReservedNamespace { id: id.into() }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::malformed(err.to_string())
    }
}
