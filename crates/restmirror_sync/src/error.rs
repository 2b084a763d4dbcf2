//! Error types for the sync engine.

use restmirror_core::CoreError;
use restmirror_storage::StorageError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during sync operations.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Schema, store or namespace error.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The request could not be sent or the server answered with a non-2xx
    /// status.
    #[error("transport error{}: {message}", status.map(|s| format!(" (status {s})")).unwrap_or_default())]
    Transport {
        /// HTTP status, `None` when the request never completed.
        status: Option<u16>,
        /// Error message, taken from the body's `errorMessage` when present.
        message: String,
    },

    /// A 2xx response carried an `errorMessage`.
    #[error("request returned an error: {message}")]
    Remote {
        /// The server's message.
        message: String,
    },

    /// The record has neither a `url` nor an identity, and no temporary key.
    #[error("missing required url or {identity_field} attribute")]
    MissingIdentity {
        /// The identity attribute of the type.
        identity_field: String,
    },

    /// A persisting create received an unusable response body.
    #[error("save failed: {message}")]
    SaveFailed {
        /// Description of the problem.
        message: String,
    },

    /// A scoped type was fetched without a value for its scope.
    #[error("no value for scope {scope:?} required by type {type_name:?}")]
    MissingScope {
        /// Scope discriminator.
        scope: String,
        /// Type being fetched.
        type_name: String,
    },
}

impl SyncError {
    /// Creates an error for a request that never completed.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Transport {
            status: None,
            message: message.into(),
        }
    }

    /// Creates an error for a non-2xx status.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Transport {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Creates a save failure.
    pub fn save_failed(message: impl Into<String>) -> Self {
        Self::SaveFailed {
            message: message.into(),
        }
    }

    /// Returns true for network failures and 5xx statuses.
    ///
    /// Nothing is retried internally; this is a hint for callers.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Transport { status: None, .. } => true,
            SyncError::Transport {
                status: Some(status),
                ..
            } => *status >= 500,
            _ => false,
        }
    }
}

impl From<StorageError> for SyncError {
    fn from(err: StorageError) -> Self {
        Self::Core(CoreError::Storage(err))
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        Self::Core(err.into())
    }
}
