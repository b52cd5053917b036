//! Transaction error types.

use std::time::Duration;

use bcdb_core::{RemoteError, TxId};
use thiserror::Error;

/// Transaction errors.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// The transaction was already committed or aborted.
    #[error("can't access spent transaction")]
    TxSpent,

    /// The server refused access for the session identity.
    #[error("error handling request, server returned: {message}")]
    PermissionDenied { message: String },

    /// A remote read exceeded the session query timeout.
    #[error("queryTimeout error: remote read did not complete within {timeout:?}")]
    Timeout { timeout: Duration },

    /// Any other failure reported by the remote store.
    #[error("error handling request, server returned: {0}")]
    Remote(RemoteError),

    /// Synchronous commit was accepted but no receipt arrived in time.
    #[error("timeout while waiting for the receipt of transaction {tx_id}, check the ledger for its status")]
    CommitTimeout { tx_id: TxId },

    /// The envelope was requested before the transaction was committed.
    #[error("transaction {tx_id} has not been committed")]
    NotCommitted { tx_id: TxId },

    /// Invalid caller input.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// The payload could not be encoded for signing.
    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl TransactionError {
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn is_spent(&self) -> bool {
        matches!(self, Self::TxSpent)
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

impl From<RemoteError> for TransactionError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Timeout { timeout } => Self::Timeout { timeout },
            err if err.is_forbidden() => Self::permission_denied(err.to_string()),
            err => Self::Remote(err),
        }
    }
}

/// Result type for transaction operations.
pub type TransactionResult<T> = Result<T, TransactionError>;
