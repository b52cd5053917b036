//! Session error types.

use std::path::{Path, PathBuf};
use std::time::Duration;

use bcdb_core::{IdentityError, RemoteError, TxId};
use bcdb_transaction::TransactionError;
use thiserror::Error;

/// Session errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Invalid connection or session configuration.
    #[error("invalid configuration: {message}")]
    Config { message: String },

    /// Configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid JSON.
    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// Signing identity could not be loaded.
    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Transaction error.
    #[error("transaction error: {0}")]
    Transaction(#[from] TransactionError),

    /// Remote store error.
    #[error("error handling request, server returned: {0}")]
    Remote(#[from] RemoteError),

    /// No final receipt within the caller's bound.
    #[error("receipt of transaction {tx_id} not available after {timeout:?}")]
    ReceiptTimeout { tx_id: TxId, timeout: Duration },
}

impl SessionError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
