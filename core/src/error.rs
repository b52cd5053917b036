//! Common error types for the BCDB client.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// Errors reported by a remote store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The server answered with a non-success status.
    #[error("status: {code} {reason}, message: {message}")]
    Status {
        code: u16,
        reason: String,
        message: String,
    },

    /// The request did not complete within the caller's timeout.
    #[error("queryTimeout error: request did not complete within {timeout:?}")]
    Timeout { timeout: Duration },

    /// Network or connection failure.
    #[error("connection error: {0}")]
    Connection(String),
}

impl RemoteError {
    pub fn status(code: u16, reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Status {
            code,
            reason: reason.into(),
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::status(403, "Forbidden", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::status(401, "Unauthorized", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::status(404, "Not Found", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::status(400, "Bad Request", message)
    }

    pub fn timeout(timeout: Duration) -> Self {
        Self::Timeout { timeout }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Whether the server refused access.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Status { code: 403, .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Result type for remote calls.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors loading a signing identity.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Key file could not be read.
    #[error("failed to read key file {path}: {source}")]
    KeyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Key material has the wrong size.
    #[error("invalid key length: expected 32 bytes, got {len}")]
    InvalidKeyLength { len: usize },
}

impl IdentityError {
    pub fn key_file(path: &Path, source: std::io::Error) -> Self {
        Self::KeyFile {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for identity loading.
pub type IdentityResult<T> = Result<T, IdentityError>;
