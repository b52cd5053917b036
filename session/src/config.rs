//! Connection and session configuration.
//!
//! Timeouts are expressed in milliseconds in configuration files:
//!
//! ```json
//! {
//!   "connection": { "replica_set": [{ "id": "bcdb1", "endpoint": "http://127.0.0.1:6001" }] },
//!   "session": { "user_id": "alice", "private_key_path": "alice.key", "tx_timeout": 10000, "query_timeout": 2000 }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bcdb_transaction::DEFAULT_TX_TIMEOUT;
use serde::{Deserialize, Serialize};

use crate::error::{SessionError, SessionResult};

/// One server node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replica {
    pub id: String,
    pub endpoint: String,
}

impl Replica {
    pub fn new(id: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            endpoint: endpoint.into(),
        }
    }
}

/// Where the remote store is reachable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub replica_set: Vec<Replica>,
    /// CA certificates the transport trusts.
    #[serde(default)]
    pub root_cas: Vec<PathBuf>,
}

impl ConnectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replica(mut self, replica: Replica) -> Self {
        self.replica_set.push(replica);
        self
    }

    pub fn validate(&self) -> SessionResult<()> {
        if self.replica_set.is_empty() {
            return Err(SessionError::config("replica set is empty"));
        }
        for (idx, replica) in self.replica_set.iter().enumerate() {
            if replica.id.is_empty() || replica.endpoint.is_empty() {
                return Err(SessionError::config(format!(
                    "replica {idx} has an empty id or endpoint"
                )));
            }
            if self.replica_set[..idx].iter().any(|r| r.id == replica.id) {
                return Err(SessionError::config(format!("duplicate replica id {}", replica.id)));
            }
        }
        Ok(())
    }
}

/// Identity and timeouts of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub user_id: String,
    /// Raw 32-byte Ed25519 secret key of the user.
    #[serde(default)]
    pub private_key_path: Option<PathBuf>,
    /// Bound on a synchronous commit.
    #[serde(default = "default_tx_timeout", with = "duration_ms")]
    pub tx_timeout: Duration,
    /// Bound on every remote read; `None` is unbounded.
    #[serde(default, with = "opt_duration_ms")]
    pub query_timeout: Option<Duration>,
}

impl SessionConfig {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            private_key_path: None,
            tx_timeout: DEFAULT_TX_TIMEOUT,
            query_timeout: None,
        }
    }

    pub fn with_private_key_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.private_key_path = Some(path.into());
        self
    }

    pub fn with_tx_timeout(mut self, timeout: Duration) -> Self {
        self.tx_timeout = timeout;
        self
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    pub fn validate(&self) -> SessionResult<()> {
        if self.user_id.is_empty() {
            return Err(SessionError::config("user id is empty"));
        }
        if self.tx_timeout.is_zero() {
            return Err(SessionError::config("tx timeout must be positive"));
        }
        Ok(())
    }
}

/// Full client configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub connection: ConnectionConfig,
    pub session: SessionConfig,
}

impl ClientConfig {
    /// Load a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> SessionResult<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| SessionError::io(path, e))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> SessionResult<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.connection.validate()?;
        config.session.validate()?;
        Ok(config)
    }
}

fn default_tx_timeout() -> Duration {
    DEFAULT_TX_TIMEOUT
}

mod duration_ms {
    use std::time::Duration;

    use serde::ser::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn millis<E: Error>(value: &Duration) -> Result<u64, E> {
        u64::try_from(value.as_millis())
            .map_err(|_| E::custom(format!("duration {value:?} does not fit in u64 milliseconds")))
    }

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(millis(value)?)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

mod opt_duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&super::duration_ms::millis::<S::Error>(d)?),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Option::<u64>::deserialize(deserializer).map(|ms| ms.map(Duration::from_millis))
    }
}
