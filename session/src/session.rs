//! Connection handle and sessions.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bcdb_core::{Ed25519Signer, RemoteStore, Signer};
use bcdb_transaction::{DataTxContext, DbsTxContext, SessionContext, UsersTxContext};
use tracing::info;

use crate::config::{ConnectionConfig, SessionConfig};
use crate::error::{SessionError, SessionResult};
use crate::json_query::JsonQuery;
use crate::ledger::Ledger;

/// Session ID type.
pub type SessionId = u64;

/// Connection to a BCDB replica set.
///
/// Sessions opened from one connection share the remote store handle.
pub struct Bcdb {
    config: ConnectionConfig,
    remote: Arc<dyn RemoteStore>,
    /// Next session ID to assign.
    next_session_id: AtomicU64,
}

impl Bcdb {
    /// Connect to the replica set served by `remote`.
    pub fn connect(config: ConnectionConfig, remote: Arc<dyn RemoteStore>) -> SessionResult<Self> {
        config.validate()?;
        info!(replicas = config.replica_set.len(), "connected to replica set");
        Ok(Self {
            config,
            remote,
            next_session_id: AtomicU64::new(1),
        })
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Open a session for the user `signer` signs for.
    pub fn session(&self, config: &SessionConfig, signer: Arc<dyn Signer>) -> SessionResult<Session> {
        config.validate()?;
        if signer.user_id() != config.user_id {
            return Err(SessionError::config(format!(
                "signer identity {} does not match session user {}",
                signer.user_id(),
                config.user_id
            )));
        }

        let id = self.next_session_id.fetch_add(1, Ordering::Relaxed);
        let context = SessionContext::new(signer, Arc::clone(&self.remote))
            .with_query_timeout(config.query_timeout)
            .with_tx_timeout(config.tx_timeout);
        info!(session = id, user = %config.user_id, "session opened");
        Ok(Session { id, context })
    }

    /// Open a session, loading the signing key from `config.private_key_path`.
    pub fn session_from_key_file(&self, config: &SessionConfig) -> SessionResult<Session> {
        let path = config
            .private_key_path
            .as_ref()
            .ok_or_else(|| SessionError::config("private key path is not set"))?;
        let signer = Ed25519Signer::from_key_file(config.user_id.clone(), path)?;
        self.session(config, Arc::new(signer))
    }
}

/// A user's session: a factory of transaction contexts.
///
/// Every context created here carries the session identity and timeouts;
/// contexts are independent of each other.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    context: SessionContext,
}

impl Session {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn user_id(&self) -> &str {
        self.context.user_id()
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Start a data transaction.
    pub fn data_tx(&self) -> SessionResult<DataTxContext> {
        Ok(DataTxContext::new(self.context.clone()))
    }

    /// Start a user administration transaction.
    pub fn users_tx(&self) -> SessionResult<UsersTxContext> {
        Ok(UsersTxContext::new(self.context.clone()))
    }

    /// Start a database administration transaction.
    pub fn dbs_tx(&self) -> SessionResult<DbsTxContext> {
        Ok(DbsTxContext::new(self.context.clone()))
    }

    /// Ledger view for finality checks.
    pub fn ledger(&self) -> SessionResult<Ledger> {
        Ok(Ledger::new(self.context.clone()))
    }

    /// Handle for JSON queries, bounded by the session query timeout.
    pub fn json_query(&self) -> SessionResult<JsonQuery> {
        Ok(JsonQuery::new(self.context.clone()))
    }
}
