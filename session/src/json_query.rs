//! JSON queries over indexed attributes of a database.

use bcdb_core::KvWithMetadata;
use bcdb_transaction::{SessionContext, TransactionError};
use tracing::{debug, warn};

use crate::error::{SessionError, SessionResult};

/// Runs selector queries against committed state.
///
/// A query looks like `{"selector": {"age": {"$eq": 30}}}`; every attribute it
/// names must be indexed by the database. Each call is bounded by the session
/// query timeout and only returns keys the session user may read.
#[derive(Debug, Clone)]
pub struct JsonQuery {
    context: SessionContext,
}

impl JsonQuery {
    pub(crate) fn new(context: SessionContext) -> Self {
        Self { context }
    }

    /// Execute `query` against `db`.
    pub fn execute(&self, db: &str, query: &str) -> SessionResult<Vec<KvWithMetadata>> {
        if db.is_empty() {
            return Err(SessionError::config("database name is empty"));
        }
        if query.trim().is_empty() {
            return Err(SessionError::config("query is empty"));
        }

        let kvs = self
            .context
            .remote()
            .query(self.context.user_id(), db, query, self.context.query_timeout())
            .map_err(TransactionError::from)
            .inspect_err(|err| warn!(db, error = %err, "json query failed"))?;
        debug!(db, matched = kvs.len(), "json query executed");
        Ok(kvs)
    }
}
