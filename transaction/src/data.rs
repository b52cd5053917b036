//! Data transactions: reads, writes and deletes of keys across databases.

use std::collections::HashMap;

use bcdb_core::{AccessControl, DataTx, Metadata, TxPayload, Value};
use tracing::{debug, warn};

use crate::buffer::DbOperationSet;
use crate::context::{require_non_empty, TxContext, TxOperations};
use crate::error::TransactionResult;

/// Operation sets of a data transaction, one per touched database.
#[derive(Debug, Clone, Default)]
pub struct DataOperations {
    dbs: HashMap<String, DbOperationSet>,
}

impl DataOperations {
    /// Operation set of `db`, if the transaction touched it.
    pub fn db(&self, db: &str) -> Option<&DbOperationSet> {
        self.dbs.get(db)
    }

    /// Names of the touched databases.
    pub fn db_names(&self) -> impl Iterator<Item = &str> {
        self.dbs.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.dbs.values().all(DbOperationSet::is_empty)
    }

    fn db_mut(&mut self, db: &str) -> &mut DbOperationSet {
        self.dbs.entry(db.to_string()).or_default()
    }
}

impl TxOperations for DataOperations {
    const KIND: &'static str = "data";

    fn to_payload(&self, tx_id: &str, user_id: &str) -> TxPayload {
        let mut db_operations: Vec<_> = self
            .dbs
            .iter()
            .map(|(name, set)| set.to_db_operation(name))
            .collect();
        db_operations.sort_by(|a, b| a.db_name.cmp(&b.db_name));

        TxPayload::Data(DataTx {
            tx_id: tx_id.to_string(),
            must_sign_user_ids: vec![user_id.to_string()],
            db_operations,
        })
    }
}

/// Transaction over keys of one or more databases.
pub type DataTxContext = TxContext<DataOperations>;

impl TxContext<DataOperations> {
    /// Read `key` from `db`.
    ///
    /// The first read of a key goes to the remote store and is memoized; later
    /// reads in the same transaction return that snapshot. A missing key is
    /// `(None, None)`. Failed reads are not memoized.
    pub fn get(&mut self, db: &str, key: &str) -> TransactionResult<(Option<Value>, Option<Metadata>)> {
        self.ensure_active()?;
        require_non_empty("database name", db)?;
        require_non_empty("key", key)?;

        if let Some(entry) = self.operations().db(db).and_then(|set| set.read(key)) {
            debug!(tx_id = %self.tx_id(), db, key, "serving memoized read");
            return Ok((entry.value.clone(), entry.metadata.clone()));
        }

        let kv = self
            .read_remote(|remote, user, timeout| remote.get_data(user, db, key, timeout))
            .inspect_err(|err| warn!(tx_id = %self.tx_id(), db, key, error = %err, "remote read failed"))?;

        let (value, metadata) = match kv {
            Some(kv) => (Some(kv.value), Some(kv.metadata)),
            None => (None, None),
        };
        debug!(tx_id = %self.tx_id(), db, key, found = value.is_some(), "key read");
        self.ops_mut()
            .db_mut(db)
            .record_read(key, value.clone(), metadata.clone());

        Ok((value, metadata))
    }

    /// Buffer a write of `key` in `db`.
    pub fn put(&mut self, db: &str, key: &str, value: Value, acl: Option<AccessControl>) -> TransactionResult<()> {
        self.ensure_active()?;
        require_non_empty("database name", db)?;
        require_non_empty("key", key)?;

        debug!(tx_id = %self.tx_id(), db, key, "write buffered");
        self.ops_mut().db_mut(db).record_write(key, value, acl);
        Ok(())
    }

    /// Buffer a delete of `key` in `db`.
    pub fn delete(&mut self, db: &str, key: &str) -> TransactionResult<()> {
        self.ensure_active()?;
        require_non_empty("database name", db)?;
        require_non_empty("key", key)?;

        debug!(tx_id = %self.tx_id(), db, key, "delete buffered");
        self.ops_mut().db_mut(db).record_delete(key);
        Ok(())
    }
}
