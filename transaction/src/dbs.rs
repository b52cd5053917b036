//! Database administration transactions.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use bcdb_core::{DbAdministrationTx, DbIndex, TxPayload};
use tracing::{debug, warn};

use crate::context::{require_non_empty, TxContext, TxOperations};
use crate::error::{TransactionError, TransactionResult};

/// Buffered database creations and deletions.
#[derive(Debug, Clone, Default)]
pub struct DbOperations {
    creates: BTreeSet<String>,
    deletes: BTreeSet<String>,
    indexes: BTreeMap<String, DbIndex>,
    exists: HashMap<String, bool>,
}

impl DbOperations {
    pub fn is_created(&self, db: &str) -> bool {
        self.creates.contains(db)
    }

    pub fn is_deleted(&self, db: &str) -> bool {
        self.deletes.contains(db)
    }

    /// Index buffered for the creation of `db`.
    pub fn index(&self, db: &str) -> Option<&DbIndex> {
        self.indexes.get(db)
    }
}

impl TxOperations for DbOperations {
    const KIND: &'static str = "dbs";

    fn to_payload(&self, tx_id: &str, user_id: &str) -> TxPayload {
        TxPayload::Dbs(DbAdministrationTx {
            tx_id: tx_id.to_string(),
            user_id: user_id.to_string(),
            create_dbs: self.creates.iter().cloned().collect(),
            delete_dbs: self.deletes.iter().cloned().collect(),
            db_indexes: self.indexes.clone(),
        })
    }
}

/// Transaction over database definitions.
pub type DbsTxContext = TxContext<DbOperations>;

impl TxContext<DbOperations> {
    /// Buffer creation of `db`, optionally indexing JSON attributes of its values.
    pub fn create_db(&mut self, db: &str, index: Option<DbIndex>) -> TransactionResult<()> {
        self.ensure_active()?;
        require_non_empty("database name", db)?;
        if index.iter().flat_map(|i| i.keys()).any(String::is_empty) {
            return Err(TransactionError::invalid_argument("index attribute is empty"));
        }

        debug!(tx_id = %self.tx_id(), db, indexed = index.is_some(), "database creation buffered");
        let ops = self.ops_mut();
        ops.deletes.remove(db);
        ops.creates.insert(db.to_string());
        match index {
            Some(index) => ops.indexes.insert(db.to_string(), index),
            None => ops.indexes.remove(db),
        };
        Ok(())
    }

    /// Buffer deletion of `db`.
    pub fn delete_db(&mut self, db: &str) -> TransactionResult<()> {
        self.ensure_active()?;
        require_non_empty("database name", db)?;

        debug!(tx_id = %self.tx_id(), db, "database deletion buffered");
        let ops = self.ops_mut();
        ops.creates.remove(db);
        ops.indexes.remove(db);
        ops.deletes.insert(db.to_string());
        Ok(())
    }

    /// Whether `db` exists on the server, as first observed in this transaction.
    pub fn exists(&mut self, db: &str) -> TransactionResult<bool> {
        self.ensure_active()?;
        require_non_empty("database name", db)?;

        if let Some(exists) = self.operations().exists.get(db) {
            return Ok(*exists);
        }
        let exists = self
            .read_remote(|remote, user, timeout| remote.db_exists(user, db, timeout))
            .inspect_err(|err| warn!(tx_id = %self.tx_id(), db, error = %err, "remote read failed"))?;
        self.ops_mut().exists.insert(db.to_string(), exists);
        Ok(exists)
    }
}
