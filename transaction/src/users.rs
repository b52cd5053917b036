//! User administration transactions.

use std::collections::{HashMap, HashSet};

use bcdb_core::{AccessControl, TxPayload, User, UserAdministrationTx, UserDelete, UserRead, UserWrite, Version};
use tracing::{debug, warn};

use crate::context::{require_non_empty, TxContext, TxOperations};
use crate::error::TransactionResult;

/// A user record observed by the transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserReadEntry {
    pub user: Option<User>,
    pub version: Option<Version>,
}

/// Buffered user reads, writes and deletes.
#[derive(Debug, Clone, Default)]
pub struct UserOperations {
    reads: HashMap<String, UserReadEntry>,
    writes: HashMap<String, UserWrite>,
    deletes: HashSet<String>,
}

impl UserOperations {
    pub fn read(&self, user_id: &str) -> Option<&UserReadEntry> {
        self.reads.get(user_id)
    }

    pub fn write(&self, user_id: &str) -> Option<&UserWrite> {
        self.writes.get(user_id)
    }

    pub fn is_deleted(&self, user_id: &str) -> bool {
        self.deletes.contains(user_id)
    }
}

impl TxOperations for UserOperations {
    const KIND: &'static str = "users";

    fn to_payload(&self, tx_id: &str, user_id: &str) -> TxPayload {
        let mut user_reads: Vec<_> = self
            .reads
            .iter()
            .map(|(id, entry)| UserRead {
                user_id: id.clone(),
                version: entry.version,
            })
            .collect();
        user_reads.sort_by(|a, b| a.user_id.cmp(&b.user_id));

        let mut user_writes: Vec<_> = self.writes.values().cloned().collect();
        user_writes.sort_by(|a, b| a.user.id.cmp(&b.user.id));

        let mut user_deletes: Vec<_> = self
            .deletes
            .iter()
            .map(|id| UserDelete { user_id: id.clone() })
            .collect();
        user_deletes.sort_by(|a, b| a.user_id.cmp(&b.user_id));

        TxPayload::Users(UserAdministrationTx {
            tx_id: tx_id.to_string(),
            user_id: user_id.to_string(),
            user_reads,
            user_writes,
            user_deletes,
        })
    }
}

/// Transaction over user records.
pub type UsersTxContext = TxContext<UserOperations>;

impl TxContext<UserOperations> {
    /// Read a user record; memoized like data reads.
    pub fn get_user(&mut self, user_id: &str) -> TransactionResult<Option<User>> {
        self.ensure_active()?;
        require_non_empty("user id", user_id)?;

        if let Some(entry) = self.operations().read(user_id) {
            return Ok(entry.user.clone());
        }

        let found = self
            .read_remote(|remote, requester, timeout| remote.get_user(requester, user_id, timeout))
            .inspect_err(|err| warn!(tx_id = %self.tx_id(), user_id, error = %err, "remote read failed"))?;
        let entry = match found {
            Some((user, metadata)) => UserReadEntry {
                user: Some(user),
                version: Some(metadata.version),
            },
            None => UserReadEntry {
                user: None,
                version: None,
            },
        };
        let user = entry.user.clone();
        self.ops_mut().reads.insert(user_id.to_string(), entry);
        Ok(user)
    }

    /// Buffer creation or update of a user.
    pub fn put_user(&mut self, user: User, acl: Option<AccessControl>) -> TransactionResult<()> {
        self.ensure_active()?;
        require_non_empty("user id", &user.id)?;

        debug!(tx_id = %self.tx_id(), user = %user.id, "user write buffered");
        let ops = self.ops_mut();
        ops.deletes.remove(&user.id);
        ops.writes.insert(user.id.clone(), UserWrite { user, acl });
        Ok(())
    }

    /// Buffer removal of a user.
    pub fn remove_user(&mut self, user_id: &str) -> TransactionResult<()> {
        self.ensure_active()?;
        require_non_empty("user id", user_id)?;

        debug!(tx_id = %self.tx_id(), user = user_id, "user delete buffered");
        let ops = self.ops_mut();
        ops.writes.remove(user_id);
        ops.deletes.insert(user_id.to_string());
        Ok(())
    }
}
