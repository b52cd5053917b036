//! Per-database operation set for tracking a transaction's intents.

use std::collections::{HashMap, HashSet};

use bcdb_core::{AccessControl, DataDelete, DataRead, DataWrite, DbOperation, Metadata, Value};

/// A key observed by the transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadEntry {
    /// The key.
    pub key: String,
    /// The value seen at first read (`None` if the key did not exist).
    pub value: Option<Value>,
    /// The metadata seen at first read.
    pub metadata: Option<Metadata>,
}

/// A pending write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteEntry {
    /// The key.
    pub key: String,
    /// The new value.
    pub value: Value,
    /// The ACL to attach to the key.
    pub acl: Option<AccessControl>,
}

/// Reads, writes and deletes of one transaction on one database.
///
/// A key never holds both a write and a delete: recording one evicts the other.
#[derive(Debug, Clone, Default)]
pub struct DbOperationSet {
    /// Keys read in this transaction, first read wins.
    reads: HashMap<String, ReadEntry>,
    /// Keys written in this transaction, last write wins.
    writes: HashMap<String, WriteEntry>,
    /// Keys deleted in this transaction.
    deletes: HashSet<String>,
}

impl DbOperationSet {
    /// Create a new empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a read. Returns false if the key was already read, in which
    /// case the stored snapshot is left untouched.
    pub fn record_read(&mut self, key: &str, value: Option<Value>, metadata: Option<Metadata>) -> bool {
        if self.reads.contains_key(key) {
            return false;
        }
        self.reads.insert(
            key.to_string(),
            ReadEntry {
                key: key.to_string(),
                value,
                metadata,
            },
        );
        true
    }

    /// Record a write, replacing any earlier write or delete of the key.
    pub fn record_write(&mut self, key: &str, value: Value, acl: Option<AccessControl>) {
        self.deletes.remove(key);
        self.writes.insert(
            key.to_string(),
            WriteEntry {
                key: key.to_string(),
                value,
                acl,
            },
        );
    }

    /// Record a delete, replacing any earlier write of the key.
    pub fn record_delete(&mut self, key: &str) {
        self.writes.remove(key);
        self.deletes.insert(key.to_string());
    }

    /// Get the read snapshot of a key.
    pub fn read(&self, key: &str) -> Option<&ReadEntry> {
        self.reads.get(key)
    }

    /// Get the pending write of a key.
    pub fn write(&self, key: &str) -> Option<&WriteEntry> {
        self.writes.get(key)
    }

    /// Check if a key is marked for deletion.
    pub fn is_deleted(&self, key: &str) -> bool {
        self.deletes.contains(key)
    }

    /// Get all reads.
    pub fn reads(&self) -> impl Iterator<Item = &ReadEntry> {
        self.reads.values()
    }

    /// Get all writes.
    pub fn writes(&self) -> impl Iterator<Item = &WriteEntry> {
        self.writes.values()
    }

    /// Get all deleted keys.
    pub fn deletes(&self) -> impl Iterator<Item = &str> {
        self.deletes.iter().map(String::as_str)
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.reads.is_empty() && self.writes.is_empty() && self.deletes.is_empty()
    }

    /// Envelope form of this set. Entries are sorted by key so the signed
    /// bytes do not depend on map iteration order.
    pub fn to_db_operation(&self, db_name: &str) -> DbOperation {
        let mut data_reads: Vec<DataRead> = self
            .reads
            .values()
            .map(|entry| DataRead {
                key: entry.key.clone(),
                version: entry.metadata.as_ref().map(|m| m.version),
            })
            .collect();
        data_reads.sort_by(|a, b| a.key.cmp(&b.key));

        let mut data_writes: Vec<DataWrite> = self
            .writes
            .values()
            .map(|entry| DataWrite {
                key: entry.key.clone(),
                value: entry.value.clone(),
                acl: entry.acl.clone(),
            })
            .collect();
        data_writes.sort_by(|a, b| a.key.cmp(&b.key));

        let mut data_deletes: Vec<DataDelete> = self
            .deletes
            .iter()
            .map(|key| DataDelete { key: key.clone() })
            .collect();
        data_deletes.sort_by(|a, b| a.key.cmp(&b.key));

        DbOperation {
            db_name: db_name.to_string(),
            data_reads,
            data_writes,
            data_deletes,
        }
    }
}
