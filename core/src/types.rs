//! Data model for keys, values and their metadata.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// A raw value stored under a key.
pub type Value = Vec<u8>;

/// Transaction identifier.
pub type TxId = String;

/// Name of the database every deployment starts with.
pub const DEFAULT_DB: &str = "bdb";

/// Per-key access control.
///
/// An absent ACL (`None` wherever an `Option<AccessControl>` is stored) means
/// the server's default policy applies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    /// Users allowed to read the key.
    pub read_users: BTreeSet<String>,
    /// Users allowed to read and write the key.
    pub read_write_users: BTreeSet<String>,
}

impl AccessControl {
    /// Create an empty ACL.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a reader.
    pub fn reader(mut self, user: impl Into<String>) -> Self {
        self.read_users.insert(user.into());
        self
    }

    /// Add a reader-writer.
    pub fn read_writer(mut self, user: impl Into<String>) -> Self {
        self.read_write_users.insert(user.into());
        self
    }

    /// ACL granting `user` both read and read-write access.
    pub fn owner(user: impl Into<String>) -> Self {
        let user = user.into();
        Self::new().reader(user.clone()).read_writer(user)
    }

    /// Whether `user` may read the key.
    pub fn can_read(&self, user: &str) -> bool {
        self.read_users.contains(user) || self.read_write_users.contains(user)
    }

    /// Whether `user` may write the key.
    pub fn can_write(&self, user: &str) -> bool {
        self.read_write_users.contains(user)
    }
}

/// Version marker assigned by the server on commit.
///
/// Only compared for equality on the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Version {
    pub block_num: u64,
    pub tx_num: u64,
}

impl Version {
    pub fn new(block_num: u64, tx_num: u64) -> Self {
        Self { block_num, tx_num }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.block_num, self.tx_num)
    }
}

/// Metadata returned with every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub version: Version,
    pub access_control: Option<AccessControl>,
}

impl Metadata {
    pub fn new(version: Version, access_control: Option<AccessControl>) -> Self {
        Self {
            version,
            access_control,
        }
    }

    /// The ACL in effect when the value was read.
    pub fn access_control(&self) -> Option<&AccessControl> {
        self.access_control.as_ref()
    }
}

/// A value together with its metadata, as served by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KvWithMetadata {
    pub key: String,
    pub value: Value,
    pub metadata: Metadata,
}

/// Access level a user holds on a database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DbAccess {
    Read,
    ReadWrite,
}

/// Database and administrative privileges of a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Privilege {
    pub db_permission: BTreeMap<String, DbAccess>,
    pub admin: bool,
}

impl Privilege {
    /// Grant `access` on `db`.
    pub fn with_db(mut self, db: impl Into<String>, access: DbAccess) -> Self {
        self.db_permission.insert(db.into(), access);
        self
    }

    /// Administrative privilege.
    pub fn admin() -> Self {
        Self {
            db_permission: BTreeMap::new(),
            admin: true,
        }
    }

    pub fn can_read_db(&self, db: &str) -> bool {
        self.admin || self.db_permission.contains_key(db)
    }

    pub fn can_write_db(&self, db: &str) -> bool {
        self.admin || self.db_permission.get(db) == Some(&DbAccess::ReadWrite)
    }
}

/// Type of a JSON attribute a database indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexAttributeType {
    String,
    Number,
    Boolean,
}

impl IndexAttributeType {
    /// Whether `value` has this attribute type.
    pub fn matches(&self, value: &serde_json::Value) -> bool {
        match self {
            IndexAttributeType::String => value.is_string(),
            IndexAttributeType::Number => value.is_number(),
            IndexAttributeType::Boolean => value.is_boolean(),
        }
    }
}

/// Indexed attributes of a database, by attribute name.
pub type DbIndex = BTreeMap<String, IndexAttributeType>;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    /// Public key used to verify envelopes signed by this user.
    pub certificate: Vec<u8>,
    pub privilege: Privilege,
}

impl User {
    pub fn new(id: impl Into<String>, certificate: Vec<u8>, privilege: Privilege) -> Self {
        Self {
            id: id.into(),
            certificate,
            privilege,
        }
    }
}
