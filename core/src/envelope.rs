//! Transaction envelopes: the signed, submittable form of a transaction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::identity::{verify_signature, Signer};
use crate::types::{AccessControl, DbIndex, TxId, User, Value, Version};

/// A key read inside a transaction, with the version observed at read time.
///
/// `version` is `None` when the key did not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataRead {
    pub key: String,
    pub version: Option<Version>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataWrite {
    pub key: String,
    pub value: Value,
    pub acl: Option<AccessControl>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataDelete {
    pub key: String,
}

/// Operations on one database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbOperation {
    pub db_name: String,
    pub data_reads: Vec<DataRead>,
    pub data_writes: Vec<DataWrite>,
    pub data_deletes: Vec<DataDelete>,
}

/// Data transaction payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTx {
    pub tx_id: TxId,
    pub must_sign_user_ids: Vec<String>,
    pub db_operations: Vec<DbOperation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRead {
    pub user_id: String,
    pub version: Option<Version>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserWrite {
    pub user: User,
    pub acl: Option<AccessControl>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDelete {
    pub user_id: String,
}

/// User administration payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAdministrationTx {
    pub tx_id: TxId,
    pub user_id: String,
    pub user_reads: Vec<UserRead>,
    pub user_writes: Vec<UserWrite>,
    pub user_deletes: Vec<UserDelete>,
}

/// Database administration payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbAdministrationTx {
    pub tx_id: TxId,
    pub user_id: String,
    pub create_dbs: Vec<String>,
    pub delete_dbs: Vec<String>,
    /// Indexed attributes of created databases; absent for unindexed ones.
    #[serde(default)]
    pub db_indexes: BTreeMap<String, DbIndex>,
}

/// Payload of any transaction kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxPayload {
    Data(DataTx),
    Users(UserAdministrationTx),
    Dbs(DbAdministrationTx),
}

impl TxPayload {
    pub fn tx_id(&self) -> &str {
        match self {
            TxPayload::Data(tx) => &tx.tx_id,
            TxPayload::Users(tx) => &tx.tx_id,
            TxPayload::Dbs(tx) => &tx.tx_id,
        }
    }

    /// The user whose signature authenticates the envelope.
    pub fn submitter(&self) -> &str {
        match self {
            TxPayload::Data(tx) => tx
                .must_sign_user_ids
                .first()
                .map(String::as_str)
                .unwrap_or_default(),
            TxPayload::Users(tx) => &tx.user_id,
            TxPayload::Dbs(tx) => &tx.user_id,
        }
    }

    /// Canonical bytes covered by the signature.
    pub fn signed_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

/// A signed payload ready for submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxEnvelope {
    pub payload: TxPayload,
    pub signature: Vec<u8>,
}

impl TxEnvelope {
    /// Sign `payload` with `signer`.
    pub fn sign(payload: TxPayload, signer: &dyn Signer) -> serde_json::Result<Self> {
        let bytes = payload.signed_bytes()?;
        let signature = signer.sign(&bytes);
        Ok(Self { payload, signature })
    }

    pub fn tx_id(&self) -> &str {
        self.payload.tx_id()
    }

    /// Check the signature against `public_key`.
    pub fn verify(&self, public_key: &[u8]) -> bool {
        match self.payload.signed_bytes() {
            Ok(bytes) => verify_signature(public_key, &bytes, &self.signature),
            Err(_) => false,
        }
    }
}
