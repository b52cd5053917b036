//! Transaction receipts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation outcome of one transaction inside a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Flag {
    Valid,
    InvalidMvccConflictWithCommittedState,
    InvalidNoPermission,
    InvalidDatabaseDoesNotExist,
    InvalidIncorrectEntries,
    InvalidUnauthorisedUser,
}

impl Flag {
    pub fn is_valid(&self) -> bool {
        matches!(self, Flag::Valid)
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Flag::Valid => "VALID",
            Flag::InvalidMvccConflictWithCommittedState => "INVALID_MVCC_CONFLICT_WITH_COMMITTED_STATE",
            Flag::InvalidNoPermission => "INVALID_NO_PERMISSION",
            Flag::InvalidDatabaseDoesNotExist => "INVALID_DATABASE_DOES_NOT_EXIST",
            Flag::InvalidIncorrectEntries => "INVALID_INCORRECT_ENTRIES",
            Flag::InvalidUnauthorisedUser => "INVALID_UNAUTHORISED_USER",
        };
        f.write_str(name)
    }
}

/// Flag plus a human readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationInfo {
    pub flag: Flag,
    pub reason: String,
}

impl ValidationInfo {
    pub fn valid() -> Self {
        Self {
            flag: Flag::Valid,
            reason: String::new(),
        }
    }

    pub fn invalid(flag: Flag, reason: impl Into<String>) -> Self {
        Self {
            flag,
            reason: reason.into(),
        }
    }
}

/// Header of the block a transaction was placed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub number: u64,
    /// One entry per transaction in the block, in block order.
    pub validation_info: Vec<ValidationInfo>,
}

/// Server-issued proof of a transaction's position and outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub header: BlockHeader,
    pub tx_index: u64,
}

impl TxReceipt {
    /// Whether the block carries validation info for this transaction yet.
    pub fn is_final(&self) -> bool {
        self.header.validation_info.len() as u64 > self.tx_index
    }

    /// Validation info of this transaction, once final.
    pub fn validation(&self) -> Option<&ValidationInfo> {
        usize::try_from(self.tx_index)
            .ok()
            .and_then(|idx| self.header.validation_info.get(idx))
    }

    /// Validation flag of this transaction, once final.
    pub fn flag(&self) -> Option<Flag> {
        self.validation().map(|info| info.flag)
    }

    /// Whether the transaction was applied.
    pub fn is_valid(&self) -> bool {
        self.flag().is_some_and(|flag| flag.is_valid())
    }
}
