//! BCDB Transaction
//!
//! Client-side optimistic transactions.
//!
//! Responsibilities:
//! - Track reads, writes and deletes per database (operation sets)
//! - Memoize the first read of every key (stable OCC read-set)
//! - Enforce single use: Active -> Committed | Aborted, exactly once
//! - Build, sign and submit the transaction envelope
//! - Return receipts as-is; MVCC and ACL outcomes are decided by the server

mod buffer;
mod context;
mod data;
mod dbs;
mod error;
mod users;


pub use buffer::{DbOperationSet, ReadEntry, WriteEntry};
pub use context::{SessionContext, TxContext, TxOperations, TxState, DEFAULT_TX_TIMEOUT};
pub use data::{DataOperations, DataTxContext};
pub use dbs::{DbOperations, DbsTxContext};
pub use error::{TransactionError, TransactionResult};
pub use users::{UserOperations, UserReadEntry, UsersTxContext};
