//! Contract of the remote store the client talks to.
//!
//! The transport, its wire format and retry policy belong to the
//! implementation; the transaction engine only relies on this trait.

use std::time::Duration;

use crate::envelope::TxEnvelope;
use crate::error::RemoteResult;
use crate::receipt::TxReceipt;
use crate::types::{KvWithMetadata, Metadata, User};

/// Result of submitting an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The transaction was placed in a block and validated.
    Receipt(TxReceipt),
    /// The transaction was accepted; finality must be observed through the ledger.
    Accepted,
}

/// Remote key-value store.
///
/// `timeout` bounds a single call; `None` means unbounded. Reads of a missing
/// key or user return `Ok(None)`, access refusal is a 403 status.
pub trait RemoteStore: Send + Sync {
    /// Read `key` from `db` on behalf of `user_id`.
    fn get_data(
        &self,
        user_id: &str,
        db: &str,
        key: &str,
        timeout: Option<Duration>,
    ) -> RemoteResult<Option<KvWithMetadata>>;

    /// Read the user record `target_user` on behalf of `user_id`.
    fn get_user(
        &self,
        user_id: &str,
        target_user: &str,
        timeout: Option<Duration>,
    ) -> RemoteResult<Option<(User, Metadata)>>;

    /// Check whether database `db` exists.
    fn db_exists(&self, user_id: &str, db: &str, timeout: Option<Duration>) -> RemoteResult<bool>;

    /// Evaluate a JSON selector `query` over the indexed attributes of `db`.
    ///
    /// Only keys `user_id` may read are returned. A malformed query is a 400 status.
    fn query(
        &self,
        user_id: &str,
        db: &str,
        query: &str,
        timeout: Option<Duration>,
    ) -> RemoteResult<Vec<KvWithMetadata>>;

    /// Submit a signed envelope.
    ///
    /// With `sync_timeout` set the call waits up to that long for the receipt;
    /// with `None` it returns as soon as the envelope is accepted.
    fn submit(&self, envelope: &TxEnvelope, sync_timeout: Option<Duration>) -> RemoteResult<SubmitOutcome>;

    /// Look up the receipt of `tx_id`; `None` until the transaction is in a block.
    fn get_receipt(&self, user_id: &str, tx_id: &str) -> RemoteResult<Option<TxReceipt>>;
}
