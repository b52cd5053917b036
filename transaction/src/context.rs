//! Transaction context: one finality state machine shared by every
//! transaction kind.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bcdb_core::{RemoteResult, RemoteStore, Signer, SubmitOutcome, TxEnvelope, TxId, TxPayload, TxReceipt};
use rand::RngCore;
use tracing::{debug, info, warn};

use crate::error::{TransactionError, TransactionResult};

/// Default bound on a synchronous commit.
pub const DEFAULT_TX_TIMEOUT: Duration = Duration::from_secs(10);

/// Transaction state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxState {
    /// Operations may be added.
    Active,
    /// The envelope was submitted.
    Committed,
    /// The transaction was abandoned, or its submission failed.
    Aborted,
}

impl TxState {
    /// Committed and aborted transactions are spent.
    pub fn is_spent(&self) -> bool {
        !matches!(self, TxState::Active)
    }
}

/// Identity, remote handle and timeouts a transaction runs with.
///
/// Cloned into every context a session creates.
#[derive(Clone)]
pub struct SessionContext {
    signer: Arc<dyn Signer>,
    remote: Arc<dyn RemoteStore>,
    query_timeout: Option<Duration>,
    tx_timeout: Duration,
}

impl SessionContext {
    /// Create a context with an unbounded query timeout and the default tx timeout.
    pub fn new(signer: Arc<dyn Signer>, remote: Arc<dyn RemoteStore>) -> Self {
        Self {
            signer,
            remote,
            query_timeout: None,
            tx_timeout: DEFAULT_TX_TIMEOUT,
        }
    }

    pub fn with_query_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub fn with_tx_timeout(mut self, timeout: Duration) -> Self {
        self.tx_timeout = timeout;
        self
    }

    /// The session user.
    pub fn user_id(&self) -> &str {
        self.signer.user_id()
    }

    pub fn signer(&self) -> &dyn Signer {
        self.signer.as_ref()
    }

    pub fn remote(&self) -> &dyn RemoteStore {
        self.remote.as_ref()
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout
    }

    pub fn tx_timeout(&self) -> Duration {
        self.tx_timeout
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("user_id", &self.user_id())
            .field("query_timeout", &self.query_timeout)
            .field("tx_timeout", &self.tx_timeout)
            .finish_non_exhaustive()
    }
}

/// Buffered operations of one transaction kind.
pub trait TxOperations: Default {
    /// Short name used in logs.
    const KIND: &'static str;

    /// Build the payload to sign and submit.
    fn to_payload(&self, tx_id: &str, user_id: &str) -> TxPayload;
}

/// A single-use transaction.
///
/// Every operation fails with [`TransactionError::TxSpent`] once the
/// transaction was committed or aborted.
pub struct TxContext<P: TxOperations> {
    session: SessionContext,
    tx_id: TxId,
    state: TxState,
    ops: P,
    envelope: Option<TxEnvelope>,
}

impl<P: TxOperations> TxContext<P> {
    /// Create an active transaction with a fresh id.
    pub fn new(session: SessionContext) -> Self {
        let tx_id = new_tx_id();
        debug!(tx_id = %tx_id, kind = P::KIND, user = session.user_id(), "transaction opened");
        Self {
            session,
            tx_id,
            state: TxState::Active,
            ops: P::default(),
            envelope: None,
        }
    }

    pub fn tx_id(&self) -> &str {
        &self.tx_id
    }

    pub fn state(&self) -> TxState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == TxState::Active
    }

    /// Operations buffered so far.
    pub fn operations(&self) -> &P {
        &self.ops
    }

    /// The signed envelope, available after commit.
    pub fn tx_envelope(&self) -> TransactionResult<&TxEnvelope> {
        self.envelope.as_ref().ok_or_else(|| TransactionError::NotCommitted {
            tx_id: self.tx_id.clone(),
        })
    }

    // ========== Finality ==========

    /// Abandon the transaction without submitting anything.
    pub fn abort(&mut self) -> TransactionResult<()> {
        self.ensure_active()?;
        self.state = TxState::Aborted;
        debug!(tx_id = %self.tx_id, kind = P::KIND, "transaction aborted");
        Ok(())
    }

    /// Sign and submit the buffered operations.
    ///
    /// With `sync` the call waits for the receipt, which is returned as is:
    /// a receipt whose flag is not `Valid` still means the transaction was
    /// processed, so it is not turned into an error here.
    pub fn commit(&mut self, sync: bool) -> TransactionResult<(TxId, Option<TxReceipt>)> {
        self.ensure_active()?;

        let payload = self.ops.to_payload(&self.tx_id, self.session.user_id());
        let envelope = match TxEnvelope::sign(payload, self.session.signer()) {
            Ok(envelope) => envelope,
            Err(err) => {
                self.state = TxState::Aborted;
                return Err(err.into());
            }
        };

        let sync_timeout = sync.then_some(self.session.tx_timeout());
        let outcome = self.session.remote().submit(&envelope, sync_timeout);

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(err) => {
                self.state = TxState::Aborted;
                warn!(tx_id = %self.tx_id, kind = P::KIND, error = %err, "transaction submission failed");
                return Err(err.into());
            }
        };

        self.state = TxState::Committed;
        self.envelope = Some(envelope);

        match outcome {
            SubmitOutcome::Receipt(receipt) => {
                info!(
                    tx_id = %self.tx_id,
                    kind = P::KIND,
                    block = receipt.header.number,
                    tx_index = receipt.tx_index,
                    flag = ?receipt.flag(),
                    "transaction committed"
                );
                Ok((self.tx_id.clone(), Some(receipt)))
            }
            SubmitOutcome::Accepted if sync => {
                warn!(tx_id = %self.tx_id, kind = P::KIND, "receipt not received within tx timeout");
                Err(TransactionError::CommitTimeout {
                    tx_id: self.tx_id.clone(),
                })
            }
            SubmitOutcome::Accepted => {
                info!(tx_id = %self.tx_id, kind = P::KIND, "transaction submitted asynchronously");
                Ok((self.tx_id.clone(), None))
            }
        }
    }

    // ========== Internal Helpers ==========

    pub(crate) fn ensure_active(&self) -> TransactionResult<()> {
        if self.state.is_spent() {
            return Err(TransactionError::TxSpent);
        }
        Ok(())
    }

    pub(crate) fn ops_mut(&mut self) -> &mut P {
        &mut self.ops
    }

    /// Run a remote read with the session identity and query timeout.
    pub(crate) fn read_remote<T>(
        &self,
        read: impl FnOnce(&dyn RemoteStore, &str, Option<Duration>) -> RemoteResult<T>,
    ) -> TransactionResult<T> {
        read(
            self.session.remote(),
            self.session.user_id(),
            self.session.query_timeout(),
        )
        .map_err(TransactionError::from)
    }
}

impl<P: TxOperations + fmt::Debug> fmt::Debug for TxContext<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TxContext")
            .field("tx_id", &self.tx_id)
            .field("state", &self.state)
            .field("ops", &self.ops)
            .finish_non_exhaustive()
    }
}

pub(crate) fn require_non_empty(what: &str, value: &str) -> TransactionResult<()> {
    if value.is_empty() {
        return Err(TransactionError::invalid_argument(format!("{what} is empty")));
    }
    Ok(())
}

fn new_tx_id() -> TxId {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
