//! Ledger view: transaction receipts.

use std::thread;
use std::time::{Duration, Instant};

use bcdb_core::TxReceipt;
use bcdb_transaction::SessionContext;
use tracing::{debug, warn};

use crate::error::{SessionError, SessionResult};

/// Default interval between receipt lookups.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Read access to committed blocks, used to observe finality of
/// asynchronously submitted transactions.
#[derive(Debug, Clone)]
pub struct Ledger {
    context: SessionContext,
}

impl Ledger {
    pub(crate) fn new(context: SessionContext) -> Self {
        Self { context }
    }

    /// Receipt of `tx_id`, or `None` while it is not in a block yet.
    pub fn get_transaction_receipt(&self, tx_id: &str) -> SessionResult<Option<TxReceipt>> {
        if tx_id.is_empty() {
            return Err(SessionError::config("transaction id is empty"));
        }
        let receipt = self.context.remote().get_receipt(self.context.user_id(), tx_id)?;
        Ok(receipt.filter(TxReceipt::is_final))
    }

    /// Poll until `tx_id` is final or `timeout` elapses.
    pub fn wait_for_receipt(
        &self,
        tx_id: &str,
        timeout: Duration,
        poll_interval: Duration,
    ) -> SessionResult<TxReceipt> {
        // A bound too large to represent is no deadline at all.
        let deadline = Instant::now().checked_add(timeout);
        loop {
            if let Some(receipt) = self.get_transaction_receipt(tx_id)? {
                debug!(tx_id, block = receipt.header.number, flag = ?receipt.flag(), "receipt available");
                return Ok(receipt);
            }
            let sleep = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        warn!(tx_id, ?timeout, "receipt not available");
                        return Err(SessionError::ReceiptTimeout {
                            tx_id: tx_id.to_string(),
                            timeout,
                        });
                    }
                    poll_interval.min(deadline - now)
                }
                None => poll_interval,
            };
            thread::sleep(sleep);
        }
    }
}
