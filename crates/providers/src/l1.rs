use crate::L1BuilderError;

use alloy_primitives::B256;
use rollup_client_primitives::Script;

/// A base-layer action requested by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum L1Intent {
    /// Deposits assets into the rollup account identified by `account_script`.
    Deposit {
        /// The lock script of the receiving rollup account.
        account_script: Script,
        /// The deposited capacity, in shannons.
        capacity: u64,
        /// The deposited simple UDT script hash and amount, if any.
        sudt: Option<(B256, u128)>,
    },
    /// Unlocks the base-layer cell of a finalized withdrawal.
    UnlockWithdrawal {
        /// The hash of the finalized withdrawal request.
        withdrawal_hash: B256,
    },
}

/// The status of a base-layer transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum L1TxStatus {
    /// The transaction is in the pool.
    Pending,
    /// The transaction has been proposed in a block.
    Proposed,
    /// The transaction has been committed in a block.
    Committed,
    /// The transaction has been rejected.
    Rejected,
}

/// Builds, signs and sends base-layer transactions.
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait L1TransactionBuilder: Send + Sync {
    /// Builds, signs and sends a base-layer transaction for the intent and returns its hash.
    async fn build_and_sign(&self, intent: L1Intent) -> Result<B256, L1BuilderError>;

    /// Returns the status of the transaction, if known.
    async fn transaction_status(&self, tx_hash: B256)
        -> Result<Option<L1TxStatus>, L1BuilderError>;
}
