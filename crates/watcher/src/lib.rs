//! Waiters for the asynchronous, eventually-finalized effects of rollup submissions.

mod error;
pub use error::WatcherError;

mod metrics;
pub use metrics::WatcherMetrics;

mod poll;
pub use poll::{poll, Outcome, PollPolicy, DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT};

use alloy_primitives::B256;
use rollup_client_primitives::{AccountId, ShortAddress, TxReceipt};
use rollup_client_providers::{L1TransactionBuilder, L1TxStatus, RollupRpc, RollupRpcError};
use std::time::Instant;

/// Observes the completion of rollup submissions through a [`RollupRpc`].
#[derive(Debug)]
pub struct FinalityWaiter<P> {
    /// The rollup rpc.
    rpc: P,
    /// The waiter metrics.
    metrics: WatcherMetrics,
}

impl<P: RollupRpc> FinalityWaiter<P> {
    /// Returns a new [`FinalityWaiter`] polling the provided rpc.
    pub fn new(rpc: P) -> Self {
        Self { rpc, metrics: WatcherMetrics::default() }
    }

    /// Waits for the rollup to assign an id to the account with the provided script hash.
    pub async fn wait_for_account_id(
        &self,
        script_hash: B256,
        policy: &PollPolicy,
    ) -> Result<Outcome<AccountId>, WatcherError> {
        let rpc = &self.rpc;
        let now = Instant::now();
        let res = poll(policy, "account id", move || rpc.get_account_id_by_script_hash(script_hash))
            .await;
        self.metrics.record(&res, now.elapsed().as_secs_f64());
        res
    }

    /// Waits for the receipt of the transaction.
    pub async fn wait_for_transaction_receipt(
        &self,
        tx_hash: B256,
        policy: &PollPolicy,
    ) -> Result<Outcome<TxReceipt>, WatcherError> {
        let rpc = &self.rpc;
        let now = Instant::now();
        let res = poll(policy, "transaction receipt", move || rpc.get_transaction_receipt(tx_hash))
            .await;
        self.metrics.record(&res, now.elapsed().as_secs_f64());
        res
    }

    /// Waits for the balance of the account to differ from `baseline` and returns the new
    /// balance.
    ///
    /// An account that is not registered yet is polled again rather than read as a zero balance.
    pub async fn wait_for_balance_change(
        &self,
        sudt_id: u32,
        short_address: ShortAddress,
        baseline: u128,
        policy: &PollPolicy,
    ) -> Result<Outcome<u128>, WatcherError> {
        let rpc = &self.rpc;
        let now = Instant::now();
        let res = poll(policy, "balance change", move || async move {
            if rpc.get_script_hash_by_short_address(short_address).await?.is_none() {
                tracing::trace!(target: "rollup_client::watcher", %short_address, "account not registered yet");
                return Ok::<_, RollupRpcError>(None);
            }
            let balance = rpc.get_balance(sudt_id, short_address).await?;
            Ok((balance != baseline).then_some(balance))
        })
        .await;
        self.metrics.record(&res, now.elapsed().as_secs_f64());
        res
    }

    /// Waits for a base-layer transaction to be committed.
    ///
    /// Exhausting the budget is always an error, whatever the policy says.
    pub async fn wait_for_l1_commit<B: L1TransactionBuilder>(
        &self,
        builder: &B,
        tx_hash: B256,
        policy: &PollPolicy,
    ) -> Result<(), WatcherError> {
        let policy = policy.fatal();
        let now = Instant::now();
        let res = poll(&policy, "base-layer commitment", move || async move {
            match builder.transaction_status(tx_hash).await? {
                Some(L1TxStatus::Committed) => Ok(Some(())),
                Some(L1TxStatus::Rejected) => Err(WatcherError::L1TransactionRejected(tx_hash)),
                _ => Ok(None),
            }
        })
        .await;
        self.metrics.record(&res, now.elapsed().as_secs_f64());

        res?;
        tracing::info!(target: "rollup_client::watcher", %tx_hash, "base-layer transaction committed");
        Ok(())
    }

    /// Returns a reference to the rollup rpc.
    pub const fn rpc(&self) -> &P {
        &self.rpc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollup_client_primitives::{AccountMerkleState, Script, ScriptHashType};
    use rollup_client_providers::test_utils::{MockL1TransactionBuilder, MockRollupRpc};
    use std::{sync::Arc, time::Duration};

    fn policy() -> PollPolicy {
        PollPolicy::new(Duration::from_secs(30), Duration::from_secs(1))
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_account_id() -> eyre::Result<()> {
        reth_tracing::init_test_tracing();
        let rpc = Arc::new(MockRollupRpc::default());
        let script = Script::new(B256::repeat_byte(1), ScriptHashType::Type, vec![0u8; 52]);
        let hash = rpc.insert_account(script, None);

        let waiter = FinalityWaiter::new(rpc.clone());
        let assign = {
            let rpc = rpc.clone();
            async move {
                tokio::time::sleep(Duration::from_secs(5)).await;
                rpc.assign_account_id(hash, 12);
            }
        };
        let policy = policy();
        let (outcome, _) = tokio::join!(waiter.wait_for_account_id(hash, &policy), assign);

        assert_eq!(outcome?, Outcome::Observed(12));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_account_id_not_observed() -> eyre::Result<()> {
        reth_tracing::init_test_tracing();
        let rpc = MockRollupRpc::default();
        let waiter = FinalityWaiter::new(&rpc);

        let outcome = waiter.wait_for_account_id(B256::ZERO, &policy()).await?;

        assert!(!outcome.is_observed());
        assert_eq!(rpc.requests(), 31);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_balance_change_skips_unregistered_account() -> eyre::Result<()> {
        reth_tracing::init_test_tracing();
        let rpc = Arc::new(MockRollupRpc::default());
        let script = Script::new(B256::repeat_byte(1), ScriptHashType::Type, vec![0u8; 52]);
        let short = ShortAddress::from_script_hash(&script.hash());
        rpc.set_balance(1, short, 100);

        let waiter = FinalityWaiter::new(rpc.clone());
        let register = {
            let rpc = rpc.clone();
            async move {
                tokio::time::sleep(Duration::from_secs(3)).await;
                rpc.insert_account(script, Some(4));
            }
        };
        let policy = policy();
        let (outcome, _) =
            tokio::join!(waiter.wait_for_balance_change(1, short, 0, &policy), register);

        assert_eq!(outcome?, Outcome::Observed(100));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_balance_is_not_observed() -> eyre::Result<()> {
        let rpc = MockRollupRpc::default();
        let script = Script::new(B256::repeat_byte(1), ScriptHashType::Type, vec![0u8; 52]);
        let hash = rpc.insert_account(script, Some(4));
        let short = ShortAddress::from_script_hash(&hash);
        rpc.set_balance(1, short, 100);

        let waiter = FinalityWaiter::new(&rpc);
        let outcome = waiter.wait_for_balance_change(1, short, 100, &policy()).await?;

        assert!(matches!(outcome, Outcome::NotObserved { .. }));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_receipt() -> eyre::Result<()> {
        let rpc = MockRollupRpc::default();
        let receipt = TxReceipt {
            tx_witness_hash: B256::repeat_byte(9),
            post_state: AccountMerkleState { merkle_root: B256::ZERO, count: 3 },
            read_data_hashes: vec![],
            logs: vec![],
        };
        rpc.insert_receipt(B256::repeat_byte(2), receipt.clone());

        let waiter = FinalityWaiter::new(&rpc);
        let outcome = waiter.wait_for_transaction_receipt(B256::repeat_byte(2), &policy()).await?;

        assert_eq!(outcome.observed(), Some(receipt));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_l1_commit_timeout_is_fatal() {
        let rpc = MockRollupRpc::default();
        let builder = MockL1TransactionBuilder::default();
        builder.set_status(B256::repeat_byte(1), L1TxStatus::Pending);

        let waiter = FinalityWaiter::new(&rpc);
        let res = waiter.wait_for_l1_commit(&builder, B256::repeat_byte(1), &policy()).await;

        assert!(matches!(res, Err(WatcherError::CommitTimeout { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_l1_commit() -> eyre::Result<()> {
        let rpc = MockRollupRpc::default();
        let builder = MockL1TransactionBuilder::default();
        builder.set_status(B256::repeat_byte(1), L1TxStatus::Committed);
        builder.set_status(B256::repeat_byte(2), L1TxStatus::Rejected);

        let waiter = FinalityWaiter::new(&rpc);
        waiter.wait_for_l1_commit(&builder, B256::repeat_byte(1), &policy()).await?;
        let res = waiter.wait_for_l1_commit(&builder, B256::repeat_byte(2), &policy()).await;

        assert!(matches!(res, Err(WatcherError::L1TransactionRejected(_))));
        Ok(())
    }
}
