//! Per-account nonce tracking.
//!
//! The rollup only reports the nonce of committed state, which lags behind submissions. The
//! tracker keeps the highest nonce it handed out so consecutive submissions from one account do
//! not reuse a nonce before the rollup catches up.

use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;
use rollup_client_primitives::AccountId;
use rollup_client_providers::{RollupRpc, RollupRpcError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Tracks the next nonce of every account submitting through the client.
#[derive(Debug, Default)]
pub struct NonceTracker {
    /// The cached nonce of each account.
    accounts: Mutex<HashMap<AccountId, Arc<AsyncMutex<u32>>>>,
}

impl NonceTracker {
    /// Returns a new empty [`NonceTracker`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the account nonce until the returned guard is dropped. Accounts are locked
    /// independently.
    pub async fn lock(&self, account_id: AccountId) -> NonceGuard {
        let cell = self.accounts.lock().entry(account_id).or_default().clone();
        NonceGuard { account_id, cached: cell.lock_owned().await }
    }

    /// Returns the next nonce of the account: the highest of the server nonce and the cached one.
    pub async fn next_nonce<P: RollupRpc>(
        &self,
        account_id: AccountId,
        rpc: &P,
    ) -> Result<u32, RollupRpcError> {
        self.lock(account_id).await.next_nonce(rpc).await
    }

    /// Advances the cached nonce of the account after a submission.
    pub async fn advance(&self, account_id: AccountId) {
        self.lock(account_id).await.advance();
    }
}

/// Exclusive access to the nonce of one account.
#[derive(Debug)]
pub struct NonceGuard {
    /// The locked account.
    account_id: AccountId,
    /// The cached nonce.
    cached: OwnedMutexGuard<u32>,
}

impl NonceGuard {
    /// Returns the locked account.
    pub const fn account_id(&self) -> AccountId {
        self.account_id
    }

    /// Returns the next nonce of the account and caches it.
    pub async fn next_nonce<P: RollupRpc>(&mut self, rpc: &P) -> Result<u32, RollupRpcError> {
        let server = rpc.get_nonce(self.account_id).await?;
        if *self.cached < server {
            tracing::trace!(target: "rollup_client::nonce", account_id = self.account_id, cached = *self.cached, server, "Refreshing cached nonce");
            *self.cached = server;
        }
        Ok(*self.cached)
    }

    /// Advances the cached nonce.
    pub fn advance(&mut self) {
        *self.cached = self.cached.saturating_add(1);
        tracing::trace!(target: "rollup_client::nonce", account_id = self.account_id, nonce = *self.cached, "Advanced nonce");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollup_client_providers::test_utils::MockRollupRpc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_cached_nonce_runs_ahead_of_server() -> eyre::Result<()> {
        let rpc = MockRollupRpc::default();
        let tracker = NonceTracker::new();

        assert_eq!(tracker.next_nonce(1, &rpc).await?, 0);
        tracker.advance(1).await;
        tracker.advance(1).await;
        assert_eq!(tracker.next_nonce(1, &rpc).await?, 2);

        // the server catches up and overtakes.
        rpc.set_nonce(1, 5);
        assert_eq!(tracker.next_nonce(1, &rpc).await?, 5);

        // other accounts are independent.
        assert_eq!(tracker.next_nonce(2, &rpc).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_nonce_is_monotonic() -> eyre::Result<()> {
        let rpc = MockRollupRpc::default();
        let tracker = NonceTracker::new();
        let mut last = 0;

        for step in 0u32..50 {
            if step % 3 == 0 {
                tracker.advance(7).await;
            }
            if step % 7 == 0 {
                rpc.set_nonce(7, step / 2);
            }
            let nonce = tracker.next_nonce(7, &rpc).await?;
            assert!(nonce >= last);
            last = nonce;
        }
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submissions_get_distinct_nonces() -> eyre::Result<()> {
        let rpc = Arc::new(MockRollupRpc::default());
        let tracker = Arc::new(NonceTracker::new());

        let tasks = (0..16).map(|_| {
            let rpc = rpc.clone();
            let tracker = tracker.clone();
            tokio::spawn(async move {
                let mut guard = tracker.lock(3).await;
                let nonce = guard.next_nonce(&rpc).await?;
                tokio::time::sleep(Duration::from_millis(1)).await;
                guard.advance();
                Ok::<_, RollupRpcError>(nonce)
            })
        });

        let mut nonces = Vec::new();
        for task in tasks.collect::<Vec<_>>() {
            nonces.push(task.await??);
        }
        nonces.sort_unstable();
        assert_eq!(nonces, (0..16).collect::<Vec<_>>());
        Ok(())
    }
}
