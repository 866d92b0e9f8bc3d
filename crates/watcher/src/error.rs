use alloy_primitives::B256;
use rollup_client_providers::{L1BuilderError, RollupRpcError};
use std::time::Duration;

/// An error that occurred while waiting for rollup or base-layer state.
#[derive(Debug, thiserror::Error)]
pub enum WatcherError {
    /// A rollup rpc error.
    #[error("rollup rpc error: {0}")]
    Rpc(#[from] RollupRpcError),
    /// A base-layer transaction builder error.
    #[error(transparent)]
    L1Builder(#[from] L1BuilderError),
    /// The awaited state was not observed within a fatal polling budget.
    #[error("{operation} not observed after {elapsed:?}")]
    CommitTimeout {
        /// The awaited operation.
        operation: &'static str,
        /// The time spent polling.
        elapsed: Duration,
    },
    /// The base-layer transaction was rejected.
    #[error("base-layer transaction {0} rejected")]
    L1TransactionRejected(B256),
}
