use alloy_primitives::Bytes;
use rollup_client_codec::CodecError;
use rollup_client_primitives::{AccountHandle, AddressError};
use rollup_client_providers::RollupRpcError;
use rollup_client_signer::SignerError;
use rollup_client_watcher::WatcherError;

/// An error that occurred while assembling or submitting a rollup request.
#[derive(Debug, thiserror::Error)]
pub enum AssemblerError {
    /// An address derivation error.
    #[error(transparent)]
    Address(#[from] AddressError),
    /// The intent cannot be encoded.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// The request cannot be signed.
    #[error(transparent)]
    Signer(#[from] SignerError),
    /// A rollup rpc error. Transport failures during a submission leave the nonce untouched.
    #[error(transparent)]
    Rpc(#[from] RollupRpcError),
    /// An error while waiting for finality.
    #[error(transparent)]
    Watcher(#[from] WatcherError),
    /// The rollup rejected the submission. The nonce has been advanced.
    #[error("submission rejected: {message}")]
    SubmissionRejected {
        /// The rejection message.
        message: String,
    },
    /// The account has no id yet. This is a pending state: the id is assigned once the account
    /// appears on the rollup.
    #[error("account {0} has no id assigned yet")]
    AccountUnresolved(AccountHandle),
    /// The withdrawal capacity is below the occupied capacity of the produced cell.
    #[error("withdrawal capacity {capacity} is below the minimal capacity {minimal}")]
    InsufficientCapacity {
        /// The requested capacity.
        capacity: u64,
        /// The minimal capacity.
        minimal: u64,
    },
    /// The data returned by an execution does not have the expected layout.
    #[error("invalid return data: {0}")]
    InvalidReturnData(Bytes),
}

/// An error that occurred while loading the client configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The deployment file cannot be read.
    #[error("failed to read deployment file: {0}")]
    Io(#[from] std::io::Error),
    /// The deployment file is malformed.
    #[error("malformed deployment file: {0}")]
    Json(#[from] serde_json::Error),
}
