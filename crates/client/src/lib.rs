//! The rollup client: turns user intents into signed rollup transactions and withdrawal requests,
//! submits them and observes their completion.

pub use address::{AddressCodec, Resolution};
mod address;

pub use assembler::{
    ContractCall, Finality, SubmissionHandle, SubmissionStage, TransactionAssembler,
    WithdrawalIntent,
};
mod assembler;

pub use config::{ClientArgs, DeploymentConfig};
mod config;

pub use error::{AssemblerError, ConfigError};
mod error;

pub use metrics::AssemblerMetrics;
mod metrics;

pub use nonce::{NonceGuard, NonceTracker};
mod nonce;

pub use rollup_client_codec as codec;
pub use rollup_client_primitives as primitives;
pub use rollup_client_providers as providers;
pub use rollup_client_signer as signer;
pub use rollup_client_watcher as watcher;
