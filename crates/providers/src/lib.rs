//! The crate exposes the rollup JSON-RPC gateway and the base-layer transaction builder
//! interface, along with their implementations for usage across the rollup client.

pub use error::{ExecutionError, L1BuilderError, RollupRpcError};
mod error;

pub use http::{HttpRollupRpc, DEFAULT_METHOD_PREFIX};
mod http;

pub use l1::{L1Intent, L1TransactionBuilder, L1TxStatus};
mod l1;

pub use rollup::RollupRpc;
mod rollup;

/// Test utils for the providers.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
