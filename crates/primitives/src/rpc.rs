//! Result types returned by the rollup JSON-RPC.

use crate::address::AccountId;

use alloy_primitives::{Address, Bytes, B256};

/// The service flag of the logs emitted by the contract runtime itself.
pub const POLYJUICE_SYSTEM_LOG_FLAG: u8 = 2;

/// A log emitted while executing a rollup transaction.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LogItem {
    /// The account that emitted the log.
    #[serde(with = "alloy_serde::quantity")]
    pub account_id: AccountId,
    /// The service that emitted the log.
    #[serde(with = "alloy_serde::quantity")]
    pub service_flag: u8,
    /// The log payload.
    pub data: Bytes,
}

/// The result of a read-only execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RunResult {
    /// The data returned by the call.
    pub return_data: Bytes,
    /// The logs emitted by the call.
    #[serde(default)]
    pub logs: Vec<LogItem>,
}

/// The account state tree after a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AccountMerkleState {
    /// The root of the account tree.
    pub merkle_root: B256,
    /// The number of accounts.
    #[serde(with = "alloy_serde::quantity")]
    pub count: u32,
}

/// The receipt of an executed rollup transaction.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TxReceipt {
    /// The witness hash of the transaction.
    pub tx_witness_hash: B256,
    /// The account state after the transaction.
    pub post_state: AccountMerkleState,
    /// The hashes of the data read by the transaction.
    #[serde(default)]
    pub read_data_hashes: Vec<B256>,
    /// The logs emitted by the transaction.
    #[serde(default)]
    pub logs: Vec<LogItem>,
}

impl TxReceipt {
    /// Returns the address of the contract created by the transaction, read from the contract
    /// runtime system log.
    pub fn created_contract_address(&self) -> Option<Address> {
        self.logs
            .iter()
            .find(|log| log.service_flag == POLYJUICE_SYSTEM_LOG_FLAG)
            .filter(|log| log.data.len() >= 36)
            .map(|log| Address::from_slice(&log.data[16..36]))
    }
}
