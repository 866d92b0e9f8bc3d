use crate::RollupRpcError;

use alloy_primitives::B256;
use rollup_client_primitives::{
    AccountId, L2Transaction, RawL2Transaction, RunResult, Script, ShortAddress, TxReceipt,
    WithdrawalRequest,
};

/// The rollup JSON-RPC gateway.
///
/// Lookups of rollup state that may not exist yet return `None` rather than an error: an account
/// id or a receipt that has not been assigned is a valid state that callers poll on.
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait RollupRpc: Send + Sync {
    /// Returns the current nonce of the account.
    async fn get_nonce(&self, account_id: AccountId) -> Result<u32, RollupRpcError>;

    /// Returns the script hash of the account.
    async fn get_script_hash(&self, account_id: AccountId) -> Result<B256, RollupRpcError>;

    /// Returns the id assigned to the account with the provided script hash, if any.
    async fn get_account_id_by_script_hash(
        &self,
        script_hash: B256,
    ) -> Result<Option<AccountId>, RollupRpcError>;

    /// Returns the script hash registered for the provided short address, if any.
    async fn get_script_hash_by_short_address(
        &self,
        short_address: ShortAddress,
    ) -> Result<Option<B256>, RollupRpcError>;

    /// Returns the script with the provided hash, if any.
    async fn get_script(&self, script_hash: B256) -> Result<Option<Script>, RollupRpcError>;

    /// Returns the balance of the account in the provided simple UDT.
    async fn get_balance(
        &self,
        sudt_id: u32,
        short_address: ShortAddress,
    ) -> Result<u128, RollupRpcError>;

    /// Submits a signed transaction. Returns the transaction hash when the rollup reports one.
    async fn submit_l2_transaction(
        &self,
        tx: &L2Transaction,
    ) -> Result<Option<B256>, RollupRpcError>;

    /// Executes a signed transaction without committing its effects.
    async fn execute_l2_transaction(&self, tx: &L2Transaction) -> Result<RunResult, RollupRpcError>;

    /// Executes an unsigned transaction without committing its effects.
    async fn execute_raw_l2_transaction(
        &self,
        raw: &RawL2Transaction,
    ) -> Result<RunResult, RollupRpcError>;

    /// Submits a signed withdrawal request. Returns the request hash when the rollup reports one.
    async fn submit_withdrawal_request(
        &self,
        request: &WithdrawalRequest,
    ) -> Result<Option<B256>, RollupRpcError>;

    /// Returns the receipt of the transaction, if it has been executed.
    async fn get_transaction_receipt(
        &self,
        tx_hash: B256,
    ) -> Result<Option<TxReceipt>, RollupRpcError>;
}
