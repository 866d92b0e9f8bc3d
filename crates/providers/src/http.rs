use crate::{ExecutionError, RollupRpc, RollupRpcError};

use alloy_json_rpc::{RpcRecv, RpcSend};
use alloy_primitives::{Bytes, B256, U128, U32};
use alloy_rpc_client::RpcClient;
use rollup_client_primitives::{
    AccountId, L2Transaction, Molecule, RawL2Transaction, RunResult, Script, ShortAddress,
    TxReceipt, WithdrawalRequest,
};

/// The default prefix of the rollup JSON-RPC methods.
pub const DEFAULT_METHOD_PREFIX: &str = "gw_";

/// The result of a submission or an execution. The rollup reports some rejections as a
/// `{ message }` object in place of the result.
#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
enum RollupResponse<T> {
    Success(T),
    Rejected { message: String },
}

impl<T> RollupResponse<T> {
    fn into_result(self) -> Result<T, RollupRpcError> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Rejected { message } => Err(ExecutionError::message(message).into()),
        }
    }
}

/// An implementation of [`RollupRpc`] over a JSON-RPC client.
///
/// Payloads are sent in their molecule serialization as hex bytes and numbers as hex quantities.
#[derive(Debug, Clone)]
pub struct HttpRollupRpc {
    /// The inner rpc client.
    inner: RpcClient,
    /// The prefix prepended to every method name.
    method_prefix: String,
}

impl HttpRollupRpc {
    /// Returns a new [`HttpRollupRpc`] from the provided client.
    pub fn new(inner: RpcClient, method_prefix: impl Into<String>) -> Self {
        Self { inner, method_prefix: method_prefix.into() }
    }

    /// Returns a new [`HttpRollupRpc`] connected over http to the provided url.
    pub fn new_http(url: reqwest::Url, method_prefix: impl Into<String>) -> Self {
        Self::new(RpcClient::new_http(url), method_prefix)
    }

    /// Returns the full name of the method.
    fn method(&self, name: &str) -> String {
        format!("{}{name}", self.method_prefix)
    }

    async fn call<Params: RpcSend, Resp: RpcRecv>(
        &self,
        name: &str,
        params: Params,
    ) -> Result<Resp, RollupRpcError> {
        let method = self.method(name);
        tracing::trace!(target: "rollup_client::providers", %method, "sending rollup request");
        self.inner.request(method, params).await.map_err(|err| {
            let err = RollupRpcError::from(err);
            tracing::debug!(target: "rollup_client::providers", method = name, ?err, "rollup request failed");
            err
        })
    }
}

#[async_trait::async_trait]
impl RollupRpc for HttpRollupRpc {
    async fn get_nonce(&self, account_id: AccountId) -> Result<u32, RollupRpcError> {
        let nonce: U32 = self.call("get_nonce", (U32::from(account_id),)).await?;
        Ok(nonce.to())
    }

    async fn get_script_hash(&self, account_id: AccountId) -> Result<B256, RollupRpcError> {
        self.call("get_script_hash", (U32::from(account_id),)).await
    }

    async fn get_account_id_by_script_hash(
        &self,
        script_hash: B256,
    ) -> Result<Option<AccountId>, RollupRpcError> {
        let id: Option<U32> = self.call("get_account_id_by_script_hash", (script_hash,)).await?;
        Ok(id.map(|id| id.to()))
    }

    async fn get_script_hash_by_short_address(
        &self,
        short_address: ShortAddress,
    ) -> Result<Option<B256>, RollupRpcError> {
        self.call("get_script_hash_by_short_address", (short_address,)).await
    }

    async fn get_script(&self, script_hash: B256) -> Result<Option<Script>, RollupRpcError> {
        self.call("get_script", (script_hash,)).await
    }

    async fn get_balance(
        &self,
        sudt_id: u32,
        short_address: ShortAddress,
    ) -> Result<u128, RollupRpcError> {
        let balance: U128 = self.call("get_balance", (short_address, U32::from(sudt_id))).await?;
        Ok(balance.to())
    }

    async fn submit_l2_transaction(
        &self,
        tx: &L2Transaction,
    ) -> Result<Option<B256>, RollupRpcError> {
        let res: RollupResponse<Option<B256>> =
            self.call("submit_l2transaction", (Bytes::from(tx.to_molecule()),)).await?;
        res.into_result()
    }

    async fn execute_l2_transaction(&self, tx: &L2Transaction) -> Result<RunResult, RollupRpcError> {
        let res: RollupResponse<RunResult> =
            self.call("execute_l2transaction", (Bytes::from(tx.to_molecule()),)).await?;
        res.into_result()
    }

    async fn execute_raw_l2_transaction(
        &self,
        raw: &RawL2Transaction,
    ) -> Result<RunResult, RollupRpcError> {
        let res: RollupResponse<RunResult> =
            self.call("execute_raw_l2transaction", (Bytes::from(raw.to_molecule()),)).await?;
        res.into_result()
    }

    async fn submit_withdrawal_request(
        &self,
        request: &WithdrawalRequest,
    ) -> Result<Option<B256>, RollupRpcError> {
        let res: RollupResponse<Option<B256>> =
            self.call("submit_withdrawal_request", (Bytes::from(request.to_molecule()),)).await?;
        res.into_result()
    }

    async fn get_transaction_receipt(
        &self,
        tx_hash: B256,
    ) -> Result<Option<TxReceipt>, RollupRpcError> {
        self.call("get_transaction_receipt", (tx_hash,)).await
    }
}
