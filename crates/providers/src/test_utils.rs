//! Test utils for providers.

use crate::{
    ExecutionError, L1BuilderError, L1Intent, L1TransactionBuilder, L1TxStatus, RollupRpc,
    RollupRpcError,
};
use std::collections::{HashMap, VecDeque};

use alloy_primitives::{B256, U256};
use alloy_transport::TransportErrorKind;
use parking_lot::Mutex;
use rollup_client_primitives::{
    AccountId, L2Transaction, RawL2Transaction, RunResult, Script, ShortAddress, TxReceipt,
    WithdrawalRequest,
};

/// The response of the [`MockRollupRpc`] to a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockSubmission {
    /// The submission is accepted and its hash returned.
    Accept,
    /// The submission is accepted without any hash in the response.
    AcceptEmpty,
    /// The rollup rejects the submission with the provided message.
    Reject(String),
    /// The transport fails.
    TransportFailure,
}

/// The mutable state of the [`MockRollupRpc`].
#[derive(Debug, Default)]
pub struct MockRollupState {
    /// Server nonces.
    pub nonces: HashMap<AccountId, u32>,
    /// Account scripts by hash.
    pub scripts: HashMap<B256, Script>,
    /// Account ids by script hash.
    pub account_ids: HashMap<B256, AccountId>,
    /// Balances by simple UDT id and short address.
    pub balances: HashMap<(u32, ShortAddress), u128>,
    /// Receipts by transaction hash.
    pub receipts: HashMap<B256, TxReceipt>,
    /// The queued submission responses. Submissions are accepted once the queue is empty.
    pub submissions: VecDeque<MockSubmission>,
    /// The submitted transactions.
    pub submitted_transactions: Vec<L2Transaction>,
    /// The submitted withdrawal requests.
    pub submitted_withdrawals: Vec<WithdrawalRequest>,
    /// The result returned by executions.
    pub run_result: RunResult,
    /// The executed raw transactions.
    pub executed: Vec<RawL2Transaction>,
    /// The number of requests received.
    pub requests: usize,
}

/// An in-memory implementation of [`RollupRpc`].
#[derive(Debug, Default)]
pub struct MockRollupRpc {
    /// The mock state.
    pub state: Mutex<MockRollupState>,
}

impl MockRollupRpc {
    /// Registers an account script, optionally with an assigned id.
    pub fn insert_account(&self, script: Script, account_id: Option<AccountId>) -> B256 {
        let hash = script.hash();
        let mut state = self.state.lock();
        state.scripts.insert(hash, script);
        if let Some(id) = account_id {
            state.account_ids.insert(hash, id);
        }
        hash
    }

    /// Assigns an id to the account with the provided script hash.
    pub fn assign_account_id(&self, script_hash: B256, account_id: AccountId) {
        self.state.lock().account_ids.insert(script_hash, account_id);
    }

    /// Sets the server nonce of the account.
    pub fn set_nonce(&self, account_id: AccountId, nonce: u32) {
        self.state.lock().nonces.insert(account_id, nonce);
    }

    /// Sets the balance of the account.
    pub fn set_balance(&self, sudt_id: u32, short_address: ShortAddress, balance: u128) {
        self.state.lock().balances.insert((sudt_id, short_address), balance);
    }

    /// Queues the response to the next submission.
    pub fn push_submission(&self, submission: MockSubmission) {
        self.state.lock().submissions.push_back(submission);
    }

    /// Inserts the receipt of a transaction.
    pub fn insert_receipt(&self, tx_hash: B256, receipt: TxReceipt) {
        self.state.lock().receipts.insert(tx_hash, receipt);
    }

    /// Returns the number of requests received.
    pub fn requests(&self) -> usize {
        self.state.lock().requests
    }

    fn submission(&self, hash: B256) -> Result<Option<B256>, RollupRpcError> {
        let next = self.state.lock().submissions.pop_front().unwrap_or(MockSubmission::Accept);
        match next {
            MockSubmission::Accept => Ok(Some(hash)),
            MockSubmission::AcceptEmpty => Ok(None),
            MockSubmission::Reject(message) => {
                Err(ExecutionError { code: Some(-32000), message }.into())
            }
            MockSubmission::TransportFailure => {
                Err(TransportErrorKind::custom_str("connection reset").into())
            }
        }
    }
}

#[async_trait::async_trait]
impl RollupRpc for MockRollupRpc {
    async fn get_nonce(&self, account_id: AccountId) -> Result<u32, RollupRpcError> {
        let mut state = self.state.lock();
        state.requests += 1;
        Ok(state.nonces.get(&account_id).copied().unwrap_or_default())
    }

    async fn get_script_hash(&self, account_id: AccountId) -> Result<B256, RollupRpcError> {
        let mut state = self.state.lock();
        state.requests += 1;
        Ok(state
            .account_ids
            .iter()
            .find_map(|(hash, id)| (*id == account_id).then_some(*hash))
            .unwrap_or_default())
    }

    async fn get_account_id_by_script_hash(
        &self,
        script_hash: B256,
    ) -> Result<Option<AccountId>, RollupRpcError> {
        let mut state = self.state.lock();
        state.requests += 1;
        Ok(state.account_ids.get(&script_hash).copied())
    }

    async fn get_script_hash_by_short_address(
        &self,
        short_address: ShortAddress,
    ) -> Result<Option<B256>, RollupRpcError> {
        let mut state = self.state.lock();
        state.requests += 1;
        Ok(state
            .scripts
            .keys()
            .find(|hash| ShortAddress::from_script_hash(hash) == short_address)
            .copied())
    }

    async fn get_script(&self, script_hash: B256) -> Result<Option<Script>, RollupRpcError> {
        let mut state = self.state.lock();
        state.requests += 1;
        Ok(state.scripts.get(&script_hash).cloned())
    }

    async fn get_balance(
        &self,
        sudt_id: u32,
        short_address: ShortAddress,
    ) -> Result<u128, RollupRpcError> {
        let mut state = self.state.lock();
        state.requests += 1;
        Ok(state.balances.get(&(sudt_id, short_address)).copied().unwrap_or_default())
    }

    async fn submit_l2_transaction(
        &self,
        tx: &L2Transaction,
    ) -> Result<Option<B256>, RollupRpcError> {
        {
            let mut state = self.state.lock();
            state.requests += 1;
            state.submitted_transactions.push(tx.clone());
        }
        self.submission(tx.hash())
    }

    async fn execute_l2_transaction(&self, tx: &L2Transaction) -> Result<RunResult, RollupRpcError> {
        let mut state = self.state.lock();
        state.requests += 1;
        state.executed.push(tx.raw.clone());
        Ok(state.run_result.clone())
    }

    async fn execute_raw_l2_transaction(
        &self,
        raw: &RawL2Transaction,
    ) -> Result<RunResult, RollupRpcError> {
        let mut state = self.state.lock();
        state.requests += 1;
        state.executed.push(raw.clone());
        Ok(state.run_result.clone())
    }

    async fn submit_withdrawal_request(
        &self,
        request: &WithdrawalRequest,
    ) -> Result<Option<B256>, RollupRpcError> {
        {
            let mut state = self.state.lock();
            state.requests += 1;
            state.submitted_withdrawals.push(request.clone());
        }
        self.submission(request.raw.hash())
    }

    async fn get_transaction_receipt(
        &self,
        tx_hash: B256,
    ) -> Result<Option<TxReceipt>, RollupRpcError> {
        let mut state = self.state.lock();
        state.requests += 1;
        Ok(state.receipts.get(&tx_hash).cloned())
    }
}

/// An in-memory implementation of [`L1TransactionBuilder`].
#[derive(Debug, Default)]
pub struct MockL1TransactionBuilder {
    /// The built intents.
    pub intents: Mutex<Vec<L1Intent>>,
    /// The status of the transactions.
    pub statuses: Mutex<HashMap<B256, L1TxStatus>>,
}

impl MockL1TransactionBuilder {
    /// Sets the status of a transaction.
    pub fn set_status(&self, tx_hash: B256, status: L1TxStatus) {
        self.statuses.lock().insert(tx_hash, status);
    }
}

#[async_trait::async_trait]
impl L1TransactionBuilder for MockL1TransactionBuilder {
    async fn build_and_sign(&self, intent: L1Intent) -> Result<B256, L1BuilderError> {
        let mut intents = self.intents.lock();
        intents.push(intent);
        Ok(B256::from(U256::from(intents.len())))
    }

    async fn transaction_status(
        &self,
        tx_hash: B256,
    ) -> Result<Option<L1TxStatus>, L1BuilderError> {
        Ok(self.statuses.lock().get(&tx_hash).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Bytes;
    use rollup_client_primitives::ScriptHashType;

    #[tokio::test]
    async fn test_mock_submission_responses() {
        let rpc = MockRollupRpc::default();
        let tx = L2Transaction {
            raw: RawL2Transaction { from_id: 2, to_id: 1, nonce: 0, args: Bytes::new() },
            signature: Bytes::from(vec![0u8; 65]),
        };

        rpc.push_submission(MockSubmission::Reject("invalid nonce".to_string()));
        rpc.push_submission(MockSubmission::TransportFailure);
        rpc.push_submission(MockSubmission::AcceptEmpty);

        assert!(matches!(rpc.submit_l2_transaction(&tx).await, Err(RollupRpcError::Execution(_))));
        assert!(matches!(rpc.submit_l2_transaction(&tx).await, Err(RollupRpcError::Transport(_))));
        assert_eq!(rpc.submit_l2_transaction(&tx).await.unwrap(), None);
        assert_eq!(rpc.submit_l2_transaction(&tx).await.unwrap(), Some(tx.hash()));
        assert_eq!(rpc.state.lock().submitted_transactions.len(), 4);
    }

    #[tokio::test]
    async fn test_mock_l1_hashes_are_distinct() {
        let builder = MockL1TransactionBuilder::default();
        let mut hashes = std::collections::HashSet::new();
        for _ in 0..300 {
            let intent = L1Intent::UnlockWithdrawal { withdrawal_hash: B256::ZERO };
            hashes.insert(builder.build_and_sign(intent).await.unwrap());
        }
        assert_eq!(hashes.len(), 300);
    }

    #[tokio::test]
    async fn test_mock_short_address_lookup() {
        let rpc = MockRollupRpc::default();
        let script = Script::new(B256::repeat_byte(1), ScriptHashType::Type, vec![2u8; 52]);
        let hash = rpc.insert_account(script.clone(), None);
        let short = ShortAddress::from_script_hash(&hash);

        assert_eq!(rpc.get_script_hash_by_short_address(short).await.unwrap(), Some(hash));
        assert_eq!(rpc.get_account_id_by_script_hash(hash).await.unwrap(), None);

        rpc.assign_account_id(hash, 7);
        assert_eq!(rpc.get_account_id_by_script_hash(hash).await.unwrap(), Some(7));
        assert_eq!(rpc.get_script(hash).await.unwrap(), Some(script));
    }
}
