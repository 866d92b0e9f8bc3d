//! Assembly and submission of rollup transactions and withdrawal requests.

use crate::{
    AddressCodec, AssemblerError, AssemblerMetrics, DeploymentConfig, NonceGuard, NonceTracker,
    Resolution,
};
use std::{sync::Arc, time::Instant};

use alloy_primitives::{Bytes, Signature, B256, U256};
use rollup_client_codec::{
    creator_script, deployed_script_hash, routed_to_id, CallEncoding, CallKind, MetaContractArgs,
    PolyjuiceArgs, SudtArgs, META_CONTRACT_ACCOUNT_ID,
};
use rollup_client_primitives::{
    minimal_withdrawal_capacity, AccountHandle, AccountId, Fee, L2Transaction, RawL2Transaction,
    RawWithdrawalRequest, RunResult, Script, ShortAddress, TxReceipt, WithdrawalRequest,
    CKB_SUDT_ID, CREATOR_PSEUDO_ACCOUNT_ID, DEFAULT_SELL_CAPACITY,
};
use rollup_client_providers::{RollupRpc, RollupRpcError};
use rollup_client_signer::MessageSigner;
use rollup_client_watcher::{FinalityWaiter, Outcome, PollPolicy};

/// The stages of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStage {
    /// The sender and receiver accounts are being resolved.
    Resolving,
    /// The call arguments are being encoded.
    Encoding,
    /// The sender nonce was obtained.
    Nonced,
    /// The raw request is being hashed.
    Hashing,
    /// The request is being signed.
    Signing,
    /// The request was signed and submitted.
    Signed,
    /// The rollup rejected the request.
    Rejected,
}

/// A contract call, or a contract creation when sent to the creator account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    /// The logical target. Zero stands for the creator account.
    pub to_id: AccountId,
    /// The gas limit.
    pub gas_limit: u64,
    /// The gas price.
    pub gas_price: U256,
    /// The value transferred to the callee.
    pub value: U256,
    /// The call data or init code.
    pub data: Bytes,
    /// Whether the call is read-only.
    pub is_static: bool,
}

impl ContractCall {
    /// Returns a call to `to_id` with no gas and no value.
    pub fn new(to_id: AccountId, data: impl Into<Bytes>) -> Self {
        Self {
            to_id,
            gas_limit: 0,
            gas_price: U256::ZERO,
            value: U256::ZERO,
            data: data.into(),
            is_static: false,
        }
    }

    /// Returns the creation of a contract with the provided init code.
    pub fn create(init_code: impl Into<Bytes>) -> Self {
        Self::new(CREATOR_PSEUDO_ACCOUNT_ID, init_code)
    }

    /// Sets the gas limit and price.
    pub const fn with_gas(mut self, gas_limit: u64, gas_price: U256) -> Self {
        self.gas_limit = gas_limit;
        self.gas_price = gas_price;
        self
    }

    /// Sets the transferred value.
    pub const fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Marks the call as read-only.
    pub const fn into_static(mut self) -> Self {
        self.is_static = true;
        self
    }
}

/// A withdrawal of assets from the rollup to the base layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalIntent {
    /// The withdrawn capacity, in shannons.
    pub capacity: u64,
    /// The withdrawn simple UDT amount.
    pub amount: u128,
    /// The script hash of the withdrawn simple UDT, zero for none.
    pub sudt_script_hash: B256,
    /// The hash of the base-layer lock receiving the assets.
    pub owner_lock_hash: B256,
    /// The withdrawal fee.
    pub fee: Fee,
}

impl WithdrawalIntent {
    /// Returns a capacity only withdrawal without fee.
    pub const fn new(capacity: u64, owner_lock_hash: B256) -> Self {
        Self {
            capacity,
            amount: 0,
            sudt_script_hash: B256::ZERO,
            owner_lock_hash,
            fee: Fee { sudt_id: CKB_SUDT_ID, amount: 0 },
        }
    }

    /// Returns true if the withdrawal carries a simple UDT.
    pub fn is_sudt(&self) -> bool {
        !self.sudt_script_hash.is_zero()
    }
}

/// A submitted request, whose completion is observed through
/// [`TransactionAssembler::await_finality`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionHandle {
    /// A submitted transaction.
    Transaction {
        /// The transaction hash.
        tx_hash: B256,
        /// The sender account.
        from_id: AccountId,
        /// The sender nonce.
        nonce: u32,
    },
    /// A submitted withdrawal request.
    Withdrawal {
        /// The withdrawal request hash.
        request_hash: B256,
        /// The short address of the withdrawing account.
        short_address: ShortAddress,
        /// The simple UDT whose balance is observed.
        sudt_id: u32,
        /// The balance before the submission.
        baseline: u128,
        /// The sender nonce.
        nonce: u32,
    },
}

impl SubmissionHandle {
    /// Returns the hash of the submitted request.
    pub const fn hash(&self) -> B256 {
        match self {
            Self::Transaction { tx_hash, .. } => *tx_hash,
            Self::Withdrawal { request_hash, .. } => *request_hash,
        }
    }

    /// Returns the nonce of the submitted request.
    pub const fn nonce(&self) -> u32 {
        match self {
            Self::Transaction { nonce, .. } | Self::Withdrawal { nonce, .. } => *nonce,
        }
    }
}

/// The observed completion of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finality {
    /// The transaction receipt.
    Receipt(TxReceipt),
    /// The balance after the withdrawal.
    BalanceChanged(u128),
}

/// The account submitting through the assembler.
#[derive(Debug, Clone, Copy)]
struct Sender {
    account_id: AccountId,
    script_hash: B256,
    short_address: ShortAddress,
}

/// Turns user intents into signed rollup requests and submits them.
#[derive(Debug)]
pub struct TransactionAssembler<P> {
    /// The waiter, which owns the rollup rpc.
    waiter: FinalityWaiter<P>,
    /// The signer of the requests.
    signer: MessageSigner,
    /// The nonces of the submitting accounts.
    nonces: Arc<NonceTracker>,
    /// The address codec of the owner accounts.
    codec: AddressCodec,
    /// The rollup deployment.
    deployment: DeploymentConfig,
    /// The account creating contracts.
    creator_account_id: AccountId,
    /// The assembler metrics.
    metrics: AssemblerMetrics,
}

impl<P: RollupRpc> TransactionAssembler<P> {
    /// Returns a new [`TransactionAssembler`] submitting on behalf of the owner of `signer`.
    pub fn new(
        rpc: P,
        signer: impl alloy_signer::Signer<Signature> + Send + Sync + 'static,
        deployment: DeploymentConfig,
        creator_account_id: AccountId,
        nonces: Arc<NonceTracker>,
    ) -> Self {
        Self {
            waiter: FinalityWaiter::new(rpc),
            signer: MessageSigner::new(deployment.rollup_type_hash, signer),
            nonces,
            codec: AddressCodec::from_deployment(&deployment),
            deployment,
            creator_account_id,
            metrics: AssemblerMetrics::default(),
        }
    }

    /// Returns the rollup rpc.
    pub const fn rpc(&self) -> &P {
        self.waiter.rpc()
    }

    /// Returns the finality waiter.
    pub const fn waiter(&self) -> &FinalityWaiter<P> {
        &self.waiter
    }

    /// Returns the address codec.
    pub const fn address_codec(&self) -> &AddressCodec {
        &self.codec
    }

    /// Returns the message signer.
    pub const fn signer(&self) -> &MessageSigner {
        &self.signer
    }

    /// Returns the script hash of the sender account.
    pub fn sender_script_hash(&self) -> B256 {
        self.codec.account_script_hash(self.signer.address())
    }

    /// Transfers `amount` of the simple UDT `sudt_id` to `to`.
    pub async fn transfer(
        &self,
        sudt_id: u32,
        to: AccountHandle,
        amount: u128,
        fee: u128,
    ) -> Result<SubmissionHandle, AssemblerError> {
        let encoding = self.transfer_encoding(to, amount, fee).await?;
        self.submit(sudt_id, encoding).await
    }

    /// Returns the signed transfer without submitting it.
    pub async fn build_transfer(
        &self,
        sudt_id: u32,
        to: AccountHandle,
        amount: u128,
        fee: u128,
    ) -> Result<L2Transaction, AssemblerError> {
        let encoding = self.transfer_encoding(to, amount, fee).await?;
        self.build_transaction(sudt_id, encoding).await
    }

    /// Calls a contract.
    pub async fn call_contract(
        &self,
        call: ContractCall,
    ) -> Result<SubmissionHandle, AssemblerError> {
        let (to_id, encoding) = self.contract_encoding(call);
        self.submit(to_id, encoding).await
    }

    /// Returns the signed contract call without submitting it.
    pub async fn build_call_contract(
        &self,
        call: ContractCall,
    ) -> Result<L2Transaction, AssemblerError> {
        let (to_id, encoding) = self.contract_encoding(call);
        self.build_transaction(to_id, encoding).await
    }

    /// Deploys a contract and returns the predicted script hash of the contract account along
    /// with the submission.
    pub async fn deploy_contract(
        &self,
        call: ContractCall,
    ) -> Result<(SubmissionHandle, B256), AssemblerError> {
        let call = ContractCall { to_id: CREATOR_PSEUDO_ACCOUNT_ID, ..call };
        let (to_id, encoding) = self.contract_encoding(call);
        let (tx_hash, from_id, nonce) = self.submit_transaction(to_id, encoding).await?;
        let predicted = deployed_script_hash(
            self.deployment.polyjuice_validator.code_hash,
            self.deployment.rollup_type_hash,
            self.creator_account_id,
            from_id,
            nonce,
        );
        tracing::info!(target: "rollup_client::assembler", %tx_hash, %predicted, "Submitted contract deployment");
        Ok((SubmissionHandle::Transaction { tx_hash, from_id, nonce }, predicted))
    }

    /// Creates an account for the provided script through the meta contract.
    pub async fn create_account(&self, script: Script) -> Result<SubmissionHandle, AssemblerError> {
        let encoding = MetaContractArgs::CreateAccount { script }.into();
        self.submit(META_CONTRACT_ACCOUNT_ID, encoding).await
    }

    /// Returns the signed account creation without submitting it.
    pub async fn build_create_account(
        &self,
        script: Script,
    ) -> Result<L2Transaction, AssemblerError> {
        let encoding = MetaContractArgs::CreateAccount { script }.into();
        self.build_transaction(META_CONTRACT_ACCOUNT_ID, encoding).await
    }

    /// Creates the account owning the contracts paid in `sudt_id` and returns its script hash
    /// along with the submission.
    pub async fn create_creator_account(
        &self,
        sudt_id: u32,
    ) -> Result<(SubmissionHandle, B256), AssemblerError> {
        let script = creator_script(
            self.deployment.polyjuice_validator,
            self.deployment.rollup_type_hash,
            sudt_id,
        );
        let script_hash = script.hash();
        let handle = self.create_account(script).await?;
        Ok((handle, script_hash))
    }

    /// Withdraws assets to the base layer.
    ///
    /// The capacity is checked against the minimal withdrawal capacity before reaching the rollup.
    pub async fn withdraw(
        &self,
        intent: WithdrawalIntent,
    ) -> Result<SubmissionHandle, AssemblerError> {
        check_withdrawal_capacity(&intent)?;
        let started = Instant::now();
        let sender = self.sender().await?;
        let baseline = self.rpc().get_balance(CKB_SUDT_ID, sender.short_address).await?;

        let mut guard = self.nonces.lock(sender.account_id).await;
        let request = self.assemble_withdrawal(&mut guard, &sender, intent).await?;
        let nonce = request.raw.nonce;
        let local_hash = request.raw.hash();

        let res = self.rpc().submit_withdrawal_request(&request).await;
        let request_hash = self.settle(&mut guard, res, local_hash, started)?;
        tracing::info!(target: "rollup_client::assembler", %request_hash, nonce, capacity = request.raw.capacity, "Submitted withdrawal request");

        Ok(SubmissionHandle::Withdrawal {
            request_hash,
            short_address: sender.short_address,
            sudt_id: CKB_SUDT_ID,
            baseline,
            nonce,
        })
    }

    /// Returns the signed withdrawal request without submitting it.
    pub async fn build_withdrawal(
        &self,
        intent: WithdrawalIntent,
    ) -> Result<WithdrawalRequest, AssemblerError> {
        check_withdrawal_capacity(&intent)?;
        let sender = self.sender().await?;
        let mut guard = self.nonces.lock(sender.account_id).await;
        self.assemble_withdrawal(&mut guard, &sender, intent).await
    }

    /// Executes a signed contract call without committing it.
    pub async fn execute(&self, call: ContractCall) -> Result<RunResult, AssemblerError> {
        let tx = self.build_call_contract(call).await?;
        Ok(self.rpc().execute_l2_transaction(&tx).await?)
    }

    /// Executes an unsigned call without committing it.
    pub async fn execute_raw(
        &self,
        to_id: AccountId,
        encoding: CallEncoding,
    ) -> Result<RunResult, AssemblerError> {
        let sender = self.sender().await?;
        let args = encoding.encode()?;
        let nonce = self.nonces.next_nonce(sender.account_id, self.rpc()).await?;
        let raw = RawL2Transaction { from_id: sender.account_id, to_id, nonce, args };
        Ok(self.rpc().execute_raw_l2_transaction(&raw).await?)
    }

    /// Returns the balance of `account` in the simple UDT `sudt_id`, read by executing a query
    /// against the UDT account.
    pub async fn query_balance_via_execute(
        &self,
        sudt_id: u32,
        account: AccountHandle,
    ) -> Result<u128, AssemblerError> {
        let account_id = self.resolve(account).await?;
        let encoding = SudtArgs::Query { account_id }.into();
        let result = self.execute_raw(sudt_id, encoding).await?;

        let balance: [u8; 16] = result
            .return_data
            .as_ref()
            .try_into()
            .map_err(|_| AssemblerError::InvalidReturnData(result.return_data.clone()))?;
        Ok(u128::from_le_bytes(balance))
    }

    /// Waits for the completion of a submission.
    pub async fn await_finality(
        &self,
        handle: &SubmissionHandle,
        policy: &PollPolicy,
    ) -> Result<Outcome<Finality>, AssemblerError> {
        let outcome = match *handle {
            SubmissionHandle::Transaction { tx_hash, .. } => self
                .waiter
                .wait_for_transaction_receipt(tx_hash, policy)
                .await?
                .map(Finality::Receipt),
            SubmissionHandle::Withdrawal { short_address, sudt_id, baseline, .. } => self
                .waiter
                .wait_for_balance_change(sudt_id, short_address, baseline, policy)
                .await?
                .map(Finality::BalanceChanged),
        };
        Ok(outcome)
    }

    async fn submit(
        &self,
        to_id: AccountId,
        encoding: CallEncoding,
    ) -> Result<SubmissionHandle, AssemblerError> {
        let (tx_hash, from_id, nonce) = self.submit_transaction(to_id, encoding).await?;
        Ok(SubmissionHandle::Transaction { tx_hash, from_id, nonce })
    }

    /// Signs and submits a transaction to `to_id`, holding the sender nonce until the rollup
    /// answers. Returns the transaction hash, the sender and the nonce.
    async fn submit_transaction(
        &self,
        to_id: AccountId,
        encoding: CallEncoding,
    ) -> Result<(B256, AccountId, u32), AssemblerError> {
        let started = Instant::now();
        let sender = self.sender().await?;
        let mut guard = self.nonces.lock(sender.account_id).await;
        let tx = self.assemble_transaction(&mut guard, &sender, to_id, encoding).await?;
        let nonce = tx.raw.nonce;

        let res = self.rpc().submit_l2_transaction(&tx).await;
        let tx_hash = self.settle(&mut guard, res, tx.hash(), started)?;
        tracing::debug!(target: "rollup_client::assembler", %tx_hash, from_id = sender.account_id, to_id, nonce, "Submitted transaction");

        Ok((tx_hash, sender.account_id, nonce))
    }

    /// Signs a transaction to `to_id` without consuming the nonce.
    async fn build_transaction(
        &self,
        to_id: AccountId,
        encoding: CallEncoding,
    ) -> Result<L2Transaction, AssemblerError> {
        let sender = self.sender().await?;
        let mut guard = self.nonces.lock(sender.account_id).await;
        self.assemble_transaction(&mut guard, &sender, to_id, encoding).await
    }

    async fn assemble_transaction(
        &self,
        guard: &mut NonceGuard,
        sender: &Sender,
        to_id: AccountId,
        encoding: CallEncoding,
    ) -> Result<L2Transaction, AssemblerError> {
        trace_stage(SubmissionStage::Resolving, sender.account_id);
        let receiver_script_hash = self.rpc().get_script_hash(to_id).await?;

        trace_stage(SubmissionStage::Encoding, sender.account_id);
        let args = encoding.encode()?;

        let nonce = guard.next_nonce(self.rpc()).await?;
        trace_stage(SubmissionStage::Nonced, sender.account_id);

        trace_stage(SubmissionStage::Hashing, sender.account_id);
        let raw = RawL2Transaction { from_id: sender.account_id, to_id, nonce, args };

        trace_stage(SubmissionStage::Signing, sender.account_id);
        let tx = self.signer.sign_transaction(raw, sender.script_hash, receiver_script_hash).await?;
        trace_stage(SubmissionStage::Signed, sender.account_id);
        Ok(tx)
    }

    async fn assemble_withdrawal(
        &self,
        guard: &mut NonceGuard,
        sender: &Sender,
        intent: WithdrawalIntent,
    ) -> Result<WithdrawalRequest, AssemblerError> {
        let nonce = guard.next_nonce(self.rpc()).await?;
        trace_stage(SubmissionStage::Nonced, sender.account_id);

        trace_stage(SubmissionStage::Hashing, sender.account_id);
        let raw = RawWithdrawalRequest {
            nonce,
            capacity: intent.capacity,
            amount: intent.amount,
            sudt_script_hash: intent.sudt_script_hash,
            account_script_hash: sender.script_hash,
            sell_amount: 0,
            sell_capacity: DEFAULT_SELL_CAPACITY,
            owner_lock_hash: intent.owner_lock_hash,
            payment_lock_hash: B256::ZERO,
            fee: intent.fee,
        };

        trace_stage(SubmissionStage::Signing, sender.account_id);
        let request = self.signer.sign_withdrawal(raw).await?;
        trace_stage(SubmissionStage::Signed, sender.account_id);
        Ok(request)
    }

    /// Advances the nonce once the rollup has answered, accepting or rejecting the submission.
    /// Transport failures leave the nonce untouched. A submission accepted without any hash is
    /// identified by its locally computed hash.
    fn settle(
        &self,
        guard: &mut NonceGuard,
        res: Result<Option<B256>, RollupRpcError>,
        local_hash: B256,
        started: Instant,
    ) -> Result<B256, AssemblerError> {
        self.metrics.assembly_duration.record(started.elapsed().as_secs_f64());
        match res {
            Ok(hash) => {
                guard.advance();
                self.metrics.submissions.increment(1);
                Ok(hash.unwrap_or(local_hash))
            }
            Err(RollupRpcError::Execution(err)) => {
                guard.advance();
                self.metrics.rejections.increment(1);
                trace_stage(SubmissionStage::Rejected, guard.account_id());
                tracing::warn!(target: "rollup_client::assembler", code = ?err.code, message = %err.message, %local_hash, "Submission rejected");
                Err(AssemblerError::SubmissionRejected { message: err.message })
            }
            Err(err) => {
                self.metrics.transport_failures.increment(1);
                tracing::error!(target: "rollup_client::assembler", ?err, %local_hash, "Submission failed");
                Err(err.into())
            }
        }
    }

    /// Returns the sender account, which must have an id.
    async fn sender(&self) -> Result<Sender, AssemblerError> {
        let owner = self.signer.address();
        let script_hash = self.codec.account_script_hash(owner);
        let short_address = self.codec.short_address(owner);
        match self.codec.resolve_owner(self.rpc(), owner).await? {
            Resolution::Resolved(account_id) => {
                Ok(Sender { account_id, script_hash, short_address })
            }
            Resolution::Unresolved => {
                tracing::debug!(target: "rollup_client::assembler", %owner, %short_address, "Sender account has no id yet");
                Err(AssemblerError::AccountUnresolved(short_address.into()))
            }
        }
    }

    async fn resolve(&self, handle: AccountHandle) -> Result<AccountId, AssemblerError> {
        self.codec
            .resolve_account_id(self.rpc(), handle)
            .await?
            .account_id()
            .ok_or(AssemblerError::AccountUnresolved(handle))
    }

    async fn transfer_encoding(
        &self,
        to: AccountHandle,
        amount: u128,
        fee: u128,
    ) -> Result<CallEncoding, AssemblerError> {
        let to = self.resolve(to).await?;
        Ok(SudtArgs::Transfer { to, amount, fee }.into())
    }

    fn contract_encoding(&self, call: ContractCall) -> (AccountId, CallEncoding) {
        let args = PolyjuiceArgs {
            kind: CallKind::for_target(call.to_id, self.creator_account_id),
            is_static: call.is_static,
            gas_limit: call.gas_limit,
            gas_price: call.gas_price,
            value: call.value,
            data: call.data,
        };
        (routed_to_id(call.to_id, self.creator_account_id), args.into())
    }
}

fn check_withdrawal_capacity(intent: &WithdrawalIntent) -> Result<(), AssemblerError> {
    let minimal = minimal_withdrawal_capacity(intent.is_sudt());
    if intent.capacity < minimal {
        return Err(AssemblerError::InsufficientCapacity { capacity: intent.capacity, minimal });
    }
    Ok(())
}

fn trace_stage(stage: SubmissionStage, account_id: AccountId) {
    tracing::trace!(target: "rollup_client::assembler", ?stage, account_id, "Submission stage");
}
