//! Finality tests for submitted transactions and withdrawal requests.

use alloy_primitives::B256;
use alloy_signer_local::PrivateKeySigner;
use rollup_client::{
    primitives::{
        AccountMerkleState, LogItem, ScriptHashType, ScriptTemplate, TxReceipt, CKB_SUDT_ID,
        POLYJUICE_SYSTEM_LOG_FLAG,
    },
    providers::test_utils::MockRollupRpc,
    watcher::{Outcome, PollPolicy},
    ContractCall, DeploymentConfig, Finality, NonceTracker, SubmissionHandle,
    TransactionAssembler, WithdrawalIntent,
};
use std::{sync::Arc, time::Duration};

const SENDER_ID: u32 = 5;

fn policy() -> PollPolicy {
    PollPolicy::new(Duration::from_secs(60), Duration::from_secs(3))
}

type Assembler = TransactionAssembler<Arc<MockRollupRpc>>;

fn deployment() -> DeploymentConfig {
    DeploymentConfig {
        rollup_type_hash: B256::repeat_byte(0x17),
        eth_account_lock: ScriptTemplate::new(B256::repeat_byte(0xbb), ScriptHashType::Type),
        polyjuice_validator: ScriptTemplate::new(B256::repeat_byte(0x55), ScriptHashType::Type),
    }
}

fn setup() -> (Arc<MockRollupRpc>, PrivateKeySigner, Assembler) {
    let rpc = Arc::new(MockRollupRpc::default());
    let key = PrivateKeySigner::random();
    let assembler =
        TransactionAssembler::new(rpc.clone(), key.clone(), deployment(), 3, Arc::default());
    rpc.insert_account(assembler.address_codec().account_script(key.address()), Some(SENDER_ID));
    (rpc, key, assembler)
}

#[tokio::test(start_paused = true)]
async fn test_withdrawal_finality_observes_balance_change() -> eyre::Result<()> {
    reth_tracing::init_test_tracing();
    let (rpc, key, assembler) = setup();
    let short = assembler.address_codec().short_address(key.address());
    rpc.set_balance(CKB_SUDT_ID, short, 5_000_000_000_000);

    let intent = WithdrawalIntent::new(4_000_000_000_000, B256::repeat_byte(2));
    let handle = assembler.withdraw(intent).await?;

    let finalize = {
        let rpc = rpc.clone();
        async move {
            tokio::time::sleep(Duration::from_secs(10)).await;
            rpc.set_balance(CKB_SUDT_ID, short, 1_000_000_000_000);
        }
    };
    let policy = policy();
    let (outcome, _) = tokio::join!(assembler.await_finality(&handle, &policy), finalize);

    assert_eq!(outcome?, Outcome::Observed(Finality::BalanceChanged(1_000_000_000_000)));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_transaction_finality_observes_receipt() -> eyre::Result<()> {
    reth_tracing::init_test_tracing();
    let (rpc, _, assembler) = setup();

    let (handle, _) = assembler.deploy_contract(ContractCall::create(vec![0x60u8, 0x80])).await?;

    let mut data = vec![0u8; 16];
    data.extend_from_slice(&[0x11; 20]);
    let receipt = TxReceipt {
        tx_witness_hash: B256::repeat_byte(9),
        post_state: AccountMerkleState { merkle_root: B256::repeat_byte(8), count: 7 },
        read_data_hashes: vec![],
        logs: vec![LogItem {
            account_id: 7,
            service_flag: POLYJUICE_SYSTEM_LOG_FLAG,
            data: data.into(),
        }],
    };
    let commit = {
        let rpc = rpc.clone();
        let receipt = receipt.clone();
        async move {
            tokio::time::sleep(Duration::from_secs(7)).await;
            rpc.insert_receipt(handle.hash(), receipt);
        }
    };
    let policy = policy();
    let (outcome, _) = tokio::join!(assembler.await_finality(&handle, &policy), commit);

    let Some(Finality::Receipt(observed)) = outcome?.observed() else {
        eyre::bail!("receipt not observed")
    };
    assert_eq!(observed, receipt);
    assert_eq!(observed.created_contract_address().map(|address| address[0]), Some(0x11));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_missing_receipt_is_not_observed() -> eyre::Result<()> {
    let (_, _, assembler) = setup();
    let tx_hash = B256::repeat_byte(1);
    let handle = SubmissionHandle::Transaction { tx_hash, from_id: SENDER_ID, nonce: 0 };

    let outcome = assembler.await_finality(&handle, &policy()).await?;

    let Outcome::NotObserved { elapsed } = outcome else { eyre::bail!("unexpected receipt") };
    assert!(elapsed >= Duration::from_secs(60));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_account_id_is_assigned_after_creation() -> eyre::Result<()> {
    reth_tracing::init_test_tracing();
    let (rpc, _, assembler) = setup();

    let (_, script_hash) = assembler.create_creator_account(CKB_SUDT_ID).await?;
    let assign = {
        let rpc = rpc.clone();
        async move {
            tokio::time::sleep(Duration::from_secs(4)).await;
            rpc.assign_account_id(script_hash, 3);
        }
    };
    let policy = policy();
    let (outcome, _) =
        tokio::join!(assembler.waiter().wait_for_account_id(script_hash, &policy), assign);

    assert_eq!(outcome?, Outcome::Observed(3));
    Ok(())
}

#[tokio::test]
async fn test_shared_nonce_tracker_across_assemblers() -> eyre::Result<()> {
    let (rpc, key, assembler) = setup();
    let nonces = Arc::new(NonceTracker::new());
    let first =
        TransactionAssembler::new(rpc.clone(), key.clone(), deployment(), 3, nonces.clone());
    let second = TransactionAssembler::new(rpc.clone(), key, deployment(), 3, nonces);

    let a = first.transfer(CKB_SUDT_ID, SENDER_ID.into(), 1, 0).await?;
    let b = second.transfer(CKB_SUDT_ID, SENDER_ID.into(), 1, 0).await?;
    assert_eq!((a.nonce(), b.nonce()), (0, 1));

    // the default assembler has its own tracker.
    let c = assembler.transfer(CKB_SUDT_ID, SENDER_ID.into(), 1, 0).await?;
    assert_eq!(c.nonce(), 0);
    Ok(())
}
