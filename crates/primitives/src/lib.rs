//! Primitive types for the rollup client: hashing, serialization, scripts, account addresses,
//! transactions and withdrawal requests.

pub use address::{
    account_script_of, owner_identity_of, script_hash_of, short_address_of, AccountHandle,
    AccountId, ShortAddress, ACCOUNT_SCRIPT_ARGS_LENGTH, CKB_SUDT_ID, CREATOR_PSEUDO_ACCOUNT_ID,
    OWNER_IDENTITY_LENGTH,
};
mod address;

pub use error::AddressError;
mod error;

pub use hash::{blake2b_256, hash_concat};
mod hash;

pub mod molecule;
pub use self::molecule::Molecule;

pub use rpc::{AccountMerkleState, LogItem, RunResult, TxReceipt, POLYJUICE_SYSTEM_LOG_FLAG};
mod rpc;

pub use script::{Script, ScriptHashType, ScriptTemplate};
mod script;

pub use transaction::{L2Transaction, RawL2Transaction};
mod transaction;

pub use withdrawal::{
    minimal_withdrawal_capacity, Fee, RawWithdrawalRequest, WithdrawalRequest,
    DEFAULT_SELL_CAPACITY, RAW_WITHDRAWAL_REQUEST_SIZE, SHANNONS_PER_CKB,
};
mod withdrawal;
