//! Derivation of the messages signed by account owners.

use alloy_primitives::{Keccak256, B256};
use rollup_client_primitives::{hash_concat, Molecule, RawL2Transaction, RawWithdrawalRequest};

/// The prefix of an Ethereum personal message with a 32 bytes payload.
const PERSONAL_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// Returns the message signed by the sender of a transaction.
///
/// The message binds the transaction to the rollup instance and to both account scripts, so a
/// signature cannot be replayed on another rollup or for another account.
pub fn transaction_message(
    raw: &RawL2Transaction,
    rollup_type_hash: B256,
    sender_script_hash: B256,
    receiver_script_hash: B256,
) -> B256 {
    let serialized = raw.to_molecule();
    hash_concat([
        rollup_type_hash.as_slice(),
        sender_script_hash.as_slice(),
        receiver_script_hash.as_slice(),
        serialized.as_slice(),
    ])
}

/// Returns the message signed by the owner of a withdrawal request.
pub fn withdrawal_message(raw: &RawWithdrawalRequest, rollup_type_hash: B256) -> B256 {
    let serialized = raw.to_molecule();
    hash_concat([rollup_type_hash.as_slice(), serialized.as_slice()])
}

/// Returns the digest actually signed for `message`: the Ethereum personal message hash.
pub fn signing_digest(message: B256) -> B256 {
    let mut hasher = Keccak256::new();
    hasher.update(PERSONAL_MESSAGE_PREFIX);
    hasher.update(message);
    hasher.finalize()
}
