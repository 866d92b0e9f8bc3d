use crate::{
    hash::blake2b_256,
    molecule::{self, Entity, Molecule},
};

use alloy_primitives::{Bytes, B256};

/// The number of shannons in one CKB.
pub const SHANNONS_PER_CKB: u64 = 100_000_000;

/// The sell capacity set on withdrawal requests when the caller does not provide one.
pub const DEFAULT_SELL_CAPACITY: u64 = 100 * SHANNONS_PER_CKB;

/// The serialized size of a [`RawWithdrawalRequest`].
pub const RAW_WITHDRAWAL_REQUEST_SIZE: usize = 200;

/// The fee paid for a withdrawal, in the given simple UDT.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Fee {
    /// The simple UDT id the fee is paid in.
    pub sudt_id: u32,
    /// The fee amount.
    pub amount: u128,
}

impl Molecule for Fee {
    fn write_molecule(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(molecule::uint32(self.sudt_id).as_slice());
        out.extend_from_slice(molecule::uint128(self.amount).as_slice());
    }
}

/// An unsigned request to move assets from the rollup back to the base layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawWithdrawalRequest {
    /// The account nonce.
    pub nonce: u32,
    /// The capacity of the base-layer cell to create, in shannons.
    pub capacity: u64,
    /// The simple UDT amount to withdraw.
    pub amount: u128,
    /// The script hash of the withdrawn simple UDT, zero for CKB only withdrawals.
    pub sudt_script_hash: B256,
    /// The script hash of the withdrawing account.
    pub account_script_hash: B256,
    /// The price asked for the withdrawal cell before finalization.
    pub sell_amount: u128,
    /// The capacity asked for the withdrawal cell before finalization.
    pub sell_capacity: u64,
    /// The base-layer lock hash of the owner.
    pub owner_lock_hash: B256,
    /// The base-layer lock hash receiving payment for a sold withdrawal.
    pub payment_lock_hash: B256,
    /// The withdrawal fee.
    pub fee: Fee,
}

impl RawWithdrawalRequest {
    /// Returns the hash of the serialized request.
    pub fn hash(&self) -> B256 {
        blake2b_256(self.to_molecule())
    }
}

impl Molecule for RawWithdrawalRequest {
    fn write_molecule(&self, out: &mut Vec<u8>) {
        out.reserve(RAW_WITHDRAWAL_REQUEST_SIZE);
        out.extend_from_slice(molecule::uint32(self.nonce).as_slice());
        out.extend_from_slice(molecule::uint64(self.capacity).as_slice());
        out.extend_from_slice(molecule::uint128(self.amount).as_slice());
        out.extend_from_slice(molecule::byte32(self.sudt_script_hash).as_slice());
        out.extend_from_slice(molecule::byte32(self.account_script_hash).as_slice());
        out.extend_from_slice(molecule::uint128(self.sell_amount).as_slice());
        out.extend_from_slice(molecule::uint64(self.sell_capacity).as_slice());
        out.extend_from_slice(molecule::byte32(self.owner_lock_hash).as_slice());
        out.extend_from_slice(molecule::byte32(self.payment_lock_hash).as_slice());
        self.fee.write_molecule(out);
    }
}

/// A signed withdrawal request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalRequest {
    /// The raw request.
    pub raw: RawWithdrawalRequest,
    /// The 65 bytes recoverable signature over the withdrawal message.
    pub signature: Bytes,
}

impl Molecule for WithdrawalRequest {
    fn write_molecule(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&molecule::table(&[
            &self.raw.to_molecule(),
            molecule::bytes(&self.signature).as_slice(),
        ]));
    }
}

/// Returns the minimal capacity, in shannons, of the base-layer cell produced by a withdrawal.
///
/// The cell must hold its own occupied size: the capacity field, the withdrawal lock script and,
/// for simple UDT withdrawals, the UDT type script and its amount.
pub fn minimal_withdrawal_capacity(is_sudt: bool) -> u64 {
    // capacity + lock code hash + hash type + rollup type hash + withdrawal lock args.
    let mut bytes = 8 + 32 + 1 + 32 + 192;
    if is_sudt {
        // type code hash + hash type + type args, then the amount.
        bytes += 32 + 1 + 32 + 16;
    }
    bytes * SHANNONS_PER_CKB
}
