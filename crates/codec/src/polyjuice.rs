//! Arguments and addressing of the EVM-compatible contract runtime.

use crate::{error::InvalidInputError, CodecError, MAX_ARGS_LENGTH};

use alloy_primitives::{Address, Bytes, B256, U256};
use rollup_client_primitives::{
    AccountId, Script, ScriptHashType, ScriptTemplate, CREATOR_PSEUDO_ACCOUNT_ID,
};

/// The length of the header preceding the call data in contract call args.
pub const POLYJUICE_ARGS_HEADER_LENGTH: usize = 62;

/// The kind of a contract call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CallKind {
    /// A message call to an existing contract.
    Call = 0,
    /// A contract creation.
    Create = 3,
}

impl CallKind {
    /// Returns the kind of a call to `to_id`: calls to the pseudo account or to the creator
    /// account create a contract.
    pub const fn for_target(to_id: AccountId, creator_account_id: AccountId) -> Self {
        if to_id == CREATOR_PSEUDO_ACCOUNT_ID || to_id == creator_account_id {
            Self::Create
        } else {
            Self::Call
        }
    }
}

/// Returns the account the transaction is routed to for a call to `to_id`.
pub const fn routed_to_id(to_id: AccountId, creator_account_id: AccountId) -> AccountId {
    if to_id > CREATOR_PSEUDO_ACCOUNT_ID {
        to_id
    } else {
        creator_account_id
    }
}

/// The arguments of a contract call or creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolyjuiceArgs {
    /// The call kind.
    pub kind: CallKind,
    /// Whether the call is read-only.
    pub is_static: bool,
    /// The gas limit.
    pub gas_limit: u64,
    /// The gas price, which must fit 16 bytes.
    pub gas_price: U256,
    /// The value transferred to the callee.
    pub value: U256,
    /// The call data or init code.
    pub data: Bytes,
}

impl PolyjuiceArgs {
    /// Returns the encoded args.
    pub fn encode(&self) -> Result<Bytes, CodecError> {
        let len = POLYJUICE_ARGS_HEADER_LENGTH + self.data.len();
        if len > MAX_ARGS_LENGTH {
            return Err(InvalidInputError::ArgsTooLong { len, max: MAX_ARGS_LENGTH }.into());
        }
        let gas_price: u128 = self
            .gas_price
            .try_into()
            .map_err(|_| InvalidInputError::GasPriceOverflow(self.gas_price))?;

        let mut out = Vec::with_capacity(len);
        out.push(self.kind as u8);
        out.push(self.is_static as u8);
        out.extend_from_slice(&self.gas_limit.to_le_bytes());
        out.extend_from_slice(&gas_price.to_le_bytes());
        out.extend_from_slice(&self.value.to_be_bytes::<32>());
        out.extend_from_slice(&(self.data.len() as u32).to_le_bytes());
        out.extend_from_slice(&self.data);
        Ok(out.into())
    }
}

/// Returns the script hash of the contract account created by `from_id` at `nonce`.
pub fn deployed_script_hash(
    validator_code_hash: B256,
    rollup_type_hash: B256,
    creator_account_id: AccountId,
    from_id: AccountId,
    nonce: u32,
) -> B256 {
    let mut args = Vec::with_capacity(44);
    args.extend_from_slice(rollup_type_hash.as_slice());
    args.extend_from_slice(&creator_account_id.to_le_bytes());
    args.extend_from_slice(&from_id.to_le_bytes());
    args.extend_from_slice(&nonce.to_le_bytes());
    Script::new(validator_code_hash, ScriptHashType::Type, args).hash()
}

/// Returns the script of the creator account, which owns every contract paid in `sudt_id`.
pub fn creator_script(validator: ScriptTemplate, rollup_type_hash: B256, sudt_id: u32) -> Script {
    validator.with_args([rollup_type_hash.as_slice(), &sudt_id.to_le_bytes()].concat())
}

/// Returns the contract address of an account id.
pub fn account_id_to_address(id: AccountId) -> Address {
    let mut address = Address::ZERO;
    address[..4].copy_from_slice(&id.to_le_bytes());
    address
}

/// Returns the account id of a contract address, if the address has the account id layout.
pub fn address_to_account_id(address: &Address) -> Option<AccountId> {
    if address[4..].iter().any(|b| *b != 0) {
        return None;
    }
    let mut id = [0u8; 4];
    id.copy_from_slice(&address[..4]);
    Some(AccountId::from_le_bytes(id))
}
