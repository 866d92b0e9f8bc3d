use crate::{
    error::AddressError,
    script::{Script, ScriptHashType},
};

use alloy_primitives::{hex, Address, FixedBytes, B256};
use std::{fmt, str::FromStr};

/// A rollup-assigned account id.
pub type AccountId = u32;

/// The reserved account id targeted by contract creation calls.
pub const CREATOR_PSEUDO_ACCOUNT_ID: AccountId = 0;

/// The simple UDT id of the native base-layer token.
pub const CKB_SUDT_ID: u32 = 1;

/// The length of an owner identity (an Ethereum address).
pub const OWNER_IDENTITY_LENGTH: usize = 20;

/// The length of the args of an account lock script: the rollup type hash followed by the owner
/// identity.
pub const ACCOUNT_SCRIPT_ARGS_LENGTH: usize = 32 + OWNER_IDENTITY_LENGTH;

/// The first 20 bytes of an account script hash.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    derive_more::Deref,
    derive_more::From,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct ShortAddress(pub FixedBytes<20>);

impl ShortAddress {
    /// Returns the short address of the provided script hash.
    pub fn from_script_hash(script_hash: &B256) -> Self {
        Self(FixedBytes::from_slice(&script_hash[..20]))
    }
}

impl fmt::Display for ShortAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ShortAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("0x").ok_or_else(|| AddressError::InvalidHandle(s.to_string()))?;
        let bytes = hex::decode(raw).map_err(|_| AddressError::InvalidHandle(s.to_string()))?;
        if bytes.len() != 20 {
            return Err(AddressError::InvalidHandle(s.to_string()));
        }
        Ok(Self(FixedBytes::from_slice(&bytes)))
    }
}

/// A reference to a rollup account, either by id or by short address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountHandle {
    /// The account id.
    Id(AccountId),
    /// The short address of the account script hash.
    ShortAddress(ShortAddress),
}

impl From<AccountId> for AccountHandle {
    fn from(id: AccountId) -> Self {
        Self::Id(id)
    }
}

impl From<ShortAddress> for AccountHandle {
    fn from(address: ShortAddress) -> Self {
        Self::ShortAddress(address)
    }
}

impl fmt::Display for AccountHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::ShortAddress(address) => write!(f, "{address}"),
        }
    }
}

impl FromStr for AccountHandle {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("0x") {
            return s.parse().map(Self::ShortAddress);
        }
        s.parse::<AccountId>().map(Self::Id).map_err(|_| AddressError::InvalidHandle(s.to_string()))
    }
}

/// Returns the lock script of the account owned by `owner_identity` on the rollup identified by
/// `rollup_type_hash`.
pub fn account_script_of(
    owner_identity: &[u8],
    rollup_type_hash: B256,
    lock_code_hash: B256,
    hash_type: ScriptHashType,
) -> Result<Script, AddressError> {
    if owner_identity.len() != OWNER_IDENTITY_LENGTH {
        return Err(AddressError::MalformedIdentity {
            expected: OWNER_IDENTITY_LENGTH,
            got: owner_identity.len(),
        });
    }
    let args = [rollup_type_hash.as_slice(), owner_identity].concat();
    Ok(Script::new(lock_code_hash, hash_type, args))
}

/// Returns the account script hash of the account owned by `owner_identity`.
pub fn script_hash_of(
    owner_identity: &[u8],
    rollup_type_hash: B256,
    lock_code_hash: B256,
    hash_type: ScriptHashType,
) -> Result<B256, AddressError> {
    Ok(account_script_of(owner_identity, rollup_type_hash, lock_code_hash, hash_type)?.hash())
}

/// Returns the short address of the provided script hash.
pub fn short_address_of(script_hash: &B256) -> ShortAddress {
    ShortAddress::from_script_hash(script_hash)
}

/// Returns the owner identity stored in the args of an account lock script, if the args have the
/// account layout.
pub fn owner_identity_of(script: &Script) -> Option<Address> {
    (script.args.len() == ACCOUNT_SCRIPT_ARGS_LENGTH)
        .then(|| Address::from_slice(&script.args[32..ACCOUNT_SCRIPT_ARGS_LENGTH]))
}
