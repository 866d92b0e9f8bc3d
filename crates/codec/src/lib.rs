//! Encoding of the call arguments carried by rollup transactions.

pub use error::{CodecError, InvalidInputError};
mod error;

pub use meta::{MetaContractArgs, META_CONTRACT_ACCOUNT_ID};
mod meta;

pub use polyjuice::{
    account_id_to_address, address_to_account_id, creator_script, deployed_script_hash,
    routed_to_id, CallKind, PolyjuiceArgs, POLYJUICE_ARGS_HEADER_LENGTH,
};
pub mod polyjuice;

pub use sudt::SudtArgs;
mod sudt;

use alloy_primitives::Bytes;
use rollup_client_primitives::Molecule;

/// The maximum length of the encoded args of a transaction accepted by the rollup.
pub const MAX_ARGS_LENGTH: usize = 25 * 1024;

/// A call intent, encoded into the `args` of a raw transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallEncoding {
    /// A simple UDT call.
    Sudt(SudtArgs),
    /// A contract call or creation.
    Contract(PolyjuiceArgs),
    /// An account creation through the meta contract.
    Meta(MetaContractArgs),
}

impl CallEncoding {
    /// Returns the encoded args.
    pub fn encode(&self) -> Result<Bytes, CodecError> {
        let encoded: Bytes = match self {
            Self::Sudt(args) => args.to_molecule().into(),
            Self::Contract(args) => return args.encode(),
            Self::Meta(args) => args.to_molecule().into(),
        };
        if encoded.len() > MAX_ARGS_LENGTH {
            return Err(
                InvalidInputError::ArgsTooLong { len: encoded.len(), max: MAX_ARGS_LENGTH }.into()
            );
        }
        Ok(encoded)
    }
}

impl From<SudtArgs> for CallEncoding {
    fn from(args: SudtArgs) -> Self {
        Self::Sudt(args)
    }
}

impl From<PolyjuiceArgs> for CallEncoding {
    fn from(args: PolyjuiceArgs) -> Self {
        Self::Contract(args)
    }
}

impl From<MetaContractArgs> for CallEncoding {
    fn from(args: MetaContractArgs) -> Self {
        Self::Meta(args)
    }
}
