use crate::DeploymentConfig;

use alloy_primitives::{Address, B256};
use rollup_client_primitives::{
    owner_identity_of, short_address_of, AccountHandle, AccountId, AddressError, Script,
    ScriptTemplate, ShortAddress,
};
use rollup_client_providers::{RollupRpc, RollupRpcError};

/// The result of an account id lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The account has an id.
    Resolved(AccountId),
    /// The account has no id yet.
    Unresolved,
}

impl Resolution {
    /// Returns the account id, if resolved.
    pub const fn account_id(self) -> Option<AccountId> {
        match self {
            Self::Resolved(id) => Some(id),
            Self::Unresolved => None,
        }
    }
}

impl From<Option<AccountId>> for Resolution {
    fn from(id: Option<AccountId>) -> Self {
        id.map_or(Self::Unresolved, Self::Resolved)
    }
}

/// Maps account owners to their rollup addresses and ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressCodec {
    /// The type hash of the rollup.
    rollup_type_hash: B256,
    /// The lock of the accounts.
    account_lock: ScriptTemplate,
}

impl AddressCodec {
    /// Returns a new [`AddressCodec`].
    pub const fn new(rollup_type_hash: B256, account_lock: ScriptTemplate) -> Self {
        Self { rollup_type_hash, account_lock }
    }

    /// Returns the [`AddressCodec`] of the Ethereum accounts of the deployment.
    pub const fn from_deployment(deployment: &DeploymentConfig) -> Self {
        Self::new(deployment.rollup_type_hash, deployment.eth_account_lock)
    }

    /// Returns the script hash of the account owned by `owner_identity`.
    pub fn script_hash_of(&self, owner_identity: &[u8]) -> Result<B256, AddressError> {
        rollup_client_primitives::script_hash_of(
            owner_identity,
            self.rollup_type_hash,
            self.account_lock.code_hash,
            self.account_lock.hash_type,
        )
    }

    /// Returns the lock script of the account owned by `owner`.
    pub fn account_script(&self, owner: Address) -> Script {
        self.account_lock.with_args([self.rollup_type_hash.as_slice(), owner.as_slice()].concat())
    }

    /// Returns the script hash of the account owned by `owner`.
    pub fn account_script_hash(&self, owner: Address) -> B256 {
        self.account_script(owner).hash()
    }

    /// Returns the short address of the account owned by `owner`.
    pub fn short_address(&self, owner: Address) -> ShortAddress {
        short_address_of(&self.account_script_hash(owner))
    }

    /// Resolves the account id of the handle. Ids resolve to themselves, short addresses are
    /// looked up on the rollup.
    pub async fn resolve_account_id<P: RollupRpc>(
        &self,
        rpc: &P,
        handle: AccountHandle,
    ) -> Result<Resolution, RollupRpcError> {
        let short_address = match handle {
            AccountHandle::Id(id) => return Ok(Resolution::Resolved(id)),
            AccountHandle::ShortAddress(short_address) => short_address,
        };
        let Some(script_hash) = rpc.get_script_hash_by_short_address(short_address).await? else {
            tracing::trace!(target: "rollup_client::assembler", %short_address, "short address not registered");
            return Ok(Resolution::Unresolved);
        };
        Ok(rpc.get_account_id_by_script_hash(script_hash).await?.into())
    }

    /// Resolves the account id of the account owned by `owner`.
    pub async fn resolve_owner<P: RollupRpc>(
        &self,
        rpc: &P,
        owner: Address,
    ) -> Result<Resolution, RollupRpcError> {
        Ok(rpc.get_account_id_by_script_hash(self.account_script_hash(owner)).await?.into())
    }

    /// Returns the Ethereum address owning the account with the provided short address.
    pub async fn eth_address_of_short_address<P: RollupRpc>(
        &self,
        rpc: &P,
        short_address: ShortAddress,
    ) -> Result<Option<Address>, RollupRpcError> {
        let Some(script_hash) = rpc.get_script_hash_by_short_address(short_address).await? else {
            return Ok(None);
        };
        let script = rpc.get_script(script_hash).await?;
        Ok(script
            .filter(|script| {
                script.code_hash == self.account_lock.code_hash &&
                    script.args.starts_with(self.rollup_type_hash.as_slice())
            })
            .as_ref()
            .and_then(owner_identity_of))
    }
}
