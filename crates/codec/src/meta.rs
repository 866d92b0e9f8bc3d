use rollup_client_primitives::{
    molecule::{self, Entity, Molecule},
    AccountId, Script,
};

/// The id of the meta contract account.
pub const META_CONTRACT_ACCOUNT_ID: AccountId = 0;

/// The arguments of a call to the meta contract, which creates accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaContractArgs {
    /// Creates an account for the provided script.
    CreateAccount {
        /// The script of the new account.
        script: Script,
    },
}

impl Molecule for MetaContractArgs {
    fn write_molecule(&self, out: &mut Vec<u8>) {
        match self {
            Self::CreateAccount { script } => {
                out.extend_from_slice(&molecule::union(
                    0,
                    &molecule::table(&[script.to_packed().as_slice()]),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::B256;
    use rollup_client_primitives::ScriptHashType;

    #[test]
    fn test_create_account_wraps_script() {
        let script = Script::new(B256::repeat_byte(3), ScriptHashType::Type, vec![1u8; 36]);
        let encoded = MetaContractArgs::CreateAccount { script: script.clone() }.to_molecule();
        let script_encoded = script.to_molecule();

        assert_eq!(&encoded[0..4], &0u32.to_le_bytes());
        assert_eq!(&encoded[4..8], &((8 + script_encoded.len()) as u32).to_le_bytes());
        assert_eq!(&encoded[12..], script_encoded.as_slice());
    }
}
