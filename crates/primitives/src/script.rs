use crate::molecule::{self, packed, Entity, Molecule};

use alloy_primitives::{Bytes, B256};
use ckb_types::prelude::Builder;

/// How the `code_hash` of a [`Script`] is matched against the deployed code.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptHashType {
    /// The code hash is the hash of the code cell data.
    Data,
    /// The code hash is the hash of the type script of the code cell.
    #[default]
    Type,
}

impl ScriptHashType {
    /// Returns the byte used for the type in serialized scripts.
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Data => 0,
            Self::Type => 1,
        }
    }
}

/// A script identifying the lock or validator of a rollup account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Script {
    /// The hash of the code to execute.
    pub code_hash: B256,
    /// The way `code_hash` is matched.
    pub hash_type: ScriptHashType,
    /// The script arguments.
    pub args: Bytes,
}

impl Script {
    /// Returns a new [`Script`].
    pub fn new(code_hash: B256, hash_type: ScriptHashType, args: impl Into<Bytes>) -> Self {
        Self { code_hash, hash_type, args: args.into() }
    }

    /// Returns the packed base-layer script.
    pub fn to_packed(&self) -> packed::Script {
        packed::Script::new_builder()
            .code_hash(molecule::byte32(self.code_hash))
            .hash_type(packed::Byte::new(self.hash_type.as_u8()))
            .args(molecule::bytes(&self.args))
            .build()
    }

    /// Returns the script hash.
    pub fn hash(&self) -> B256 {
        B256::from_slice(self.to_packed().calc_script_hash().as_slice())
    }
}

impl Molecule for Script {
    fn write_molecule(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.to_packed().as_slice());
    }
}

/// The code part of a script, to be completed with arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ScriptTemplate {
    /// The code hash of the script.
    pub code_hash: B256,
    /// The hash type of the script.
    pub hash_type: ScriptHashType,
}

impl ScriptTemplate {
    /// Returns a new [`ScriptTemplate`].
    pub const fn new(code_hash: B256, hash_type: ScriptHashType) -> Self {
        Self { code_hash, hash_type }
    }

    /// Completes the template with the provided arguments.
    pub fn with_args(&self, args: impl Into<Bytes>) -> Script {
        Script::new(self.code_hash, self.hash_type, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::bytes;

    #[test]
    fn test_script_layout() {
        let script = Script::new(B256::repeat_byte(0x11), ScriptHashType::Type, bytes!("0102"));
        let encoded = script.to_molecule();

        // 16 byte header, 32 byte code hash, 1 byte hash type and 4 + 2 byte args.
        assert_eq!(encoded.len(), 55);
        assert_eq!(&encoded[0..4], &55u32.to_le_bytes());
        assert_eq!(&encoded[4..8], &16u32.to_le_bytes());
        assert_eq!(&encoded[8..12], &48u32.to_le_bytes());
        assert_eq!(&encoded[12..16], &49u32.to_le_bytes());
        assert_eq!(encoded[48], 1);
        assert_eq!(&encoded[49..], &[2, 0, 0, 0, 1, 2]);
    }

    #[test]
    fn test_hash_is_rollup_hash_of_serialization() {
        let script = Script::new(B256::repeat_byte(0x22), ScriptHashType::Data, bytes!("abcdef"));
        assert_eq!(script.hash(), crate::blake2b_256(script.to_molecule()));
    }

    #[test]
    fn test_hash_type_changes_hash() {
        let data = Script::new(B256::ZERO, ScriptHashType::Data, Bytes::new());
        let ty = Script::new(B256::ZERO, ScriptHashType::Type, Bytes::new());
        assert_ne!(data.hash(), ty.hash());
    }

    #[test]
    fn test_script_json() {
        let json = r#"{
            "code_hash": "0x1111111111111111111111111111111111111111111111111111111111111111",
            "hash_type": "type",
            "args": "0xabcd"
        }"#;
        let script: Script = serde_json::from_str(json).unwrap();
        assert_eq!(script.hash_type, ScriptHashType::Type);
        assert_eq!(script.args, bytes!("abcd"));
    }
}
