use crate::{
    address::AccountId,
    hash::blake2b_256,
    molecule::{self, Entity, Molecule},
};

use alloy_primitives::{Bytes, B256};

/// An unsigned rollup transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawL2Transaction {
    /// The sender account id.
    pub from_id: AccountId,
    /// The receiver account id.
    pub to_id: AccountId,
    /// The sender nonce.
    pub nonce: u32,
    /// The encoded call arguments, interpreted by the receiver.
    pub args: Bytes,
}

impl RawL2Transaction {
    /// Returns the transaction hash, the rollup hash of the serialized raw transaction.
    pub fn hash(&self) -> B256 {
        blake2b_256(self.to_molecule())
    }
}

impl Molecule for RawL2Transaction {
    fn write_molecule(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&molecule::table(&[
            molecule::uint32(self.from_id).as_slice(),
            molecule::uint32(self.to_id).as_slice(),
            molecule::uint32(self.nonce).as_slice(),
            molecule::bytes(&self.args).as_slice(),
        ]));
    }
}

/// A signed rollup transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct L2Transaction {
    /// The raw transaction.
    pub raw: RawL2Transaction,
    /// The 65 bytes recoverable signature over the transaction message.
    pub signature: Bytes,
}

impl L2Transaction {
    /// Returns the hash of the raw transaction.
    pub fn hash(&self) -> B256 {
        self.raw.hash()
    }
}

impl Molecule for L2Transaction {
    fn write_molecule(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&molecule::table(&[
            &self.raw.to_molecule(),
            molecule::bytes(&self.signature).as_slice(),
        ]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::bytes;

    #[test]
    fn test_raw_transaction_layout() {
        let raw = RawL2Transaction { from_id: 5, to_id: 3, nonce: 9, args: bytes!("ff") };
        let encoded = raw.to_molecule();

        assert_eq!(encoded.len(), 20 + 12 + 5);
        assert_eq!(&encoded[0..4], &37u32.to_le_bytes());
        assert_eq!(&encoded[20..24], &5u32.to_le_bytes());
        assert_eq!(&encoded[24..28], &3u32.to_le_bytes());
        assert_eq!(&encoded[28..32], &9u32.to_le_bytes());
        assert_eq!(&encoded[32..], &[1, 0, 0, 0, 0xff]);
    }

    #[test]
    fn test_signed_transaction_embeds_raw() {
        let raw = RawL2Transaction { from_id: 1, to_id: 2, nonce: 0, args: Bytes::new() };
        let tx = L2Transaction { raw: raw.clone(), signature: Bytes::from(vec![1u8; 65]) };
        let encoded = tx.to_molecule();
        let raw_encoded = raw.to_molecule();

        assert_eq!(&encoded[12..12 + raw_encoded.len()], raw_encoded.as_slice());
        assert_eq!(encoded.len(), 12 + raw_encoded.len() + 4 + 65);
        assert_eq!(tx.hash(), raw.hash());
    }
}
