//! Serialization helpers for the molecule layouts checked by the on-chain verifier.
//!
//! Base-layer entities (numbers, hashes, byte vectors and scripts) are the `ckb-types` packed
//! types. The rollup tables and unions are laid out from those packed fields the same way the
//! molecule builders write theirs. Only the encoding direction is needed by a client: payloads are
//! built here and hashed or submitted, never parsed back.

pub use ckb_types::{packed, prelude::Entity};

use ckb_types::prelude::Pack;
use ::molecule::{pack_number, Number, NUMBER_SIZE};

/// Types with a canonical molecule serialization.
pub trait Molecule {
    /// Appends the serialization of the value to `out`.
    fn write_molecule(&self, out: &mut Vec<u8>);

    /// Returns the serialization of the value.
    fn to_molecule(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_molecule(&mut out);
        out
    }
}

/// Returns the packed `Uint32`.
pub fn uint32(value: u32) -> packed::Uint32 {
    value.pack()
}

/// Returns the packed `Uint64`.
pub fn uint64(value: u64) -> packed::Uint64 {
    value.pack()
}

/// Returns the packed `Uint128`.
pub fn uint128(value: u128) -> packed::Uint128 {
    value.pack()
}

/// Returns the packed `Byte32`.
pub fn byte32(value: impl Into<[u8; 32]>) -> packed::Byte32 {
    value.into().pack()
}

/// Returns the packed `Bytes` vector: a little endian length followed by the raw bytes.
pub fn bytes(data: &[u8]) -> packed::Bytes {
    ckb_types::bytes::Bytes::copy_from_slice(data).pack()
}

/// Returns the serialization of a table made of the provided, already serialized, fields.
///
/// A table starts with its total size and the offset of each field, both relative to the start
/// of the table.
pub fn table(fields: &[&[u8]]) -> Vec<u8> {
    let header_size = NUMBER_SIZE * (fields.len() + 1);
    let total_size = header_size + fields.iter().map(|f| f.len()).sum::<usize>();

    let mut out = Vec::with_capacity(total_size);
    out.extend_from_slice(&pack_number(total_size as Number));
    let mut offset = header_size;
    for field in fields {
        out.extend_from_slice(&pack_number(offset as Number));
        offset += field.len();
    }
    for field in fields {
        out.extend_from_slice(field);
    }
    out
}

/// Returns the serialization of a union item with the provided item id.
pub fn union(item_id: Number, item: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(NUMBER_SIZE + item.len());
    out.extend_from_slice(&pack_number(item_id));
    out.extend_from_slice(item);
    out
}
