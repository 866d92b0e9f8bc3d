//! The rollup hash function.
//!
//! Every protocol hash (script hashes, signing messages) is a blake2b-256 digest personalized with
//! `ckb-default-hash`, the same function the base layer uses for its scripts.

use alloy_primitives::B256;
use ckb_hash::new_blake2b;

/// Returns the rollup hash of the provided data.
pub fn blake2b_256(data: impl AsRef<[u8]>) -> B256 {
    hash_concat([data.as_ref()])
}

/// Returns the rollup hash of the concatenation of the provided parts, without allocating the
/// concatenated buffer.
pub fn hash_concat<'a>(parts: impl IntoIterator<Item = &'a [u8]>) -> B256 {
    let mut hasher = new_blake2b();
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    B256::from(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::b256;

    #[test]
    fn test_empty_input_hash() {
        // blake2b-256("") with the `ckb-default-hash` personalization.
        assert_eq!(
            blake2b_256(b""),
            b256!("44f4c69744d5f8c55d642062949dcae49bc4e7ef43d388c5a12f42b5633d163e")
        );
    }

    #[test]
    fn test_concat_matches_single_buffer() {
        let a = [1u8; 32];
        let b = [2u8; 7];
        let joined = [a.as_slice(), b.as_slice()].concat();
        assert_eq!(hash_concat([a.as_slice(), b.as_slice()]), blake2b_256(joined));
    }
}
