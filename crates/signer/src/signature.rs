/// The offset added to the recovery id by Ethereum wallets.
const RECOVERY_ID_OFFSET: u8 = 27;

/// Returns the signature with its recovery id in the `{0, 1}` form checked by the rollup.
///
/// Wallets produce recovery ids offset by 27; signatures already in the normalized form are
/// returned unchanged.
#[inline]
pub const fn normalize_recovery_signature(mut signature: [u8; 65]) -> [u8; 65] {
    if signature[64] >= RECOVERY_ID_OFFSET {
        signature[64] -= RECOVERY_ID_OFFSET;
    }
    signature
}
