/// An error that occurred while deriving or parsing an account address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    /// The owner identity does not have the length expected by the lock script.
    #[error("malformed owner identity: expected {expected} bytes, got {got}")]
    MalformedIdentity {
        /// The expected length in bytes.
        expected: usize,
        /// The provided length in bytes.
        got: usize,
    },
    /// The account handle is neither a decimal account id nor a `0x` prefixed short address.
    #[error("invalid account handle: {0}")]
    InvalidHandle(String),
}
