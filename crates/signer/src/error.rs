/// An enum representing the errors that can occur in the signer.
#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    /// The underlying signer failed to produce a signature.
    #[error("failed to sign: {0}")]
    SigningFailed(#[from] alloy_signer::Error),
    /// The signature is malformed or does not recover to a public key.
    #[error("invalid signature: {0}")]
    InvalidSignature(#[from] alloy_primitives::SignatureError),
}
