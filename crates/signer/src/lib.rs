//! A library responsible for signing rollup transactions and withdrawal requests.
//!
//! The signer is generic and can use any implementation of the `Signer` trait from the
//! `alloy_signer` crate, including local and remote signers such as AWS KMS. Messages are wrapped
//! as Ethereum personal messages before signing and the produced signatures carry a normalized
//! recovery id.

use std::{sync::Arc, time::Instant};

use alloy_primitives::{Address, Bytes, Signature, B256};
use rollup_client_primitives::{
    L2Transaction, RawL2Transaction, RawWithdrawalRequest, WithdrawalRequest,
};

mod error;
pub use error::SignerError;

mod message;
pub use message::{signing_digest, transaction_message, withdrawal_message};

mod metrics;
pub use metrics::SignerMetrics;

mod signature;
pub use signature::normalize_recovery_signature;

/// Signs rollup messages on behalf of a single account owner.
#[derive(Clone)]
pub struct MessageSigner {
    /// The type hash of the rollup the messages are bound to.
    rollup_type_hash: B256,
    /// The signer instance.
    signer: Arc<dyn alloy_signer::Signer<Signature> + Send + Sync>,
    /// The signer metrics.
    metrics: SignerMetrics,
}

impl MessageSigner {
    /// Creates a new [`MessageSigner`] bound to the provided rollup.
    pub fn new(
        rollup_type_hash: B256,
        signer: impl alloy_signer::Signer<Signature> + Send + Sync + 'static,
    ) -> Self {
        Self { rollup_type_hash, signer: Arc::new(signer), metrics: SignerMetrics::default() }
    }

    /// Returns the address of the owner.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Returns the type hash of the rollup.
    pub const fn rollup_type_hash(&self) -> B256 {
        self.rollup_type_hash
    }

    /// Signs the personal message digest of `message` and returns the normalized 65 bytes
    /// signature.
    pub async fn sign_message(&self, message: B256) -> Result<Bytes, SignerError> {
        let now = Instant::now();
        let res = self.signer.sign_hash(&signing_digest(message)).await;
        self.metrics.signing_duration.record(now.elapsed().as_secs_f64());

        let signature = res.inspect_err(|err| {
            self.metrics.signing_failures.increment(1);
            tracing::error!(target: "rollup_client::signer", ?err, %message, "An error occurred while signing");
        })?;
        Ok(Bytes::copy_from_slice(&normalize_recovery_signature(signature.as_bytes())))
    }

    /// Signs a raw transaction sent from the account with script hash `sender_script_hash` to the
    /// account with script hash `receiver_script_hash`.
    pub async fn sign_transaction(
        &self,
        raw: RawL2Transaction,
        sender_script_hash: B256,
        receiver_script_hash: B256,
    ) -> Result<L2Transaction, SignerError> {
        let message =
            transaction_message(&raw, self.rollup_type_hash, sender_script_hash, receiver_script_hash);
        tracing::trace!(target: "rollup_client::signer", from_id = raw.from_id, to_id = raw.to_id, nonce = raw.nonce, %message, "signing transaction");
        let signature = self.sign_message(message).await?;
        Ok(L2Transaction { raw, signature })
    }

    /// Signs a raw withdrawal request.
    pub async fn sign_withdrawal(
        &self,
        raw: RawWithdrawalRequest,
    ) -> Result<WithdrawalRequest, SignerError> {
        let message = withdrawal_message(&raw, self.rollup_type_hash);
        tracing::trace!(target: "rollup_client::signer", nonce = raw.nonce, capacity = raw.capacity, %message, "signing withdrawal request");
        let signature = self.sign_message(message).await?;
        Ok(WithdrawalRequest { raw, signature })
    }
}

/// Returns the address of the owner who signed `message`.
pub fn recover_owner(message: B256, signature: &[u8]) -> Result<Address, SignerError> {
    let signature = Signature::from_raw(signature)?;
    Ok(signature.recover_address_from_prehash(&signing_digest(message))?)
}

impl std::fmt::Debug for MessageSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageSigner")
            .field("rollup_type_hash", &self.rollup_type_hash)
            .field("signer", &"alloy_signer::Signer")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_signer_local::PrivateKeySigner;
    use rollup_client_primitives::{Fee, Molecule, DEFAULT_SELL_CAPACITY};

    const ROLLUP: B256 = B256::repeat_byte(0x17);

    #[tokio::test]
    async fn test_withdrawal_round_trip() {
        reth_tracing::init_test_tracing();
        let key = PrivateKeySigner::random();
        let signer = MessageSigner::new(ROLLUP, key.clone());

        let raw = RawWithdrawalRequest {
            nonce: 0,
            capacity: 4_000_000_000_000,
            amount: 0,
            sudt_script_hash: B256::ZERO,
            account_script_hash: B256::repeat_byte(1),
            sell_amount: 0,
            sell_capacity: DEFAULT_SELL_CAPACITY,
            owner_lock_hash: B256::repeat_byte(2),
            payment_lock_hash: B256::ZERO,
            fee: Fee { sudt_id: 1, amount: 0 },
        };
        let message = withdrawal_message(&raw, ROLLUP);
        let request = signer.sign_withdrawal(raw.clone()).await.unwrap();

        assert_eq!(request.raw, raw);
        assert_eq!(request.signature.len(), 65);
        assert!(request.signature[64] <= 1);
        assert_eq!(recover_owner(message, &request.signature).unwrap(), key.address());

        let serialized = raw.to_molecule();
        let mut flipped = serialized.clone();
        flipped[0] ^= 1;
        assert_ne!(
            rollup_client_primitives::hash_concat([ROLLUP.as_slice(), flipped.as_slice()]),
            message
        );
    }

    #[tokio::test]
    async fn test_transaction_signature_recovers_sender() {
        reth_tracing::init_test_tracing();
        let key = PrivateKeySigner::random();
        let signer = MessageSigner::new(ROLLUP, key.clone());

        let raw = RawL2Transaction { from_id: 5, to_id: 1, nonce: 2, args: Bytes::new() };
        let sender = B256::repeat_byte(0x05);
        let receiver = B256::repeat_byte(0x01);
        let tx = signer.sign_transaction(raw.clone(), sender, receiver).await.unwrap();

        let message = transaction_message(&raw, ROLLUP, sender, receiver);
        assert_eq!(recover_owner(message, &tx.signature).unwrap(), key.address());

        // A signature over another sender does not recover the key.
        let other = transaction_message(&raw, ROLLUP, B256::repeat_byte(0x06), receiver);
        assert_ne!(recover_owner(other, &tx.signature).ok(), Some(key.address()));
    }

    #[test]
    fn test_recover_malformed_signature() {
        assert!(matches!(
            recover_owner(B256::ZERO, &[0u8; 12]),
            Err(SignerError::InvalidSignature(_))
        ));
    }
}
