//! Signing capability.

use ed25519_dalek::{Signer as _, SigningKey};

use openlease_types::{Address, Result};

/// Signs transaction bytes on behalf of one actor.
pub trait Signer: Send + Sync {
    fn public_key(&self) -> [u8; 32];

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>>;

    /// Ledger address of this signer.
    fn address(&self) -> Address {
        Address::from_public_key(&self.public_key())
    }
}

/// In-process ed25519 key.
pub struct Ed25519Signer {
    key: SigningKey,
}

impl Ed25519Signer {
    /// Fresh key from the OS RNG.
    #[must_use]
    pub fn generate() -> Self {
        Self {
            key: SigningKey::generate(&mut rand::rngs::OsRng),
        }
    }

    #[must_use]
    pub fn from_bytes(secret: &[u8; 32]) -> Self {
        Self {
            key: SigningKey::from_bytes(secret),
        }
    }
}

impl Signer for Ed25519Signer {
    fn public_key(&self) -> [u8; 32] {
        self.key.verifying_key().to_bytes()
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        Ok(self.key.sign(message).to_bytes().to_vec())
    }
}

impl std::fmt::Debug for Ed25519Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519Signer")
            .field("address", &self.address().short())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use openlease_types::{SignedTx, TxCreateOrder, TxPayload, signing_bytes};

    use super::*;

    #[test]
    fn signatures_verify_in_an_envelope() {
        let signer = Ed25519Signer::from_bytes(&[5u8; 32]);
        let payload = TxPayload::CreateOrder(TxCreateOrder {
            id: openlease_types::OrderId::new(
                openlease_types::GroupId::new(Address::repeat(1), 1),
                1,
            ),
            end_at: 3,
        });
        let signature = signer.sign(&signing_bytes(&payload, 4).unwrap()).unwrap();
        let tx = SignedTx {
            payload,
            nonce: 4,
            public_key: signer.public_key(),
            signature,
        };
        tx.verify().unwrap();
        assert_eq!(tx.signer(), signer.address());
    }

    #[test]
    fn generated_keys_differ() {
        assert_ne!(
            Ed25519Signer::generate().address(),
            Ed25519Signer::generate().address()
        );
    }
}
