//! A local STARK-curve signer for devnet accounts

use starknet::{
    core::{crypto::Signature, types::FieldElement},
    signers::{LocalWallet, SigningKey},
};

use crate::errors::ClientError;

/// The private key of the devnet's default account
pub const DEFAULT_PRIVATE_KEY: u64 = 123456789987654321;

/// A signer holding a private key in memory
#[derive(Clone, Debug)]
pub struct MockSigner {
    /// The key transactions are signed with
    signing_key: SigningKey,
}

impl MockSigner {
    /// Creates a signer from a private key
    pub fn new(private_key: FieldElement) -> Self {
        Self {
            signing_key: SigningKey::from_secret_scalar(private_key),
        }
    }

    /// Creates a signer with a random private key
    pub fn random() -> Self {
        Self {
            signing_key: SigningKey::from_random(),
        }
    }

    /// The private key of the signer
    pub fn private_key(&self) -> FieldElement {
        self.signing_key.secret_scalar()
    }

    /// The public key of the signer
    pub fn public_key(&self) -> FieldElement {
        self.signing_key.verifying_key().scalar()
    }

    /// Signs a transaction hash
    pub fn sign(&self, hash: &FieldElement) -> Result<Signature, ClientError> {
        self.signing_key
            .sign(hash)
            .map_err(|e| ClientError::Signing(e.to_string()))
    }

    /// A wallet signing with the same key, for use with JSON-RPC accounts
    pub fn wallet(&self) -> LocalWallet {
        LocalWallet::from_signing_key(self.signing_key.clone())
    }
}

impl Default for MockSigner {
    fn default() -> Self {
        Self::new(FieldElement::from(DEFAULT_PRIVATE_KEY))
    }
}
