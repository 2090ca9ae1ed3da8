//! # Ed25519 Suite
//!
//! Twisted Edwards curve signatures with deterministic nonces.
//!
//! ## Security Properties
//!
//! - No RNG dependency (deterministic nonce from message)
//! - Complete addition formulas (no conditional branches)
//! - Message is signed directly (Ed25519 hashes internally with SHA-512)

use std::sync::Arc;

use ed25519_dalek::pkcs8::DecodePrivateKey;
use ed25519_dalek::{Signer as _, SigningKey, Verifier as _, VerifyingKey};
use sha2::{Digest, Sha512};
use zeroize::Zeroize;

use crate::suite::{is_pem, pem_str, CryptoSuite, Signer, SuiteOptions};
use crate::CryptoError;

/// Registered type name of this suite.
pub const ED25519_SUITE: &str = "ed25519";

/// Ed25519 crypto suite.
#[derive(Debug, Clone, Default)]
pub struct Ed25519Suite;

impl Ed25519Suite {
    /// Registry factory. Ed25519 takes no options.
    pub fn from_options(_options: &SuiteOptions) -> Result<Arc<dyn CryptoSuite>, CryptoError> {
        Ok(Arc::new(Self))
    }

    /// Generate a random secret seed.
    pub fn generate_key(&self) -> [u8; 32] {
        SigningKey::generate(&mut rand::thread_rng()).to_bytes()
    }
}

struct Ed25519Signer {
    signing_key: SigningKey,
}

impl Ed25519Signer {
    fn decode(private_key: &[u8]) -> Result<Self, CryptoError> {
        let signing_key = if is_pem(private_key) {
            SigningKey::from_pkcs8_pem(pem_str(private_key)?)
                .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?
        } else {
            let mut seed: [u8; 32] = private_key.try_into().map_err(|_| {
                CryptoError::InvalidPrivateKey(format!(
                    "expected 32-byte seed, got {} bytes",
                    private_key.len()
                ))
            })?;
            let key = SigningKey::from_bytes(&seed);
            seed.zeroize();
            key
        };
        Ok(Self { signing_key })
    }
}

impl Signer for Ed25519Signer {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Ok(self.signing_key.sign(message).to_bytes().to_vec())
    }

    fn public_key(&self) -> Vec<u8> {
        self.signing_key.verifying_key().to_bytes().to_vec()
    }
}

impl Drop for Ed25519Signer {
    fn drop(&mut self) {
        // Zeroize secret key material
        let mut bytes = self.signing_key.to_bytes();
        bytes.zeroize();
    }
}

impl CryptoSuite for Ed25519Suite {
    fn name(&self) -> &str {
        ED25519_SUITE
    }

    fn hash(&self, message: &[u8]) -> Vec<u8> {
        Sha512::digest(message).to_vec()
    }

    fn new_signer(&self, private_key: &[u8]) -> Result<Box<dyn Signer>, CryptoError> {
        Ok(Box::new(Ed25519Signer::decode(private_key)?))
    }

    fn verify(
        &self,
        public_key: &[u8],
        message: &[u8],
        signature: &[u8],
    ) -> Result<(), CryptoError> {
        let public_key: [u8; 32] = public_key
            .try_into()
            .map_err(|_| CryptoError::InvalidPublicKey)?;
        let verifying_key =
            VerifyingKey::from_bytes(&public_key).map_err(|_| CryptoError::InvalidPublicKey)?;

        let signature = ed25519_dalek::Signature::from_slice(signature)
            .map_err(|_| CryptoError::InvalidSignature)?;

        verifying_key
            .verify(message, &signature)
            .map_err(|_| CryptoError::SignatureVerificationFailed)
    }
}
