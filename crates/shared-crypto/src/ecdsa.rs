//! # ECDSA Suite
//!
//! The `ecdsa` crypto suite. The curve is chosen by the `curve` option:
//!
//! | `curve` | Backend | Notes |
//! |---------|---------|-------|
//! | `P256` (default) | `p256` | NIST P-256, what ledger MSPs issue |
//! | `secp256k1` | `k256` | Kept for node identities on secp256k1 |
//!
//! ## Security Properties
//!
//! - RFC 6979 deterministic nonces (no RNG dependency for signing)
//! - Low-S normalization, signatures emitted as ASN.1 DER
//! - Message is hashed with SHA-256 before signing

use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::suite::{is_pem, pem_str, CryptoSuite, Signer, SuiteOptions};
use crate::CryptoError;

/// Registered type name of this suite.
pub const ECDSA_SUITE: &str = "ecdsa";

/// Registered type name of the secp256k1 variant.
pub const SECP256K1_SUITE: &str = "secp256k1";

/// Option key selecting the curve.
pub const CURVE_OPTION: &str = "curve";

/// Option key selecting the digest.
pub const HASH_OPTION: &str = "hash";

/// Elliptic curve backing an [`EcdsaSuite`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Curve {
    /// NIST P-256.
    P256,
    /// secp256k1.
    Secp256k1,
}

impl Curve {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "p256" | "p-256" | "secp256r1" | "prime256v1" => Some(Curve::P256),
            "secp256k1" | "k256" => Some(Curve::Secp256k1),
            _ => None,
        }
    }
}

/// ECDSA over SHA-256.
#[derive(Debug, Clone)]
pub struct EcdsaSuite {
    curve: Curve,
}

impl EcdsaSuite {
    /// Create a suite for the given curve.
    pub fn new(curve: Curve) -> Self {
        Self { curve }
    }

    /// Curve this suite signs on.
    pub fn curve(&self) -> Curve {
        self.curve
    }

    /// Registry factory: reads `curve` and `hash` options.
    pub fn from_options(options: &SuiteOptions) -> Result<Arc<dyn CryptoSuite>, CryptoError> {
        let curve = match options.get(CURVE_OPTION) {
            None => Curve::P256,
            Some(value) => Curve::parse(value).ok_or_else(|| CryptoError::UnsupportedOption {
                suite: ECDSA_SUITE.to_string(),
                option: CURVE_OPTION.to_string(),
                value: value.clone(),
            })?,
        };

        if let Some(hash) = options.get(HASH_OPTION) {
            if !matches!(hash.to_ascii_uppercase().as_str(), "SHA2-256" | "SHA256" | "SHA-256") {
                return Err(CryptoError::UnsupportedOption {
                    suite: ECDSA_SUITE.to_string(),
                    option: HASH_OPTION.to_string(),
                    value: hash.clone(),
                });
            }
        }

        Ok(Arc::new(Self::new(curve)))
    }

    /// Registry factory for the `secp256k1` type name; forces the curve.
    pub fn secp256k1_from_options(
        options: &SuiteOptions,
    ) -> Result<Arc<dyn CryptoSuite>, CryptoError> {
        let mut options = options.clone();
        options.insert(CURVE_OPTION.to_string(), "secp256k1".to_string());
        Self::from_options(&options)
    }

    /// Generate a fresh private key for this curve, returned as the raw scalar.
    pub fn generate_key(&self) -> [u8; 32] {
        match self.curve {
            Curve::P256 => p256::ecdsa::SigningKey::random(&mut rand::thread_rng())
                .to_bytes()
                .into(),
            Curve::Secp256k1 => k256::ecdsa::SigningKey::random(&mut rand::thread_rng())
                .to_bytes()
                .into(),
        }
    }
}

impl Default for EcdsaSuite {
    fn default() -> Self {
        Self::new(Curve::P256)
    }
}

/// Shared decode/sign/verify body for both curves; the crates expose the same
/// `ecdsa` 0.16 API under different modules.
macro_rules! curve_impl {
    ($module:ident, $signer:ident, $curve:ident) => {
        mod $module {
            use super::*;
            use $curve::ecdsa::signature::{Signer as _, Verifier as _};
            use $curve::ecdsa::{Signature, SigningKey, VerifyingKey};
            use $curve::pkcs8::DecodePrivateKey;

            pub(super) struct $signer {
                key: SigningKey,
            }

            impl $signer {
                pub(super) fn decode(private_key: &[u8]) -> Result<Self, CryptoError> {
                    let key = if is_pem(private_key) {
                        let pem = pem_str(private_key)?;
                        if pem.contains("EC PRIVATE KEY") {
                            $curve::SecretKey::from_sec1_pem(pem)
                                .map(SigningKey::from)
                                .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?
                        } else {
                            SigningKey::from_pkcs8_pem(pem)
                                .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?
                        }
                    } else {
                        SigningKey::from_slice(private_key)
                            .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?
                    };
                    Ok(Self { key })
                }
            }

            impl Signer for $signer {
                fn sign(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
                    let signature: Signature = self
                        .key
                        .try_sign(message)
                        .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;
                    let signature = signature.normalize_s().unwrap_or(signature);
                    Ok(signature.to_der().as_bytes().to_vec())
                }

                fn public_key(&self) -> Vec<u8> {
                    self.key
                        .verifying_key()
                        .to_encoded_point(true)
                        .as_bytes()
                        .to_vec()
                }
            }

            pub(super) fn verify(
                public_key: &[u8],
                message: &[u8],
                signature: &[u8],
            ) -> Result<(), CryptoError> {
                let verifying_key = VerifyingKey::from_sec1_bytes(public_key)
                    .map_err(|_| CryptoError::InvalidPublicKey)?;
                let signature =
                    Signature::from_der(signature).map_err(|_| CryptoError::InvalidSignature)?;
                verifying_key
                    .verify(message, &signature)
                    .map_err(|_| CryptoError::SignatureVerificationFailed)
            }
        }
    };
}

curve_impl!(nist_p256, P256Signer, p256);
curve_impl!(secp256k1, K256Signer, k256);

impl CryptoSuite for EcdsaSuite {
    fn name(&self) -> &str {
        match self.curve {
            Curve::P256 => ECDSA_SUITE,
            Curve::Secp256k1 => SECP256K1_SUITE,
        }
    }

    fn hash(&self, message: &[u8]) -> Vec<u8> {
        Sha256::digest(message).to_vec()
    }

    fn new_signer(&self, private_key: &[u8]) -> Result<Box<dyn Signer>, CryptoError> {
        Ok(match self.curve {
            Curve::P256 => Box::new(nist_p256::P256Signer::decode(private_key)?),
            Curve::Secp256k1 => Box::new(secp256k1::K256Signer::decode(private_key)?),
        })
    }

    fn verify(
        &self,
        public_key: &[u8],
        message: &[u8],
        signature: &[u8],
    ) -> Result<(), CryptoError> {
        match self.curve {
            Curve::P256 => nist_p256::verify(public_key, message, signature),
            Curve::Secp256k1 => secp256k1::verify(public_key, message, signature),
        }
    }
}
