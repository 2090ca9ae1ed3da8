//! # Crypto Suite Port
//!
//! A crypto suite bundles the hash function and signature scheme an identity
//! signs with. Suites are looked up by type name through
//! [`SuiteRegistry`](crate::SuiteRegistry).

use std::collections::BTreeMap;
use std::fmt;

use crate::CryptoError;

/// Free-form suite options (`curve`, `hash`, ...) as they appear in config.
pub type SuiteOptions = BTreeMap<String, String>;

/// Signing and verification implementation selected by type name.
pub trait CryptoSuite: Send + Sync + fmt::Debug {
    /// Registered type name of this suite.
    fn name(&self) -> &str;

    /// Digest used by the suite's signature scheme.
    fn hash(&self, message: &[u8]) -> Vec<u8>;

    /// Build a signer from private key material.
    ///
    /// Accepts PEM (PKCS#8 or SEC1 where the curve allows it) or the raw
    /// 32-byte scalar/seed.
    fn new_signer(&self, private_key: &[u8]) -> Result<Box<dyn Signer>, CryptoError>;

    /// Verify `signature` over `message` with an encoded public key.
    fn verify(&self, public_key: &[u8], message: &[u8], signature: &[u8])
        -> Result<(), CryptoError>;
}

/// Key-bound signer produced by a [`CryptoSuite`].
pub trait Signer: Send + Sync {
    /// Sign a message. The suite hashes internally.
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Encoded public key matching this signer.
    fn public_key(&self) -> Vec<u8>;
}

/// Returns true when `bytes` look like PEM text.
pub(crate) fn is_pem(bytes: &[u8]) -> bool {
    bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .map(|start| bytes[start..].starts_with(b"-----BEGIN"))
        .unwrap_or(false)
}

/// Interpret PEM bytes as UTF-8 text.
pub(crate) fn pem_str(bytes: &[u8]) -> Result<&str, CryptoError> {
    std::str::from_utf8(bytes).map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))
}
