//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// No suite registered under the requested type name
    #[error("unsupported crypto suite `{name}`, available: {available}")]
    UnsupportedSuite {
        /// Requested suite type
        name: String,
        /// Comma separated list of registered suites
        available: String,
    },

    /// Suite option has a value the suite cannot honour
    #[error("crypto suite `{suite}` does not support {option} = `{value}`")]
    UnsupportedOption {
        /// Suite type name
        suite: String,
        /// Option key
        option: String,
        /// Rejected value
        value: String,
    },

    /// Signature verification failed
    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    /// Invalid public key
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Invalid private key
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Invalid signature
    #[error("Invalid signature")]
    InvalidSignature,

    /// Signing backend refused to produce a signature
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// Key or certificate file could not be read
    #[error("failed to read {path}: {error}")]
    Io {
        /// Path of the file
        path: String,
        /// Underlying I/O error message
        error: String,
    },
}
