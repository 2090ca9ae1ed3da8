//! # Shared Crypto - Identity and Crypto Suites
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `ecdsa` | P-256 / secp256k1, SHA-256 | Default MSP identity signing (`ecdsa`, `secp256k1`) |
//! | `ed25519` | Ed25519 | Alternative identity signing |
//! | `registry` | - | Suite lookup by type name + options |
//! | `identity` | - | Raw identity -> signing identity |
//!
//! ## Security Properties
//!
//! - **ECDSA**: RFC 6979 deterministic, low-S normalization, DER signatures
//! - **Ed25519**: Deterministic nonces, no RNG dependency
//! - Private key material is zeroized on drop

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdsa;
pub mod ed25519;
pub mod errors;
pub mod identity;
pub mod registry;
pub mod suite;

// Re-exports
pub use ecdsa::{Curve, EcdsaSuite, ECDSA_SUITE, SECP256K1_SUITE};
pub use ed25519::{Ed25519Suite, ED25519_SUITE};
pub use errors::CryptoError;
pub use identity::{Identity, SerializedIdentity, SigningIdentity};
pub use registry::{default_suite_options, SuiteFactory, SuiteRegistry, DEFAULT_SUITE};
pub use suite::{CryptoSuite, Signer, SuiteOptions};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
