//! # Crypto Suite Registry
//!
//! Maps a suite type name plus options to a [`CryptoSuite`] implementation.
//! The default registry knows `ecdsa`, `secp256k1` and `ed25519`; callers may register
//! more before handing the registry to the client core.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::ecdsa::{EcdsaSuite, CURVE_OPTION, ECDSA_SUITE, HASH_OPTION, SECP256K1_SUITE};
use crate::ed25519::{Ed25519Suite, ED25519_SUITE};
use crate::suite::{CryptoSuite, SuiteOptions};
use crate::CryptoError;

/// Suite used when configuration leaves the crypto type empty.
pub const DEFAULT_SUITE: &str = ECDSA_SUITE;

/// Options paired with [`DEFAULT_SUITE`].
pub fn default_suite_options() -> SuiteOptions {
    let mut options = SuiteOptions::new();
    options.insert(CURVE_OPTION.to_string(), "P256".to_string());
    options.insert(HASH_OPTION.to_string(), "SHA2-256".to_string());
    options.insert("signatureAlgorithm".to_string(), "SHA256".to_string());
    options
}

/// Constructor registered under a suite name.
pub type SuiteFactory =
    Arc<dyn Fn(&SuiteOptions) -> Result<Arc<dyn CryptoSuite>, CryptoError> + Send + Sync>;

/// Registry of crypto suites keyed by type name.
#[derive(Clone)]
pub struct SuiteRegistry {
    factories: BTreeMap<String, SuiteFactory>,
}

impl SuiteRegistry {
    /// Registry with no suites.
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Register (or replace) a suite factory.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&SuiteOptions) -> Result<Arc<dyn CryptoSuite>, CryptoError> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    /// Registered suite names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Look up a suite by type name and build it with `options`.
    pub fn get_suite(
        &self,
        name: &str,
        options: &SuiteOptions,
    ) -> Result<Arc<dyn CryptoSuite>, CryptoError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| CryptoError::UnsupportedSuite {
                name: name.to_string(),
                available: self.names().join(", "),
            })?;
        factory(options)
    }
}

impl Default for SuiteRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(ECDSA_SUITE, EcdsaSuite::from_options);
        registry.register(SECP256K1_SUITE, EcdsaSuite::secp256k1_from_options);
        registry.register(ED25519_SUITE, Ed25519Suite::from_options);
        registry
    }
}

impl fmt::Debug for SuiteRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuiteRegistry")
            .field("suites", &self.names())
            .finish()
    }
}
