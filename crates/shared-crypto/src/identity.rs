//! # Identities
//!
//! [`Identity`] is the raw material an operator hands to the client: the MSP
//! id, the enrollment certificate and the private key. Binding it to a
//! [`CryptoSuite`] yields a [`SigningIdentity`], which is immutable and can be
//! shared between tasks.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use prost::Message;
use zeroize::Zeroizing;

use crate::suite::{CryptoSuite, Signer};
use crate::CryptoError;

/// Wire form of an identity: MSP id plus PEM certificate.
///
/// Field numbers match the ledger's `msp.SerializedIdentity` message so the
/// bytes can be used as a creator or discovery handshake payload.
#[derive(Clone, PartialEq, Message)]
pub struct SerializedIdentity {
    /// Membership service provider id.
    #[prost(string, tag = "1")]
    pub mspid: String,
    /// PEM encoded certificate.
    #[prost(bytes = "vec", tag = "2")]
    pub id_bytes: Vec<u8>,
}

/// Raw identity before it is bound to a crypto suite.
#[derive(Clone)]
pub struct Identity {
    msp_id: String,
    certificate: Vec<u8>,
    private_key: Zeroizing<Vec<u8>>,
}

impl Identity {
    /// Create from in-memory certificate and key material.
    pub fn new(msp_id: impl Into<String>, certificate: Vec<u8>, private_key: Vec<u8>) -> Self {
        Self {
            msp_id: msp_id.into(),
            certificate,
            private_key: Zeroizing::new(private_key),
        }
    }

    /// Load certificate and key from PEM files.
    pub fn from_files(
        msp_id: impl Into<String>,
        certificate_path: impl AsRef<Path>,
        private_key_path: impl AsRef<Path>,
    ) -> Result<Self, CryptoError> {
        let certificate = read_file(certificate_path.as_ref())?;
        let private_key = read_file(private_key_path.as_ref())?;
        Ok(Self::new(msp_id, certificate, private_key))
    }

    /// MSP id this identity belongs to.
    pub fn msp_id(&self) -> &str {
        &self.msp_id
    }

    /// PEM certificate bytes.
    pub fn certificate(&self) -> &[u8] {
        &self.certificate
    }

    /// Bind the identity to a crypto suite.
    pub fn signing_identity(
        &self,
        suite: Arc<dyn CryptoSuite>,
    ) -> Result<SigningIdentity, CryptoError> {
        let signer = suite.new_signer(&self.private_key)?;
        Ok(SigningIdentity {
            msp_id: self.msp_id.clone(),
            certificate: self.certificate.clone(),
            suite,
            signer,
        })
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("msp_id", &self.msp_id)
            .field("certificate_len", &self.certificate.len())
            .finish_non_exhaustive()
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, CryptoError> {
    std::fs::read(path).map_err(|e| CryptoError::Io {
        path: path.display().to_string(),
        error: e.to_string(),
    })
}

/// Identity bound to a crypto suite, able to sign.
pub struct SigningIdentity {
    msp_id: String,
    certificate: Vec<u8>,
    suite: Arc<dyn CryptoSuite>,
    signer: Box<dyn Signer>,
}

impl SigningIdentity {
    /// MSP id.
    pub fn msp_id(&self) -> &str {
        &self.msp_id
    }

    /// PEM certificate bytes.
    pub fn certificate(&self) -> &[u8] {
        &self.certificate
    }

    /// Suite the identity signs with.
    pub fn suite(&self) -> &Arc<dyn CryptoSuite> {
        &self.suite
    }

    /// Encoded public key of the signing key.
    pub fn public_key(&self) -> Vec<u8> {
        self.signer.public_key()
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.signer.sign(message)
    }

    /// Verify a signature produced by this identity.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
        self.suite
            .verify(&self.signer.public_key(), message, signature)
    }

    /// Protobuf encoded [`SerializedIdentity`].
    pub fn serialize(&self) -> Vec<u8> {
        SerializedIdentity {
            mspid: self.msp_id.clone(),
            id_bytes: self.certificate.clone(),
        }
        .encode_to_vec()
    }
}

impl fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("msp_id", &self.msp_id)
            .field("suite", &self.suite.name())
            .finish_non_exhaustive()
    }
}
