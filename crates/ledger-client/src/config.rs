//! # Client Configuration
//!
//! Configuration consumed by the construction cascade. Loaded from TOML.
//!
//! ```toml
//! [crypto]
//! type = "ecdsa"
//! options = { curve = "P256", hash = "SHA2-256" }
//!
//! [[msp]]
//! name = "Org1MSP"
//! endorsers = [{ host = "peer0.org1:7051" }]
//!
//! [[orderers]]
//! host = "orderer0:7050"
//! tls = { enabled = true, ca_cert_path = "/etc/ledger/orderer-ca.pem" }
//!
//! [discovery]
//! type = "gossip"
//! connection = { host = "peer0.org1:7051" }
//!
//! [[tls_certs_map]]
//! address = "peer0.org1:7051"
//! tls = { enabled = true, ca_cert_path = "/etc/ledger/org1-ca.pem" }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use shared_crypto::SuiteOptions;
use thiserror::Error;

/// Default per-request timeout for connections, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Complete client configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Crypto suite selection.
    pub crypto: CryptoConfig,
    /// Organizations and their endorsing peers.
    pub msp: Vec<MspConfig>,
    /// Default ordering service endpoints.
    pub orderers: Vec<ConnectionConfig>,
    /// Discovery backend selection.
    pub discovery: DiscoveryConfig,
    /// Per-address TLS settings applied to discovered endpoints.
    pub tls_certs_map: Vec<TlsCertsMapEntry>,
}

impl ClientConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Small two-organization config for tests: one endorser per org,
    /// one orderer, no discovery.
    pub fn for_testing() -> Self {
        Self {
            msp: vec![
                MspConfig {
                    name: "Org1MSP".to_string(),
                    endorsers: vec![ConnectionConfig::new("peer0.org1:7051")],
                },
                MspConfig {
                    name: "Org2MSP".to_string(),
                    endorsers: vec![ConnectionConfig::new("peer0.org2:7051")],
                },
            ],
            orderers: vec![ConnectionConfig::new("orderer0:7050")],
            ..Self::default()
        }
    }
}

/// Crypto suite selection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoConfig {
    /// Suite type name; empty selects the built-in default.
    #[serde(rename = "type")]
    pub suite_type: String,
    /// Suite specific options.
    pub options: SuiteOptions,
}

impl CryptoConfig {
    /// Built-in default: ECDSA on P-256 with SHA2-256.
    pub fn default_suite() -> Self {
        Self {
            suite_type: shared_crypto::DEFAULT_SUITE.to_string(),
            options: shared_crypto::default_suite_options(),
        }
    }
}

/// One organization (MSP) and its endorsing peers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MspConfig {
    /// MSP id.
    pub name: String,
    /// Endorsing peers of this organization.
    pub endorsers: Vec<ConnectionConfig>,
}

/// Connection descriptor for a single host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// `host:port`, optionally with an explicit scheme.
    pub host: String,
    /// TLS settings for this host.
    pub tls: TlsConfig,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl ConnectionConfig {
    /// Plaintext descriptor with default timeouts.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Same descriptor with `tls` replaced.
    #[must_use]
    pub fn with_tls(mut self, tls: TlsConfig) -> Self {
        self.tls = tls;
        self
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Connect timeout.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            tls: TlsConfig::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// TLS settings for one host.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsConfig {
    /// Use TLS at all.
    pub enabled: bool,
    /// CA bundle used to verify the server.
    pub ca_cert_path: Option<PathBuf>,
    /// Client certificate for mutual TLS.
    pub cert_path: Option<PathBuf>,
    /// Client key for mutual TLS.
    pub key_path: Option<PathBuf>,
    /// Override for the name checked against the server certificate.
    pub server_name: Option<String>,
}

impl TlsConfig {
    /// TLS enabled, verifying against `ca_cert_path`.
    pub fn with_ca(ca_cert_path: impl Into<PathBuf>) -> Self {
        Self {
            enabled: true,
            ca_cert_path: Some(ca_cert_path.into()),
            ..Self::default()
        }
    }
}

/// Discovery backend selection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// `local`, `gossip`, or empty for no discovery.
    #[serde(rename = "type")]
    pub discovery_type: String,
    /// Bootstrap peer for the gossip backend.
    pub connection: Option<ConnectionConfig>,
    /// Static topology for the local backend.
    pub local: LocalDiscoveryOptions,
}

/// Static topology served by the local discovery backend.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalDiscoveryOptions {
    /// Known channels.
    pub channels: Vec<LocalChannelConfig>,
}

/// One channel of the static topology.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalChannelConfig {
    /// Channel name.
    pub name: String,
    /// Channel specific ordering endpoints; empty means "use the default".
    pub orderers: Vec<LocalEndpointConfig>,
    /// Chaincodes instantiated on the channel.
    pub chaincodes: Vec<LocalChaincodeConfig>,
}

/// Hosts of one organization.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalEndpointConfig {
    /// Organization owning the hosts.
    pub msp_id: String,
    /// `host:port` list.
    pub hosts: Vec<String>,
}

/// One chaincode of a static channel.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalChaincodeConfig {
    /// Chaincode name.
    pub name: String,
    /// Chaincode version.
    pub version: String,
    /// Peers able to endorse this chaincode.
    pub endorsers: Vec<LocalEndpointConfig>,
}

/// TLS settings for one address.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsCertsMapEntry {
    /// `host:port` as reported by discovery.
    pub address: String,
    /// TLS settings to use for it.
    pub tls: TlsConfig,
}

/// Errors that can occur during config loading.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// File I/O error.
    #[error("failed to read config {path}: {error}")]
    Io {
        /// Path of the file that failed to load.
        path: String,
        /// Error message from the I/O operation.
        error: String,
    },
    /// TOML parse error.
    #[error("failed to parse config: {0}")]
    Parse(String),
}
