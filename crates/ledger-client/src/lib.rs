//! # Ledger Client Core
//!
//! Bootstraps a client of a permissioned ledger network: crypto suite,
//! signing identity, endorsing peer pool, discovery provider and default
//! orderer. Channel and chaincode handles are created lazily and cached.
//!
//! ## Construction Cascade
//!
//! ```text
//! options (in order) ──→ crypto suite ──→ identity ──→ peer pool
//!                                                         │
//!          fetcher ←── default orderer ←── discovery ←────┘
//! ```
//!
//! Anything an option supplies is used as is; everything else is derived
//! from the [`ClientConfig`].
//!
//! ## Channel Orderer Resolution
//!
//! | Situation | Channel orderer | [`OrdererResolution`] |
//! |-----------|-----------------|-----------------------|
//! | discovery returned orderers, connection ok | discovered | `Discovered` |
//! | discovery returned no orderers | default | `NoChannelOrderers` |
//! | no discovery provider | default | `DiscoveryUnavailable` |
//! | discovery query failed | default | `DiscoveryFailed` |
//! | connection or orderer creation failed | default | `ConnectionFailed` |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Endpoints, handles, discovery results, errors
//! - `ports/` - `CoreApi` and the outbound collaborator traits
//! - `adapters/` - gRPC connections, in-memory peer pool, local fetcher
//! - `discovery/` - Local and gossip discovery backends
//! - `service/` - Construction cascade and the [`Core`]
//!
//! ## Usage
//!
//! ```ignore
//! use ledger_client::{Core, Identity};
//!
//! let identity = Identity::from_files("Org1MSP", "cert.pem", "key.pem")?;
//! let core = Core::builder("Org1MSP")
//!     .identity(identity)
//!     .config_file("client.toml")
//!     .build()
//!     .await?;
//!
//! let channel = core.channel("mychannel").await;
//! let orderer = channel.orderer();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod discovery;
pub mod domain;
pub mod ports;
pub mod service;
pub mod telemetry;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export key types for convenience
pub use config::{
    ClientConfig, ConfigError, ConnectionConfig, CryptoConfig, DiscoveryConfig,
    LocalChaincodeConfig, LocalChannelConfig, LocalDiscoveryOptions, LocalEndpointConfig,
    MspConfig, TlsCertsMapEntry, TlsConfig,
};
pub use domain::{
    ChaincodeDiscovery, ChaincodeSource, ChannelDiscovery, Connection, ConnectionError, CoreError,
    DiscoveryError, DiscoveryType, FetchError, HostAddress, HostEndpoint, LocalPeersDiscovery,
    Orderer, OrdererError, Peer, PeerStrategy, PoolError, SourceFile,
};
pub use ports::{
    ConnectionBuilder, CoreApi, DiscoveryProvider, DiscoveryTransport, Fetcher, OrdererConnector,
    PeerPool,
};
pub use service::{
    ChaincodePackage, Channel, Core, CoreBuilder, CoreOption, Lifecycle, Lscc, OrdererResolution,
    SystemCc, SystemChaincode,
};
pub use telemetry::{init_tracing, TelemetryConfig, TelemetryError};

// Re-export identity types callers need to construct a core
pub use shared_crypto::{CryptoSuite, Identity, SigningIdentity, SuiteRegistry};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
