//! # Domain Errors
//!
//! One error enum per layer. Only [`CoreError`] escapes to callers of the
//! public API; the rest surface through ports and are either wrapped into it
//! during construction or logged and recorded during channel resolution.

use shared_crypto::CryptoError;
use thiserror::Error;

use crate::config::ConfigError;

/// Connection building errors.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// Builder was called with an empty descriptor list.
    #[error("no connection targets given")]
    NoTargets,

    /// Host cannot be turned into an endpoint.
    #[error("invalid endpoint `{host}`: {reason}")]
    InvalidEndpoint {
        /// Offending host
        host: String,
        /// Parser message
        reason: String,
    },

    /// TLS material unreadable or rejected.
    #[error("tls setup for `{host}` failed: {reason}")]
    Tls {
        /// Host the TLS settings belong to
        host: String,
        /// Underlying message
        reason: String,
    },

    /// Context was cancelled before the connection was built.
    #[error("connection cancelled")]
    Cancelled,

    /// Transport level failure.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Peer pool errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// Peers must be registered under a non-empty organization.
    #[error("msp id must not be empty")]
    EmptyMspId,

    /// Same address registered twice for one organization.
    #[error("peer {address} already registered for {msp_id}")]
    PeerAlreadyExists {
        /// Organization
        msp_id: String,
        /// Duplicate address
        address: String,
    },
}

/// Discovery provider and transport errors.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// No discovery provider is configured.
    #[error("discovery provider is not configured")]
    Unavailable,

    /// Backend does not implement the query.
    #[error("{0} is not supported by this discovery backend")]
    Unsupported(&'static str),

    /// Channel unknown to the backend.
    #[error("channel `{0}` not found")]
    ChannelNotFound(String),

    /// Chaincode unknown on the channel.
    #[error("chaincode `{chaincode}` not found on channel `{channel}`")]
    ChaincodeNotFound {
        /// Channel name
        channel: String,
        /// Chaincode name
        chaincode: String,
    },

    /// Context was cancelled while the query was in flight.
    #[error("discovery cancelled")]
    Cancelled,

    /// Transport level failure.
    #[error("discovery transport error: {0}")]
    Transport(String),

    /// Request could not be signed.
    #[error("failed to sign discovery request: {0}")]
    Signing(#[source] CryptoError),

    /// Service answered with an error.
    #[error("discovery service rejected the query: {0}")]
    Rejected(String),

    /// Response did not match the query.
    #[error("invalid discovery response: {0}")]
    InvalidResponse(String),

    /// Backend configuration is inconsistent.
    #[error("invalid discovery configuration: {0}")]
    InvalidConfig(String),
}

/// Orderer construction errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrdererError {
    /// Connection spans no ordering hosts.
    #[error("orderer connection has no endpoints")]
    NoEndpoints,

    /// Context was cancelled.
    #[error("orderer construction cancelled")]
    Cancelled,
}

/// Chaincode fetch errors.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Repository path does not exist under the source root.
    #[error("chaincode source `{0}` not found")]
    NotFound(String),

    /// Reading the sources failed.
    #[error("failed to read chaincode source {path}: {error}")]
    Io {
        /// Path being read
        path: String,
        /// Error message
        error: String,
    },

    /// Context was cancelled.
    #[error("chaincode fetch cancelled")]
    Cancelled,
}

/// Construction errors returned by `Core::new`.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A construction option failed to apply.
    #[error("option #{index} failed: {source}")]
    Option {
        /// Zero-based position in the option list
        index: usize,
        /// Error produced by the option
        #[source]
        source: Box<CoreError>,
    },

    /// A stage needed configuration but none was given.
    #[error("config is empty")]
    EmptyConfig,

    /// No identity was supplied.
    #[error("identity wasn't provided")]
    MissingIdentity,

    /// Crypto type not registered.
    #[error("unsupported crypto suite `{name}`, available: {available}")]
    UnsupportedCryptoSuite {
        /// Requested type
        name: String,
        /// Registered types
        available: String,
    },

    /// Suite exists but rejected its options.
    #[error("failed to initialize crypto suite: {0}")]
    CryptoSuite(#[source] CryptoError),

    /// Identity key material unusable with the suite.
    #[error("failed to create signing identity: {0}")]
    Identity(#[source] CryptoError),

    /// Endorser connection for an organization could not be built.
    #[error("failed to initialize endorsers for MSP: {msp_id}: {source}")]
    PeerConnection {
        /// Organization
        msp_id: String,
        /// Cause
        #[source]
        source: ConnectionError,
    },

    /// Peer pool rejected a registration.
    #[error("failed to add peer for MSP: {msp_id}: {source}")]
    PeerPool {
        /// Organization
        msp_id: String,
        /// Cause
        #[source]
        source: PoolError,
    },

    /// Gossip discovery selected without a bootstrap connection.
    #[error("discovery connection config wasn't provided. configure 'discovery.connection'")]
    MissingDiscoveryConnection,

    /// Discovery type not recognized.
    #[error("unknown discovery type={given}. available: {available}")]
    UnknownDiscoveryType {
        /// Configured type
        given: String,
        /// Known types
        available: String,
    },

    /// Bootstrap connection for gossip discovery failed.
    #[error("failed to connect to discovery service: {0}")]
    DiscoveryConnection(#[source] ConnectionError),

    /// Discovery provider could not be built.
    #[error("failed to initialize discovery provider: {0}")]
    Discovery(#[source] DiscoveryError),

    /// Local peers query failed.
    #[error("failed to fetch local peers: {0}")]
    LocalPeers(#[source] DiscoveryError),

    /// Default orderer connection failed.
    #[error("failed to connect to orderers: {0}")]
    OrdererConnection(#[source] ConnectionError),

    /// Default orderer could not be constructed.
    #[error("failed to create orderer: {0}")]
    Orderer(#[source] OrdererError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl CoreError {
    /// Error with any option wrapper removed.
    pub fn root(&self) -> &CoreError {
        match self {
            CoreError::Option { source, .. } => source.root(),
            other => other,
        }
    }
}
