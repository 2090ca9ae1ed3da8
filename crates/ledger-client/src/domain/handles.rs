//! Connection, peer and orderer handles.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ConnectionConfig;

/// Timeout Core attaches to every peer it registers.
pub const DEFAULT_PEER_TIMEOUT: Duration = Duration::from_secs(5);

/// One logical connection load-balanced across its targets.
#[derive(Clone)]
pub struct Connection {
    targets: Arc<[ConnectionConfig]>,
    channel: Option<tonic::transport::Channel>,
}

impl Connection {
    /// Connection backed by a gRPC channel.
    pub fn new(targets: Vec<ConnectionConfig>, channel: tonic::transport::Channel) -> Self {
        Self {
            targets: targets.into(),
            channel: Some(channel),
        }
    }

    /// Connection with no transport behind it. Used by non-gRPC builders.
    pub fn detached(targets: Vec<ConnectionConfig>) -> Self {
        Self {
            targets: targets.into(),
            channel: None,
        }
    }

    /// Descriptors this connection spans.
    pub fn targets(&self) -> &[ConnectionConfig] {
        &self.targets
    }

    /// Target hosts in order.
    pub fn addresses(&self) -> Vec<String> {
        self.targets.iter().map(|t| t.host.clone()).collect()
    }

    /// Underlying gRPC channel, if any.
    pub fn grpc_channel(&self) -> Option<&tonic::transport::Channel> {
        self.channel.as_ref()
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("targets", &self.addresses())
            .field("grpc", &self.channel.is_some())
            .finish()
    }
}

/// How the pool talks to a registered peer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PeerStrategy {
    /// Plain gRPC with a per-request timeout.
    Grpc {
        /// Per-request timeout.
        timeout: Duration,
    },
}

impl Default for PeerStrategy {
    fn default() -> Self {
        PeerStrategy::Grpc {
            timeout: DEFAULT_PEER_TIMEOUT,
        }
    }
}

/// Endorsing peer.
#[derive(Clone, Debug)]
pub struct Peer {
    address: String,
    connection: Connection,
}

impl Peer {
    /// Peer reachable through `connection`.
    pub fn new(address: impl Into<String>, connection: Connection) -> Self {
        Self {
            address: address.into(),
            connection,
        }
    }

    /// Address the peer was registered under.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Connection to the peer.
    pub fn connection(&self) -> &Connection {
        &self.connection
    }
}

/// Ordering service handle.
#[derive(Clone, Debug)]
pub struct Orderer {
    connection: Connection,
}

impl Orderer {
    /// Wrap a connection. Prefer an [`OrdererConnector`](crate::ports::OrdererConnector).
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    /// Connection to the ordering service.
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Ordering hosts this handle balances across.
    pub fn addresses(&self) -> Vec<String> {
        self.connection.addresses()
    }
}

/// One file of a fetched chaincode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to the repository root.
    pub path: PathBuf,
    /// File content.
    pub content: Vec<u8>,
}

/// Chaincode sources as returned by a fetcher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChaincodeSource {
    /// Repository path the source was fetched from.
    pub repository: String,
    /// Requested version.
    pub version: String,
    /// Files, sorted by path.
    pub files: Vec<SourceFile>,
}
