//! # Driven Ports (Outbound SPI)
//!
//! Collaborators Core builds on. Every one has a default adapter in
//! [`crate::adapters`] or [`crate::discovery`] and can be replaced through a
//! [`CoreOption`](crate::CoreOption).
//!
//! Every network-touching call takes a [`CancellationToken`]. A cancelled
//! token must abort the call with the port's `Cancelled` error.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::config::ConnectionConfig;
use crate::discovery::gossip::proto::{Response, SignedRequest};
use crate::domain::{
    ChaincodeDiscovery, ChaincodeSource, ChannelDiscovery, Connection, ConnectionError,
    DiscoveryError, FetchError, LocalPeersDiscovery, Orderer, OrdererError, Peer, PeerStrategy,
    PoolError,
};

/// Builds one logical, load-balanced connection from host descriptors.
#[async_trait]
pub trait ConnectionBuilder: Send + Sync {
    /// Connect to `targets`. An empty slice is an error.
    async fn build(
        &self,
        ctx: &CancellationToken,
        targets: &[ConnectionConfig],
    ) -> Result<Connection, ConnectionError>;
}

/// Endorsing peers grouped by organization.
///
/// Written during construction, read afterwards.
pub trait PeerPool: Send + Sync {
    /// Register `peer` under `msp_id`.
    fn add(&self, msp_id: &str, peer: Peer, strategy: PeerStrategy) -> Result<(), PoolError>;

    /// All peers of an organization, in registration order.
    fn peers(&self, msp_id: &str) -> Vec<Peer>;

    /// Next peer of an organization, round-robin.
    fn select(&self, msp_id: &str) -> Option<Peer>;

    /// Organizations with at least one peer, sorted.
    fn msp_ids(&self) -> Vec<String>;
}

/// Resolves channels and chaincodes to endpoint sets.
#[async_trait]
pub trait DiscoveryProvider: Send + Sync {
    /// Orderers of a channel.
    async fn channel(
        &self,
        ctx: &CancellationToken,
        channel_name: &str,
    ) -> Result<ChannelDiscovery, DiscoveryError>;

    /// Endorsers of a chaincode on a channel.
    async fn chaincode(
        &self,
        ctx: &CancellationToken,
        channel_name: &str,
        chaincode_name: &str,
    ) -> Result<ChaincodeDiscovery, DiscoveryError>;

    /// Peers of the client's own organization.
    ///
    /// Only the gossip backend answers this; others return
    /// [`DiscoveryError::Unsupported`].
    async fn local_peers(&self, ctx: &CancellationToken)
        -> Result<LocalPeersDiscovery, DiscoveryError>;
}

/// Carries signed discovery requests to the network's discovery service.
#[async_trait]
pub trait DiscoveryTransport: Send + Sync {
    /// Send one request and wait for the answer.
    async fn discover(
        &self,
        ctx: &CancellationToken,
        request: SignedRequest,
    ) -> Result<Response, DiscoveryError>;
}

/// Wraps a connection into an ordering service handle.
#[async_trait]
pub trait OrdererConnector: Send + Sync {
    /// Build the orderer handle.
    async fn from_connection(
        &self,
        ctx: &CancellationToken,
        connection: Connection,
    ) -> Result<Arc<Orderer>, OrdererError>;
}

/// Retrieves chaincode sources.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `repository` at `version`.
    async fn fetch(
        &self,
        ctx: &CancellationToken,
        repository: &str,
        version: &str,
    ) -> Result<ChaincodeSource, FetchError>;
}
