//! # Gossip Discovery
//!
//! Asks the network's discovery service, reached through a bootstrap peer,
//! for channel orderers, chaincode endorsers and the peers of the client's
//! own organization. Requests are signed by the client identity.

pub mod proto;
mod provider;
mod transport;

pub use provider::{GossipDiscoveryProvider, IdentitySigner};
pub use transport::{GrpcDiscoveryTransport, DISCOVER_PATH};
