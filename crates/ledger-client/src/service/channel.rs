//! Channel handle.

use std::fmt;
use std::sync::Arc;

use shared_crypto::SigningIdentity;
use tokio_util::sync::CancellationToken;

use crate::domain::{ChaincodeDiscovery, DiscoveryError, Orderer, Peer};
use crate::ports::{DiscoveryProvider, PeerPool};

/// How a channel's orderer was chosen.
///
/// Everything except [`OrdererResolution::Discovered`] means the channel is
/// bound to the core's default orderer (or to none when there is no default).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OrdererResolution {
    /// Channel specific orderers were discovered and connected.
    Discovered,
    /// Discovery answered but listed no orderers for the channel.
    NoChannelOrderers,
    /// No discovery provider is configured.
    DiscoveryUnavailable,
    /// Discovery query failed.
    DiscoveryFailed(String),
    /// Orderers were discovered but the connection or handle failed.
    ConnectionFailed(String),
}

impl OrdererResolution {
    /// True when the channel uses its own orderer.
    pub fn is_discovered(&self) -> bool {
        matches!(self, OrdererResolution::Discovered)
    }

    /// True when discovery found orderers that could not be used, or failed.
    pub fn is_degraded(&self) -> bool {
        matches!(
            self,
            OrdererResolution::DiscoveryFailed(_) | OrdererResolution::ConnectionFailed(_)
        )
    }
}

/// Per-channel handle, created once per name by the core.
pub struct Channel {
    pub(super) msp_id: String,
    pub(super) name: String,
    pub(super) peer_pool: Arc<dyn PeerPool>,
    pub(super) orderer: Option<Arc<Orderer>>,
    pub(super) resolution: OrdererResolution,
    pub(super) discovery: Option<Arc<dyn DiscoveryProvider>>,
    pub(super) identity: Arc<SigningIdentity>,
    pub(super) fabric_v2: bool,
}

impl Channel {
    /// Channel name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Organization the client acts for.
    pub fn msp_id(&self) -> &str {
        &self.msp_id
    }

    /// Bound orderer.
    pub fn orderer(&self) -> Option<&Arc<Orderer>> {
        self.orderer.as_ref()
    }

    /// How [`Channel::orderer`] was chosen.
    pub fn orderer_resolution(&self) -> &OrdererResolution {
        &self.resolution
    }

    /// Peer pool.
    pub fn peer_pool(&self) -> &Arc<dyn PeerPool> {
        &self.peer_pool
    }

    /// Signing identity.
    pub fn identity(&self) -> &Arc<SigningIdentity> {
        &self.identity
    }

    /// Protocol version flag.
    pub fn fabric_v2(&self) -> bool {
        self.fabric_v2
    }

    /// Discovery provider bound at creation.
    pub fn discovery_provider(&self) -> Option<&Arc<dyn DiscoveryProvider>> {
        self.discovery.as_ref()
    }

    /// Endorsers of `chaincode` on this channel.
    pub async fn discover_chaincode(
        &self,
        ctx: &CancellationToken,
        chaincode: &str,
    ) -> Result<ChaincodeDiscovery, DiscoveryError> {
        let discovery = self.discovery.as_ref().ok_or(DiscoveryError::Unavailable)?;
        discovery.chaincode(ctx, &self.name, chaincode).await
    }

    /// Registered peers of `msp_id`.
    pub fn endorsers(&self, msp_id: &str) -> Vec<Peer> {
        self.peer_pool.peers(msp_id)
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("name", &self.name)
            .field("msp_id", &self.msp_id)
            .field("orderer", &self.orderer.as_ref().map(|o| o.addresses()))
            .field("resolution", &self.resolution)
            .field("fabric_v2", &self.fabric_v2)
            .finish_non_exhaustive()
    }
}
