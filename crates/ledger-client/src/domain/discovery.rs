//! Discovery results.

use strum::{Display, EnumString, VariantNames};

use super::endpoint::HostEndpoint;

/// Discovery backend selectable from configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString, VariantNames)]
#[strum(serialize_all = "lowercase")]
pub enum DiscoveryType {
    /// Static topology from configuration.
    Local,
    /// Queries the network's discovery service through a bootstrap peer.
    Gossip,
}

impl DiscoveryType {
    /// Known type names joined for error messages.
    pub fn available() -> String {
        Self::VARIANTS.join(", ")
    }
}

/// Ordering endpoints of one channel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChannelDiscovery {
    /// Channel name.
    pub channel_name: String,
    /// Channel specific orderers; empty when the channel has none of its own.
    pub orderers: Vec<HostEndpoint>,
}

impl ChannelDiscovery {
    /// Channel name.
    pub fn channel_name(&self) -> &str {
        &self.channel_name
    }

    /// Channel specific orderers.
    pub fn orderers(&self) -> &[HostEndpoint] {
        &self.orderers
    }
}

/// Endorsers of one chaincode plus the channel it lives on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChaincodeDiscovery {
    /// Channel part of the answer.
    pub channel: ChannelDiscovery,
    /// Chaincode name.
    pub chaincode_name: String,
    /// Chaincode version as reported by the network.
    pub chaincode_version: String,
    /// Peers able to endorse the chaincode, grouped by organization.
    pub endorsers: Vec<HostEndpoint>,
}

impl ChaincodeDiscovery {
    /// Channel name.
    pub fn channel_name(&self) -> &str {
        self.channel.channel_name()
    }

    /// Channel specific orderers.
    pub fn orderers(&self) -> &[HostEndpoint] {
        self.channel.orderers()
    }

    /// Chaincode name.
    pub fn chaincode_name(&self) -> &str {
        &self.chaincode_name
    }

    /// Chaincode version.
    pub fn chaincode_version(&self) -> &str {
        &self.chaincode_version
    }

    /// Endorsing peers.
    pub fn endorsers(&self) -> &[HostEndpoint] {
        &self.endorsers
    }
}

/// Peers of the client's own organization as seen by gossip.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocalPeersDiscovery {
    /// Peers grouped by organization.
    pub peers: Vec<HostEndpoint>,
}
