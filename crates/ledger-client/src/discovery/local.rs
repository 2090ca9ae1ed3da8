//! Discovery backed by the static topology in configuration.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::tls_mapper::TlsCertsMapper;
use crate::config::{LocalChannelConfig, LocalDiscoveryOptions, LocalEndpointConfig};
use crate::domain::{
    ChaincodeDiscovery, ChannelDiscovery, DiscoveryError, HostEndpoint, LocalPeersDiscovery,
};
use crate::ports::DiscoveryProvider;

/// Serves channel and chaincode topology from `discovery.local`.
#[derive(Debug)]
pub struct LocalDiscoveryProvider {
    channels: HashMap<String, LocalChannelConfig>,
    mapper: TlsCertsMapper,
}

impl LocalDiscoveryProvider {
    /// Validate and index the configured channels.
    ///
    /// Channel names must be non-empty and unique.
    pub fn new(
        options: &LocalDiscoveryOptions,
        mapper: TlsCertsMapper,
    ) -> Result<Self, DiscoveryError> {
        let mut channels = HashMap::with_capacity(options.channels.len());
        for channel in &options.channels {
            if channel.name.is_empty() {
                return Err(DiscoveryError::InvalidConfig(
                    "local channel without a name".to_string(),
                ));
            }
            if channels
                .insert(channel.name.clone(), channel.clone())
                .is_some()
            {
                return Err(DiscoveryError::InvalidConfig(format!(
                    "channel `{}` configured twice",
                    channel.name
                )));
            }
        }

        Ok(Self { channels, mapper })
    }

    fn endpoints(&self, configs: &[LocalEndpointConfig]) -> Vec<HostEndpoint> {
        configs
            .iter()
            .map(|config| HostEndpoint {
                msp_id: config.msp_id.clone(),
                host_addresses: config
                    .hosts
                    .iter()
                    .map(|host| self.mapper.host_address(host))
                    .collect(),
            })
            .collect()
    }

    fn lookup(&self, channel_name: &str) -> Result<&LocalChannelConfig, DiscoveryError> {
        self.channels
            .get(channel_name)
            .ok_or_else(|| DiscoveryError::ChannelNotFound(channel_name.to_string()))
    }

    fn channel_discovery(&self, channel: &LocalChannelConfig) -> ChannelDiscovery {
        ChannelDiscovery {
            channel_name: channel.name.clone(),
            orderers: self.endpoints(&channel.orderers),
        }
    }
}

#[async_trait]
impl DiscoveryProvider for LocalDiscoveryProvider {
    async fn channel(
        &self,
        ctx: &CancellationToken,
        channel_name: &str,
    ) -> Result<ChannelDiscovery, DiscoveryError> {
        if ctx.is_cancelled() {
            return Err(DiscoveryError::Cancelled);
        }
        let channel = self.lookup(channel_name)?;
        debug!(channel = channel_name, orderers = channel.orderers.len(), "local channel lookup");
        Ok(self.channel_discovery(channel))
    }

    async fn chaincode(
        &self,
        ctx: &CancellationToken,
        channel_name: &str,
        chaincode_name: &str,
    ) -> Result<ChaincodeDiscovery, DiscoveryError> {
        if ctx.is_cancelled() {
            return Err(DiscoveryError::Cancelled);
        }
        let channel = self.lookup(channel_name)?;
        let chaincode = channel
            .chaincodes
            .iter()
            .find(|cc| cc.name == chaincode_name)
            .ok_or_else(|| DiscoveryError::ChaincodeNotFound {
                channel: channel_name.to_string(),
                chaincode: chaincode_name.to_string(),
            })?;

        Ok(ChaincodeDiscovery {
            channel: self.channel_discovery(channel),
            chaincode_name: chaincode.name.clone(),
            chaincode_version: chaincode.version.clone(),
            endorsers: self.endpoints(&chaincode.endorsers),
        })
    }

    async fn local_peers(
        &self,
        _ctx: &CancellationToken,
    ) -> Result<LocalPeersDiscovery, DiscoveryError> {
        Err(DiscoveryError::Unsupported("local peers discovery"))
    }
}
