//! Endpoint value objects produced by discovery.

use crate::config::{ConnectionConfig, TlsConfig};

/// Network address plus the TLS settings to reach it with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostAddress {
    /// `host:port`.
    pub address: String,
    /// TLS settings for this address.
    pub tls: TlsConfig,
}

impl HostAddress {
    /// Address with TLS disabled.
    pub fn plain(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            tls: TlsConfig::default(),
        }
    }

    /// Connection descriptor for this address with default timeouts.
    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig::new(self.address.clone()).with_tls(self.tls.clone())
    }
}

/// Addresses belonging to one organization.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HostEndpoint {
    /// Organization the hosts belong to.
    pub msp_id: String,
    /// Ordered addresses.
    pub host_addresses: Vec<HostAddress>,
}

impl HostEndpoint {
    /// Endpoint for `msp_id` with the given addresses.
    pub fn new(msp_id: impl Into<String>, host_addresses: Vec<HostAddress>) -> Self {
        Self {
            msp_id: msp_id.into(),
            host_addresses,
        }
    }
}

/// Every address of every endpoint, in order, as connection descriptors.
pub fn flatten_connection_configs(endpoints: &[HostEndpoint]) -> Vec<ConnectionConfig> {
    endpoints
        .iter()
        .flat_map(|endpoint| endpoint.host_addresses.iter())
        .map(HostAddress::connection_config)
        .collect()
}
