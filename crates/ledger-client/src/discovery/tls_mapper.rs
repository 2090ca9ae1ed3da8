//! Per-address TLS lookup for discovered endpoints.

use std::collections::HashMap;

use crate::config::{TlsCertsMapEntry, TlsConfig};
use crate::domain::HostAddress;

/// Maps `host:port` to the TLS settings configured for it.
///
/// Discovery only reports addresses; this supplies the certificates.
#[derive(Clone, Debug, Default)]
pub struct TlsCertsMapper {
    by_address: HashMap<String, TlsConfig>,
}

impl TlsCertsMapper {
    /// Build from config entries. Later entries win on duplicate addresses.
    pub fn new(entries: &[TlsCertsMapEntry]) -> Self {
        let by_address = entries
            .iter()
            .map(|entry| (entry.address.clone(), entry.tls.clone()))
            .collect();
        Self { by_address }
    }

    /// Configured TLS for `address`, if any.
    pub fn tls_config_for_address(&self, address: &str) -> Option<&TlsConfig> {
        self.by_address.get(address)
    }

    /// `address` paired with its configured TLS, or plaintext when unmapped.
    pub fn host_address(&self, address: &str) -> HostAddress {
        HostAddress {
            address: address.to_string(),
            tls: self
                .tls_config_for_address(address)
                .cloned()
                .unwrap_or_default(),
        }
    }

    /// Number of mapped addresses.
    pub fn len(&self) -> usize {
        self.by_address.len()
    }

    /// True when nothing is mapped.
    pub fn is_empty(&self) -> bool {
        self.by_address.is_empty()
    }
}
