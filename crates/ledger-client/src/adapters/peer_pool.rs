//! In-memory peer pool.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use tracing::debug;

use crate::domain::{Peer, PeerStrategy, PoolError};
use crate::ports::PeerPool;

#[derive(Debug, Default)]
struct PeerGroup {
    peers: Vec<(Peer, PeerStrategy)>,
    cursor: AtomicUsize,
}

/// Peers grouped by MSP id with a round-robin cursor per group.
#[derive(Debug, Default)]
pub struct MemoryPeerPool {
    groups: RwLock<BTreeMap<String, PeerGroup>>,
}

impl MemoryPeerPool {
    /// Empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Strategy a peer was registered with.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn strategy(&self, msp_id: &str, address: &str) -> Option<PeerStrategy> {
        self.groups.read().get(msp_id).and_then(|group| {
            group
                .peers
                .iter()
                .find(|(peer, _)| peer.address() == address)
                .map(|(_, strategy)| *strategy)
        })
    }

    /// Total number of registered peers.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn len(&self) -> usize {
        self.groups.read().values().map(|g| g.peers.len()).sum()
    }

    /// True when no peer is registered.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PeerPool for MemoryPeerPool {
    fn add(&self, msp_id: &str, peer: Peer, strategy: PeerStrategy) -> Result<(), PoolError> {
        if msp_id.is_empty() {
            return Err(PoolError::EmptyMspId);
        }

        let mut groups = self.groups.write();
        let group = groups.entry(msp_id.to_string()).or_default();
        if group.peers.iter().any(|(p, _)| p.address() == peer.address()) {
            return Err(PoolError::PeerAlreadyExists {
                msp_id: msp_id.to_string(),
                address: peer.address().to_string(),
            });
        }

        debug!(msp_id, address = peer.address(), "peer added to pool");
        group.peers.push((peer, strategy));
        Ok(())
    }

    fn peers(&self, msp_id: &str) -> Vec<Peer> {
        self.groups
            .read()
            .get(msp_id)
            .map(|group| group.peers.iter().map(|(peer, _)| peer.clone()).collect())
            .unwrap_or_default()
    }

    fn select(&self, msp_id: &str) -> Option<Peer> {
        let groups = self.groups.read();
        let group = groups.get(msp_id)?;
        if group.peers.is_empty() {
            return None;
        }
        let index = group.cursor.fetch_add(1, Ordering::Relaxed) % group.peers.len();
        Some(group.peers[index].0.clone())
    }

    fn msp_ids(&self) -> Vec<String> {
        self.groups
            .read()
            .iter()
            .filter(|(_, group)| !group.peers.is_empty())
            .map(|(msp_id, _)| msp_id.clone())
            .collect()
    }
}
