//! System chaincode handles.

use std::fmt;
use std::sync::Arc;

use shared_crypto::SigningIdentity;

use crate::ports::PeerPool;

/// Legacy lifecycle system chaincode.
pub const LSCC: &str = "lscc";
/// Lifecycle system chaincode of protocol v2.
pub const LIFECYCLE: &str = "_lifecycle";
/// Configuration system chaincode.
pub const CSCC: &str = "cscc";
/// Query system chaincode.
pub const QSCC: &str = "qscc";

/// A system chaincode bound to the peer pool and signing identity it is
/// invoked through.
#[derive(Clone)]
pub struct SystemChaincode {
    name: &'static str,
    peer_pool: Arc<dyn PeerPool>,
    identity: Arc<SigningIdentity>,
}

impl SystemChaincode {
    pub(crate) fn new(
        name: &'static str,
        peer_pool: Arc<dyn PeerPool>,
        identity: Arc<SigningIdentity>,
    ) -> Self {
        Self {
            name,
            peer_pool,
            identity,
        }
    }

    /// Chaincode name on the peer.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Pool the chaincode is invoked through.
    pub fn peer_pool(&self) -> &Arc<dyn PeerPool> {
        &self.peer_pool
    }

    /// Identity invocations are signed with.
    pub fn identity(&self) -> &Arc<SigningIdentity> {
        &self.identity
    }
}

impl fmt::Debug for SystemChaincode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemChaincode")
            .field("name", &self.name)
            .field("msp_id", &self.identity.msp_id())
            .finish_non_exhaustive()
    }
}

/// Legacy lifecycle handle held by chaincode packages.
pub type Lscc = SystemChaincode;

/// Chaincode lifecycle for the configured protocol version.
#[derive(Clone, Debug)]
pub struct Lifecycle {
    fabric_v2: bool,
    chaincode: SystemChaincode,
}

impl Lifecycle {
    pub(crate) fn new(
        fabric_v2: bool,
        peer_pool: Arc<dyn PeerPool>,
        identity: Arc<SigningIdentity>,
    ) -> Self {
        let name = if fabric_v2 { LIFECYCLE } else { LSCC };
        Self {
            fabric_v2,
            chaincode: SystemChaincode::new(name, peer_pool, identity),
        }
    }

    /// True for the v2 `_lifecycle` chaincode.
    pub fn is_v2(&self) -> bool {
        self.fabric_v2
    }

    /// Lifecycle chaincode name.
    pub fn name(&self) -> &'static str {
        self.chaincode.name()
    }

    /// Underlying system chaincode handle.
    pub fn chaincode(&self) -> &SystemChaincode {
        &self.chaincode
    }
}

/// Factory for system chaincode handles.
#[derive(Clone)]
pub struct SystemCc {
    peer_pool: Arc<dyn PeerPool>,
    identity: Arc<SigningIdentity>,
}

impl SystemCc {
    pub(crate) fn new(peer_pool: Arc<dyn PeerPool>, identity: Arc<SigningIdentity>) -> Self {
        Self {
            peer_pool,
            identity,
        }
    }

    fn handle(&self, name: &'static str) -> SystemChaincode {
        SystemChaincode::new(name, self.peer_pool.clone(), self.identity.clone())
    }

    /// Configuration system chaincode.
    pub fn cscc(&self) -> SystemChaincode {
        self.handle(CSCC)
    }

    /// Query system chaincode.
    pub fn qscc(&self) -> SystemChaincode {
        self.handle(QSCC)
    }

    /// Legacy lifecycle system chaincode.
    pub fn lscc(&self) -> SystemChaincode {
        self.handle(LSCC)
    }
}

impl fmt::Debug for SystemCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemCc")
            .field("msp_id", &self.identity.msp_id())
            .finish_non_exhaustive()
    }
}
