//! Chaincode package handle.

use std::fmt;
use std::sync::Arc;

use shared_crypto::SigningIdentity;
use tokio_util::sync::CancellationToken;

use super::system::Lscc;
use crate::domain::{ChaincodeSource, FetchError, Orderer};
use crate::ports::Fetcher;

/// Per-chaincode handle, created once per name by the core.
pub struct ChaincodePackage {
    pub(super) name: String,
    pub(super) lscc: Lscc,
    pub(super) fetcher: Arc<dyn Fetcher>,
    pub(super) orderer: Option<Arc<Orderer>>,
    pub(super) identity: Arc<SigningIdentity>,
}

impl ChaincodePackage {
    /// Chaincode name, also its source repository path.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Legacy lifecycle chaincode used to install and instantiate.
    pub fn lscc(&self) -> &Lscc {
        &self.lscc
    }

    /// Default orderer at creation time.
    pub fn orderer(&self) -> Option<&Arc<Orderer>> {
        self.orderer.as_ref()
    }

    /// Signing identity.
    pub fn identity(&self) -> &Arc<SigningIdentity> {
        &self.identity
    }

    /// Fetch the chaincode sources at `version`.
    pub async fn fetch(
        &self,
        ctx: &CancellationToken,
        version: &str,
    ) -> Result<ChaincodeSource, FetchError> {
        self.fetcher.fetch(ctx, &self.name, version).await
    }
}

impl fmt::Debug for ChaincodePackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChaincodePackage")
            .field("name", &self.name)
            .field("lscc", &self.lscc.name())
            .field("orderer", &self.orderer.as_ref().map(|o| o.addresses()))
            .finish_non_exhaustive()
    }
}
