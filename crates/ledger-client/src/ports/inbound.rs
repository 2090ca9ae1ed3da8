//! # Inbound Ports
//!
//! What downstream transaction logic may ask of a constructed core.

use std::sync::Arc;

use async_trait::async_trait;
use shared_crypto::{CryptoSuite, SigningIdentity};
use tokio_util::sync::CancellationToken;

use super::outbound::{DiscoveryProvider, PeerPool};
use crate::domain::Orderer;
use crate::service::{ChaincodePackage, Channel, Lifecycle, SystemCc};

/// Client core API - inbound port.
///
/// Handle lookups never fail: topology problems degrade to the default
/// orderer and are reported through [`Channel::orderer_resolution`].
#[async_trait]
pub trait CoreApi: Send + Sync {
    /// Cached channel handle, resolved on first access.
    async fn channel(&self, name: &str) -> Arc<Channel>;

    /// Same as [`CoreApi::channel`] with a per-call cancellation context.
    async fn channel_with(&self, ctx: &CancellationToken, name: &str) -> Arc<Channel>;

    /// Cached chaincode handle.
    fn chaincode(&self, name: &str) -> Arc<ChaincodePackage>;

    /// Organization this client acts for.
    fn msp_id(&self) -> &str;

    /// Signing identity.
    fn current_identity(&self) -> Arc<SigningIdentity>;

    /// Crypto suite.
    fn crypto_suite(&self) -> Arc<dyn CryptoSuite>;

    /// Peer pool.
    fn peer_pool(&self) -> Arc<dyn PeerPool>;

    /// Discovery provider, if one is configured.
    fn discovery_provider(&self) -> Option<Arc<dyn DiscoveryProvider>>;

    /// Default orderer, if one is configured.
    fn default_orderer(&self) -> Option<Arc<Orderer>>;

    /// Protocol version flag.
    fn fabric_v2(&self) -> bool;

    /// Chaincode lifecycle factory for the configured protocol version.
    fn chaincode_lifecycle(&self) -> Lifecycle;

    /// System chaincode factory.
    fn system(&self) -> SystemCc;
}
