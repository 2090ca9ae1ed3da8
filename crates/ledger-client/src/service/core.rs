//! # Client Core
//!
//! Owns the identity, crypto suite, peer pool, discovery provider and default
//! orderer, and hands out cached [`Channel`] and [`ChaincodePackage`] handles.
//!
//! ## Caches
//!
//! - Channels: `tokio::sync::Mutex`, held across discovery and connection
//!   building so a name is resolved at most once even under concurrent calls.
//! - Chaincodes: `parking_lot::Mutex`, never held across an await.
//!
//! Entries are never replaced or evicted.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use shared_crypto::{CryptoSuite, Identity, SigningIdentity};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn, Instrument, Span};

use super::builder::{self, CoreBuilder, CoreOption, CoreParts, DiscoveryDeps};
use super::chaincode::ChaincodePackage;
use super::channel::{Channel, OrdererResolution};
use super::system::{Lifecycle, SystemCc, SystemChaincode, LSCC};
use crate::config::ClientConfig;
use crate::domain::{flatten_connection_configs, CoreError, Orderer};
use crate::ports::{
    ConnectionBuilder, CoreApi, DiscoveryProvider, Fetcher, OrdererConnector, PeerPool,
};

/// Client runtime core.
pub struct Core {
    msp_id: String,
    identity: Arc<SigningIdentity>,
    crypto_suite: Arc<dyn CryptoSuite>,
    peer_pool: Arc<dyn PeerPool>,
    discovery: Option<Arc<dyn DiscoveryProvider>>,
    orderer: Option<Arc<Orderer>>,
    fabric_v2: bool,
    config: Option<ClientConfig>,
    ctx: CancellationToken,
    span: Span,
    connection_builder: Arc<dyn ConnectionBuilder>,
    orderer_connector: Arc<dyn OrdererConnector>,
    fetcher: Arc<dyn Fetcher>,
    channels: tokio::sync::Mutex<HashMap<String, Arc<Channel>>>,
    chaincodes: parking_lot::Mutex<HashMap<String, Arc<ChaincodePackage>>>,
}

impl Core {
    /// Build a core for `msp_id`.
    ///
    /// Options apply in order; a failing option is reported as
    /// [`CoreError::Option`] with its position. Unset fields are then filled
    /// in by the construction cascade (see [`crate::service::builder`]).
    #[instrument(name = "core_init", skip_all)]
    pub async fn new(
        msp_id: impl Into<String>,
        identity: Option<Identity>,
        options: impl IntoIterator<Item = CoreOption>,
    ) -> Result<Self, CoreError> {
        let msp_id = msp_id.into();

        let mut parts = CoreParts::default();
        for (index, option) in options.into_iter().enumerate() {
            option
                .apply(&mut parts)
                .map_err(|source| CoreError::Option {
                    index,
                    source: Box::new(source),
                })?;
        }

        let (ctx, span, connection_builder, orderer_connector) =
            builder::init_ambient(&mut parts, &msp_id);

        Self::assemble(
            msp_id,
            identity,
            parts,
            ctx,
            span.clone(),
            connection_builder,
            orderer_connector,
        )
        .instrument(span)
        .await
    }

    /// Fluent construction.
    pub fn builder(msp_id: impl Into<String>) -> CoreBuilder {
        CoreBuilder::new(msp_id)
    }

    async fn assemble(
        msp_id: String,
        identity: Option<Identity>,
        parts: CoreParts,
        ctx: CancellationToken,
        span: Span,
        connection_builder: Arc<dyn ConnectionBuilder>,
        orderer_connector: Arc<dyn OrdererConnector>,
    ) -> Result<Self, CoreError> {
        info!("initializing client core");
        let config = parts.config;

        let crypto_suite =
            builder::init_crypto_suite(parts.crypto_suite, config.as_ref(), parts.registry)?;
        let identity = builder::init_identity(identity, &crypto_suite)?;
        let peer_pool = builder::init_peer_pool(
            parts.peer_pool,
            config.as_ref(),
            &ctx,
            connection_builder.as_ref(),
        )
        .await?;
        let discovery = builder::init_discovery(
            parts.discovery,
            config.as_ref(),
            DiscoveryDeps {
                ctx: &ctx,
                identity: &identity,
                peer_pool: &peer_pool,
                builder: connection_builder.as_ref(),
                transport: parts.discovery_transport,
            },
        )
        .await?;
        let orderer = builder::init_orderer(
            parts.orderer,
            config.as_ref(),
            &ctx,
            connection_builder.as_ref(),
            orderer_connector.as_ref(),
        )
        .await?;
        let fetcher = builder::init_fetcher(parts.fetcher);

        info!(
            peers = peer_pool.msp_ids().len(),
            discovery = discovery.is_some(),
            default_orderer = orderer.is_some(),
            fabric_v2 = parts.fabric_v2,
            "client core ready"
        );

        Ok(Self {
            msp_id,
            identity,
            crypto_suite,
            peer_pool,
            discovery,
            orderer,
            fabric_v2: parts.fabric_v2,
            config,
            ctx,
            span,
            connection_builder,
            orderer_connector,
            fetcher,
            channels: tokio::sync::Mutex::new(HashMap::new()),
            chaincodes: parking_lot::Mutex::new(HashMap::new()),
        })
    }

    /// Cached channel handle, resolved on first access with a child of the
    /// core context.
    pub async fn channel(&self, name: &str) -> Arc<Channel> {
        let ctx = self.ctx.child_token();
        self.channel_with(&ctx, name).await
    }

    /// Cached channel handle; `ctx` bounds discovery and connection building
    /// on first access.
    pub async fn channel_with(&self, ctx: &CancellationToken, name: &str) -> Arc<Channel> {
        async {
            let mut channels = self.channels.lock().await;
            if let Some(channel) = channels.get(name) {
                return channel.clone();
            }

            let (discovered, resolution) = self.resolve_channel_orderer(ctx, name).await;
            let orderer = discovered.or_else(|| self.orderer.clone());

            let channel = Arc::new(Channel {
                msp_id: self.msp_id.clone(),
                name: name.to_string(),
                peer_pool: self.peer_pool.clone(),
                orderer,
                resolution,
                discovery: self.discovery.clone(),
                identity: self.identity.clone(),
                fabric_v2: self.fabric_v2,
            });
            channels.insert(name.to_string(), channel.clone());
            debug!(channel = name, resolution = ?channel.orderer_resolution(), "channel cached");
            channel
        }
        .instrument(self.span.clone())
        .await
    }

    /// Channel specific orderer, or `None` with the reason the default is used.
    async fn resolve_channel_orderer(
        &self,
        ctx: &CancellationToken,
        name: &str,
    ) -> (Option<Arc<Orderer>>, OrdererResolution) {
        let Some(discovery) = &self.discovery else {
            warn!(channel = name, "discovery provider not configured, using default orderer");
            return (None, OrdererResolution::DiscoveryUnavailable);
        };

        let discovered = match discovery.channel(ctx, name).await {
            Ok(discovered) => discovered,
            Err(e) => {
                error!(channel = name, error = %e, "channel discovery failed, using default orderer");
                return (None, OrdererResolution::DiscoveryFailed(e.to_string()));
            }
        };

        let targets = flatten_connection_configs(discovered.orderers());
        if targets.is_empty() {
            debug!(channel = name, "no channel orderers discovered, using default orderer");
            return (None, OrdererResolution::NoChannelOrderers);
        }

        let connection = match self.connection_builder.build(ctx, &targets).await {
            Ok(connection) => connection,
            Err(e) => {
                warn!(channel = name, error = %e, "failed to connect to channel orderers");
                return (None, OrdererResolution::ConnectionFailed(e.to_string()));
            }
        };

        match self.orderer_connector.from_connection(ctx, connection).await {
            Ok(orderer) => {
                info!(channel = name, orderers = ?orderer.addresses(), "using channel orderer");
                (Some(orderer), OrdererResolution::Discovered)
            }
            Err(e) => {
                warn!(channel = name, error = %e, "failed to create channel orderer");
                (None, OrdererResolution::ConnectionFailed(e.to_string()))
            }
        }
    }

    /// Cached chaincode handle.
    pub fn chaincode(&self, name: &str) -> Arc<ChaincodePackage> {
        let mut chaincodes = self.chaincodes.lock();
        chaincodes
            .entry(name.to_string())
            .or_insert_with(|| {
                Arc::new(ChaincodePackage {
                    name: name.to_string(),
                    lscc: SystemChaincode::new(
                        LSCC,
                        self.peer_pool.clone(),
                        self.identity.clone(),
                    ),
                    fetcher: self.fetcher.clone(),
                    orderer: self.orderer.clone(),
                    identity: self.identity.clone(),
                })
            })
            .clone()
    }

    /// Organization this client acts for.
    pub fn msp_id(&self) -> &str {
        &self.msp_id
    }

    /// Signing identity.
    pub fn current_identity(&self) -> Arc<SigningIdentity> {
        self.identity.clone()
    }

    /// Crypto suite.
    pub fn crypto_suite(&self) -> Arc<dyn CryptoSuite> {
        self.crypto_suite.clone()
    }

    /// Peer pool.
    pub fn peer_pool(&self) -> Arc<dyn PeerPool> {
        self.peer_pool.clone()
    }

    /// Discovery provider, if configured.
    pub fn discovery_provider(&self) -> Option<Arc<dyn DiscoveryProvider>> {
        self.discovery.clone()
    }

    /// Default orderer, if configured.
    pub fn default_orderer(&self) -> Option<Arc<Orderer>> {
        self.orderer.clone()
    }

    /// Protocol version flag.
    pub fn fabric_v2(&self) -> bool {
        self.fabric_v2
    }

    /// Configuration the core was built from, if any.
    pub fn config(&self) -> Option<&ClientConfig> {
        self.config.as_ref()
    }

    /// Root cancellation context.
    pub fn context(&self) -> &CancellationToken {
        &self.ctx
    }

    /// Lifecycle chaincode for the configured protocol version.
    pub fn chaincode_lifecycle(&self) -> Lifecycle {
        Lifecycle::new(self.fabric_v2, self.peer_pool.clone(), self.identity.clone())
    }

    /// System chaincode factory.
    pub fn system(&self) -> SystemCc {
        SystemCc::new(self.peer_pool.clone(), self.identity.clone())
    }
}

impl fmt::Debug for Core {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Core")
            .field("msp_id", &self.msp_id)
            .field("suite", &self.crypto_suite.name())
            .field("discovery", &self.discovery.is_some())
            .field("orderer", &self.orderer.as_ref().map(|o| o.addresses()))
            .field("fabric_v2", &self.fabric_v2)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CoreApi for Core {
    async fn channel(&self, name: &str) -> Arc<Channel> {
        Core::channel(self, name).await
    }

    async fn channel_with(&self, ctx: &CancellationToken, name: &str) -> Arc<Channel> {
        Core::channel_with(self, ctx, name).await
    }

    fn chaincode(&self, name: &str) -> Arc<ChaincodePackage> {
        Core::chaincode(self, name)
    }

    fn msp_id(&self) -> &str {
        Core::msp_id(self)
    }

    fn current_identity(&self) -> Arc<SigningIdentity> {
        Core::current_identity(self)
    }

    fn crypto_suite(&self) -> Arc<dyn CryptoSuite> {
        Core::crypto_suite(self)
    }

    fn peer_pool(&self) -> Arc<dyn PeerPool> {
        Core::peer_pool(self)
    }

    fn discovery_provider(&self) -> Option<Arc<dyn DiscoveryProvider>> {
        Core::discovery_provider(self)
    }

    fn default_orderer(&self) -> Option<Arc<Orderer>> {
        Core::default_orderer(self)
    }

    fn fabric_v2(&self) -> bool {
        Core::fabric_v2(self)
    }

    fn chaincode_lifecycle(&self) -> Lifecycle {
        Core::chaincode_lifecycle(self)
    }

    fn system(&self) -> SystemCc {
        Core::system(self)
    }
}
