//! # Construction Options and Cascade
//!
//! Options are applied strictly in order; the first failing option aborts
//! construction. Whatever the options leave unset is then filled in by the
//! cascade below, one stage at a time:
//!
//! ```text
//! 1. context      fresh CancellationToken
//! 2. span         `core` span carrying the MSP id
//! 3. crypto suite registry lookup (empty type -> ecdsa / P256 / SHA2-256)
//! 4. identity     mandatory, bound to the suite
//! 5. peer pool    MemoryPeerPool with every configured endorser
//! 6. discovery    local | gossip (+ local peers) | none
//! 7. orderer      one connection over all configured orderers
//! 8. fetcher      LocalFetcher, Go layout
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use shared_crypto::{CryptoError, CryptoSuite, Identity, SigningIdentity, SuiteRegistry};
use strum::IntoStaticStr;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, Span};

use super::core::Core;
use crate::adapters::{
    GrpcConnectionBuilder, GrpcOrdererConnector, LocalFetcher, MemoryPeerPool, SourceLayout,
};
use crate::config::{ClientConfig, CryptoConfig};
use crate::discovery::{
    GossipDiscoveryProvider, GrpcDiscoveryTransport, IdentitySigner, LocalDiscoveryProvider,
    TlsCertsMapper,
};
use crate::domain::{CoreError, DiscoveryType, Orderer, Peer, PeerStrategy, PoolError};
use crate::ports::{
    ConnectionBuilder, DiscoveryProvider, DiscoveryTransport, Fetcher, OrdererConnector, PeerPool,
};

/// Construction option for [`Core::new`].
#[derive(IntoStaticStr)]
pub enum CoreOption {
    /// Use this configuration.
    Config(ClientConfig),
    /// Load configuration from a TOML file.
    ConfigFile(PathBuf),
    /// Parse configuration from a TOML string.
    ConfigToml(String),
    /// Root cancellation context.
    Context(CancellationToken),
    /// Span all core logging is recorded in.
    Span(Span),
    /// Use this crypto suite instead of looking one up.
    CryptoSuite(Arc<dyn CryptoSuite>),
    /// Registry the crypto suite is looked up in.
    CryptoRegistry(SuiteRegistry),
    /// Use this peer pool instead of building one from config.
    PeerPool(Arc<dyn PeerPool>),
    /// Default orderer.
    Orderer(Arc<Orderer>),
    /// Use this discovery provider instead of building one from config.
    Discovery(Arc<dyn DiscoveryProvider>),
    /// Transport the gossip backend sends requests through.
    DiscoveryTransport(Arc<dyn DiscoveryTransport>),
    /// Connection builder for peers, orderers and the discovery bootstrap.
    ConnectionBuilder(Arc<dyn ConnectionBuilder>),
    /// Orderer connector.
    OrdererConnector(Arc<dyn OrdererConnector>),
    /// Chaincode source fetcher.
    Fetcher(Arc<dyn Fetcher>),
    /// Protocol version flag.
    FabricV2(bool),
}

impl fmt::Debug for CoreOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name: &'static str = self.into();
        f.write_str(name)
    }
}

/// Values collected from options before the cascade runs.
#[derive(Default)]
pub(crate) struct CoreParts {
    pub(crate) config: Option<ClientConfig>,
    pub(crate) ctx: Option<CancellationToken>,
    pub(crate) span: Option<Span>,
    pub(crate) crypto_suite: Option<Arc<dyn CryptoSuite>>,
    pub(crate) registry: Option<SuiteRegistry>,
    pub(crate) peer_pool: Option<Arc<dyn PeerPool>>,
    pub(crate) orderer: Option<Arc<Orderer>>,
    pub(crate) discovery: Option<Arc<dyn DiscoveryProvider>>,
    pub(crate) discovery_transport: Option<Arc<dyn DiscoveryTransport>>,
    pub(crate) connection_builder: Option<Arc<dyn ConnectionBuilder>>,
    pub(crate) orderer_connector: Option<Arc<dyn OrdererConnector>>,
    pub(crate) fetcher: Option<Arc<dyn Fetcher>>,
    pub(crate) fabric_v2: bool,
}

impl CoreOption {
    pub(crate) fn apply(self, parts: &mut CoreParts) -> Result<(), CoreError> {
        match self {
            CoreOption::Config(config) => parts.config = Some(config),
            CoreOption::ConfigFile(path) => parts.config = Some(ClientConfig::load(path)?),
            CoreOption::ConfigToml(content) => {
                parts.config = Some(ClientConfig::from_toml_str(&content)?)
            }
            CoreOption::Context(ctx) => parts.ctx = Some(ctx),
            CoreOption::Span(span) => parts.span = Some(span),
            CoreOption::CryptoSuite(suite) => parts.crypto_suite = Some(suite),
            CoreOption::CryptoRegistry(registry) => parts.registry = Some(registry),
            CoreOption::PeerPool(pool) => parts.peer_pool = Some(pool),
            CoreOption::Orderer(orderer) => parts.orderer = Some(orderer),
            CoreOption::Discovery(provider) => parts.discovery = Some(provider),
            CoreOption::DiscoveryTransport(transport) => {
                parts.discovery_transport = Some(transport)
            }
            CoreOption::ConnectionBuilder(builder) => parts.connection_builder = Some(builder),
            CoreOption::OrdererConnector(connector) => parts.orderer_connector = Some(connector),
            CoreOption::Fetcher(fetcher) => parts.fetcher = Some(fetcher),
            CoreOption::FabricV2(enabled) => parts.fabric_v2 = enabled,
        }
        Ok(())
    }
}

/// Fluent front end to [`Core::new`].
///
/// ```rust,ignore
/// let core = Core::builder("Org1MSP")
///     .identity(identity)
///     .config_file("client.toml")
///     .fabric_v2(true)
///     .build()
///     .await?;
/// ```
#[derive(Debug)]
pub struct CoreBuilder {
    msp_id: String,
    identity: Option<Identity>,
    options: Vec<CoreOption>,
}

impl CoreBuilder {
    pub(crate) fn new(msp_id: impl Into<String>) -> Self {
        Self {
            msp_id: msp_id.into(),
            identity: None,
            options: Vec::new(),
        }
    }

    /// Raw identity to sign with.
    #[must_use]
    pub fn identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Append an option.
    #[must_use]
    pub fn option(mut self, option: CoreOption) -> Self {
        self.options.push(option);
        self
    }

    /// Append [`CoreOption::Config`].
    #[must_use]
    pub fn config(self, config: ClientConfig) -> Self {
        self.option(CoreOption::Config(config))
    }

    /// Append [`CoreOption::ConfigFile`].
    #[must_use]
    pub fn config_file(self, path: impl Into<PathBuf>) -> Self {
        self.option(CoreOption::ConfigFile(path.into()))
    }

    /// Append [`CoreOption::Context`].
    #[must_use]
    pub fn context(self, ctx: CancellationToken) -> Self {
        self.option(CoreOption::Context(ctx))
    }

    /// Append [`CoreOption::FabricV2`].
    #[must_use]
    pub fn fabric_v2(self, enabled: bool) -> Self {
        self.option(CoreOption::FabricV2(enabled))
    }

    /// Run the options and the cascade.
    pub async fn build(self) -> Result<Core, CoreError> {
        Core::new(self.msp_id, self.identity, self.options).await
    }
}

// =============================================================================
// Cascade stages
// =============================================================================

/// Stage 3.
pub(crate) fn init_crypto_suite(
    suite: Option<Arc<dyn CryptoSuite>>,
    config: Option<&ClientConfig>,
    registry: Option<SuiteRegistry>,
) -> Result<Arc<dyn CryptoSuite>, CoreError> {
    if let Some(suite) = suite {
        return Ok(suite);
    }
    let config = config.ok_or(CoreError::EmptyConfig)?;

    let crypto = if config.crypto.suite_type.is_empty() {
        CryptoConfig::default_suite()
    } else {
        config.crypto.clone()
    };
    info!(suite = %crypto.suite_type, "initializing crypto suite");

    registry
        .unwrap_or_default()
        .get_suite(&crypto.suite_type, &crypto.options)
        .map_err(|e| match e {
            CryptoError::UnsupportedSuite { name, available } => {
                CoreError::UnsupportedCryptoSuite { name, available }
            }
            other => CoreError::CryptoSuite(other),
        })
}

/// Stage 4.
pub(crate) fn init_identity(
    identity: Option<Identity>,
    suite: &Arc<dyn CryptoSuite>,
) -> Result<Arc<SigningIdentity>, CoreError> {
    let identity = identity.ok_or(CoreError::MissingIdentity)?;
    info!(identity_msp = identity.msp_id(), "initializing signing identity");
    identity
        .signing_identity(suite.clone())
        .map(Arc::new)
        .map_err(CoreError::Identity)
}

/// Register `peer` under `msp_id`.
fn register_peer(pool: &dyn PeerPool, msp_id: &str, peer: Peer) -> Result<(), CoreError> {
    pool.add(msp_id, peer, PeerStrategy::default())
        .map_err(|source| CoreError::PeerPool {
            msp_id: msp_id.to_string(),
            source,
        })
}

/// Register a gossip local peer; one already configured as an endorser is
/// left alone.
fn register_local_peer(pool: &dyn PeerPool, msp_id: &str, peer: Peer) -> Result<(), CoreError> {
    match register_peer(pool, msp_id, peer) {
        Err(CoreError::PeerPool {
            source: PoolError::PeerAlreadyExists { address, .. },
            ..
        }) => {
            debug!(msp_id, %address, "local peer already registered");
            Ok(())
        }
        other => other,
    }
}

/// Stage 5.
pub(crate) async fn init_peer_pool(
    pool: Option<Arc<dyn PeerPool>>,
    config: Option<&ClientConfig>,
    ctx: &CancellationToken,
    builder: &dyn ConnectionBuilder,
) -> Result<Arc<dyn PeerPool>, CoreError> {
    if let Some(pool) = pool {
        return Ok(pool);
    }
    let config = config.ok_or(CoreError::EmptyConfig)?;
    info!(msps = config.msp.len(), "initializing peer pool");

    let pool = Arc::new(MemoryPeerPool::new());
    for msp in &config.msp {
        for endorser in &msp.endorsers {
            let connection = builder
                .build(ctx, std::slice::from_ref(endorser))
                .await
                .map_err(|source| CoreError::PeerConnection {
                    msp_id: msp.name.clone(),
                    source,
                })?;
            register_peer(pool.as_ref(), &msp.name, Peer::new(&endorser.host, connection))?;
        }
    }
    Ok(pool)
}

/// Collaborators the discovery stage needs.
pub(crate) struct DiscoveryDeps<'a> {
    pub(crate) ctx: &'a CancellationToken,
    pub(crate) identity: &'a Arc<SigningIdentity>,
    pub(crate) peer_pool: &'a Arc<dyn PeerPool>,
    pub(crate) builder: &'a dyn ConnectionBuilder,
    pub(crate) transport: Option<Arc<dyn DiscoveryTransport>>,
}

/// Stage 6.
pub(crate) async fn init_discovery(
    provider: Option<Arc<dyn DiscoveryProvider>>,
    config: Option<&ClientConfig>,
    deps: DiscoveryDeps<'_>,
) -> Result<Option<Arc<dyn DiscoveryProvider>>, CoreError> {
    if provider.is_some() {
        return Ok(provider);
    }
    let Some(config) = config else {
        return Ok(None);
    };

    let given = config.discovery.discovery_type.as_str();
    if given.is_empty() {
        info!("discovery not configured");
        return Ok(None);
    }
    let discovery_type =
        DiscoveryType::from_str(given).map_err(|_| CoreError::UnknownDiscoveryType {
            given: given.to_string(),
            available: DiscoveryType::available(),
        })?;
    info!(%discovery_type, "initializing discovery provider");

    let mapper = TlsCertsMapper::new(&config.tls_certs_map);
    match discovery_type {
        DiscoveryType::Local => {
            let provider = LocalDiscoveryProvider::new(&config.discovery.local, mapper)
                .map_err(CoreError::Discovery)?;
            Ok(Some(Arc::new(provider)))
        }
        DiscoveryType::Gossip => {
            let mut bootstrap = config
                .discovery
                .connection
                .clone()
                .ok_or(CoreError::MissingDiscoveryConnection)?;
            if let Some(tls) = mapper.tls_config_for_address(&bootstrap.host) {
                bootstrap.tls = tls.clone();
            }

            let transport = match deps.transport {
                Some(transport) => transport,
                None => {
                    let connection = deps
                        .builder
                        .build(deps.ctx, std::slice::from_ref(&bootstrap))
                        .await
                        .map_err(CoreError::DiscoveryConnection)?;
                    Arc::new(GrpcDiscoveryTransport::new(connection))
                }
            };

            let signing = deps.identity.clone();
            let signer: IdentitySigner = Arc::new(move |payload: &[u8]| signing.sign(payload));
            let provider =
                GossipDiscoveryProvider::new(transport, signer, deps.identity.serialize(), mapper);

            let local = provider
                .local_peers(deps.ctx)
                .await
                .map_err(CoreError::LocalPeers)?;
            for endpoint in &local.peers {
                for address in &endpoint.host_addresses {
                    let connection = deps
                        .builder
                        .build(deps.ctx, &[address.connection_config()])
                        .await
                        .map_err(|source| CoreError::PeerConnection {
                            msp_id: endpoint.msp_id.clone(),
                            source,
                        })?;
                    register_local_peer(
                        deps.peer_pool.as_ref(),
                        &endpoint.msp_id,
                        Peer::new(&address.address, connection),
                    )?;
                }
            }
            info!(orgs = local.peers.len(), bootstrap = %bootstrap.host, "local peers registered");

            Ok(Some(Arc::new(provider)))
        }
    }
}

/// Stage 7.
pub(crate) async fn init_orderer(
    orderer: Option<Arc<Orderer>>,
    config: Option<&ClientConfig>,
    ctx: &CancellationToken,
    builder: &dyn ConnectionBuilder,
    connector: &dyn OrdererConnector,
) -> Result<Option<Arc<Orderer>>, CoreError> {
    if orderer.is_some() {
        return Ok(orderer);
    }
    let Some(config) = config.filter(|c| !c.orderers.is_empty()) else {
        return Ok(None);
    };
    info!(orderers = config.orderers.len(), "initializing default orderer");

    let connection = builder
        .build(ctx, &config.orderers)
        .await
        .map_err(CoreError::OrdererConnection)?;
    let orderer = connector
        .from_connection(ctx, connection)
        .await
        .map_err(CoreError::Orderer)?;
    Ok(Some(orderer))
}

/// Stage 8.
pub(crate) fn init_fetcher(fetcher: Option<Arc<dyn Fetcher>>) -> Arc<dyn Fetcher> {
    fetcher.unwrap_or_else(|| {
        info!("initializing local chaincode fetcher");
        Arc::new(LocalFetcher::new(SourceLayout::Golang))
    })
}

/// Stages 1 and 2, plus the adapter defaults every later stage shares.
pub(crate) fn init_ambient(
    parts: &mut CoreParts,
    msp_id: &str,
) -> (
    CancellationToken,
    Span,
    Arc<dyn ConnectionBuilder>,
    Arc<dyn OrdererConnector>,
) {
    let ctx = parts.ctx.take().unwrap_or_default();
    let span = parts
        .span
        .take()
        .unwrap_or_else(|| info_span!("core", msp_id = %msp_id));
    let builder = parts
        .connection_builder
        .take()
        .unwrap_or_else(|| Arc::new(GrpcConnectionBuilder::new()));
    let connector = parts
        .orderer_connector
        .take()
        .unwrap_or_else(|| Arc::new(GrpcOrdererConnector));
    (ctx, span, builder, connector)
}
