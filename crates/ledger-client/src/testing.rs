//! # Test Utilities
//!
//! Mock ports and fixtures. Compiled for unit tests and behind the
//! `test-utils` feature for the workspace test suite.

use std::collections::{HashMap, HashSet, VecDeque};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_crypto::{EcdsaSuite, Identity, SigningIdentity};
use tokio_util::sync::CancellationToken;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;

use crate::config::ConnectionConfig;
use crate::discovery::gossip::proto::{Response, SignedRequest};
use crate::domain::{
    ChaincodeDiscovery, ChannelDiscovery, Connection, ConnectionError, DiscoveryError, HostAddress,
    HostEndpoint, LocalPeersDiscovery, Orderer, OrdererError,
};
use crate::ports::{ConnectionBuilder, DiscoveryProvider, DiscoveryTransport, OrdererConnector};

/// PEM-shaped placeholder certificate.
pub const TEST_CERTIFICATE: &[u8] =
    b"-----BEGIN CERTIFICATE-----\nMIIBtest\n-----END CERTIFICATE-----\n";

/// Raw identity with a fixed P-256 scalar.
pub fn test_identity(msp_id: &str) -> Identity {
    Identity::new(msp_id, TEST_CERTIFICATE.to_vec(), vec![0x42; 32])
}

/// [`test_identity`] bound to the default ECDSA suite.
pub fn test_signing_identity(msp_id: &str) -> SigningIdentity {
    match test_identity(msp_id).signing_identity(Arc::new(EcdsaSuite::default())) {
        Ok(identity) => identity,
        Err(e) => panic!("fixture key must be valid: {e}"),
    }
}

/// Orderer endpoint of `msp_id` over plaintext `hosts`.
pub fn endpoint(msp_id: &str, hosts: &[&str]) -> HostEndpoint {
    HostEndpoint::new(msp_id, hosts.iter().map(|h| HostAddress::plain(*h)).collect())
}

/// Detached orderer over `hosts`.
pub fn orderer(hosts: &[&str]) -> Arc<Orderer> {
    Arc::new(Orderer::new(Connection::detached(
        hosts.iter().map(|h| ConnectionConfig::new(*h)).collect(),
    )))
}

// =============================================================================
// Connection builder
// =============================================================================

/// Builds detached connections and records every call.
#[derive(Debug, Default)]
pub struct RecordingConnectionBuilder {
    builds: Mutex<Vec<Vec<String>>>,
    failing_hosts: Mutex<HashSet<String>>,
}

impl RecordingConnectionBuilder {
    /// Builder that accepts every host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail any build that includes `host`.
    pub fn fail_host(&self, host: &str) {
        self.failing_hosts.lock().insert(host.to_string());
    }

    /// Host lists of every successful build, in call order.
    pub fn builds(&self) -> Vec<Vec<String>> {
        self.builds.lock().clone()
    }

    /// Number of successful builds.
    pub fn build_count(&self) -> usize {
        self.builds.lock().len()
    }
}

#[async_trait]
impl ConnectionBuilder for RecordingConnectionBuilder {
    async fn build(
        &self,
        ctx: &CancellationToken,
        targets: &[ConnectionConfig],
    ) -> Result<Connection, ConnectionError> {
        if ctx.is_cancelled() {
            return Err(ConnectionError::Cancelled);
        }
        if targets.is_empty() {
            return Err(ConnectionError::NoTargets);
        }
        let failing = self.failing_hosts.lock();
        if let Some(target) = targets.iter().find(|t| failing.contains(&t.host)) {
            return Err(ConnectionError::Transport(format!(
                "connection refused: {}",
                target.host
            )));
        }
        drop(failing);

        self.builds
            .lock()
            .push(targets.iter().map(|t| t.host.clone()).collect());
        Ok(Connection::detached(targets.to_vec()))
    }
}

// =============================================================================
// Orderer connector
// =============================================================================

/// Orderer connector that always fails.
#[derive(Debug, Default)]
pub struct FailingOrdererConnector;

#[async_trait]
impl OrdererConnector for FailingOrdererConnector {
    async fn from_connection(
        &self,
        _ctx: &CancellationToken,
        _connection: Connection,
    ) -> Result<Arc<Orderer>, OrdererError> {
        Err(OrdererError::NoEndpoints)
    }
}

// =============================================================================
// Discovery provider
// =============================================================================

/// Scripted discovery provider counting channel queries.
#[derive(Debug, Default)]
pub struct MockDiscoveryProvider {
    channels: Mutex<HashMap<String, Vec<HostEndpoint>>>,
    failing: Mutex<HashSet<String>>,
    chaincodes: Mutex<HashMap<(String, String), ChaincodeDiscovery>>,
    local_peers: Mutex<Option<Vec<HostEndpoint>>>,
    channel_calls: Mutex<HashMap<String, usize>>,
    total_calls: AtomicUsize,
    delay: Mutex<Option<Duration>>,
}

impl MockDiscoveryProvider {
    /// Provider that knows no channels.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `channel` with `orderers`.
    pub fn with_channel(self, channel: &str, orderers: Vec<HostEndpoint>) -> Self {
        self.channels.lock().insert(channel.to_string(), orderers);
        self
    }

    /// Fail queries for `channel` with a transport error.
    pub fn with_failing_channel(self, channel: &str) -> Self {
        self.failing.lock().insert(channel.to_string());
        self
    }

    /// Answer chaincode queries for `channel`/`name`.
    pub fn with_chaincode(self, discovery: ChaincodeDiscovery) -> Self {
        let key = (
            discovery.channel_name().to_string(),
            discovery.chaincode_name().to_string(),
        );
        self.chaincodes.lock().insert(key, discovery);
        self
    }

    /// Answer `local_peers` with `peers`.
    pub fn with_local_peers(self, peers: Vec<HostEndpoint>) -> Self {
        *self.local_peers.lock() = Some(peers);
        self
    }

    /// Sleep before answering channel queries.
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock() = Some(delay);
        self
    }

    /// Channel queries seen for `channel`.
    pub fn channel_calls(&self, channel: &str) -> usize {
        self.channel_calls.lock().get(channel).copied().unwrap_or(0)
    }

    /// Channel queries seen in total.
    pub fn total_channel_calls(&self) -> usize {
        self.total_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DiscoveryProvider for MockDiscoveryProvider {
    async fn channel(
        &self,
        ctx: &CancellationToken,
        channel_name: &str,
    ) -> Result<ChannelDiscovery, DiscoveryError> {
        *self
            .channel_calls
            .lock()
            .entry(channel_name.to_string())
            .or_default() += 1;
        self.total_calls.fetch_add(1, Ordering::SeqCst);

        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::select! {
                _ = ctx.cancelled() => return Err(DiscoveryError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
        if ctx.is_cancelled() {
            return Err(DiscoveryError::Cancelled);
        }
        if self.failing.lock().contains(channel_name) {
            return Err(DiscoveryError::Transport("discovery peer unreachable".to_string()));
        }

        let orderers = self
            .channels
            .lock()
            .get(channel_name)
            .cloned()
            .ok_or_else(|| DiscoveryError::ChannelNotFound(channel_name.to_string()))?;
        Ok(ChannelDiscovery {
            channel_name: channel_name.to_string(),
            orderers,
        })
    }

    async fn chaincode(
        &self,
        _ctx: &CancellationToken,
        channel_name: &str,
        chaincode_name: &str,
    ) -> Result<ChaincodeDiscovery, DiscoveryError> {
        self.chaincodes
            .lock()
            .get(&(channel_name.to_string(), chaincode_name.to_string()))
            .cloned()
            .ok_or_else(|| DiscoveryError::ChaincodeNotFound {
                channel: channel_name.to_string(),
                chaincode: chaincode_name.to_string(),
            })
    }

    async fn local_peers(
        &self,
        _ctx: &CancellationToken,
    ) -> Result<LocalPeersDiscovery, DiscoveryError> {
        self.local_peers
            .lock()
            .clone()
            .map(|peers| LocalPeersDiscovery { peers })
            .ok_or(DiscoveryError::Unsupported("local peers discovery"))
    }
}

// =============================================================================
// Discovery transport
// =============================================================================

/// Transport answering from a queue and recording requests.
#[derive(Debug, Default)]
pub struct MockDiscoveryTransport {
    responses: Mutex<VecDeque<Response>>,
    requests: Mutex<Vec<SignedRequest>>,
}

impl MockDiscoveryTransport {
    /// Transport that answers with `responses` in order.
    pub fn new(responses: Vec<Response>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<SignedRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl DiscoveryTransport for MockDiscoveryTransport {
    async fn discover(
        &self,
        ctx: &CancellationToken,
        request: SignedRequest,
    ) -> Result<Response, DiscoveryError> {
        if ctx.is_cancelled() {
            return Err(DiscoveryError::Cancelled);
        }
        self.requests.lock().push(request);
        self.responses
            .lock()
            .pop_front()
            .ok_or_else(|| DiscoveryError::Transport("no scripted response".to_string()))
    }
}

// =============================================================================
// Log capture
// =============================================================================

/// Formatted log output collected by [`capture_logs`].
#[derive(Clone, Debug, Default)]
pub struct CapturedLogs {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    /// Everything written so far.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }

    /// Lines containing `needle`.
    pub fn lines_with(&self, needle: &str) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| line.contains(needle))
            .map(str::to_string)
            .collect()
    }
}

/// Writer handed out per event.
#[derive(Debug)]
pub struct CapturedWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl io::Write for CapturedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CapturedWriter {
            buffer: self.buffer.clone(),
        }
    }
}

/// Route events of the current thread into a buffer until the guard drops.
pub fn capture_logs() -> (CapturedLogs, DefaultGuard) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    (logs, tracing::subscriber::set_default(subscriber))
}
