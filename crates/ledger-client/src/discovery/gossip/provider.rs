//! Discovery through the network's discovery service.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use prost::Message;
use shared_crypto::{CryptoError, SerializedIdentity};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::proto::{
    self, AuthInfo, ChaincodeCall, ChaincodeInterest, ChaincodeQuery, ConfigQuery, ConfigResult,
    LocalPeerQuery, Query, QueryKind, QueryResultKind, Request, SignedRequest,
};
use crate::discovery::tls_mapper::TlsCertsMapper;
use crate::domain::{
    ChaincodeDiscovery, ChannelDiscovery, DiscoveryError, HostAddress, HostEndpoint,
    LocalPeersDiscovery,
};
use crate::ports::{DiscoveryProvider, DiscoveryTransport};

/// Signs request payloads with the client identity.
pub type IdentitySigner = Arc<dyn Fn(&[u8]) -> Result<Vec<u8>, CryptoError> + Send + Sync>;

/// Discovery provider backed by a [`DiscoveryTransport`].
///
/// Every call is one signed request. Addresses in answers are paired with TLS
/// settings from the [`TlsCertsMapper`].
pub struct GossipDiscoveryProvider {
    transport: Arc<dyn DiscoveryTransport>,
    signer: IdentitySigner,
    client_identity: Vec<u8>,
    mapper: TlsCertsMapper,
}

impl GossipDiscoveryProvider {
    /// Provider over `transport`, authenticating as `client_identity`.
    pub fn new(
        transport: Arc<dyn DiscoveryTransport>,
        signer: IdentitySigner,
        client_identity: Vec<u8>,
        mapper: TlsCertsMapper,
    ) -> Self {
        Self {
            transport,
            signer,
            client_identity,
            mapper,
        }
    }

    fn signed_request(&self, queries: Vec<Query>) -> Result<SignedRequest, DiscoveryError> {
        let request = Request {
            authentication: Some(AuthInfo {
                client_identity: self.client_identity.clone(),
                client_tls_cert_hash: Vec::new(),
            }),
            queries,
        };
        let payload = request.encode_to_vec();
        let signature = (self.signer)(&payload).map_err(DiscoveryError::Signing)?;
        Ok(SignedRequest { payload, signature })
    }

    /// Send `queries` and return one result per query, errors turned into
    /// [`DiscoveryError::Rejected`].
    async fn query(
        &self,
        ctx: &CancellationToken,
        queries: Vec<Query>,
    ) -> Result<Vec<QueryResultKind>, DiscoveryError> {
        if ctx.is_cancelled() {
            return Err(DiscoveryError::Cancelled);
        }

        let expected = queries.len();
        let request = self.signed_request(queries)?;
        let response = self.transport.discover(ctx, request).await?;

        if response.results.len() != expected {
            return Err(DiscoveryError::InvalidResponse(format!(
                "expected {expected} results, got {}",
                response.results.len()
            )));
        }

        response
            .results
            .into_iter()
            .map(|result| match result.result {
                Some(QueryResultKind::Error(error)) => Err(DiscoveryError::Rejected(error.content)),
                Some(other) => Ok(other),
                None => Err(DiscoveryError::InvalidResponse("empty query result".to_string())),
            })
            .collect()
    }

    fn orderers(&self, config: ConfigResult) -> Vec<HostEndpoint> {
        config
            .orderers
            .into_iter()
            .map(|(msp_id, endpoints)| HostEndpoint {
                msp_id,
                host_addresses: endpoints
                    .endpoint
                    .iter()
                    .map(|endpoint| self.mapper.host_address(&endpoint.address()))
                    .collect(),
            })
            .collect()
    }

    /// Group peers by the MSP id in their serialized identity.
    fn peers_by_msp<'a>(
        &self,
        peers: impl IntoIterator<Item = &'a proto::Peer>,
    ) -> Vec<HostEndpoint> {
        let mut grouped: BTreeMap<String, Vec<HostAddress>> = BTreeMap::new();
        for peer in peers {
            let msp_id = match SerializedIdentity::decode(peer.identity.as_slice()) {
                Ok(identity) => identity.mspid,
                Err(e) => {
                    warn!(endpoint = %peer.endpoint, error = %e, "skipping peer with undecodable identity");
                    continue;
                }
            };
            let addresses = grouped.entry(msp_id).or_default();
            if !addresses.iter().any(|a| a.address == peer.endpoint) {
                addresses.push(self.mapper.host_address(&peer.endpoint));
            }
        }

        grouped
            .into_iter()
            .map(|(msp_id, host_addresses)| HostEndpoint {
                msp_id,
                host_addresses,
            })
            .collect()
    }
}

impl fmt::Debug for GossipDiscoveryProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GossipDiscoveryProvider")
            .field("mapped_addresses", &self.mapper.len())
            .finish_non_exhaustive()
    }
}

fn unexpected(kind: &QueryResultKind) -> DiscoveryError {
    let name = match kind {
        QueryResultKind::Error(_) => "error",
        QueryResultKind::ConfigResult(_) => "config result",
        QueryResultKind::CcQueryRes(_) => "chaincode result",
        QueryResultKind::Members(_) => "membership result",
    };
    DiscoveryError::InvalidResponse(format!("unexpected {name}"))
}

#[async_trait]
impl DiscoveryProvider for GossipDiscoveryProvider {
    async fn channel(
        &self,
        ctx: &CancellationToken,
        channel_name: &str,
    ) -> Result<ChannelDiscovery, DiscoveryError> {
        let mut results = self
            .query(
                ctx,
                vec![Query::new(channel_name, QueryKind::ConfigQuery(ConfigQuery {}))],
            )
            .await?;

        match results.pop() {
            Some(QueryResultKind::ConfigResult(config)) => {
                let orderers = self.orderers(config);
                debug!(channel = channel_name, orderer_orgs = orderers.len(), "channel discovered");
                Ok(ChannelDiscovery {
                    channel_name: channel_name.to_string(),
                    orderers,
                })
            }
            Some(other) => Err(unexpected(&other)),
            None => Err(DiscoveryError::InvalidResponse("no result".to_string())),
        }
    }

    async fn chaincode(
        &self,
        ctx: &CancellationToken,
        channel_name: &str,
        chaincode_name: &str,
    ) -> Result<ChaincodeDiscovery, DiscoveryError> {
        let interest = ChaincodeInterest {
            chaincodes: vec![ChaincodeCall {
                name: chaincode_name.to_string(),
            }],
        };
        let results = self
            .query(
                ctx,
                vec![
                    Query::new(channel_name, QueryKind::ConfigQuery(ConfigQuery {})),
                    Query::new(
                        channel_name,
                        QueryKind::CcQuery(ChaincodeQuery {
                            interests: vec![interest],
                        }),
                    ),
                ],
            )
            .await?;

        let mut results = results.into_iter();
        let orderers = match results.next() {
            Some(QueryResultKind::ConfigResult(config)) => self.orderers(config),
            Some(other) => return Err(unexpected(&other)),
            None => return Err(DiscoveryError::InvalidResponse("no config result".to_string())),
        };
        let descriptor = match results.next() {
            Some(QueryResultKind::CcQueryRes(result)) => result
                .content
                .into_iter()
                .find(|d| d.chaincode == chaincode_name)
                .ok_or_else(|| DiscoveryError::ChaincodeNotFound {
                    channel: channel_name.to_string(),
                    chaincode: chaincode_name.to_string(),
                })?,
            Some(other) => return Err(unexpected(&other)),
            None => {
                return Err(DiscoveryError::InvalidResponse("no chaincode result".to_string()))
            }
        };

        let peers: Vec<&proto::Peer> = descriptor
            .endorsers_by_groups
            .values()
            .flat_map(|group| group.peers.iter())
            .collect();
        let chaincode_version = peers
            .iter()
            .flat_map(|peer| peer.chaincodes.iter())
            .find(|cc| cc.name == chaincode_name)
            .map(|cc| cc.version.clone())
            .unwrap_or_default();

        Ok(ChaincodeDiscovery {
            channel: ChannelDiscovery {
                channel_name: channel_name.to_string(),
                orderers,
            },
            chaincode_name: chaincode_name.to_string(),
            chaincode_version,
            endorsers: self.peers_by_msp(peers),
        })
    }

    async fn local_peers(
        &self,
        ctx: &CancellationToken,
    ) -> Result<LocalPeersDiscovery, DiscoveryError> {
        let mut results = self
            .query(ctx, vec![Query::new("", QueryKind::LocalPeers(LocalPeerQuery {}))])
            .await?;

        match results.pop() {
            Some(QueryResultKind::Members(members)) => Ok(LocalPeersDiscovery {
                peers: self.peers_by_msp(
                    members
                        .peers_by_org
                        .values()
                        .flat_map(|group| group.peers.iter()),
                ),
            }),
            Some(other) => Err(unexpected(&other)),
            None => Err(DiscoveryError::InvalidResponse("no result".to_string())),
        }
    }
}
