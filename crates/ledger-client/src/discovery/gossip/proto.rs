//! Discovery service messages.
//!
//! A trimmed rendition of the ledger's `discovery` protobuf package: the
//! request envelope and the config, chaincode, membership and local-peer
//! queries the client issues. Peer records carry their endpoint and installed
//! chaincodes directly instead of inside gossip envelopes.

use std::collections::BTreeMap;

/// Request payload plus the client's signature over it.
#[derive(Clone, PartialEq, prost::Message)]
pub struct SignedRequest {
    /// Encoded [`Request`].
    #[prost(bytes = "vec", tag = "1")]
    pub payload: Vec<u8>,
    /// Signature over `payload` by the client identity.
    #[prost(bytes = "vec", tag = "2")]
    pub signature: Vec<u8>,
}

/// Batch of queries sent in one round trip.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Request {
    /// Who is asking.
    #[prost(message, optional, tag = "1")]
    pub authentication: Option<AuthInfo>,
    /// Queries, answered in order.
    #[prost(message, repeated, tag = "2")]
    pub queries: Vec<Query>,
}

/// Client authentication material.
#[derive(Clone, PartialEq, prost::Message)]
pub struct AuthInfo {
    /// Serialized identity of the client.
    #[prost(bytes = "vec", tag = "1")]
    pub client_identity: Vec<u8>,
    /// Hash of the client TLS certificate, empty without mutual TLS.
    #[prost(bytes = "vec", tag = "2")]
    pub client_tls_cert_hash: Vec<u8>,
}

/// One query, scoped to a channel.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Query {
    /// Channel name; empty for local queries.
    #[prost(string, tag = "1")]
    pub channel: String,
    /// Query body.
    #[prost(oneof = "QueryKind", tags = "2, 3, 4, 5")]
    pub query: Option<QueryKind>,
}

impl Query {
    /// Query `kind` on `channel`.
    pub fn new(channel: impl Into<String>, kind: QueryKind) -> Self {
        Self {
            channel: channel.into(),
            query: Some(kind),
        }
    }
}

/// Query bodies.
#[derive(Clone, PartialEq, prost::Oneof)]
pub enum QueryKind {
    /// Channel config: MSPs and orderers.
    #[prost(message, tag = "2")]
    ConfigQuery(ConfigQuery),
    /// Channel members.
    #[prost(message, tag = "3")]
    PeerQuery(PeerMembershipQuery),
    /// Endorsers of chaincodes.
    #[prost(message, tag = "4")]
    CcQuery(ChaincodeQuery),
    /// Peers known to the answering peer's organization.
    #[prost(message, tag = "5")]
    LocalPeers(LocalPeerQuery),
}

/// Channel config query.
#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct ConfigQuery {}

/// Channel membership query.
#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct PeerMembershipQuery {}

/// Local membership query.
#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct LocalPeerQuery {}

/// Endorsers query.
#[derive(Clone, PartialEq, prost::Message)]
pub struct ChaincodeQuery {
    /// Chaincode invocations the client is interested in.
    #[prost(message, repeated, tag = "1")]
    pub interests: Vec<ChaincodeInterest>,
}

/// Chaincodes invoked together.
#[derive(Clone, PartialEq, prost::Message)]
pub struct ChaincodeInterest {
    /// Invoked chaincodes.
    #[prost(message, repeated, tag = "1")]
    pub chaincodes: Vec<ChaincodeCall>,
}

/// One invoked chaincode.
#[derive(Clone, PartialEq, prost::Message)]
pub struct ChaincodeCall {
    /// Chaincode name.
    #[prost(string, tag = "1")]
    pub name: String,
}

/// Answers, one per query.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Response {
    /// Results in query order.
    #[prost(message, repeated, tag = "1")]
    pub results: Vec<QueryResult>,
}

/// Answer to one query.
#[derive(Clone, PartialEq, prost::Message)]
pub struct QueryResult {
    /// Result body.
    #[prost(oneof = "QueryResultKind", tags = "1, 2, 3, 4")]
    pub result: Option<QueryResultKind>,
}

/// Result bodies.
#[derive(Clone, PartialEq, prost::Oneof)]
pub enum QueryResultKind {
    /// Query failed.
    #[prost(message, tag = "1")]
    Error(Error),
    /// Answer to [`ConfigQuery`].
    #[prost(message, tag = "2")]
    ConfigResult(ConfigResult),
    /// Answer to [`ChaincodeQuery`].
    #[prost(message, tag = "3")]
    CcQueryRes(ChaincodeQueryResult),
    /// Answer to membership and local peer queries.
    #[prost(message, tag = "4")]
    Members(PeerMembershipResult),
}

/// Error text from the service.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Error {
    /// Message.
    #[prost(string, tag = "1")]
    pub content: String,
}

/// Channel config answer.
#[derive(Clone, PartialEq, prost::Message)]
pub struct ConfigResult {
    /// Orderer endpoints keyed by orderer MSP id.
    #[prost(btree_map = "string, message", tag = "2")]
    pub orderers: BTreeMap<String, Endpoints>,
}

/// Endpoint list.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Endpoints {
    /// Endpoints.
    #[prost(message, repeated, tag = "1")]
    pub endpoint: Vec<Endpoint>,
}

/// Host and port.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Endpoint {
    /// Host name or IP.
    #[prost(string, tag = "1")]
    pub host: String,
    /// Port.
    #[prost(uint32, tag = "2")]
    pub port: u32,
}

impl Endpoint {
    /// `host:port`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Endorsers answer.
#[derive(Clone, PartialEq, prost::Message)]
pub struct ChaincodeQueryResult {
    /// One descriptor per interest.
    #[prost(message, repeated, tag = "1")]
    pub content: Vec<EndorsementDescriptor>,
}

/// Endorsers of one chaincode, grouped.
#[derive(Clone, PartialEq, prost::Message)]
pub struct EndorsementDescriptor {
    /// Chaincode name.
    #[prost(string, tag = "1")]
    pub chaincode: String,
    /// Endorsing peers by policy group.
    #[prost(btree_map = "string, message", tag = "2")]
    pub endorsers_by_groups: BTreeMap<String, Peers>,
}

/// Membership answer.
#[derive(Clone, PartialEq, prost::Message)]
pub struct PeerMembershipResult {
    /// Peers keyed by MSP id.
    #[prost(btree_map = "string, message", tag = "1")]
    pub peers_by_org: BTreeMap<String, Peers>,
}

/// Peer list.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Peers {
    /// Peers.
    #[prost(message, repeated, tag = "1")]
    pub peers: Vec<Peer>,
}

/// One peer.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Peer {
    /// Serialized identity of the peer.
    #[prost(bytes = "vec", tag = "3")]
    pub identity: Vec<u8>,
    /// `host:port` the peer listens on.
    #[prost(string, tag = "4")]
    pub endpoint: String,
    /// Chaincodes installed on the peer.
    #[prost(message, repeated, tag = "5")]
    pub chaincodes: Vec<Chaincode>,
    /// Ledger height of the peer.
    #[prost(uint64, tag = "6")]
    pub ledger_height: u64,
}

/// Installed chaincode.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Chaincode {
    /// Name.
    #[prost(string, tag = "1")]
    pub name: String,
    /// Version.
    #[prost(string, tag = "2")]
    pub version: String,
}
