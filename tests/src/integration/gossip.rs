//! # Gossip Discovery Flow
//!
//! Core construction and channel resolution against a scripted discovery
//! service.

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use ledger_client::discovery::gossip::proto::{
        ConfigResult, Endpoint, Endpoints, Peer, PeerMembershipResult, Peers, QueryKind,
        QueryResult, QueryResultKind, Request, Response,
    };
    use ledger_client::testing::{
        test_identity, test_signing_identity, MockDiscoveryTransport, RecordingConnectionBuilder,
    };
    use ledger_client::{
        ClientConfig, ConnectionConfig, Core, CoreError, CoreOption, DiscoveryError,
        OrdererResolution, TlsCertsMapEntry, TlsConfig,
    };
    use prost::Message;
    use shared_crypto::SerializedIdentity;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn gossip_config() -> ClientConfig {
        let mut config = ClientConfig::for_testing();
        config.discovery.discovery_type = "gossip".to_string();
        config.discovery.connection = Some(ConnectionConfig::new("peer0.org1:7051"));
        config.tls_certs_map = vec![TlsCertsMapEntry {
            address: "peer1.org1:7051".to_string(),
            tls: TlsConfig::with_ca("/etc/ledger/org1-ca.pem"),
        }];
        config
    }

    fn peer(msp_id: &str, endpoint: &str) -> Peer {
        Peer {
            identity: SerializedIdentity {
                mspid: msp_id.to_string(),
                id_bytes: b"peer-cert".to_vec(),
            }
            .encode_to_vec(),
            endpoint: endpoint.to_string(),
            chaincodes: Vec::new(),
            ledger_height: 1,
        }
    }

    fn local_peers_response() -> Response {
        let mut peers_by_org = BTreeMap::new();
        peers_by_org.insert(
            "Org1MSP".to_string(),
            Peers {
                peers: vec![peer("Org1MSP", "peer0.org1:7051"), peer("Org1MSP", "peer1.org1:7051")],
            },
        );
        Response {
            results: vec![QueryResult {
                result: Some(QueryResultKind::Members(PeerMembershipResult { peers_by_org })),
            }],
        }
    }

    fn config_response(host: &str) -> Response {
        let mut orderers = BTreeMap::new();
        orderers.insert(
            "OrdererMSP".to_string(),
            Endpoints {
                endpoint: vec![Endpoint {
                    host: host.to_string(),
                    port: 7050,
                }],
            },
        );
        Response {
            results: vec![QueryResult {
                result: Some(QueryResultKind::ConfigResult(ConfigResult { orderers })),
            }],
        }
    }

    async fn gossip_core(
        transport: Arc<MockDiscoveryTransport>,
        connections: Arc<RecordingConnectionBuilder>,
    ) -> Result<Core, CoreError> {
        Core::new(
            "Org1MSP",
            Some(test_identity("Org1MSP")),
            vec![
                CoreOption::Config(gossip_config()),
                CoreOption::ConnectionBuilder(connections),
                CoreOption::DiscoveryTransport(transport),
            ],
        )
        .await
    }

    // =============================================================================
    // CONSTRUCTION
    // =============================================================================

    #[tokio::test]
    async fn test_local_peers_join_the_pool() {
        let transport = Arc::new(MockDiscoveryTransport::new(vec![local_peers_response()]));
        let connections = Arc::new(RecordingConnectionBuilder::new());

        let core = gossip_core(transport, connections.clone()).await.unwrap();

        let addresses: Vec<String> = core
            .peer_pool()
            .peers("Org1MSP")
            .iter()
            .map(|p| p.address().to_string())
            .collect();
        assert_eq!(addresses, vec!["peer0.org1:7051", "peer1.org1:7051"]);
        assert!(connections
            .builds()
            .contains(&vec!["peer1.org1:7051".to_string()]));
        assert!(core.discovery_provider().is_some());
    }

    #[tokio::test]
    async fn test_requests_are_signed_by_client_identity() {
        let transport = Arc::new(MockDiscoveryTransport::new(vec![local_peers_response()]));
        gossip_core(transport.clone(), Arc::new(RecordingConnectionBuilder::new()))
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);

        let signed = &requests[0];
        test_signing_identity("Org1MSP")
            .verify(&signed.payload, &signed.signature)
            .unwrap();

        let request = Request::decode(signed.payload.as_slice()).unwrap();
        let auth = request.authentication.unwrap();
        let identity = SerializedIdentity::decode(auth.client_identity.as_slice()).unwrap();
        assert_eq!(identity.mspid, "Org1MSP");
        assert!(matches!(
            request.queries[0].query,
            Some(QueryKind::LocalPeers(_))
        ));
    }

    #[tokio::test]
    async fn test_local_peers_failure_aborts_construction() {
        let transport = Arc::new(MockDiscoveryTransport::new(Vec::new()));

        let err = gossip_core(transport, Arc::new(RecordingConnectionBuilder::new()))
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::LocalPeers(DiscoveryError::Transport(_))));
    }

    #[tokio::test]
    async fn test_bootstrap_connection_built_without_transport() {
        let connections = Arc::new(RecordingConnectionBuilder::new());

        let err = Core::new(
            "Org1MSP",
            Some(test_identity("Org1MSP")),
            vec![
                CoreOption::Config(gossip_config()),
                CoreOption::ConnectionBuilder(connections.clone()),
            ],
        )
        .await
        .unwrap_err();

        // Detached bootstrap connections cannot carry the local peers query.
        assert!(matches!(err, CoreError::LocalPeers(_)));
        assert_eq!(
            connections.builds().last().unwrap(),
            &vec!["peer0.org1:7051".to_string()]
        );
    }

    #[tokio::test]
    async fn test_unreachable_bootstrap_peer() {
        let connections = Arc::new(RecordingConnectionBuilder::new());
        let mut config = gossip_config();
        config.discovery.connection = Some(ConnectionConfig::new("bootstrap.org1:7051"));
        connections.fail_host("bootstrap.org1:7051");

        let err = Core::new(
            "Org1MSP",
            Some(test_identity("Org1MSP")),
            vec![
                CoreOption::Config(config),
                CoreOption::ConnectionBuilder(connections),
            ],
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CoreError::DiscoveryConnection(_)));
    }

    // =============================================================================
    // CHANNEL RESOLUTION
    // =============================================================================

    #[tokio::test]
    async fn test_channel_uses_discovered_orderer() {
        let transport = Arc::new(MockDiscoveryTransport::new(vec![
            local_peers_response(),
            config_response("orderer5.example.com"),
        ]));
        let core = gossip_core(transport.clone(), Arc::new(RecordingConnectionBuilder::new()))
            .await
            .unwrap();

        let channel = core.channel("mychannel").await;

        assert_eq!(channel.orderer_resolution(), &OrdererResolution::Discovered);
        assert_eq!(
            channel.orderer().unwrap().addresses(),
            vec!["orderer5.example.com:7050"]
        );

        let request = Request::decode(transport.requests()[1].payload.as_slice()).unwrap();
        assert_eq!(request.queries[0].channel, "mychannel");
    }

    #[tokio::test]
    async fn test_rejected_channel_query_falls_back() {
        let rejected = Response {
            results: vec![QueryResult {
                result: Some(QueryResultKind::Error(
                    ledger_client::discovery::gossip::proto::Error {
                        content: "access denied".to_string(),
                    },
                )),
            }],
        };
        let transport = Arc::new(MockDiscoveryTransport::new(vec![
            local_peers_response(),
            rejected,
        ]));
        let core = gossip_core(transport, Arc::new(RecordingConnectionBuilder::new()))
            .await
            .unwrap();

        let channel = core.channel("mychannel").await;

        match channel.orderer_resolution() {
            OrdererResolution::DiscoveryFailed(reason) => assert!(reason.contains("access denied")),
            other => panic!("unexpected resolution: {other:?}"),
        }
        assert_eq!(channel.orderer().unwrap().addresses(), vec!["orderer0:7050"]);
    }
}
