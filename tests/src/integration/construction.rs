//! # Core Construction
//!
//! Option ordering, the construction cascade and its fail-fast errors.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ledger_client::adapters::MemoryPeerPool;
    use ledger_client::testing::{
        endpoint, orderer, test_identity, MockDiscoveryProvider, RecordingConnectionBuilder,
    };
    use ledger_client::{
        ClientConfig, ConfigError, ConnectionConfig, Core, CoreError, CoreOption, MspConfig,
        PeerPool, PoolError,
    };
    use tokio_util::sync::CancellationToken;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn builder() -> Arc<RecordingConnectionBuilder> {
        Arc::new(RecordingConnectionBuilder::new())
    }

    async fn build(
        config: ClientConfig,
        connections: Arc<RecordingConnectionBuilder>,
    ) -> Result<Core, CoreError> {
        Core::new(
            "Org1MSP",
            Some(test_identity("Org1MSP")),
            vec![
                CoreOption::Config(config),
                CoreOption::ConnectionBuilder(connections),
            ],
        )
        .await
    }

    // =============================================================================
    // CASCADE DEFAULTS
    // =============================================================================

    #[tokio::test]
    async fn test_two_orgs_one_connection_per_endorser() {
        let connections = builder();
        let core = build(ClientConfig::for_testing(), connections.clone())
            .await
            .unwrap();

        assert_eq!(
            connections.builds(),
            vec![
                vec!["peer0.org1:7051".to_string()],
                vec!["peer0.org2:7051".to_string()],
                vec!["orderer0:7050".to_string()],
            ]
        );
        assert_eq!(core.peer_pool().msp_ids(), vec!["Org1MSP", "Org2MSP"]);
        assert_eq!(core.peer_pool().peers("Org2MSP")[0].address(), "peer0.org2:7051");
    }

    #[tokio::test]
    async fn test_default_suite_and_identity() {
        let core = build(ClientConfig::for_testing(), builder()).await.unwrap();

        assert_eq!(core.msp_id(), "Org1MSP");
        assert_eq!(core.crypto_suite().name(), "ecdsa");
        assert_eq!(core.current_identity().msp_id(), "Org1MSP");
        assert!(!core.fabric_v2());
        assert!(core.config().is_some());
    }

    #[tokio::test]
    async fn test_default_orderer_covers_all_configured_orderers() {
        let mut config = ClientConfig::for_testing();
        config.orderers.push(ConnectionConfig::new("orderer1:7050"));

        let core = build(config, builder()).await.unwrap();
        let orderer = core.default_orderer().unwrap();
        assert_eq!(orderer.addresses(), vec!["orderer0:7050", "orderer1:7050"]);
    }

    #[tokio::test]
    async fn test_no_orderers_no_default_orderer() {
        let mut config = ClientConfig::for_testing();
        config.orderers.clear();

        let core = build(config, builder()).await.unwrap();
        assert!(core.default_orderer().is_none());
    }

    #[tokio::test]
    async fn test_empty_discovery_type_disables_discovery() {
        let core = build(ClientConfig::for_testing(), builder()).await.unwrap();
        assert!(core.discovery_provider().is_none());
    }

    #[tokio::test]
    async fn test_local_discovery_from_config() {
        let config = ClientConfig::from_toml_str(
            r#"
            [[msp]]
            name = "Org1MSP"
            endorsers = [{ host = "peer0.org1:7051" }]

            [discovery]
            type = "local"

            [[discovery.local.channels]]
            name = "mychannel"
            orderers = [{ msp_id = "OrdererMSP", hosts = ["orderer1:7050"] }]
            "#,
        )
        .unwrap();

        let core = build(config, builder()).await.unwrap();
        let discovery = core.discovery_provider().unwrap();
        let channel = discovery
            .channel(&CancellationToken::new(), "mychannel")
            .await
            .unwrap();
        assert_eq!(channel.orderers()[0].host_addresses[0].address, "orderer1:7050");
    }

    // =============================================================================
    // OPTION OVERRIDES
    // =============================================================================

    #[tokio::test]
    async fn test_supplied_components_skip_config() {
        let pool: Arc<dyn PeerPool> = Arc::new(MemoryPeerPool::new());
        let connections = builder();

        let core = Core::new(
            "Org1MSP",
            Some(test_identity("Org1MSP")),
            vec![
                CoreOption::CryptoSuite(Arc::new(shared_crypto::EcdsaSuite::default())),
                CoreOption::PeerPool(pool.clone()),
                CoreOption::Orderer(orderer(&["orderer9:7050"])),
                CoreOption::Discovery(Arc::new(MockDiscoveryProvider::new())),
                CoreOption::ConnectionBuilder(connections.clone()),
            ],
        )
        .await
        .unwrap();

        assert!(Arc::ptr_eq(&core.peer_pool(), &pool));
        assert_eq!(core.default_orderer().unwrap().addresses(), vec!["orderer9:7050"]);
        assert!(core.discovery_provider().is_some());
        assert_eq!(connections.build_count(), 0);
    }

    #[tokio::test]
    async fn test_later_option_wins() {
        let mut other = ClientConfig::for_testing();
        other.msp.truncate(1);

        let core = Core::new(
            "Org1MSP",
            Some(test_identity("Org1MSP")),
            vec![
                CoreOption::Config(ClientConfig::for_testing()),
                CoreOption::Config(other),
                CoreOption::ConnectionBuilder(builder()),
            ],
        )
        .await
        .unwrap();

        assert_eq!(core.peer_pool().msp_ids(), vec!["Org1MSP"]);
    }

    #[tokio::test]
    async fn test_builder_front_end() {
        let core = Core::builder("Org1MSP")
            .identity(test_identity("Org1MSP"))
            .config(ClientConfig::for_testing())
            .option(CoreOption::ConnectionBuilder(builder()))
            .fabric_v2(true)
            .build()
            .await
            .unwrap();

        assert!(core.fabric_v2());
        assert_eq!(core.chaincode_lifecycle().name(), "_lifecycle");
        assert_eq!(core.system().qscc().name(), "qscc");
    }

    #[tokio::test]
    async fn test_config_file_option() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("client.toml");
        std::fs::write(
            &path,
            r#"
            [crypto]
            type = "ecdsa"

            [[msp]]
            name = "Org1MSP"
            endorsers = [{ host = "peer0.org1:7051" }]
            "#,
        )?;

        let core = Core::builder("Org1MSP")
            .identity(test_identity("Org1MSP"))
            .config_file(&path)
            .option(CoreOption::ConnectionBuilder(builder()))
            .build()
            .await?;

        assert_eq!(core.peer_pool().msp_ids(), vec!["Org1MSP"]);
        assert!(core.default_orderer().is_none());
        Ok(())
    }

    // =============================================================================
    // FAIL-FAST ERRORS
    // =============================================================================

    #[tokio::test]
    async fn test_missing_config_file_reports_option_index() {
        let err = Core::new(
            "Org1MSP",
            Some(test_identity("Org1MSP")),
            vec![
                CoreOption::FabricV2(true),
                CoreOption::ConfigFile("/nonexistent/client.toml".into()),
            ],
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CoreError::Option { index: 1, .. }));
        assert!(matches!(err.root(), CoreError::Config(ConfigError::Io { .. })));
    }

    #[tokio::test]
    async fn test_missing_identity() {
        let err = Core::new(
            "Org1MSP",
            None,
            vec![
                CoreOption::Config(ClientConfig::for_testing()),
                CoreOption::ConnectionBuilder(builder()),
            ],
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CoreError::MissingIdentity));
        assert_eq!(err.to_string(), "identity wasn't provided");
    }

    #[tokio::test]
    async fn test_no_config_is_empty_config() {
        let err = Core::new("Org1MSP", Some(test_identity("Org1MSP")), Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::EmptyConfig));
    }

    #[tokio::test]
    async fn test_unsupported_crypto_suite_lists_available() {
        let mut config = ClientConfig::for_testing();
        config.crypto.suite_type = "sm2".to_string();

        let err = build(config, builder()).await.unwrap_err();
        match err {
            CoreError::UnsupportedCryptoSuite { name, available } => {
                assert_eq!(name, "sm2");
                assert_eq!(available, "ecdsa, ed25519, secp256k1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_endorser_names_msp() {
        let connections = builder();
        connections.fail_host("peer0.org2:7051");

        let err = build(ClientConfig::for_testing(), connections).await.unwrap_err();
        match &err {
            CoreError::PeerConnection { msp_id, .. } => assert_eq!(msp_id, "Org2MSP"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(err
            .to_string()
            .starts_with("failed to initialize endorsers for MSP: Org2MSP"));
    }

    #[tokio::test]
    async fn test_empty_msp_name_rejected_by_pool() {
        let mut config = ClientConfig::for_testing();
        config.msp.push(MspConfig {
            name: String::new(),
            endorsers: vec![ConnectionConfig::new("peer0.org3:7051")],
        });

        let err = build(config, builder()).await.unwrap_err();
        assert!(matches!(err, CoreError::PeerPool { .. }));
    }

    #[tokio::test]
    async fn test_duplicate_endorser_aborts_construction() {
        let mut config = ClientConfig::for_testing();
        config.msp[0]
            .endorsers
            .push(ConnectionConfig::new("peer0.org1:7051"));

        let err = build(config, builder()).await.unwrap_err();
        match err {
            CoreError::PeerPool { msp_id, source } => {
                assert_eq!(msp_id, "Org1MSP");
                assert!(matches!(source, PoolError::PeerAlreadyExists { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_discovery_type() {
        let mut config = ClientConfig::for_testing();
        config.discovery.discovery_type = "dns".to_string();

        let err = build(config, builder()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown discovery type=dns. available: local, gossip"
        );
    }

    #[tokio::test]
    async fn test_gossip_requires_connection() {
        let mut config = ClientConfig::for_testing();
        config.discovery.discovery_type = "gossip".to_string();

        let err = build(config, builder()).await.unwrap_err();
        assert!(matches!(err, CoreError::MissingDiscoveryConnection));
    }

    #[tokio::test]
    async fn test_unreachable_orderer() {
        let connections = builder();
        connections.fail_host("orderer0:7050");

        let err = build(ClientConfig::for_testing(), connections).await.unwrap_err();
        assert!(matches!(err, CoreError::OrdererConnection(_)));
    }

    #[tokio::test]
    async fn test_cancelled_context_fails_connections() {
        let ctx = CancellationToken::new();
        ctx.cancel();

        let err = Core::new(
            "Org1MSP",
            Some(test_identity("Org1MSP")),
            vec![
                CoreOption::Config(ClientConfig::for_testing()),
                CoreOption::ConnectionBuilder(builder()),
                CoreOption::Context(ctx),
            ],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CoreError::PeerConnection { .. }));
    }

    #[test]
    fn test_endpoint_fixture() {
        let endpoint = endpoint("OrdererMSP", &["o1:7050", "o2:7050"]);
        assert_eq!(endpoint.host_addresses.len(), 2);
    }
}
