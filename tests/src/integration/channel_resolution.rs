//! # Channel Orderer Resolution
//!
//! How a channel handle picks its orderer, and how the channel cache behaves
//! under repeated and concurrent access.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use ledger_client::testing::{
        capture_logs, endpoint, orderer, test_identity, FailingOrdererConnector, MockDiscoveryProvider,
        RecordingConnectionBuilder,
    };
    use ledger_client::{
        ChaincodeDiscovery, ChannelDiscovery, ClientConfig, Core, CoreOption, DiscoveryError,
        OrdererResolution,
    };
    use tokio_util::sync::CancellationToken;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    struct Fixture {
        core: Core,
        discovery: Arc<MockDiscoveryProvider>,
        connections: Arc<RecordingConnectionBuilder>,
    }

    async fn fixture(discovery: MockDiscoveryProvider) -> Fixture {
        fixture_with(discovery, Vec::new()).await
    }

    async fn fixture_with(discovery: MockDiscoveryProvider, extra: Vec<CoreOption>) -> Fixture {
        let discovery = Arc::new(discovery);
        let connections = Arc::new(RecordingConnectionBuilder::new());
        let mut options = vec![
            CoreOption::Config(ClientConfig::for_testing()),
            CoreOption::ConnectionBuilder(connections.clone()),
            CoreOption::Discovery(discovery.clone()),
        ];
        options.extend(extra);

        let core = Core::new("Org1MSP", Some(test_identity("Org1MSP")), options)
            .await
            .unwrap();
        Fixture {
            core,
            discovery,
            connections,
        }
    }

    fn two_orderer_orgs() -> Vec<ledger_client::HostEndpoint> {
        vec![
            endpoint("OrdererOrg1MSP", &["orderer1:7050"]),
            endpoint("OrdererOrg2MSP", &["orderer2:7050"]),
        ]
    }

    // =============================================================================
    // RESOLUTION OUTCOMES
    // =============================================================================

    #[tokio::test]
    async fn test_discovered_orderers_override_default() {
        let f = fixture(MockDiscoveryProvider::new().with_channel("mychannel", two_orderer_orgs()))
            .await;

        let channel = f.core.channel("mychannel").await;

        assert_eq!(channel.orderer_resolution(), &OrdererResolution::Discovered);
        assert_eq!(
            channel.orderer().unwrap().addresses(),
            vec!["orderer1:7050", "orderer2:7050"]
        );
        assert_eq!(
            f.connections.builds().last().unwrap(),
            &vec!["orderer1:7050".to_string(), "orderer2:7050".to_string()]
        );
        assert_eq!(channel.name(), "mychannel");
        assert_eq!(channel.msp_id(), "Org1MSP");
    }

    #[tokio::test]
    async fn test_no_channel_orderers_uses_default() {
        let f = fixture(MockDiscoveryProvider::new().with_channel("mychannel", Vec::new())).await;
        let builds_before = f.connections.build_count();

        let channel = f.core.channel("mychannel").await;

        assert_eq!(channel.orderer_resolution(), &OrdererResolution::NoChannelOrderers);
        assert!(!channel.orderer_resolution().is_degraded());
        assert!(Arc::ptr_eq(
            channel.orderer().unwrap(),
            &f.core.default_orderer().unwrap()
        ));
        assert_eq!(f.connections.build_count(), builds_before);
    }

    #[tokio::test]
    async fn test_discovery_failure_uses_default() {
        let f = fixture(MockDiscoveryProvider::new().with_failing_channel("mychannel")).await;

        let channel = f.core.channel("mychannel").await;

        assert!(matches!(
            channel.orderer_resolution(),
            OrdererResolution::DiscoveryFailed(_)
        ));
        assert!(channel.orderer_resolution().is_degraded());
        assert_eq!(channel.orderer().unwrap().addresses(), vec!["orderer0:7050"]);
    }

    #[tokio::test]
    async fn test_unknown_channel_uses_default() {
        let f = fixture(MockDiscoveryProvider::new()).await;

        let channel = f.core.channel("unknown").await;

        assert!(matches!(
            channel.orderer_resolution(),
            OrdererResolution::DiscoveryFailed(_)
        ));
        assert_eq!(channel.orderer().unwrap().addresses(), vec!["orderer0:7050"]);
    }

    #[tokio::test]
    async fn test_orderer_connection_failure_uses_default() {
        let f = fixture(MockDiscoveryProvider::new().with_channel("mychannel", two_orderer_orgs()))
            .await;
        f.connections.fail_host("orderer2:7050");

        let channel = f.core.channel("mychannel").await;

        assert!(matches!(
            channel.orderer_resolution(),
            OrdererResolution::ConnectionFailed(_)
        ));
        assert_eq!(channel.orderer().unwrap().addresses(), vec!["orderer0:7050"]);
    }

    #[tokio::test]
    async fn test_orderer_creation_failure_uses_default() {
        let f = fixture_with(
            MockDiscoveryProvider::new().with_channel("mychannel", two_orderer_orgs()),
            vec![
                CoreOption::Orderer(orderer(&["orderer0:7050"])),
                CoreOption::OrdererConnector(Arc::new(FailingOrdererConnector)),
            ],
        )
        .await;

        let channel = f.core.channel("mychannel").await;

        assert!(matches!(
            channel.orderer_resolution(),
            OrdererResolution::ConnectionFailed(_)
        ));
        assert_eq!(channel.orderer().unwrap().addresses(), vec!["orderer0:7050"]);
    }

    #[tokio::test]
    async fn test_without_discovery_provider() {
        let core = Core::new(
            "Org1MSP",
            Some(test_identity("Org1MSP")),
            vec![
                CoreOption::Config(ClientConfig::for_testing()),
                CoreOption::ConnectionBuilder(Arc::new(RecordingConnectionBuilder::new())),
            ],
        )
        .await
        .unwrap();

        let channel = core.channel("mychannel").await;

        assert_eq!(
            channel.orderer_resolution(),
            &OrdererResolution::DiscoveryUnavailable
        );
        assert!(channel.orderer().is_some());
        let err = channel
            .discover_chaincode(&CancellationToken::new(), "basic")
            .await
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::Unavailable));
    }

    #[tokio::test]
    async fn test_without_discovery_provider_logs_fallback() {
        let (logs, _guard) = capture_logs();
        let core = Core::new(
            "Org1MSP",
            Some(test_identity("Org1MSP")),
            vec![
                CoreOption::Config(ClientConfig::for_testing()),
                CoreOption::ConnectionBuilder(Arc::new(RecordingConnectionBuilder::new())),
            ],
        )
        .await
        .unwrap();

        let channel = core.channel("mychannel").await;

        assert_eq!(
            channel.orderer_resolution(),
            &OrdererResolution::DiscoveryUnavailable
        );
        let warnings = logs.lines_with("discovery provider not configured");
        assert_eq!(warnings.len(), 1, "captured: {}", logs.contents());
        assert!(warnings[0].contains("WARN"));
        assert!(warnings[0].contains("mychannel"));
    }

    #[tokio::test]
    async fn test_no_default_and_no_discovery_leaves_channel_without_orderer() {
        let mut config = ClientConfig::for_testing();
        config.orderers.clear();
        let core = Core::new(
            "Org1MSP",
            Some(test_identity("Org1MSP")),
            vec![
                CoreOption::Config(config),
                CoreOption::ConnectionBuilder(Arc::new(RecordingConnectionBuilder::new())),
            ],
        )
        .await
        .unwrap();

        assert!(core.channel("mychannel").await.orderer().is_none());
    }

    // =============================================================================
    // CACHING
    // =============================================================================

    #[tokio::test]
    async fn test_channel_resolved_once() {
        let f = fixture(MockDiscoveryProvider::new().with_channel("mychannel", two_orderer_orgs()))
            .await;

        let first = f.core.channel("mychannel").await;
        let second = f.core.channel("mychannel").await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(f.discovery.channel_calls("mychannel"), 1);
    }

    #[tokio::test]
    async fn test_fallback_entry_is_not_retried() {
        let f = fixture(MockDiscoveryProvider::new().with_failing_channel("mychannel")).await;

        let first = f.core.channel("mychannel").await;
        let second = f.core.channel("mychannel").await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(f.discovery.channel_calls("mychannel"), 1);
    }

    #[tokio::test]
    async fn test_channels_resolved_independently() {
        let f = fixture(
            MockDiscoveryProvider::new()
                .with_channel("a", two_orderer_orgs())
                .with_channel("b", Vec::new()),
        )
        .await;

        let a = f.core.channel("a").await;
        let b = f.core.channel("b").await;

        assert!(a.orderer_resolution().is_discovered());
        assert_eq!(b.orderer_resolution(), &OrdererResolution::NoChannelOrderers);
        assert_eq!(f.discovery.total_channel_calls(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_access_resolves_once() {
        let f = fixture(
            MockDiscoveryProvider::new()
                .with_channel("mychannel", two_orderer_orgs())
                .with_delay(Duration::from_millis(50)),
        )
        .await;
        let core = Arc::new(f.core);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let core = core.clone();
                tokio::spawn(async move { core.channel("mychannel").await })
            })
            .collect();

        let mut channels = Vec::new();
        for handle in handles {
            channels.push(handle.await.unwrap());
        }

        assert!(channels.iter().all(|c| Arc::ptr_eq(c, &channels[0])));
        assert_eq!(f.discovery.channel_calls("mychannel"), 1);
    }

    // =============================================================================
    // CANCELLATION
    // =============================================================================

    #[tokio::test]
    async fn test_cancelled_context_falls_back() {
        let f = fixture(
            MockDiscoveryProvider::new()
                .with_channel("mychannel", two_orderer_orgs())
                .with_delay(Duration::from_secs(30)),
        )
        .await;

        let ctx = CancellationToken::new();
        let cancel = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel.cancel();
        });

        let channel = f.core.channel_with(&ctx, "mychannel").await;

        assert!(matches!(
            channel.orderer_resolution(),
            OrdererResolution::DiscoveryFailed(_)
        ));
        assert_eq!(channel.orderer().unwrap().addresses(), vec!["orderer0:7050"]);
    }

    #[tokio::test]
    async fn test_core_context_bounds_channel_resolution() {
        let root = CancellationToken::new();
        let f = fixture_with(
            MockDiscoveryProvider::new().with_channel("mychannel", two_orderer_orgs()),
            vec![CoreOption::Context(root.clone())],
        )
        .await;
        root.cancel();

        let channel = f.core.channel("mychannel").await;

        assert!(!channel.orderer_resolution().is_discovered());
        assert!(f.core.context().is_cancelled());
    }

    // =============================================================================
    // CHANNEL OPERATIONS
    // =============================================================================

    #[tokio::test]
    async fn test_channel_chaincode_discovery_and_endorsers() {
        let discovery = MockDiscoveryProvider::new()
            .with_channel("mychannel", Vec::new())
            .with_chaincode(ChaincodeDiscovery {
                channel: ChannelDiscovery {
                    channel_name: "mychannel".to_string(),
                    orderers: Vec::new(),
                },
                chaincode_name: "basic".to_string(),
                chaincode_version: "1.0".to_string(),
                endorsers: vec![endpoint("Org2MSP", &["peer0.org2:7051"])],
            });
        let f = fixture(discovery).await;

        let channel = f.core.channel("mychannel").await;
        let chaincode = channel
            .discover_chaincode(&CancellationToken::new(), "basic")
            .await
            .unwrap();

        assert_eq!(chaincode.chaincode_version(), "1.0");
        assert_eq!(chaincode.endorsers()[0].msp_id, "Org2MSP");
        assert_eq!(channel.endorsers("Org2MSP")[0].address(), "peer0.org2:7051");
        assert!(channel.discovery_provider().is_some());
    }
}
