//! # Chaincode Handles
//!
//! Per-name caching of chaincode packages and source fetching through the
//! configured fetcher.

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use ledger_client::adapters::{LocalFetcher, SourceLayout};
    use ledger_client::testing::{
        endpoint, test_identity, MockDiscoveryProvider, RecordingConnectionBuilder,
    };
    use ledger_client::{ClientConfig, Core, CoreOption, FetchError};
    use tokio_util::sync::CancellationToken;

    async fn core_with_sources(root: &std::path::Path) -> Core {
        Core::builder("Org1MSP")
            .identity(test_identity("Org1MSP"))
            .config(ClientConfig::for_testing())
            .option(CoreOption::ConnectionBuilder(Arc::new(
                RecordingConnectionBuilder::new(),
            )))
            .option(CoreOption::Fetcher(Arc::new(LocalFetcher::with_root(
                SourceLayout::Golang,
                root,
            ))))
            .build()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_same_name_same_handle() {
        let dir = tempfile::tempdir().unwrap();
        let core = core_with_sources(dir.path()).await;

        let first = core.chaincode("basic");
        let second = core.chaincode("basic");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.name(), "basic");
    }

    #[tokio::test]
    async fn test_names_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let core = core_with_sources(dir.path()).await;

        let basic = core.chaincode("basic");
        let marbles = core.chaincode("marbles");

        assert!(!Arc::ptr_eq(&basic, &marbles));
        assert_eq!(marbles.name(), "marbles");
    }

    #[tokio::test]
    async fn test_chaincode_lookup_leaves_channel_cache_alone() {
        let discovery = Arc::new(
            MockDiscoveryProvider::new()
                .with_channel("basic", vec![endpoint("OrdererMSP", &["orderer1:7050"])]),
        );
        let core = Core::builder("Org1MSP")
            .identity(test_identity("Org1MSP"))
            .config(ClientConfig::for_testing())
            .option(CoreOption::ConnectionBuilder(Arc::new(
                RecordingConnectionBuilder::new(),
            )))
            .option(CoreOption::Discovery(discovery.clone()))
            .build()
            .await
            .unwrap();

        let package = core.chaincode("basic");
        assert_eq!(discovery.channel_calls("basic"), 0);

        let channel = core.channel("basic").await;
        assert_eq!(discovery.channel_calls("basic"), 1);
        assert!(channel.orderer_resolution().is_discovered());

        // The chaincode handle keeps the default orderer.
        assert_eq!(package.orderer().unwrap().addresses(), vec!["orderer0:7050"]);
        assert!(Arc::ptr_eq(&package, &core.chaincode("basic")));
    }

    #[tokio::test]
    async fn test_handle_bound_to_core_components() {
        let dir = tempfile::tempdir().unwrap();
        let core = core_with_sources(dir.path()).await;

        let package = core.chaincode("basic");

        assert_eq!(package.lscc().name(), "lscc");
        assert_eq!(package.identity().msp_id(), "Org1MSP");
        assert!(Arc::ptr_eq(
            package.orderer().unwrap(),
            &core.default_orderer().unwrap()
        ));
    }

    #[tokio::test]
    async fn test_fetch_reads_sources() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let repo = dir.path().join("src/example.com/basic");
        std::fs::create_dir_all(repo.join("pkg"))?;
        std::fs::write(repo.join("main.go"), b"package main")?;
        std::fs::write(repo.join("pkg/asset.go"), b"package pkg")?;

        let core = core_with_sources(dir.path()).await;
        let source = core
            .chaincode("example.com/basic")
            .fetch(&CancellationToken::new(), "1.0")
            .await?;

        assert_eq!(source.repository, "example.com/basic");
        assert_eq!(source.version, "1.0");
        let paths: Vec<PathBuf> = source.files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(
            paths,
            vec![PathBuf::from("main.go"), PathBuf::from("pkg/asset.go")]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_missing_repository() {
        let dir = tempfile::tempdir().unwrap();
        let core = core_with_sources(dir.path()).await;

        let err = core
            .chaincode("example.com/missing")
            .fetch(&CancellationToken::new(), "1.0")
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::NotFound(repo) if repo == "example.com/missing"));
    }

    #[tokio::test]
    async fn test_fetch_cancelled() {
        let dir = tempfile::tempdir().unwrap();
        let core = core_with_sources(dir.path()).await;
        let ctx = CancellationToken::new();
        ctx.cancel();

        let err = core.chaincode("basic").fetch(&ctx, "1.0").await.unwrap_err();
        assert!(matches!(err, FetchError::Cancelled));
    }
}
