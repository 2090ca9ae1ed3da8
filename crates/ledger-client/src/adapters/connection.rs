//! tonic-backed connection builder.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint, Identity};
use tracing::debug;

use crate::config::ConnectionConfig;
use crate::domain::{Connection, ConnectionError};
use crate::ports::ConnectionBuilder;

/// Builds lazily connecting gRPC channels.
///
/// One descriptor yields a plain channel; several are combined with
/// [`Channel::balance_list`]. Nothing is dialed until the first request.
#[derive(Clone, Copy, Debug, Default)]
pub struct GrpcConnectionBuilder;

impl GrpcConnectionBuilder {
    /// Create the builder.
    pub fn new() -> Self {
        Self
    }

    async fn endpoint(target: &ConnectionConfig) -> Result<Endpoint, ConnectionError> {
        let uri = if target.host.contains("://") {
            target.host.clone()
        } else if target.tls.enabled {
            format!("https://{}", target.host)
        } else {
            format!("http://{}", target.host)
        };

        let endpoint = Endpoint::from_shared(uri)
            .map_err(|e| ConnectionError::InvalidEndpoint {
                host: target.host.clone(),
                reason: e.to_string(),
            })?
            .timeout(target.timeout())
            .connect_timeout(target.connect_timeout());

        if !target.tls.enabled {
            return Ok(endpoint);
        }

        let tls = Self::client_tls(target).await?;
        endpoint.tls_config(tls).map_err(|e| ConnectionError::Tls {
            host: target.host.clone(),
            reason: e.to_string(),
        })
    }

    async fn client_tls(target: &ConnectionConfig) -> Result<ClientTlsConfig, ConnectionError> {
        let settings = &target.tls;
        let mut tls = ClientTlsConfig::new();

        if let Some(ca_path) = &settings.ca_cert_path {
            let pem = read_pem(target, ca_path).await?;
            tls = tls.ca_certificate(Certificate::from_pem(pem));
        }

        match (&settings.cert_path, &settings.key_path) {
            (Some(cert_path), Some(key_path)) => {
                let cert = read_pem(target, cert_path).await?;
                let key = read_pem(target, key_path).await?;
                tls = tls.identity(Identity::from_pem(cert, key));
            }
            (None, None) => {}
            _ => {
                return Err(ConnectionError::Tls {
                    host: target.host.clone(),
                    reason: "client certificate and key must be set together".to_string(),
                })
            }
        }

        if let Some(server_name) = &settings.server_name {
            tls = tls.domain_name(server_name.clone());
        }

        Ok(tls)
    }
}

async fn read_pem(
    target: &ConnectionConfig,
    path: &std::path::Path,
) -> Result<Vec<u8>, ConnectionError> {
    tokio::fs::read(path).await.map_err(|e| ConnectionError::Tls {
        host: target.host.clone(),
        reason: format!("{}: {e}", path.display()),
    })
}

#[async_trait]
impl ConnectionBuilder for GrpcConnectionBuilder {
    async fn build(
        &self,
        ctx: &CancellationToken,
        targets: &[ConnectionConfig],
    ) -> Result<Connection, ConnectionError> {
        if targets.is_empty() {
            return Err(ConnectionError::NoTargets);
        }

        let mut endpoints = Vec::with_capacity(targets.len());
        for target in targets {
            if ctx.is_cancelled() {
                return Err(ConnectionError::Cancelled);
            }
            endpoints.push(Self::endpoint(target).await?);
        }

        let channel = if endpoints.len() == 1 {
            endpoints.remove(0).connect_lazy()
        } else {
            Channel::balance_list(endpoints.into_iter())
        };

        debug!(targets = targets.len(), "grpc connection ready");
        Ok(Connection::new(targets.to_vec(), channel))
    }
}
