//! Unary gRPC transport for discovery requests.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tracing::debug;

use super::proto::{Response, SignedRequest};
use crate::domain::{Connection, DiscoveryError};
use crate::ports::DiscoveryTransport;

/// Method path of the discovery service.
pub const DISCOVER_PATH: &str = "/discovery.Discovery/Discover";

/// Sends discovery requests over the bootstrap peer connection.
#[derive(Clone, Debug)]
pub struct GrpcDiscoveryTransport {
    connection: Connection,
}

impl GrpcDiscoveryTransport {
    /// Transport over `connection`.
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    /// Bootstrap connection.
    pub fn connection(&self) -> &Connection {
        &self.connection
    }
}

#[async_trait]
impl DiscoveryTransport for GrpcDiscoveryTransport {
    async fn discover(
        &self,
        ctx: &CancellationToken,
        request: SignedRequest,
    ) -> Result<Response, DiscoveryError> {
        let channel = self.connection.grpc_channel().cloned().ok_or_else(|| {
            DiscoveryError::Transport("bootstrap connection has no grpc channel".to_string())
        })?;
        let mut grpc = tonic::client::Grpc::new(channel);

        let call = async move {
            grpc.ready()
                .await
                .map_err(|e| DiscoveryError::Transport(e.to_string()))?;
            let codec = ProstCodec::<SignedRequest, Response>::default();
            let response = grpc
                .unary(
                    tonic::Request::new(request),
                    PathAndQuery::from_static(DISCOVER_PATH),
                    codec,
                )
                .await
                .map_err(|status| DiscoveryError::Transport(status.message().to_string()))?;
            Ok(response.into_inner())
        };

        debug!(targets = ?self.connection.addresses(), "discovery request");
        tokio::select! {
            _ = ctx.cancelled() => Err(DiscoveryError::Cancelled),
            result = call => result,
        }
    }
}
