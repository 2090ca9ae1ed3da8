//! Default orderer connector.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::{Connection, Orderer, OrdererError};
use crate::ports::OrdererConnector;

/// Wraps a connection as an ordering service handle.
#[derive(Clone, Copy, Debug, Default)]
pub struct GrpcOrdererConnector;

#[async_trait]
impl OrdererConnector for GrpcOrdererConnector {
    async fn from_connection(
        &self,
        ctx: &CancellationToken,
        connection: Connection,
    ) -> Result<Arc<Orderer>, OrdererError> {
        if ctx.is_cancelled() {
            return Err(OrdererError::Cancelled);
        }
        if connection.targets().is_empty() {
            return Err(OrdererError::NoEndpoints);
        }
        Ok(Arc::new(Orderer::new(connection)))
    }
}
