//! # Adapters
//!
//! Default implementations of the outbound ports.
//!
//! | Port | Adapter |
//! |------|---------|
//! | `ConnectionBuilder` | [`GrpcConnectionBuilder`] |
//! | `OrdererConnector` | [`GrpcOrdererConnector`] |
//! | `PeerPool` | [`MemoryPeerPool`] |
//! | `Fetcher` | [`LocalFetcher`] |

pub mod connection;
pub mod fetcher;
pub mod orderer;
pub mod peer_pool;

pub use connection::GrpcConnectionBuilder;
pub use fetcher::{LocalFetcher, SourceLayout};
pub use orderer::GrpcOrdererConnector;
pub use peer_pool::MemoryPeerPool;
