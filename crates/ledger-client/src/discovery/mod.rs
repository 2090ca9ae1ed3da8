//! # Discovery Backends
//!
//! | Backend | Source | `local_peers` |
//! |---------|--------|---------------|
//! | [`LocalDiscoveryProvider`] | `discovery.local` in config | unsupported |
//! | [`GossipDiscoveryProvider`] | discovery service via a bootstrap peer | yes |
//!
//! Both pair discovered addresses with TLS settings from the
//! [`TlsCertsMapper`].

pub mod gossip;
pub mod local;
pub mod tls_mapper;

pub use gossip::{GossipDiscoveryProvider, GrpcDiscoveryTransport, IdentitySigner};
pub use local::LocalDiscoveryProvider;
pub use tls_mapper::TlsCertsMapper;
