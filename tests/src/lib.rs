//! # Ledger Client Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── construction.rs        # Option ordering, cascade, fail-fast errors
//!     ├── channel_resolution.rs  # Orderer fallbacks, caching, concurrency
//!     ├── chaincode_cache.rs     # Chaincode handles and source fetching
//!     └── gossip.rs              # Gossip discovery through a scripted transport
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ledger-client-tests
//! cargo test -p ledger-client-tests integration::gossip::
//! ```

#![allow(dead_code)]

pub mod integration;
