//! Cross-module flows driven through `Core` with mock ports.

pub mod chaincode_cache;
pub mod channel_resolution;
pub mod construction;
pub mod gossip;
