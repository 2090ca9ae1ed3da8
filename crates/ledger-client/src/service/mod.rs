//! # Service Layer
//!
//! The construction cascade ([`builder`]), the client core with its channel
//! and chaincode caches ([`core`]), and the handles it hands out.

pub mod builder;
pub mod chaincode;
pub mod channel;
pub mod core;
pub mod system;

pub use builder::{CoreBuilder, CoreOption};
pub use chaincode::ChaincodePackage;
pub use channel::{Channel, OrdererResolution};
pub use self::core::Core;
pub use system::{Lifecycle, Lscc, SystemCc, SystemChaincode, CSCC, LIFECYCLE, LSCC, QSCC};
