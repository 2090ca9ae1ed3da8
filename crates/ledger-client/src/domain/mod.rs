//! Domain Layer - value objects, handles and errors, no I/O

pub mod discovery;
pub mod endpoint;
pub mod errors;
pub mod handles;

pub use discovery::*;
pub use endpoint::*;
pub use errors::*;
pub use handles::*;
