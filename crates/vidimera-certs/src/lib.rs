#![forbid(unsafe_code)]

//! Certificate handling for completion-response verification: PEM
//! armoring/parsing, the trust store, and chain-of-trust validation
//! against a pinned root.

pub mod chain;
pub mod pem;
pub mod store;

pub use chain::{validate_chain, ValidationOptions};
pub use store::TrustStore;
