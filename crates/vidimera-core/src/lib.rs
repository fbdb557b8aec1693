#![forbid(unsafe_code)]

//! Core definitions shared across the Vidimera workspace: the error
//! taxonomy, XML namespace/element constants for the BankID signature
//! container, and the algorithm OIDs the verifier dispatches on.

pub mod error;
pub mod ns;
pub mod oid;

pub use error::{CertRole, Error, Result, Stage};
