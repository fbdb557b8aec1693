#![forbid(unsafe_code)]

//! Vidimera — Relying-Party completion-response verification for the
//! BankID e-identification scheme.
//!
//! Given the completion data a collect poll returns for a finished order
//! and the scheme's pinned root certificate, [`Verifier::verify`] checks
//! the order's cryptography end-to-end: the signature container's
//! digests, the message signature, the embedded OCSP response with its
//! session-binding nonce, and both certificate chains.
//!
//! ```no_run
//! use vidimera::{CompletionData, Verifier, VerifierConfig};
//!
//! # fn main() -> vidimera::Result<()> {
//! # let root_pem = String::new();
//! # let completion: CompletionData = todo!();
//! let verifier = Verifier::new(VerifierConfig::new(root_pem))?;
//! let verification = verifier.verify(&completion)?;
//! println!("verified at {}", verification.ocsp_produced_at);
//! # Ok(())
//! # }
//! ```
//!
//! Transport (auth/sign/collect calls) is out of scope; this library
//! consumes payloads a polling client has already collected.

pub use vidimera_certs as certs;
pub use vidimera_core as core;
pub use vidimera_crypto as crypto;
pub use vidimera_ocsp as ocsp;
pub use vidimera_xml as xml;

pub mod model;
pub mod verify;

pub use model::{CollectResponse, CollectStatus, CompletionData, Device, StepUp, User};
pub use verify::{Verification, Verifier, VerifierConfig};
pub use vidimera_core::{CertRole, Error, Result, Stage};
