#![forbid(unsafe_code)]

//! Cryptographic primitives for completion-response verification: one-shot
//! digests and signature verification over raw byte regions and DER
//! structures.
//!
//! Verification functions return `Ok(false)` for a well-formed but
//! non-matching signature and reserve `Err` for malformed keys, signatures
//! or unsupported algorithms, so callers can map a mismatch to the right
//! rejection kind for their stage.

pub mod digest;
pub mod pkix;
