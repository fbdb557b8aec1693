#![forbid(unsafe_code)]

//! OCSP response verification for completion responses.
//!
//! A completed order embeds a pre-fetched OCSP response proving the user
//! certificate was not revoked at signing time. Verification checks the
//! response status, the responder's own signature over `tbsResponseData`,
//! and the replay-binding nonce derived from the signing session, then
//! extracts the `producedAt` timestamp that becomes the accepted
//! verification time.

pub mod nonce;
pub mod response;

pub use response::{verify_ocsp_response, VerifiedOcsp};
