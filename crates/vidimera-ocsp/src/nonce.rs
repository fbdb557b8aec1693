#![forbid(unsafe_code)]

//! Replay-binding nonce checks.
//!
//! The scheme binds the OCSP response to the signing session by embedding
//! a nonce whose leading bytes are the SHA-1 digest of the completion
//! payload's `signature` field exactly as received (the base64 text, not
//! the decoded document). A response replayed from an unrelated query
//! carries a different nonce and must be rejected.

use der::asn1::{ObjectIdentifier, OctetString};
use der::Decode;
use vidimera_core::{oid, Error, Result};
use vidimera_crypto::digest;
use x509_cert::ext::Extensions;

/// Hex SHA-1 of the signature blob as received; the value the nonce must
/// start with (or equal).
pub fn expected_nonce_hex(signature_b64: &str) -> String {
    digest::sha1_hex(signature_b64.as_bytes())
}

/// Extract the nonce extension's value from the response extensions.
///
/// Per RFC 6960 the extension's `extnValue` OCTET STRING wraps a second,
/// DER-encoded OCTET STRING holding the nonce; some responders omit the
/// inner wrapping, so fall back to the raw bytes when it does not parse.
pub fn extract_nonce(extensions: Option<&Extensions>) -> Result<Vec<u8>> {
    let nonce_oid = ObjectIdentifier::new_unwrap(oid::ID_PKIX_OCSP_NONCE);
    let ext = extensions
        .into_iter()
        .flatten()
        .find(|e| e.extn_id == nonce_oid)
        .ok_or(Error::NonceMismatch {
            computed: String::new(),
            presented: "<nonce extension absent>".into(),
        })?;

    let raw = ext.extn_value.as_bytes();
    match OctetString::from_der(raw) {
        Ok(inner) => Ok(inner.as_bytes().to_vec()),
        Err(_) => Ok(raw.to_vec()),
    }
}

/// Check that `nonce` binds the given signature blob.
pub fn check_nonce(nonce: &[u8], signature_b64: &str) -> Result<()> {
    let computed = expected_nonce_hex(signature_b64);
    let presented = hex::encode(nonce);
    if presented.starts_with(&computed) {
        Ok(())
    } else {
        Err(Error::NonceMismatch {
            computed,
            presented,
        })
    }
}
