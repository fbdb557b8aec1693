#![forbid(unsafe_code)]

//! PEM armoring and certificate parsing.

use der::{Decode, DecodePem, Encode};
use vidimera_core::{Error, Result};
use x509_cert::Certificate;

/// Wrap a bare base64 certificate body in PEM armor, 64 columns per line.
///
/// The container carries certificates as unwrapped base64 text inside XML
/// elements; this restores the armor so they can be fed to standard PEM
/// consumers.
pub fn armor_certificate(b64: &str) -> String {
    let clean: String = b64.chars().filter(|c| !c.is_whitespace()).collect();
    let mut out = String::with_capacity(clean.len() + 64);
    out.push_str("-----BEGIN CERTIFICATE-----\n");
    for chunk in clean.as_bytes().chunks(64) {
        // base64 text is always ASCII
        out.push_str(std::str::from_utf8(chunk).unwrap_or(""));
        out.push('\n');
    }
    out.push_str("-----END CERTIFICATE-----\n");
    out
}

/// Parse a PEM certificate, returning the parsed form and its DER bytes.
pub fn cert_from_pem(pem: &str) -> Result<(Certificate, Vec<u8>)> {
    let cert = Certificate::from_pem(pem.as_bytes())
        .map_err(|e| Error::Pem(format!("certificate: {e}")))?;
    let der = cert
        .to_der()
        .map_err(|e| Error::Certificate(format!("failed to re-encode certificate: {e}")))?;
    Ok((cert, der))
}

/// Parse a DER certificate.
pub fn cert_from_der(der: &[u8]) -> Result<Certificate> {
    Certificate::from_der(der)
        .map_err(|e| Error::Certificate(format!("failed to parse certificate: {e}")))
}
