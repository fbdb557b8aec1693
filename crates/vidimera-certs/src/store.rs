#![forbid(unsafe_code)]

//! The trust store used by chain validation.
//!
//! Trust anchors come exclusively from the caller (the pinned root,
//! distributed out of band). Certificates found in the payload, the
//! issuing bank and root-adjacent certificates, only ever enter as
//! untrusted chain candidates, so a malicious payload cannot supply its
//! own anchor.

use vidimera_core::Result;
use x509_cert::Certificate;

use crate::pem;

/// A set of trust anchors plus untrusted intermediate candidates.
#[derive(Default)]
pub struct TrustStore {
    trusted: Vec<(Certificate, Vec<u8>)>,
    untrusted: Vec<(Certificate, Vec<u8>)>,
}

impl TrustStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a trust anchor from PEM text.
    pub fn add_trusted_pem(&mut self, pem_text: &str) -> Result<()> {
        let (cert, der) = pem::cert_from_pem(pem_text)?;
        self.trusted.push((cert, der));
        Ok(())
    }

    /// Add a trust anchor from DER bytes.
    pub fn add_trusted_der(&mut self, der: &[u8]) -> Result<()> {
        let cert = pem::cert_from_der(der)?;
        self.trusted.push((cert, der.to_vec()));
        Ok(())
    }

    /// Add an untrusted intermediate candidate from DER bytes.
    pub fn add_untrusted_der(&mut self, der: &[u8]) -> Result<()> {
        let cert = pem::cert_from_der(der)?;
        self.untrusted.push((cert, der.to_vec()));
        Ok(())
    }

    pub fn trusted(&self) -> &[(Certificate, Vec<u8>)] {
        &self.trusted
    }

    pub fn untrusted(&self) -> &[(Certificate, Vec<u8>)] {
        &self.untrusted
    }

    pub fn is_empty(&self) -> bool {
        self.trusted.is_empty()
    }
}
