#![forbid(unsafe_code)]

//! Error taxonomy for completion-response verification.
//!
//! One variant per pipeline rejection kind, so callers can match narrowly
//! (was it a nonce replay? an untrusted chain?) or broadly via [`Error`]
//! itself. Security rejections also report the pipeline [`Stage`] that
//! produced them.

/// Pipeline stage that produced a rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Parsing the signature container document.
    ContainerParse,
    /// Recomputing and comparing the declared digests.
    DigestCheck,
    /// Verifying the message signature against the user certificate.
    SignatureCheck,
    /// Parsing and verifying the OCSP response.
    OcspCheck,
    /// Validating certificate chains against the pinned root.
    ChainCheck,
}

/// Which certificate a chain-of-trust failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertRole {
    /// The end user's session certificate (first in the container).
    User,
    /// The certificate embedded in the OCSP response.
    OcspResponder,
}

impl std::fmt::Display for CertRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CertRole::User => write!(f, "user certificate"),
            CertRole::OcspResponder => write!(f, "OCSP responder certificate"),
        }
    }
}

/// Errors produced by the Vidimera verification library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed signature document: {0}")]
    MalformedSignature(String),

    #[error("digest mismatch for {region}: computed {computed}, declared {declared}")]
    DigestMismatch {
        region: &'static str,
        computed: String,
        declared: String,
    },

    #[error("message signature verification failed: {0}")]
    InvalidSignature(String),

    #[error("malformed OCSP response: {0}")]
    MalformedOcsp(String),

    #[error("OCSP response status was not successful: {0}")]
    OcspNotSuccessful(String),

    #[error("OCSP response signature verification failed: {0}")]
    InvalidOcspSignature(String),

    #[error("OCSP nonce does not bind this session: computed {computed}, presented {presented}")]
    NonceMismatch { computed: String, presented: String },

    #[error("{role} chain could not be verified: {reason}")]
    CertificateChain { role: CertRole, reason: String },

    #[error("base64 decode error: {0}")]
    Base64(String),

    #[error("certificate error: {0}")]
    Certificate(String),

    #[error("PEM error: {0}")]
    Pem(String),

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("time error: {0}")]
    Time(String),
}

impl Error {
    /// The pipeline stage a security rejection belongs to.
    ///
    /// Ambient errors (base64, PEM, time) return `None`; they indicate a
    /// corrupt input or misconfiguration rather than a stage verdict.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::MalformedSignature(_) => Some(Stage::ContainerParse),
            Error::DigestMismatch { .. } => Some(Stage::DigestCheck),
            Error::InvalidSignature(_) => Some(Stage::SignatureCheck),
            Error::MalformedOcsp(_)
            | Error::OcspNotSuccessful(_)
            | Error::InvalidOcspSignature(_)
            | Error::NonceMismatch { .. } => Some(Stage::OcspCheck),
            Error::CertificateChain { .. } => Some(Stage::ChainCheck),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
