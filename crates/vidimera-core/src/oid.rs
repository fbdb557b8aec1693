#![forbid(unsafe_code)]

//! Algorithm and extension OIDs the verifier dispatches on.

// ── Signature algorithms ─────────────────────────────────────────────

pub const SHA1_WITH_RSA: &str = "1.2.840.113549.1.1.5";
pub const SHA224_WITH_RSA: &str = "1.2.840.113549.1.1.14";
pub const SHA256_WITH_RSA: &str = "1.2.840.113549.1.1.11";
pub const SHA384_WITH_RSA: &str = "1.2.840.113549.1.1.12";
pub const SHA512_WITH_RSA: &str = "1.2.840.113549.1.1.13";

pub const ECDSA_WITH_SHA256: &str = "1.2.840.10045.4.3.2";
pub const ECDSA_WITH_SHA384: &str = "1.2.840.10045.4.3.3";

// ── Public key algorithms ────────────────────────────────────────────

pub const RSA_ENCRYPTION: &str = "1.2.840.113549.1.1.1";
pub const ID_EC_PUBLIC_KEY: &str = "1.2.840.10045.2.1";

/// NIST P-256 named curve.
pub const SECP256R1: &str = "1.2.840.10045.3.1.7";

// ── OCSP ─────────────────────────────────────────────────────────────

/// id-pkix-ocsp-basic: the response type carried in `ResponseBytes`.
pub const ID_PKIX_OCSP_BASIC: &str = "1.3.6.1.5.5.7.48.1.1";

/// id-pkix-ocsp-nonce: the replay-binding nonce extension.
pub const ID_PKIX_OCSP_NONCE: &str = "1.3.6.1.5.5.7.48.1.2";

// ── Certificate extensions ───────────────────────────────────────────

pub const BASIC_CONSTRAINTS: &str = "2.5.29.19";
