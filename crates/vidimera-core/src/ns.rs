#![forbid(unsafe_code)]

//! XML namespace and element-name constants for the BankID signature
//! container.
//!
//! The container borrows the XML-DSig vocabulary for its envelope but is
//! not a general XML-DSig document: the element set and ordering are fixed
//! by the scheme.

/// XML Digital Signature namespace (the container's envelope vocabulary).
pub const DSIG: &str = "http://www.w3.org/2000/09/xmldsig#";

/// BankID signed-data types namespace (the `bankIdSignedData` payload).
pub const BANKID_TYPES: &str = "http://www.bankid.com/signature/v1.0.0/types";

// ── Element names ────────────────────────────────────────────────────

pub mod node {
    // Envelope elements
    pub const SIGNATURE: &str = "Signature";
    pub const SIGNED_INFO: &str = "SignedInfo";
    pub const SIGNATURE_VALUE: &str = "SignatureValue";
    pub const KEY_INFO: &str = "KeyInfo";
    pub const OBJECT: &str = "Object";
    pub const REFERENCE: &str = "Reference";
    pub const DIGEST_VALUE: &str = "DigestValue";

    // KeyInfo elements
    pub const X509_DATA: &str = "X509Data";
    pub const X509_CERTIFICATE: &str = "X509Certificate";

    // bankIdSignedData elements
    pub const BANKID_SIGNED_DATA: &str = "bankIdSignedData";
    pub const USR_VISIBLE_DATA: &str = "usrVisibleData";
    pub const USR_NON_VISIBLE_DATA: &str = "usrNonVisibleData";
    pub const SRV_INFO: &str = "srvInfo";
    pub const SRV_NAME: &str = "name";
    pub const SRV_DISPLAY_NAME: &str = "displayName";
}

// ── Attribute names ──────────────────────────────────────────────────

pub mod attr {
    pub const URI: &str = "URI";
}

// ── Reference URIs ───────────────────────────────────────────────────

/// `Reference` URI for the signed `bankIdSignedData` object.
pub const REF_SIGNED_DATA: &str = "#bidSignedData";

/// `Reference` URI for the `KeyInfo` element.
pub const REF_KEY_INFO: &str = "#bidKeyInfo";
