#![forbid(unsafe_code)]

//! Parsing of the BankID signature container document.
//!
//! The container is an XML-DSig-*like* envelope with a fixed, scheme-defined
//! structure. Elements are located by namespace and local name with explicit
//! structure validation; the digest-relevant regions (`SignedInfo`,
//! `KeyInfo`, the signed object content) are extracted by byte offset from
//! the original text, because digesting is defined over the exact original
//! bytes, never over a re-serialized parse tree.

pub mod container;

pub use container::{ServerInfo, SignatureContainer};
