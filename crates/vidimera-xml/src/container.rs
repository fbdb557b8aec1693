#![forbid(unsafe_code)]

//! The parsed view over a decoded signature blob.

use base64::Engine;
use vidimera_core::{ns, Error, Result};

/// Server identity carried inside `bankIdSignedData/srvInfo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    /// The relying party's registered name.
    pub name: String,
    /// The display name shown to the user in the client app.
    pub display_name: String,
}

/// Parsed signature container.
///
/// All fields are extracted once during [`SignatureContainer::parse`]; the
/// raw regions keep the exact bytes of the original document so digest and
/// signature verification operate on what was actually signed.
#[derive(Debug)]
pub struct SignatureContainer {
    signed_info_raw: Vec<u8>,
    key_info_raw: Vec<u8>,
    signed_data_raw: Vec<u8>,
    signature_value: Vec<u8>,
    signed_data_digest: Vec<u8>,
    key_info_digest: Vec<u8>,
    certificates: Vec<Vec<u8>>,
    user_visible_data: Option<Vec<u8>>,
    user_non_visible_data: Option<Vec<u8>>,
    server_info: ServerInfo,
}

impl SignatureContainer {
    /// Decode a base64 signature blob and parse it.
    pub fn from_base64(signature_b64: &str) -> Result<Self> {
        let engine = base64::engine::general_purpose::STANDARD;
        let clean: String = signature_b64
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let bytes = engine
            .decode(&clean)
            .map_err(|e| Error::Base64(format!("signature blob: {e}")))?;
        let xml = String::from_utf8(bytes)
            .map_err(|e| Error::MalformedSignature(format!("not UTF-8: {e}")))?;
        Self::parse(&xml)
    }

    /// Parse a decoded signature document.
    pub fn parse(xml: &str) -> Result<Self> {
        let doc = roxmltree::Document::parse(xml)
            .map_err(|e| Error::MalformedSignature(format!("XML parse: {e}")))?;

        let root = doc.root_element();
        if root.tag_name().name() != ns::node::SIGNATURE
            || root.tag_name().namespace().unwrap_or("") != ns::DSIG
        {
            return Err(Error::MalformedSignature(format!(
                "root element is not a dsig Signature: {}",
                root.tag_name().name()
            )));
        }

        let signed_info = find_child(root, ns::DSIG, ns::node::SIGNED_INFO)?;
        let signature_value_node = find_child(root, ns::DSIG, ns::node::SIGNATURE_VALUE)?;
        let key_info = find_child(root, ns::DSIG, ns::node::KEY_INFO)?;
        let object = find_child(root, ns::DSIG, ns::node::OBJECT)?;

        // Raw regions, by byte offset into the original text. SignedInfo and
        // KeyInfo cover the full element span (start tag through end tag);
        // the signed-data region is the Object element's content only.
        let signed_info_raw = xml[signed_info.range()].as_bytes().to_vec();
        let key_info_raw = xml[key_info.range()].as_bytes().to_vec();
        let signed_data_raw = element_content(xml, object.range())?.as_bytes().to_vec();

        let signature_value = decode_text(signature_value_node)?;

        // The two References are distinguished by their URI attributes.
        let signed_data_digest =
            reference_digest(signed_info, ns::REF_SIGNED_DATA)?;
        let key_info_digest = reference_digest(signed_info, ns::REF_KEY_INFO)?;

        // KeyInfo/X509Data carries the user, issuing-bank and root-adjacent
        // certificates in order.
        let x509_data = find_child(key_info, ns::DSIG, ns::node::X509_DATA)?;
        let mut certificates = Vec::new();
        for child in x509_data.children() {
            if child.is_element() && child.tag_name().name() == ns::node::X509_CERTIFICATE {
                certificates.push(decode_text(child)?);
            }
        }
        if certificates.len() < 3 {
            return Err(Error::MalformedSignature(format!(
                "expected 3 certificates in X509Data, found {}",
                certificates.len()
            )));
        }

        // The signed object payload.
        let signed_data = find_child_any_ns(object, ns::node::BANKID_SIGNED_DATA)?;
        let user_visible_data = find_optional_child(signed_data, ns::node::USR_VISIBLE_DATA)
            .map(decode_text)
            .transpose()?;
        let user_non_visible_data =
            find_optional_child(signed_data, ns::node::USR_NON_VISIBLE_DATA)
                .map(decode_text)
                .transpose()?;

        let srv_info = find_child_any_ns(signed_data, ns::node::SRV_INFO)?;
        let server_info = ServerInfo {
            name: decode_text_utf8(find_child_any_ns(srv_info, ns::node::SRV_NAME)?)?,
            display_name: decode_text_utf8(find_child_any_ns(
                srv_info,
                ns::node::SRV_DISPLAY_NAME,
            )?)?,
        };

        Ok(Self {
            signed_info_raw,
            key_info_raw,
            signed_data_raw,
            signature_value,
            signed_data_digest,
            key_info_digest,
            certificates,
            user_visible_data,
            user_non_visible_data,
            server_info,
        })
    }

    /// Exact original bytes of the `SignedInfo` element, tags included.
    pub fn signed_info_raw(&self) -> &[u8] {
        &self.signed_info_raw
    }

    /// Exact original bytes of the `KeyInfo` element, tags included.
    pub fn key_info_raw(&self) -> &[u8] {
        &self.key_info_raw
    }

    /// Exact original bytes of the signed object content (the
    /// `bankIdSignedData` element between the `Object` tags).
    pub fn signed_data_raw(&self) -> &[u8] {
        &self.signed_data_raw
    }

    /// The decoded `SignatureValue` bytes.
    pub fn signature_value(&self) -> &[u8] {
        &self.signature_value
    }

    /// The decoded digest declared for the signed-data reference.
    pub fn signed_data_digest(&self) -> &[u8] {
        &self.signed_data_digest
    }

    /// The decoded digest declared for the `KeyInfo` reference.
    pub fn key_info_digest(&self) -> &[u8] {
        &self.key_info_digest
    }

    /// DER certificates in container order: user, issuing bank,
    /// root-adjacent.
    pub fn certificates(&self) -> &[Vec<u8>] {
        &self.certificates
    }

    /// The user's session certificate (first in the container).
    pub fn user_certificate(&self) -> &[u8] {
        &self.certificates[0]
    }

    /// The certificates above the user certificate, in container order.
    pub fn issuer_certificates(&self) -> &[Vec<u8>] {
        &self.certificates[1..]
    }

    /// Decoded `usrVisibleData`, when present.
    pub fn user_visible_data(&self) -> Option<&[u8]> {
        self.user_visible_data.as_deref()
    }

    /// Decoded `usrNonVisibleData`, when present.
    pub fn user_non_visible_data(&self) -> Option<&[u8]> {
        self.user_non_visible_data.as_deref()
    }

    /// Server identity from `srvInfo`.
    pub fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }
}

// ── Helper functions ─────────────────────────────────────────────────

fn find_child<'a>(
    parent: roxmltree::Node<'a, 'a>,
    ns_uri: &str,
    local_name: &str,
) -> Result<roxmltree::Node<'a, 'a>> {
    parent
        .children()
        .find(|n| {
            n.is_element()
                && n.tag_name().name() == local_name
                && n.tag_name().namespace().unwrap_or("") == ns_uri
        })
        .ok_or_else(|| Error::MalformedSignature(format!("missing element: {local_name}")))
}

/// Like [`find_child`] but accepts any namespace, for the scheme payload
/// elements whose producers are inconsistent about default-namespace
/// declarations.
fn find_child_any_ns<'a>(
    parent: roxmltree::Node<'a, 'a>,
    local_name: &str,
) -> Result<roxmltree::Node<'a, 'a>> {
    find_optional_child(parent, local_name)
        .ok_or_else(|| Error::MalformedSignature(format!("missing element: {local_name}")))
}

fn find_optional_child<'a>(
    parent: roxmltree::Node<'a, 'a>,
    local_name: &str,
) -> Option<roxmltree::Node<'a, 'a>> {
    parent
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == local_name)
}

/// Base64-decode an element's text content, stripping embedded whitespace.
fn decode_text(node: roxmltree::Node<'_, '_>) -> Result<Vec<u8>> {
    let name = node.tag_name().name().to_owned();
    let text = node
        .text()
        .ok_or_else(|| Error::MalformedSignature(format!("empty element: {name}")))?;
    let clean: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let engine = base64::engine::general_purpose::STANDARD;
    engine
        .decode(&clean)
        .map_err(|e| Error::Base64(format!("{name}: {e}")))
}

fn decode_text_utf8(node: roxmltree::Node<'_, '_>) -> Result<String> {
    let name = node.tag_name().name().to_owned();
    let bytes = decode_text(node)?;
    String::from_utf8(bytes)
        .map_err(|e| Error::MalformedSignature(format!("{name} is not UTF-8: {e}")))
}

/// Find a `Reference` with the given URI and decode its `DigestValue`.
fn reference_digest(signed_info: roxmltree::Node<'_, '_>, uri: &str) -> Result<Vec<u8>> {
    let reference = signed_info
        .children()
        .find(|n| {
            n.is_element()
                && n.tag_name().name() == ns::node::REFERENCE
                && n.attribute(ns::attr::URI) == Some(uri)
        })
        .ok_or_else(|| {
            Error::MalformedSignature(format!("missing Reference with URI {uri}"))
        })?;
    let digest_value = find_child(reference, ns::DSIG, ns::node::DIGEST_VALUE)?;
    decode_text(digest_value)
}

/// Slice the content of an element span: everything after the start tag's
/// closing `>` up to the end tag's opening `<`.
fn element_content(xml: &str, range: std::ops::Range<usize>) -> Result<&str> {
    let slice = &xml[range];
    let start = slice
        .find('>')
        .ok_or_else(|| Error::MalformedSignature("unterminated start tag".into()))?;
    let end = slice
        .rfind("</")
        .ok_or_else(|| Error::MalformedSignature("missing end tag".into()))?;
    if end < start + 1 {
        return Err(Error::MalformedSignature("empty element content".into()));
    }
    Ok(&slice[start + 1..end])
}
