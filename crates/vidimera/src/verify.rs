#![forbid(unsafe_code)]

//! The completion-response verification pipeline.
//!
//! Stages run strictly in order (container parse, digest check, message
//! signature, OCSP, chain of trust) and short-circuit on the first
//! failure. Each call is stateless; a [`Verifier`] is immutable after
//! construction and safe to share across threads.

use base64::Engine;
use chrono::{DateTime, Utc};
use vidimera_certs::{chain, TrustStore, ValidationOptions};
use vidimera_core::{CertRole, Error, Result};
use vidimera_crypto::{digest, pkix};
use vidimera_ocsp::verify_ocsp_response;
use vidimera_xml::SignatureContainer;

use crate::model::CompletionData;

/// Configuration for a [`Verifier`].
///
/// The pinned root is always an explicit caller-supplied value; there is
/// no built-in default trust root.
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    /// The scheme's pinned root certificate, PEM text, distributed out of
    /// band.
    pub root_certificate_pem: String,
    /// Enforce certificate expiry (notAfter). Disable only to replay
    /// archived transactions; issuance and signature checks still run.
    pub ensure_certificates_still_valid: bool,
    /// Evaluation clock override for replays; system time when `None`.
    pub now: Option<DateTime<Utc>>,
}

impl VerifierConfig {
    /// Strict configuration: expiry enforced, system clock.
    pub fn new(root_certificate_pem: impl Into<String>) -> Self {
        Self {
            root_certificate_pem: root_certificate_pem.into(),
            ensure_certificates_still_valid: true,
            now: None,
        }
    }
}

/// Successful verification verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    /// OCSP `producedAt` in the scheme's local timezone,
    /// `YYYY-MM-DD HH:MM:SS`. The accepted verification time.
    pub ocsp_produced_at: String,
}

/// Verifies completion responses against a pinned root certificate.
pub struct Verifier {
    root_der: Vec<u8>,
    ensure_certificates_still_valid: bool,
    now: Option<DateTime<Utc>>,
}

impl Verifier {
    /// Parse and pin the root certificate.
    pub fn new(config: VerifierConfig) -> Result<Self> {
        let (_, root_der) = vidimera_certs::pem::cert_from_pem(&config.root_certificate_pem)?;
        Ok(Self {
            root_der,
            ensure_certificates_still_valid: config.ensure_certificates_still_valid,
            now: config.now,
        })
    }

    /// Verify a completed order's cryptography end-to-end.
    pub fn verify(&self, completion: &CompletionData) -> Result<Verification> {
        // 1. Parse the signature container.
        let container = SignatureContainer::from_base64(&completion.signature)?;
        tracing::debug!(
            server = %container.server_info().name,
            certificates = container.certificates().len(),
            "signature container parsed"
        );

        // 2. Recompute and compare the declared digests. A mismatch
        // already proves tampering, so no signature work happens after
        // a failure here.
        self.check_digest(
            "bankIdSignedData",
            container.signed_data_raw(),
            container.signed_data_digest(),
        )?;
        self.check_digest("KeyInfo", container.key_info_raw(), container.key_info_digest())?;
        tracing::debug!("message digests verified");

        // 3. Verify the message signature against the user certificate's
        // public key. Trust in that certificate is established in stage 5.
        let signature_ok = pkix::verify_message_signature(
            container.user_certificate(),
            container.signed_info_raw(),
            container.signature_value(),
        )?;
        if !signature_ok {
            return Err(Error::InvalidSignature(
                "SignatureValue does not verify over SignedInfo with the user certificate".into(),
            ));
        }
        tracing::debug!("message signature verified");

        // 4. Verify the OCSP response, including the session nonce.
        let engine = base64::engine::general_purpose::STANDARD;
        let ocsp_der = engine
            .decode(completion.ocsp_response.trim())
            .map_err(|e| Error::MalformedOcsp(format!("base64: {e}")))?;
        let ocsp = verify_ocsp_response(&ocsp_der, &completion.signature)?;
        tracing::debug!(produced_at = %ocsp.produced_at_local, "OCSP response verified");

        // 5. Validate both chains against the pinned root. The container's
        // issuer certificates enter as untrusted candidates only.
        let mut store = TrustStore::new();
        store.add_trusted_der(&self.root_der)?;
        for der in container.issuer_certificates() {
            store.add_untrusted_der(der)?;
        }
        let opts = ValidationOptions {
            ensure_validity: self.ensure_certificates_still_valid,
            now: self.now,
        };

        chain::validate_chain(container.user_certificate(), &store, &opts).map_err(|e| {
            Error::CertificateChain {
                role: CertRole::User,
                reason: e.to_string(),
            }
        })?;
        chain::validate_chain(&ocsp.responder_cert_der, &store, &opts).map_err(|e| {
            Error::CertificateChain {
                role: CertRole::OcspResponder,
                reason: e.to_string(),
            }
        })?;
        tracing::debug!("certificate chains verified");

        Ok(Verification {
            ocsp_produced_at: ocsp.produced_at_local,
        })
    }

    fn check_digest(&self, region: &'static str, raw: &[u8], declared: &[u8]) -> Result<()> {
        let computed = digest::sha256_hex(raw);
        let declared = hex::encode(declared);
        if computed != declared {
            return Err(Error::DigestMismatch {
                region,
                computed,
                declared,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Device, User};
    use base64::Engine;
    use der::asn1::{BitString, GeneralizedTime, Null, ObjectIdentifier, OctetString};
    use der::{Decode, Encode};
    use p256::pkcs8::DecodePrivateKey;
    use signature::Signer;
    use spki::AlgorithmIdentifierOwned;
    use vidimera_core::oid;
    use x509_cert::ext::Extension;
    use x509_cert::serial_number::SerialNumber;
    use x509_ocsp::{
        BasicOcspResponse, CertId, CertStatus, OcspGeneralizedTime, OcspResponse,
        OcspResponseStatus, ResponderId, ResponseBytes, ResponseData, SingleResponse,
    };

    const STANDARD: base64::engine::GeneralPurpose = base64::engine::general_purpose::STANDARD;

    struct Fixture {
        completion: CompletionData,
        root_pem: String,
        other_root_pem: String,
        /// A well-formed signature over different data, for tamper tests.
        wrong_signature_b64: String,
        signature_b64: String,
    }

    struct Issued {
        cert: rcgen::Certificate,
        key: rcgen::KeyPair,
    }

    fn issue(
        cn: &str,
        is_ca: bool,
        not_after: time::OffsetDateTime,
        issuer: Option<&Issued>,
    ) -> Issued {
        let key = rcgen::KeyPair::generate_for(&rcgen::PKCS_ECDSA_P256_SHA256).unwrap();
        let mut params = rcgen::CertificateParams::default();
        params.distinguished_name.push(rcgen::DnType::CommonName, cn);
        params.not_before = rcgen::date_time_ymd(2020, 1, 1);
        params.not_after = not_after;
        if is_ca {
            params.is_ca = rcgen::IsCa::Ca(rcgen::BasicConstraints::Unconstrained);
        }
        let cert = match issuer {
            None => params.self_signed(&key).unwrap(),
            Some(parent) => params.signed_by(&key, &parent.cert, &parent.key).unwrap(),
        };
        Issued { cert, key }
    }

    fn p256_signer(issued: &Issued) -> p256::ecdsa::SigningKey {
        p256::ecdsa::SigningKey::from_pkcs8_der(&issued.key.serialize_der()).unwrap()
    }

    /// Assemble a complete, self-consistent completion payload: rcgen
    /// chain, container XML with matching digests and signature, and an
    /// OCSP response nonce-bound to the signature field.
    fn build_fixture(not_after: time::OffsetDateTime, nonce_session_b64: Option<&str>) -> Fixture {
        let root = issue("Fixture Root CA", true, not_after, None);
        let bank = issue("Fixture Bank CA", true, not_after, Some(&root));
        let user = issue("Fixture User", false, not_after, Some(&bank));
        let responder = issue("Fixture OCSP Responder", false, not_after, Some(&bank));

        let b64 = |data: &[u8]| STANDARD.encode(data);

        // KeyInfo with the user, issuing-bank and root certificates.
        let key_info = format!(
            concat!(
                r#"<KeyInfo xmlns="http://www.w3.org/2000/09/xmldsig#" Id="bidKeyInfo">"#,
                "<X509Data><X509Certificate>{user}</X509Certificate>",
                "<X509Certificate>{bank}</X509Certificate>",
                "<X509Certificate>{root}</X509Certificate></X509Data></KeyInfo>",
            ),
            user = b64(user.cert.der()),
            bank = b64(bank.cert.der()),
            root = b64(root.cert.der()),
        );

        // The signed object content.
        let object_content = format!(
            concat!(
                r#"<bankIdSignedData xmlns="http://www.bankid.com/signature/v1.0.0/types" Id="bidSignedData">"#,
                r#"<usrVisibleData charset="UTF-8" visible="wysiwys">{uvd}</usrVisibleData>"#,
                "<usrNonVisibleData>{unvd}</usrNonVisibleData>",
                "<srvInfo><name>{srv}</name><displayName>{dn}</displayName></srvInfo>",
                "</bankIdSignedData>",
            ),
            uvd = b64("Logga in hos Testbolaget".as_bytes()),
            unvd = b64(b"order-binding-data"),
            srv = b64(b"testbolaget.se"),
            dn = b64("Testbolaget AB".as_bytes()),
        );

        let signed_info = format!(
            concat!(
                r#"<SignedInfo xmlns="http://www.w3.org/2000/09/xmldsig#">"#,
                r##"<Reference Type="http://www.bankid.com/signature/v1.0.0/types" URI="#bidSignedData">"##,
                "<DigestValue>{d1}</DigestValue></Reference>",
                r##"<Reference URI="#bidKeyInfo"><DigestValue>{d2}</DigestValue></Reference>"##,
                "</SignedInfo>",
            ),
            d1 = b64(&digest::digest(digest::HashAlg::Sha256, object_content.as_bytes())),
            d2 = b64(&digest::digest(digest::HashAlg::Sha256, key_info.as_bytes())),
        );

        let user_signer = p256_signer(&user);
        let sig: p256::ecdsa::Signature = user_signer.sign(signed_info.as_bytes());
        let signature_value_b64 = b64(sig.to_der().as_bytes());
        let wrong_sig: p256::ecdsa::Signature = user_signer.sign(b"something else entirely");
        let wrong_signature_b64 = b64(wrong_sig.to_der().as_bytes());

        let xml = format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#,
                r#"<Signature xmlns="http://www.w3.org/2000/09/xmldsig#">"#,
                "{signed_info}",
                "<SignatureValue>{sig}</SignatureValue>",
                "{key_info}",
                "<Object>{object}</Object></Signature>",
            ),
            signed_info = signed_info,
            sig = signature_value_b64,
            key_info = key_info,
            object = object_content,
        );

        let signature_b64 = b64(xml.as_bytes());

        // The OCSP nonce binds the base64 signature text; optionally bind
        // a different session to exercise the replay rejection.
        let bound_session = nonce_session_b64.unwrap_or(&signature_b64);
        let mut nonce = digest::digest(digest::HashAlg::Sha1, bound_session.as_bytes());
        nonce.extend_from_slice(&[0x5a, 0x5a, 0x5a, 0x5a]);

        let ocsp_der = build_ocsp(&responder, &nonce);

        let completion = CompletionData {
            user: User {
                personal_number: "190000000000".into(),
                name: "Karl Karlsson".into(),
                given_name: "Karl".into(),
                surname: "Karlsson".into(),
            },
            device: Device {
                ip_address: "192.168.0.1".into(),
                uhi: None,
            },
            step_up: None,
            bank_id_issue_date: Some("2020-02-01".into()),
            signature: signature_b64.clone(),
            ocsp_response: b64(&ocsp_der),
            risk: None,
        };

        let other_root = issue("Unrelated Root CA", true, not_after, None);

        Fixture {
            completion,
            root_pem: root.cert.pem(),
            other_root_pem: other_root.cert.pem(),
            wrong_signature_b64,
            signature_b64,
        }
    }

    fn build_ocsp(responder: &Issued, nonce: &[u8]) -> Vec<u8> {
        let nonce_inner = OctetString::new(nonce.to_vec()).unwrap().to_der().unwrap();
        let tbs = ResponseData {
            version: Default::default(),
            responder_id: ResponderId::ByKey(OctetString::new(vec![7u8; 20]).unwrap()),
            produced_at: OcspGeneralizedTime(GeneralizedTime::from_date_time(
                der::DateTime::new(2024, 5, 17, 10, 0, 0).unwrap(),
            )),
            responses: vec![SingleResponse {
                cert_id: CertId {
                    hash_algorithm: AlgorithmIdentifierOwned {
                        oid: ObjectIdentifier::new_unwrap("1.3.14.3.2.26"),
                        parameters: None,
                    },
                    issuer_name_hash: OctetString::new(vec![0u8; 20]).unwrap(),
                    issuer_key_hash: OctetString::new(vec![0u8; 20]).unwrap(),
                    serial_number: SerialNumber::new(&[0x2a]).unwrap(),
                },
                cert_status: CertStatus::Good(Null),
                this_update: OcspGeneralizedTime(GeneralizedTime::from_date_time(
                    der::DateTime::new(2024, 5, 17, 9, 59, 0).unwrap(),
                )),
                next_update: None,
                single_extensions: None,
            }],
            response_extensions: Some(vec![Extension {
                extn_id: ObjectIdentifier::new_unwrap(oid::ID_PKIX_OCSP_NONCE),
                critical: false,
                extn_value: OctetString::new(nonce_inner).unwrap(),
            }]),
        };

        let tbs_der = tbs.to_der().unwrap();
        let sig: p256::ecdsa::Signature = p256_signer(responder).sign(&tbs_der);

        let basic = BasicOcspResponse {
            tbs_response_data: tbs,
            signature_algorithm: AlgorithmIdentifierOwned {
                oid: ObjectIdentifier::new_unwrap(oid::ECDSA_WITH_SHA256),
                parameters: None,
            },
            signature: BitString::from_bytes(sig.to_der().as_bytes()).unwrap(),
            certs: Some(vec![
                x509_cert::Certificate::from_der(responder.cert.der()).unwrap()
            ]),
        };

        let response = OcspResponse {
            response_status: OcspResponseStatus::Successful,
            response_bytes: Some(ResponseBytes {
                response_type: ObjectIdentifier::new_unwrap(oid::ID_PKIX_OCSP_BASIC),
                response: OctetString::new(basic.to_der().unwrap()).unwrap(),
            }),
        };
        response.to_der().unwrap()
    }

    fn long_lived() -> time::OffsetDateTime {
        rcgen::date_time_ymd(2123, 1, 1)
    }

    fn verifier(root_pem: &str) -> Verifier {
        Verifier::new(VerifierConfig::new(root_pem)).unwrap()
    }

    /// Re-wrap a tampered container document as the payload's signature
    /// field.
    fn with_tampered_xml(fixture: &Fixture, edit: impl Fn(&str) -> String) -> CompletionData {
        let xml_bytes = STANDARD.decode(&fixture.signature_b64).unwrap();
        let xml = String::from_utf8(xml_bytes).unwrap();
        let tampered = edit(&xml);
        assert_ne!(xml, tampered, "edit must change the document");
        CompletionData {
            signature: STANDARD.encode(tampered.as_bytes()),
            ..fixture.completion.clone()
        }
    }

    #[test]
    fn valid_payload_is_accepted() {
        let fixture = build_fixture(long_lived(), None);
        let verification = verifier(&fixture.root_pem)
            .verify(&fixture.completion)
            .unwrap();

        assert_eq!(verification.ocsp_produced_at, "2024-05-17 12:00:00");
        assert!(chrono::NaiveDateTime::parse_from_str(
            &verification.ocsp_produced_at,
            "%Y-%m-%d %H:%M:%S"
        )
        .is_ok());
    }

    #[test]
    fn verification_is_idempotent() {
        let fixture = build_fixture(long_lived(), None);
        let verifier = verifier(&fixture.root_pem);
        let first = verifier.verify(&fixture.completion).unwrap();
        let second = verifier.verify(&fixture.completion).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn altered_signed_data_fails_the_digest_stage() {
        let fixture = build_fixture(long_lived(), None);
        // Change one byte inside the signed object content: swap the
        // leading character of the base64 user-visible data.
        let uvd = STANDARD.encode("Logga in hos Testbolaget".as_bytes());
        let mut tampered_uvd = uvd.clone();
        tampered_uvd.replace_range(0..1, if uvd.starts_with('A') { "B" } else { "A" });
        let tampered =
            with_tampered_xml(&fixture, |xml| xml.replace(&uvd, &tampered_uvd));

        let err = verifier(&fixture.root_pem).verify(&tampered).unwrap_err();
        match err {
            Error::DigestMismatch { region, .. } => assert_eq!(region, "bankIdSignedData"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn altered_signature_value_fails_after_digests_pass() {
        let fixture = build_fixture(long_lived(), None);
        // The digests cover the object and KeyInfo regions, not the
        // SignatureValue, so swapping in a well-formed but wrong
        // signature must reach the signature stage and fail there.
        let tampered = with_tampered_xml(&fixture, |xml| {
            xml.replacen(
                &format!("<SignatureValue>{}", sig_of(xml)),
                &format!("<SignatureValue>{}", fixture.wrong_signature_b64),
                1,
            )
        });

        let err = verifier(&fixture.root_pem).verify(&tampered).unwrap_err();
        assert!(matches!(err, Error::InvalidSignature(_)));
    }

    /// Extract the SignatureValue text from a container document.
    fn sig_of(xml: &str) -> String {
        let start = xml.find("<SignatureValue>").unwrap() + "<SignatureValue>".len();
        let end = xml.find("</SignatureValue>").unwrap();
        xml[start..end].to_string()
    }

    #[test]
    fn nonce_bound_to_another_session_is_rejected() {
        // Container, digests and signature are all valid; only the OCSP
        // nonce belongs to a different session.
        let fixture = build_fixture(long_lived(), Some("c29tZSBvdGhlciBzZXNzaW9u"));
        let err = verifier(&fixture.root_pem)
            .verify(&fixture.completion)
            .unwrap_err();
        assert!(matches!(err, Error::NonceMismatch { .. }));
    }

    #[test]
    fn untrusted_root_fails_naming_the_user_certificate() {
        let fixture = build_fixture(long_lived(), None);
        let err = verifier(&fixture.other_root_pem)
            .verify(&fixture.completion)
            .unwrap_err();
        match err {
            Error::CertificateChain { role, .. } => assert_eq!(role, CertRole::User),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn garbage_ocsp_response_fails_after_signature_stage() {
        let fixture = build_fixture(long_lived(), None);
        let broken = CompletionData {
            ocsp_response: STANDARD.encode(b"not an ocsp response"),
            ..fixture.completion.clone()
        };
        let err = verifier(&fixture.root_pem).verify(&broken).unwrap_err();
        assert!(matches!(err, Error::MalformedOcsp(_)));
    }

    #[test]
    fn expired_certificates_accepted_only_when_expiry_relaxed() {
        use chrono::TimeZone;

        // Certificates expire 2024-07-01; the frozen clock sits one day
        // before, and a later strict run must reject.
        let fixture = build_fixture(rcgen::date_time_ymd(2024, 7, 1), None);

        let frozen = Verifier::new(VerifierConfig {
            root_certificate_pem: fixture.root_pem.clone(),
            ensure_certificates_still_valid: false,
            now: Some(chrono::Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()),
        })
        .unwrap();
        let verification = frozen.verify(&fixture.completion).unwrap();
        assert_eq!(verification.ocsp_produced_at, "2024-05-17 12:00:00");

        let strict = Verifier::new(VerifierConfig {
            root_certificate_pem: fixture.root_pem.clone(),
            ensure_certificates_still_valid: true,
            now: Some(chrono::Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()),
        })
        .unwrap();
        let err = strict.verify(&fixture.completion).unwrap_err();
        assert!(matches!(err, Error::CertificateChain { .. }));
    }

    #[test]
    fn verifier_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Verifier>();
    }
}
