#![forbid(unsafe_code)]

//! Signature verification over DER structures and raw byte regions.
//!
//! Two dispatch paths: [`verify_with_oid`] for structures that declare
//! their signature algorithm (certificates, OCSP `tbsResponseData`), and
//! [`verify_message_signature`] for the container's message signature,
//! where the hash is fixed to SHA-256 and the scheme is selected from the
//! signer certificate's public-key algorithm.

use der::{Decode, Encode};
use vidimera_core::{oid, Error, Result};
use x509_cert::Certificate;

/// Verify a signature over `data` with the algorithm identified by
/// `sig_oid` (dotted-decimal string) and the signer's DER-encoded
/// SubjectPublicKeyInfo.
pub fn verify_with_oid(
    sig_oid: &str,
    spki_der: &[u8],
    data: &[u8],
    signature: &[u8],
) -> Result<bool> {
    match sig_oid {
        oid::SHA1_WITH_RSA => verify_rsa::<sha1::Sha1>(spki_der, data, signature),
        oid::SHA224_WITH_RSA => verify_rsa::<sha2::Sha224>(spki_der, data, signature),
        oid::SHA256_WITH_RSA => verify_rsa::<sha2::Sha256>(spki_der, data, signature),
        oid::SHA384_WITH_RSA => verify_rsa::<sha2::Sha384>(spki_der, data, signature),
        oid::SHA512_WITH_RSA => verify_rsa::<sha2::Sha512>(spki_der, data, signature),
        oid::ECDSA_WITH_SHA256 => verify_ecdsa_p256(spki_der, data, signature),
        oid::ECDSA_WITH_SHA384 => verify_ecdsa_p384(spki_der, data, signature),
        _ => Err(Error::UnsupportedAlgorithm(format!(
            "signature algorithm: {sig_oid}"
        ))),
    }
}

/// Verify a certificate's own signature using the issuer's
/// SubjectPublicKeyInfo. Used by the chain walk.
pub fn verify_cert_signature(
    cert: &Certificate,
    issuer_spki: &spki::SubjectPublicKeyInfoOwned,
) -> Result<bool> {
    let tbs_der = cert
        .tbs_certificate
        .to_der()
        .map_err(|e| Error::Certificate(format!("failed to encode TBS: {e}")))?;
    let sig_bytes = cert
        .signature
        .as_bytes()
        .ok_or_else(|| Error::Certificate("no signature bytes".into()))?;
    let spki_der = issuer_spki
        .to_der()
        .map_err(|e| Error::Certificate(format!("failed to encode issuer SPKI: {e}")))?;

    verify_with_oid(
        &cert.signature_algorithm.oid.to_string(),
        &spki_der,
        &tbs_der,
        sig_bytes,
    )
}

/// Verify the container's message signature over `data` with the public
/// key of `cert_der`, hashing with SHA-256 as the scheme prescribes.
///
/// This proves mathematical consistency with the claimed key only;
/// whether the certificate is trustworthy is the chain stage's concern.
pub fn verify_message_signature(cert_der: &[u8], data: &[u8], signature: &[u8]) -> Result<bool> {
    let cert = Certificate::from_der(cert_der)
        .map_err(|e| Error::Certificate(format!("failed to parse signer certificate: {e}")))?;
    let spki = &cert.tbs_certificate.subject_public_key_info;
    let spki_der = spki
        .to_der()
        .map_err(|e| Error::Certificate(format!("failed to encode SPKI: {e}")))?;

    match spki.algorithm.oid.to_string().as_str() {
        oid::RSA_ENCRYPTION => verify_rsa::<sha2::Sha256>(&spki_der, data, signature),
        oid::ID_EC_PUBLIC_KEY => verify_ecdsa_p256(&spki_der, data, signature),
        other => Err(Error::UnsupportedAlgorithm(format!(
            "signer public key algorithm: {other}"
        ))),
    }
}

// ── RSA PKCS#1 v1.5 ─────────────────────────────────────────────────

fn verify_rsa<D>(spki_der: &[u8], data: &[u8], signature: &[u8]) -> Result<bool>
where
    D: digest::Digest + digest::const_oid::AssociatedOid,
{
    use spki::DecodePublicKey;

    let public_key = rsa::RsaPublicKey::from_public_key_der(spki_der)
        .map_err(|e| Error::Certificate(format!("invalid RSA public key: {e}")))?;
    let verifying_key = rsa::pkcs1v15::VerifyingKey::<D>::new(public_key);
    let sig = rsa::pkcs1v15::Signature::try_from(signature)
        .map_err(|e| Error::Certificate(format!("invalid RSA signature: {e}")))?;

    use signature::Verifier;
    Ok(verifying_key.verify(data, &sig).is_ok())
}

// ── ECDSA (DER-encoded signatures) ───────────────────────────────────

fn verify_ecdsa_p256(spki_der: &[u8], data: &[u8], signature: &[u8]) -> Result<bool> {
    use spki::DecodePublicKey;

    let vk = p256::ecdsa::VerifyingKey::from_public_key_der(spki_der)
        .map_err(|e| Error::Certificate(format!("invalid EC P-256 key: {e}")))?;
    let sig = p256::ecdsa::DerSignature::from_bytes(signature)
        .map_err(|e| Error::Certificate(format!("invalid ECDSA signature: {e}")))?;

    use signature::Verifier;
    Ok(vk.verify(data, &sig).is_ok())
}

fn verify_ecdsa_p384(spki_der: &[u8], data: &[u8], signature: &[u8]) -> Result<bool> {
    use spki::DecodePublicKey;

    let vk = p384::ecdsa::VerifyingKey::from_public_key_der(spki_der)
        .map_err(|e| Error::Certificate(format!("invalid EC P-384 key: {e}")))?;
    let sig = p384::ecdsa::DerSignature::from_bytes(signature)
        .map_err(|e| Error::Certificate(format!("invalid ECDSA signature: {e}")))?;

    use signature::Verifier;
    Ok(vk.verify(data, &sig).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidimera_core::oid;

    #[test]
    fn rsa_sha256_round_trip() {
        use rsa::pkcs8::EncodePublicKey;
        use signature::{SignatureEncoding, Signer};

        let mut rng = rand::thread_rng();
        let private_key = rsa::RsaPrivateKey::new(&mut rng, 2048).unwrap();
        let spki_der = private_key
            .to_public_key()
            .to_public_key_der()
            .unwrap()
            .into_vec();

        let data = b"<SignedInfo xmlns=\"http://www.w3.org/2000/09/xmldsig#\"></SignedInfo>";
        let signing_key = rsa::pkcs1v15::SigningKey::<sha2::Sha256>::new(private_key);
        let sig = signing_key.sign(data).to_vec();

        assert!(verify_with_oid(oid::SHA256_WITH_RSA, &spki_der, data, &sig).unwrap());

        // One flipped bit anywhere in the signature must fail verification.
        let mut bad = sig.clone();
        bad[0] ^= 0x01;
        assert!(!verify_with_oid(oid::SHA256_WITH_RSA, &spki_der, data, &bad).unwrap());

        // Different data must fail too.
        assert!(!verify_with_oid(oid::SHA256_WITH_RSA, &spki_der, b"other", &sig).unwrap());
    }

    #[test]
    fn ecdsa_p256_round_trip() {
        use signature::Signer;
        use spki::EncodePublicKey;

        let sk = p256::ecdsa::SigningKey::random(&mut rand::thread_rng());
        let vk = sk.verifying_key();
        let spki_der = vk.to_public_key_der().unwrap().into_vec();

        let data = b"tbs-response-data";
        let sig: p256::ecdsa::Signature = sk.sign(data);
        let der_sig = sig.to_der();

        assert!(verify_with_oid(
            oid::ECDSA_WITH_SHA256,
            &spki_der,
            data,
            der_sig.as_bytes()
        )
        .unwrap());

        assert!(!verify_with_oid(
            oid::ECDSA_WITH_SHA256,
            &spki_der,
            b"tampered",
            der_sig.as_bytes()
        )
        .unwrap());
    }

    #[test]
    fn unknown_algorithm_is_rejected() {
        let err = verify_with_oid("1.2.3.4", &[], b"data", &[]).unwrap_err();
        assert!(matches!(err, Error::UnsupportedAlgorithm(_)));
    }

    #[test]
    fn garbage_spki_is_an_error_not_a_mismatch() {
        let err = verify_with_oid(oid::SHA256_WITH_RSA, b"junk", b"data", &[0u8; 256]);
        assert!(err.is_err());
    }
}
