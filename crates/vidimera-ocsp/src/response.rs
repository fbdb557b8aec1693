#![forbid(unsafe_code)]

//! OCSP response parsing and verification.

use chrono::{DateTime, Utc};
use der::asn1::ObjectIdentifier;
use der::{Decode, Encode};
use vidimera_core::{oid, Error, Result};
use vidimera_crypto::pkix;
use x509_ocsp::{BasicOcspResponse, OcspResponse, OcspResponseStatus};

use crate::nonce;

/// Timezone the scheme renders accepted timestamps in.
pub const SCHEME_TIMEZONE: chrono_tz::Tz = chrono_tz::Europe::Stockholm;

/// Artifacts of a successfully verified OCSP response.
#[derive(Debug, Clone)]
pub struct VerifiedOcsp {
    /// `producedAt` from `tbsResponseData`, in UTC.
    pub produced_at: DateTime<Utc>,
    /// `producedAt` rendered `%Y-%m-%d %H:%M:%S` in the scheme timezone.
    pub produced_at_local: String,
    /// The embedded responder certificate, for chain validation.
    pub responder_cert_der: Vec<u8>,
}

/// Verify an OCSP response and its binding to the signing session.
///
/// `ocsp_der` is the decoded `ocspResponse` blob; `signature_b64` is the
/// completion payload's `signature` field exactly as received, which the
/// nonce binds. Each gate is hard: status, response signature, nonce.
/// Certificate *trust* for the responder is established later by the
/// chain stage, using the certificate returned here.
pub fn verify_ocsp_response(ocsp_der: &[u8], signature_b64: &str) -> Result<VerifiedOcsp> {
    let response = OcspResponse::from_der(ocsp_der)
        .map_err(|e| Error::MalformedOcsp(format!("OCSPResponse: {e}")))?;

    if response.response_status != OcspResponseStatus::Successful {
        return Err(Error::OcspNotSuccessful(format!(
            "{:?}",
            response.response_status
        )));
    }

    let response_bytes = response
        .response_bytes
        .ok_or_else(|| Error::MalformedOcsp("successful response carries no responseBytes".into()))?;

    let basic_oid = ObjectIdentifier::new_unwrap(oid::ID_PKIX_OCSP_BASIC);
    if response_bytes.response_type != basic_oid {
        return Err(Error::MalformedOcsp(format!(
            "unexpected response type: {}",
            response_bytes.response_type
        )));
    }

    let basic = BasicOcspResponse::from_der(response_bytes.response.as_bytes())
        .map_err(|e| Error::MalformedOcsp(format!("BasicOCSPResponse: {e}")))?;

    verify_response_signature(&basic)?;

    let nonce_value = nonce::extract_nonce(basic.tbs_response_data.response_extensions.as_ref())?;
    nonce::check_nonce(&nonce_value, signature_b64)?;

    let produced_at = produced_at_utc(&basic)?;
    let produced_at_local = produced_at
        .with_timezone(&SCHEME_TIMEZONE)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();

    let responder_cert_der = responder_certificate(&basic)?;

    Ok(VerifiedOcsp {
        produced_at,
        produced_at_local,
        responder_cert_der,
    })
}

/// Verify the response's own signature with the embedded responder
/// certificate, over the DER re-encoding of `tbsResponseData` using the
/// declared algorithm.
fn verify_response_signature(basic: &BasicOcspResponse) -> Result<()> {
    let responder_der = responder_certificate(basic)?;
    let responder = x509_cert::Certificate::from_der(&responder_der)
        .map_err(|e| Error::MalformedOcsp(format!("responder certificate: {e}")))?;
    let spki_der = responder
        .tbs_certificate
        .subject_public_key_info
        .to_der()
        .map_err(|e| Error::Certificate(format!("failed to encode responder SPKI: {e}")))?;

    let tbs_der = basic
        .tbs_response_data
        .to_der()
        .map_err(|e| Error::MalformedOcsp(format!("failed to encode tbsResponseData: {e}")))?;
    let sig_bytes = basic
        .signature
        .as_bytes()
        .ok_or_else(|| Error::MalformedOcsp("signature is not an octet-aligned BIT STRING".into()))?;

    let alg_oid = basic.signature_algorithm.oid.to_string();
    match pkix::verify_with_oid(&alg_oid, &spki_der, &tbs_der, sig_bytes)? {
        true => Ok(()),
        false => Err(Error::InvalidOcspSignature(format!(
            "signature does not verify with the responder certificate ({alg_oid})"
        ))),
    }
}

fn responder_certificate(basic: &BasicOcspResponse) -> Result<Vec<u8>> {
    let cert = basic
        .certs
        .as_ref()
        .and_then(|certs| certs.first())
        .ok_or_else(|| Error::MalformedOcsp("no responder certificate embedded".into()))?;
    cert.to_der()
        .map_err(|e| Error::MalformedOcsp(format!("responder certificate: {e}")))
}

fn produced_at_utc(basic: &BasicOcspResponse) -> Result<DateTime<Utc>> {
    let unix = basic
        .tbs_response_data
        .produced_at
        .0
        .to_date_time()
        .unix_duration();
    DateTime::<Utc>::from_timestamp(unix.as_secs() as i64, unix.subsec_nanos())
        .ok_or_else(|| Error::Time("producedAt out of range".into()))
}
