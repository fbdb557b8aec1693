#![forbid(unsafe_code)]

//! Chain-of-trust validation.
//!
//! Walks issuer links from a leaf certificate to a trust anchor, verifying
//! each certificate's signature with its issuer's public key. Validity
//! times are checked against an evaluation clock that the caller may
//! inject; the expiry (notAfter) comparison can be relaxed for replaying
//! archived transactions, but issuer and signature checks always run.

use std::time::Duration;

use chrono::{DateTime, Utc};
use der::Encode;
use vidimera_core::{Error, Result};
use vidimera_crypto::pkix;
use x509_cert::Certificate;

use crate::store::TrustStore;

/// Policy knobs for a chain validation run.
#[derive(Debug, Clone, Copy)]
pub struct ValidationOptions {
    /// Enforce the notAfter bound. notBefore is always enforced.
    pub ensure_validity: bool,
    /// Evaluation clock override; system time when `None`.
    pub now: Option<DateTime<Utc>>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            ensure_validity: true,
            now: None,
        }
    }
}

/// Validate a chain from `leaf_der` to one of the store's trust anchors.
pub fn validate_chain(
    leaf_der: &[u8],
    store: &TrustStore,
    opts: &ValidationOptions,
) -> Result<()> {
    if store.is_empty() {
        return Err(Error::Certificate(
            "no trusted certificates available".into(),
        ));
    }

    let leaf = crate::pem::cert_from_der(leaf_der)?;
    let eval_time = evaluation_time(opts)?;

    check_time_validity(&leaf, &eval_time, opts.ensure_validity)?;

    // Leaf is itself a trust anchor: accept after verifying its
    // self-signature.
    for (tc, tc_der) in store.trusted() {
        if tc_der == leaf_der {
            return match pkix::verify_cert_signature(&leaf, &tc.tbs_certificate.subject_public_key_info)? {
                true => Ok(()),
                false => Err(Error::Certificate(
                    "trusted certificate self-signature is invalid".into(),
                )),
            };
        }
    }

    // Walk the chain: find issuer, verify, repeat until a trust anchor
    // signs the current certificate.
    let mut current = leaf;
    let mut visited: Vec<Vec<u8>> = vec![leaf_der.to_vec()];
    let max_depth = 10;

    for _ in 0..max_depth {
        let issuer_der = current.tbs_certificate.issuer.to_der().unwrap_or_default();

        // Trust anchors first.
        for (tc, _) in store.trusted() {
            let tc_subject = tc.tbs_certificate.subject.to_der().unwrap_or_default();
            if tc_subject == issuer_der
                && pkix::verify_cert_signature(
                    &current,
                    &tc.tbs_certificate.subject_public_key_info,
                )?
            {
                check_time_validity(tc, &eval_time, opts.ensure_validity)?;
                return Ok(());
            }
        }

        // Then untrusted intermediates.
        let mut advanced = false;
        for (ic, ic_der) in store.untrusted() {
            if visited.contains(ic_der) {
                continue; // avoid cycles
            }
            let ic_subject = ic.tbs_certificate.subject.to_der().unwrap_or_default();
            if ic_subject == issuer_der
                && pkix::verify_cert_signature(
                    &current,
                    &ic.tbs_certificate.subject_public_key_info,
                )?
            {
                check_time_validity(ic, &eval_time, opts.ensure_validity)?;
                visited.push(ic_der.clone());
                current = ic.clone();
                advanced = true;
                break;
            }
        }

        if !advanced {
            return Err(Error::Certificate(
                "cannot find issuer certificate (incomplete chain)".into(),
            ));
        }
    }

    Err(Error::Certificate("certificate chain too long".into()))
}

/// Resolve the evaluation clock to a `der::DateTime`.
fn evaluation_time(opts: &ValidationOptions) -> Result<der::DateTime> {
    let unix = match opts.now {
        Some(t) => {
            let ts = t.timestamp();
            if ts < 0 {
                return Err(Error::Time(format!("evaluation time before epoch: {t}")));
            }
            Duration::from_secs(ts as u64)
        }
        None => std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_err(|e| Error::Time(format!("system time: {e}")))?,
    };
    der::DateTime::from_unix_duration(unix).map_err(|e| Error::Time(format!("{e}")))
}

fn check_time_validity(
    cert: &Certificate,
    eval_time: &der::DateTime,
    enforce_expiry: bool,
) -> Result<()> {
    let not_before = cert.tbs_certificate.validity.not_before.to_date_time();
    let not_after = cert.tbs_certificate.validity.not_after.to_date_time();

    if *eval_time < not_before {
        return Err(Error::Certificate(format!(
            "certificate is not yet valid (notBefore: {not_before})"
        )));
    }
    if enforce_expiry && *eval_time > not_after {
        return Err(Error::Certificate(format!(
            "certificate has expired (notAfter: {not_after})"
        )));
    }
    Ok(())
}
