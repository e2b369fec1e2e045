// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

//! Certification path construction, grounded on the issuer-validation step
//! of `cryptography-x509-validation`'s policy engine (`valid_issuer`): at
//! each step the candidate issuer must be a CA whose key identifies the
//! child's `authorityKeyIdentifier`, and the child's signature must verify
//! against it. Relaynet has no CA/B Forum algorithm allowlist or name
//! constraints to enforce, so the policy collapses to those two checks.

use crate::certificate::{self, Certificate};
use crate::error::{CertificateError, Result};
use crate::sign;

fn is_issuer_of(issuer: &Certificate, subject: &Certificate) -> bool {
    if issuer.common_name() != subject.issuer_common_name() {
        return false;
    }
    match (issuer.subject_key_identifier(), subject.authority_key_identifier()) {
        (Some(ski), Some(aki)) => ski == aki,
        _ => false,
    }
}

fn verify_issued_by(subject: &Certificate, issuer: &Certificate) -> Result<()> {
    let (signature, hash) = certificate::signature(subject);
    let verified = sign::verify(certificate::tbs_der(subject), signature, issuer.public_key(), hash)?;
    if !verified {
        return Err(CertificateError::NoCertificationPath);
    }
    Ok(())
}

/// Builds the certification path from `end_entity` to a trust anchor in
/// `trusted_cas`, consulting `untrusted_intermediates` for any CAs in
/// between. The returned list starts with `end_entity`, ends with the
/// matching trust anchor, and borrows the caller's own certificates rather
/// than freshly decoded copies.
pub fn get_certification_path<'a>(
    end_entity: &'a Certificate,
    untrusted_intermediates: &'a [Certificate],
    trusted_cas: &'a [Certificate],
) -> Result<Vec<&'a Certificate>> {
    if trusted_cas.is_empty() {
        return Err(CertificateError::NoTrustedCas);
    }

    let mut path: Vec<&'a Certificate> = vec![end_entity];
    let mut current = end_entity;

    // Bounded by the total number of candidate certificates: every
    // successful step consumes one, so a chain can't legitimately exceed
    // this length, and a broken chain hits the "no path" case below.
    let max_steps = untrusted_intermediates.len() + trusted_cas.len() + 1;
    for _ in 0..max_steps {
        if let Some(anchor) = trusted_cas.iter().find(|tc| is_issuer_of(tc, current)) {
            verify_issued_by(current, anchor)?;
            path.push(anchor);
            return Ok(path);
        }
        if let Some(intermediate) = untrusted_intermediates
            .iter()
            .find(|ic| is_issuer_of(ic, current))
        {
            verify_issued_by(current, intermediate)?;
            path.push(intermediate);
            current = intermediate;
            continue;
        }
        return Err(CertificateError::NoCertificationPath);
    }
    Err(CertificateError::NoCertificationPath)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyPair;
    use chrono::{Duration, Utc};

    #[test]
    fn test_three_certificate_path_preserves_order() {
        let root_keys = KeyPair::generate(2048).unwrap();
        let now = Utc::now();
        let root = Certificate::issue(
            "root",
            root_keys.public_key(),
            root_keys.private_key(),
            now + Duration::days(3650),
            now,
            None,
            true,
            2,
        )
        .unwrap();

        let intermediate_keys = KeyPair::generate(2048).unwrap();
        let intermediate = Certificate::issue(
            "intermediate",
            intermediate_keys.public_key(),
            root_keys.private_key(),
            now + Duration::days(365),
            now,
            Some(&root),
            true,
            1,
        )
        .unwrap();

        let leaf_keys = KeyPair::generate(2048).unwrap();
        let leaf = Certificate::issue(
            "leaf",
            leaf_keys.public_key(),
            intermediate_keys.private_key(),
            now + Duration::days(30),
            now,
            Some(&intermediate),
            false,
            0,
        )
        .unwrap();

        let intermediates = vec![intermediate.clone()];
        let roots = vec![root.clone()];
        let path = get_certification_path(&leaf, &intermediates, &roots).unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path[0], &leaf);
        assert_eq!(path[1], &intermediate);
        assert_eq!(path[2], &root);
    }

    #[test]
    fn test_empty_trusted_cas_rejected() {
        let keys = KeyPair::generate(2048).unwrap();
        let now = Utc::now();
        let leaf = Certificate::issue(
            "leaf",
            keys.public_key(),
            keys.private_key(),
            now + Duration::days(1),
            now,
            None,
            false,
            0,
        )
        .unwrap();
        let err = get_certification_path(&leaf, &[], &[]).unwrap_err();
        assert!(matches!(err, CertificateError::NoTrustedCas));
    }

    #[test]
    fn test_no_path_when_issuer_missing() {
        let keys = KeyPair::generate(2048).unwrap();
        let other_keys = KeyPair::generate(2048).unwrap();
        let now = Utc::now();
        let leaf = Certificate::issue(
            "leaf",
            keys.public_key(),
            keys.private_key(),
            now + Duration::days(1),
            now,
            None,
            false,
            0,
        )
        .unwrap();
        let unrelated_root = Certificate::issue(
            "unrelated",
            other_keys.public_key(),
            other_keys.private_key(),
            now + Duration::days(3650),
            now,
            None,
            true,
            0,
        )
        .unwrap();
        let err = get_certification_path(&leaf, &[], &[unrelated_root]).unwrap_err();
        assert!(matches!(err, CertificateError::NoCertificationPath));
    }
}
