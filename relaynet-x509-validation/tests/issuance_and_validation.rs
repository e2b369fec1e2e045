// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

use chrono::{Duration, Utc};
use relaynet_x509_validation::{Certificate, CertificateError, KeyPair};

#[test]
fn test_deserialize_rejects_garbage() {
    let err = Certificate::deserialize(b"Not a certificate").unwrap_err();
    assert!(matches!(
        err,
        CertificateError::Malformed(_) | CertificateError::NotVersion3
    ));
}

#[test]
fn test_validate_rejects_not_yet_valid_certificate() {
    let pair = KeyPair::generate(2048).unwrap();
    let start = Utc::now() + Duration::days(1);
    let end = start + Duration::days(30);
    let cert = Certificate::issue(
        "future", pair.public_key(), pair.private_key(), end, start, None, false, 0,
    )
    .unwrap();

    let err = cert.validate().unwrap_err();
    assert!(matches!(err, CertificateError::NotYetValid));
}

#[test]
fn test_validate_rejects_expired_certificate() {
    let pair = KeyPair::generate(2048).unwrap();
    let start = Utc::now() - Duration::days(30);
    let end = Utc::now() - Duration::days(1);
    let cert = Certificate::issue(
        "expired", pair.public_key(), pair.private_key(), end, start, None, false, 0,
    )
    .unwrap();

    let err = cert.validate().unwrap_err();
    assert!(matches!(err, CertificateError::Expired));
}

#[test]
fn test_issuing_from_non_ca_issuer_is_rejected() {
    let issuer_keys = KeyPair::generate(2048).unwrap();
    let now = Utc::now();
    let issuer = Certificate::issue(
        "issuer",
        issuer_keys.public_key(),
        issuer_keys.private_key(),
        now + Duration::days(365),
        now,
        None,
        false,
        0,
    )
    .unwrap();

    let subject_keys = KeyPair::generate(2048).unwrap();
    let err = Certificate::issue(
        "subject",
        subject_keys.public_key(),
        issuer_keys.private_key(),
        now + Duration::days(1),
        now,
        Some(&issuer),
        false,
        0,
    )
    .unwrap_err();
    assert!(matches!(err, CertificateError::IssuerNotMarkedAsCa));
}

#[test]
fn test_subject_private_address_is_35_characters() {
    let pair = KeyPair::generate(2048).unwrap();
    let now = Utc::now();
    let cert = Certificate::issue(
        "node", pair.public_key(), pair.private_key(), now + Duration::days(1), now, None, false, 0,
    )
    .unwrap();
    let address = cert.subject_private_address();
    assert_eq!(address.len(), 35);
    assert!(address.starts_with('0'));
}
