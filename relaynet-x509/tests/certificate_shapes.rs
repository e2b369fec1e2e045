// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

use relaynet_x509::{
    AlgorithmIdentifier, AlgorithmParameters, AttributeTypeValue, BasicConstraints,
    SubjectPublicKeyInfo, Time,
};

#[test]
fn test_basic_constraints_default_ca_false() {
    let der = asn1::write_single(&BasicConstraints {
        ca: false,
        path_length: None,
    })
    .unwrap();
    // DEFAULT FALSE means an absent `cA` is omitted from the encoding.
    let parsed = asn1::parse_single::<BasicConstraints>(&der).unwrap();
    assert!(!parsed.ca);
    assert_eq!(parsed.path_length, None);
}

#[test]
fn test_basic_constraints_ca_with_path_length() {
    let bc = BasicConstraints {
        ca: true,
        path_length: Some(1),
    };
    let der = asn1::write_single(&bc).unwrap();
    let parsed = asn1::parse_single::<BasicConstraints>(&der).unwrap();
    assert!(parsed.ca);
    assert_eq!(parsed.path_length, Some(1));
}

#[test]
fn test_common_name_round_trip_through_rdn_sequence() {
    let avas = [AttributeTypeValue {
        type_id: relaynet_x509::oid::COMMON_NAME_OID,
        value: asn1::BMPString::new_from_codepoints(&[
            0x0054, 0x0065, 0x0073, 0x0074,
        ]),
    }];
    let rdns = [asn1::SetOfWriter::new(&avas)];
    let write = asn1::SequenceOfWriter::new(rdns);
    let der = asn1::write_single(&write).unwrap();

    let parsed = asn1::parse_single::<relaynet_x509::NameRead<'_>>(&der).unwrap();
    let cn = relaynet_x509::name::common_name_from_rdn_sequence(&parsed).unwrap();
    assert_eq!(cn, "Test");
}

#[test]
fn test_algorithm_identifier_sha256_has_no_trailing_garbage() {
    let alg = AlgorithmIdentifier {
        oid: asn1::DefinedByMarker::marker(),
        params: AlgorithmParameters::Sha256(Some(asn1::Null::new())),
    };
    let der = asn1::write_single(&alg).unwrap();
    let parsed = asn1::parse_single::<AlgorithmIdentifier<'_>>(&der).unwrap();
    assert_eq!(parsed.oid(), &relaynet_x509::oid::SHA256_OID);
}

#[test]
fn test_time_variants_both_expose_the_same_datetime_accessor() {
    let dt = asn1::DateTime::new(2024, 6, 1, 12, 0, 0).unwrap();
    let utc = Time::UtcTime(asn1::UtcTime::new(dt).unwrap());
    let generalized = Time::GeneralizedTime(asn1::GeneralizedTime::new(dt).unwrap());
    assert_eq!(utc.as_datetime(), generalized.as_datetime());
}
