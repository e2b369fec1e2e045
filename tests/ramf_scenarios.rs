// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

//! End-to-end RAMF scenarios spanning certificate issuance, message
//! serialization, and verification, grounded in the concrete walkthroughs
//! the codec's own unit tests don't exercise across crate boundaries.

use chrono::{Duration, TimeZone, Utc};
use chrono_tz::America::Caracas;

use relaynet_core::{
    message::RamfMessageType, Certificate, FieldSet, HashingAlgorithm, KeyPair, RamfMessage,
};

struct StubCargo;
impl RamfMessageType for StubCargo {
    const MESSAGE_TYPE: u8 = 0x43;
    const MESSAGE_VERSION: u8 = 0x00;
}

fn issue_self_signed(cn: &str) -> (KeyPair, Certificate) {
    let pair = KeyPair::generate(2048).unwrap();
    let now = Utc::now();
    let cert = Certificate::issue(
        cn,
        pair.public_key(),
        pair.private_key(),
        now + Duration::days(1),
        now,
        None,
        false,
        0,
    )
    .unwrap();
    (pair, cert)
}

/// Scenario 5: a Cargo-shaped RAMF message round-trips with its format
/// signature bytes exactly as specified, including with an empty payload.
#[test]
fn cargo_message_round_trips_with_expected_format_signature() {
    let (pair, cert) = issue_self_signed("stub-sender");
    let field_set = FieldSet::new(
        "https://gb.relaycorp.tech",
        "the-message-id",
        Utc::now(),
        3600,
        vec![],
    )
    .unwrap();
    let message = RamfMessage::<StubCargo>::new(field_set.clone(), cert.clone());

    let bytes = message
        .serialize(pair.private_key(), HashingAlgorithm::Sha256)
        .unwrap();

    // The serialized bytes are a CMS SignedData ContentInfo, not the raw
    // envelope; unwrap one layer down to the attached content to check the
    // format signature bytes directly.
    let signed = relaynet_core::SignedData::deserialize(&bytes).unwrap();
    let content = signed.plaintext();
    assert_eq!(&content[0..8], b"Relaynet");
    assert_eq!(content[8], 0x43);
    assert_eq!(content[9], 0x00);

    let parsed = RamfMessage::<StubCargo>::deserialize(&bytes).unwrap();
    assert_eq!(parsed.field_set().message_id(), field_set.message_id());
    assert_eq!(parsed.field_set().payload(), field_set.payload());
    assert_eq!(parsed.sender_certificate(), &cert);
}

/// Scenario 6: a creation time expressed in a non-UTC zone is normalized to
/// UTC on the wire, and the deserialized instant equals the original one.
#[test]
fn creation_time_in_non_utc_zone_round_trips_as_utc() {
    let (pair, cert) = issue_self_signed("stub-sender");
    let caracas_time = Caracas.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap();
    let expected_utc = caracas_time.with_timezone(&Utc);

    let field_set = FieldSet::new(
        "recipient",
        "message-id",
        caracas_time.with_timezone(&Utc),
        60,
        vec![],
    )
    .unwrap();

    let message = RamfMessage::<StubCargo>::new(field_set, cert);
    let bytes = message
        .serialize(pair.private_key(), HashingAlgorithm::Sha256)
        .unwrap();

    let parsed = RamfMessage::<StubCargo>::deserialize(&bytes).unwrap();
    assert_eq!(parsed.field_set().creation_time(), expected_utc);
}

/// A certification path built across three freshly issued certificates
/// preserves object identity and ends at the supplied trust anchor.
#[test]
fn certification_path_spans_root_intermediate_and_leaf() {
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

    let path = leaf
        .get_certification_path(std::slice::from_ref(&intermediate), std::slice::from_ref(&root))
        .unwrap();
    assert_eq!(path, vec![&leaf, &intermediate, &root]);
}
