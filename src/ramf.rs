// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

//! The RAMF wire format (§4.8): five fixed fields DER-encoded as a SEQUENCE
//! with implicit `[0]`..`[4]` context tags, prefixed with a 10-byte format
//! signature, and wrapped in a CMS SignedData (§4.6) whose attached content
//! *is* that prefixed envelope. This module owns the field set and the
//! signature-checked serializer; binding a field set to a sender
//! certificate for a specific `(message_type, message_version)` pair is
//! `crate::message`'s job.

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};
use openssl::pkey::{PKey, Private};

use relaynet_cms::SignedData;
use relaynet_x509_validation::sign::HashingAlgorithm;
use relaynet_x509_validation::Certificate;

use crate::asn1::DerDateTime;
use crate::error::{Asn1Error, RamfError, RamfResult};

/// The 8-byte ASCII magic constant every RAMF serialization starts with.
pub const RELAYNET_MAGIC: &[u8; 8] = b"Relaynet";

/// `len(RELAYNET_MAGIC) + concrete_message_type + concrete_message_version`.
pub const FORMAT_SIGNATURE_LEN: usize = 10;

/// `recipientAddress` is a VisibleString of at most this many characters.
pub const RECIPIENT_ADDRESS_MAX_CHARS: usize = 1024;

/// `messageId` is a VisibleString of at most this many characters.
pub const MESSAGE_ID_MAX_CHARS: usize = 64;

/// 180 days, expressed in seconds: the maximum `ttlSeconds` value.
pub const TTL_MAX_SECONDS: i64 = 15_552_000;

/// 8 MiB: the maximum `payload` length.
pub const PAYLOAD_MAX_BYTES: usize = 8 * 1024 * 1024;

fn chrono_to_asn1_datetime(dt: DateTime<Utc>) -> asn1::DateTime {
    asn1::DateTime::new(
        dt.year() as u16,
        dt.month() as u8,
        dt.day() as u8,
        dt.hour() as u8,
        dt.minute() as u8,
        dt.second() as u8,
    )
    .expect("chrono only produces valid calendar fields")
}

fn asn1_datetime_to_chrono(dt: &asn1::DateTime) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(
        dt.year() as i32,
        dt.month() as u32,
        dt.day() as u32,
        dt.hour() as u32,
        dt.minute() as u32,
        dt.second() as u32,
    )
    .single()
    .expect("a DATE-TIME value only ever carries a valid, unambiguous calendar instant")
}

/// The five RAMF fields, in wire order: `recipientAddress`, `messageId`,
/// `creationTime`, `ttlSeconds`, `payload`. An immutable value once
/// constructed; `new` is the only way to build one from scratch, and it
/// enforces every bound in §3 up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSet {
    recipient_address: String,
    message_id: String,
    creation_time: DateTime<Utc>,
    ttl_seconds: u32,
    payload: Vec<u8>,
}

impl FieldSet {
    /// Validates and builds a field set. `creation_time` is truncated to
    /// whole-second precision; every other bound in §3 is checked here, in
    /// the order recipient address, message id, ttl, payload.
    pub fn new(
        recipient_address: impl Into<String>,
        message_id: impl Into<String>,
        creation_time: DateTime<Utc>,
        ttl_seconds: i64,
        payload: Vec<u8>,
    ) -> RamfResult<FieldSet> {
        let recipient_address = recipient_address.into();
        let recipient_len = recipient_address.chars().count();
        if recipient_len > RECIPIENT_ADDRESS_MAX_CHARS {
            return Err(RamfError::RecipientAddressTooLong(recipient_len));
        }
        if asn1::VisibleString::new(&recipient_address).is_none() {
            return Err(RamfError::RecipientAddressNotVisibleString);
        }

        let message_id = message_id.into();
        let message_id_len = message_id.chars().count();
        if message_id_len > MESSAGE_ID_MAX_CHARS {
            return Err(RamfError::MessageIdTooLong(message_id_len));
        }
        if asn1::VisibleString::new(&message_id).is_none() {
            return Err(RamfError::MessageIdNotVisibleString);
        }

        if !(0..=TTL_MAX_SECONDS).contains(&ttl_seconds) {
            return Err(RamfError::TtlOutOfRange(ttl_seconds));
        }

        if payload.len() > PAYLOAD_MAX_BYTES {
            return Err(RamfError::PayloadTooLarge(payload.len()));
        }

        let creation_time = creation_time
            .with_nanosecond(0)
            .expect("zeroing the nanosecond field never produces an invalid instant");

        Ok(FieldSet {
            recipient_address,
            message_id,
            creation_time,
            ttl_seconds: ttl_seconds as u32,
            payload,
        })
    }

    pub fn recipient_address(&self) -> &str {
        &self.recipient_address
    }

    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    pub fn creation_time(&self) -> DateTime<Utc> {
        self.creation_time
    }

    pub fn ttl_seconds(&self) -> u32 {
        self.ttl_seconds
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Encodes the five fields as a DER SEQUENCE with implicit `[0]`..`[4]`
    /// context tags, per §4.8 step 3.
    pub(crate) fn to_der(&self) -> Vec<u8> {
        let recipient_der = asn1::write_single(
            &asn1::VisibleString::new(&self.recipient_address)
                .expect("validated as VisibleString at construction"),
        )
        .expect("VisibleString always serializes");
        let message_id_der = asn1::write_single(
            &asn1::VisibleString::new(&self.message_id)
                .expect("validated as VisibleString at construction"),
        )
        .expect("VisibleString always serializes");
        let creation_time_der =
            asn1::write_single(&DerDateTime::new(chrono_to_asn1_datetime(self.creation_time)))
                .expect("DATE-TIME always serializes");
        let ttl_der = asn1::write_single(&self.ttl_seconds).expect("INTEGER always serializes");
        let payload_der =
            asn1::write_single(&self.payload.as_slice()).expect("OCTET STRING always serializes");

        let bufs = [
            recipient_der,
            message_id_der,
            creation_time_der,
            ttl_der,
            payload_der,
        ];
        let tlvs: Vec<asn1::Tlv<'_>> = bufs
            .iter()
            .map(|buf| {
                asn1::parse_single::<asn1::Tlv<'_>>(buf)
                    .expect("a value this module just wrote is well-formed DER")
            })
            .collect();
        crate::asn1::serialize_sequence(&tlvs, false)
    }

    /// Parses a DER SEQUENCE of implicitly `[0]`..`[4]`-tagged fields, per
    /// §4.8 steps 6-8. Does not re-check the length/range bounds `new`
    /// enforces: a field set that made it onto the wire already satisfied
    /// them, and re-validating would only reject a legitimate message
    /// whose bounds happened to sit exactly at the limit.
    pub(crate) fn from_der(bytes: &[u8]) -> RamfResult<FieldSet> {
        let items = crate::asn1::deserialize_heterogeneous_sequence(bytes).map_err(|err| {
            match err {
                Asn1Error::NotASequence => RamfError::FieldsNotASequence,
                other => RamfError::FieldsMalformed(other),
            }
        })?;
        if items.len() != 5 {
            return Err(RamfError::UnexpectedFieldCount {
                expected: 5,
                actual: items.len(),
            });
        }

        let recipient_address = crate::asn1::visible_string(&items[0])
            .map_err(|e| RamfError::InvalidField("recipientAddress", e))?
            .to_string();
        let message_id = crate::asn1::visible_string(&items[1])
            .map_err(|e| RamfError::InvalidField("messageId", e))?
            .to_string();
        let creation_time = crate::asn1::date_time(&items[2])
            .map_err(|_| RamfError::CreationTimeNotDateTime)?;
        let ttl_seconds = crate::asn1::u32_integer(&items[3])
            .map_err(|e| RamfError::InvalidField("ttlSeconds", e))?;
        let payload = crate::asn1::octet_string(&items[4])
            .map_err(|e| RamfError::InvalidField("payload", e))?
            .to_vec();

        Ok(FieldSet {
            recipient_address,
            message_id,
            creation_time: asn1_datetime_to_chrono(creation_time.as_datetime()),
            ttl_seconds,
            payload,
        })
    }
}

/// Serializes `field_set` as a RAMF message of the given
/// `(message_type, message_version)` pair, signed by `sender_private_key`
/// under `sender_certificate`. Implements §4.8 `serialize` end to end.
#[allow(clippy::too_many_arguments)]
pub fn serialize(
    field_set: &FieldSet,
    message_type: u8,
    message_version: u8,
    sender_private_key: &PKey<Private>,
    sender_certificate: &Certificate,
    hashing_algorithm: HashingAlgorithm,
) -> RamfResult<Vec<u8>> {
    let fields_der = field_set.to_der();
    let mut envelope = Vec::with_capacity(FORMAT_SIGNATURE_LEN + fields_der.len());
    envelope.extend_from_slice(RELAYNET_MAGIC);
    envelope.push(message_type);
    envelope.push(message_version);
    envelope.extend_from_slice(&fields_der);

    let signed_data = SignedData::sign(
        &envelope,
        sender_private_key,
        sender_certificate,
        &[],
        hashing_algorithm,
    )?;
    Ok(signed_data.serialize())
}

/// Verifies and parses a RAMF message of the given
/// `(expected_type, expected_version)` pair, returning its field set and
/// sender certificate. Implements §4.8 `deserialize` end to end.
pub fn deserialize(
    bytes: &[u8],
    expected_type: u8,
    expected_version: u8,
) -> RamfResult<(FieldSet, Certificate)> {
    let signed_data = SignedData::deserialize(bytes)?;
    let (sender_certificate, _ca_certificates) = signed_data.verify(None)?;
    let sender_certificate = sender_certificate.clone();
    let content = signed_data.plaintext();

    if content.len() < FORMAT_SIGNATURE_LEN {
        return Err(RamfError::TooShortForFormatSignature);
    }
    if &content[0..8] != RELAYNET_MAGIC {
        return Err(RamfError::InvalidMagicConstant);
    }
    if content[8] != expected_type {
        return Err(RamfError::UnexpectedMessageType {
            expected: expected_type,
            actual: content[8],
        });
    }
    if content[9] != expected_version {
        return Err(RamfError::UnexpectedMessageVersion {
            expected: expected_version,
            actual: content[9],
        });
    }

    let field_set = FieldSet::from_der(&content[FORMAT_SIGNATURE_LEN..])?;
    Ok((field_set, sender_certificate))
}
