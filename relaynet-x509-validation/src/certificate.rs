// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

//! The application-facing `Certificate` type: an eagerly-parsed, owned view
//! over a DER-encoded X.509v3 certificate. Unlike `relaynet_x509::tbs::Certificate`,
//! which borrows from the input buffer for the duration of a single parse,
//! this type owns its DER bytes and every field extracted from them, so it
//! can be stored, cloned, and passed across threads without a lifetime tied
//! to the bytes it was built from.

use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};
use openssl::pkey::{PKey, Private, Public};

use relaynet_x509::common::{Asn1ReadableOrWritable, Time};
use relaynet_x509::extensions::{self, BasicConstraints};
use relaynet_x509::name::AttributeTypeValue;
use relaynet_x509::oid;
use relaynet_x509::tbs::{TbsCertificate, Validity};
use relaynet_x509::Certificate as CertificateDer;

use crate::error::{CertificateError, Result};
use crate::sign::{self, HashingAlgorithm};

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
    .expect("certificate validity timestamps are always unambiguous calendar instants")
}

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

/// Strips the leading zero bytes a raw big-endian integer doesn't need,
/// keeping one when the following byte's high bit is set (so the value
/// still reads as positive). `asn1::BigUint::new` rejects anything less
/// minimal than this, and `random_serial_number`'s raw bytes aren't
/// guaranteed to already be minimal.
fn minimal_positive_integer_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut slice = bytes;
    while slice.len() > 1 && slice[0] == 0 && slice[1] < 0x80 {
        slice = &slice[1..];
    }
    slice.to_vec()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicConstraintsValue {
    pub ca: bool,
    pub path_length: Option<u64>,
}

#[derive(Clone)]
pub struct Certificate {
    der: Vec<u8>,
    tbs_der: Vec<u8>,
    signature_value: Vec<u8>,
    signature_hash: HashingAlgorithm,
    version: u8,
    serial_number: Vec<u8>,
    issuer_common_name: String,
    subject_common_name: String,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
    spki_der: Vec<u8>,
    public_key: PKey<Public>,
    basic_constraints: Option<BasicConstraintsValue>,
    subject_key_identifier: Option<Vec<u8>>,
    authority_key_identifier: Option<Vec<u8>>,
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("subject_common_name", &self.subject_common_name)
            .field("issuer_common_name", &self.issuer_common_name)
            .field("not_before", &self.not_before)
            .field("not_after", &self.not_after)
            .finish()
    }
}

impl fmt::Display for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (serial {}, valid {} to {})",
            self.subject_common_name,
            hex::encode(&self.serial_number),
            self.not_before.to_rfc3339(),
            self.not_after.to_rfc3339(),
        )
    }
}

impl PartialEq for Certificate {
    fn eq(&self, other: &Self) -> bool {
        self.der == other.der
    }
}
impl Eq for Certificate {}

impl Hash for Certificate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.der.hash(state);
    }
}

impl Certificate {
    pub fn common_name(&self) -> &str {
        &self.subject_common_name
    }

    pub fn issuer_common_name(&self) -> &str {
        &self.issuer_common_name
    }

    pub fn not_before(&self) -> DateTime<Utc> {
        self.not_before
    }

    pub fn not_after(&self) -> DateTime<Utc> {
        self.not_after
    }

    pub fn public_key(&self) -> &PKey<Public> {
        &self.public_key
    }

    /// The X.509 version this certificate declares, as the number printed
    /// on the wire in conversation (`3` for X.509v3), not the zero-indexed
    /// DER integer (`2`) the certificate actually encodes.
    pub fn version(&self) -> u8 {
        self.version + 1
    }

    pub fn serial_number(&self) -> &[u8] {
        &self.serial_number
    }

    pub fn is_ca(&self) -> bool {
        self.basic_constraints.map(|bc| bc.ca).unwrap_or(false)
    }

    pub fn path_len_constraint(&self) -> Option<u64> {
        self.basic_constraints.and_then(|bc| bc.path_length)
    }

    pub fn subject_key_identifier(&self) -> Option<&[u8]> {
        self.subject_key_identifier.as_deref()
    }

    pub fn authority_key_identifier(&self) -> Option<&[u8]> {
        self.authority_key_identifier.as_deref()
    }

    /// "0" followed by the lowercase hex SHA-256 of the subject's
    /// `SubjectPublicKeyInfo` DER encoding: a 35-character identifier.
    pub fn subject_private_address(&self) -> String {
        let digest = sign::sha256(&self.spki_der);
        format!("0{}", hex::encode(digest))
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.der.clone()
    }

    pub fn deserialize(der: &[u8]) -> Result<Certificate> {
        let parsed = asn1::parse_single::<CertificateDer<'_>>(der)
            .map_err(CertificateError::Malformed)?;
        Certificate::from_parsed(der, &parsed)
    }

    fn from_parsed(der: &[u8], parsed: &CertificateDer<'_>) -> Result<Certificate> {
        let tbs = &parsed.tbs_cert;
        if tbs.version != TbsCertificate::VERSION_3 {
            return Err(CertificateError::NotVersion3);
        }

        let issuer_common_name = extensions_common_name(&tbs.issuer)?;
        let subject_common_name = extensions_common_name(&tbs.subject)?;

        let not_before = asn1_datetime_to_chrono(tbs.validity.not_before.as_datetime());
        let not_after = asn1_datetime_to_chrono(tbs.validity.not_after.as_datetime());

        let spki_der =
            asn1::write_single(&tbs.subject_public_key_info).map_err(|_| CertificateError::NotVersion3)?;
        let public_key =
            PKey::public_key_from_der(&spki_der).map_err(CertificateError::InvalidKey)?;

        let mut basic_constraints = None;
        let mut ski = None;
        let mut aki = None;
        if let Some(exts) = &tbs.extensions {
            if let Some(ext) = extensions::get_extension(exts, &oid::BASIC_CONSTRAINTS_OID) {
                let bc = asn1::parse_single::<BasicConstraints>(ext.extn_value)
                    .map_err(CertificateError::Malformed)?;
                basic_constraints = Some(BasicConstraintsValue {
                    ca: bc.ca,
                    path_length: bc.path_length,
                });
            }
            if let Some(ext) = extensions::get_extension(exts, &oid::SUBJECT_KEY_IDENTIFIER_OID) {
                ski = Some(
                    extensions::parse_subject_key_identifier(ext.extn_value)
                        .map_err(CertificateError::Malformed)?
                        .to_vec(),
                );
            }
            if let Some(ext) = extensions::get_extension(exts, &oid::AUTHORITY_KEY_IDENTIFIER_OID)
            {
                let akid =
                    asn1::parse_single::<extensions::AuthorityKeyIdentifier<'_>>(ext.extn_value)
                        .map_err(CertificateError::Malformed)?;
                aki = akid.key_identifier.map(|v| v.to_vec());
            }
        }

        let tbs_der =
            asn1::write_single(tbs).map_err(|_| CertificateError::NotVersion3)?;
        let signature_hash = sign::hashing_algorithm_from_identifier(&parsed.signature_alg)?;

        Ok(Certificate {
            der: der.to_vec(),
            tbs_der,
            signature_value: parsed.signature_value.as_bytes().to_vec(),
            signature_hash,
            version: tbs.version,
            serial_number: tbs.serial_number.as_bytes().to_vec(),
            issuer_common_name,
            subject_common_name,
            not_before,
            not_after,
            spki_der,
            public_key,
            basic_constraints,
            subject_key_identifier: ski,
            authority_key_identifier: aki,
        })
    }

    /// Checks that the subject has a Common Name and that the current time
    /// falls within the certificate's validity interval.
    pub fn validate(&self) -> Result<()> {
        if self.subject_common_name.is_empty() {
            return Err(CertificateError::SubjectMissingCommonName);
        }
        let now = Utc::now();
        if now < self.not_before {
            return Err(CertificateError::NotYetValid);
        }
        if now > self.not_after {
            return Err(CertificateError::Expired);
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn issue(
        common_name: &str,
        subject_public_key: &PKey<Public>,
        issuer_private_key: &PKey<Private>,
        validity_end: DateTime<Utc>,
        validity_start: DateTime<Utc>,
        issuer_certificate: Option<&Certificate>,
        is_ca: bool,
        path_len_constraint: i32,
    ) -> Result<Certificate> {
        if !is_ca && path_len_constraint != 0 {
            return Err(CertificateError::NonCaWithPathLenConstraint(
                path_len_constraint,
            ));
        }
        if !(0..=2).contains(&path_len_constraint) {
            return Err(CertificateError::PathLenConstraintOutOfRange(
                path_len_constraint,
            ));
        }
        if validity_end <= validity_start {
            return Err(CertificateError::ValidityPeriodNotPositive);
        }

        let subject_spki_der = subject_public_key
            .public_key_to_der()
            .map_err(CertificateError::InvalidKey)?;
        let ski = sign::sha256(&subject_spki_der);

        let (issuer_common_name, aki) = match issuer_certificate {
            Some(issuer_cert) => {
                let bc = issuer_cert
                    .basic_constraints
                    .ok_or(CertificateError::IssuerMissingBasicConstraints)?;
                if !bc.ca {
                    return Err(CertificateError::IssuerNotMarkedAsCa);
                }
                let issuer_ski = issuer_cert
                    .subject_key_identifier
                    .clone()
                    .ok_or(CertificateError::IssuerMissingSubjectKeyIdentifier)?;
                (issuer_cert.subject_common_name.clone(), issuer_ski)
            }
            None => (common_name.to_string(), ski.clone()),
        };

        let serial_number = minimal_positive_integer_bytes(&crate::random_serial_number());

        let path_length = if is_ca && path_len_constraint > 0 {
            Some(path_len_constraint as u64)
        } else if is_ca {
            Some(0)
        } else {
            None
        };
        let basic_constraints_der = asn1::write_single(&BasicConstraints {
            ca: is_ca,
            path_length,
        })
        .expect("BasicConstraints always serializes");

        let aki_der = asn1::write_single(&extensions::AuthorityKeyIdentifier {
            key_identifier: Some(&aki),
        })
        .expect("AuthorityKeyIdentifier always serializes");

        let ski_der = extensions::write_subject_key_identifier(&ski);

        let ext_list = vec![
            extensions::Extension {
                extn_id: oid::BASIC_CONSTRAINTS_OID,
                critical: true,
                extn_value: &basic_constraints_der,
            },
            extensions::Extension {
                extn_id: oid::AUTHORITY_KEY_IDENTIFIER_OID,
                critical: false,
                extn_value: &aki_der,
            },
            extensions::Extension {
                extn_id: oid::SUBJECT_KEY_IDENTIFIER_OID,
                critical: false,
                extn_value: &ski_der,
            },
        ];
        let extensions_write = asn1::SequenceOfWriter::new(ext_list);

        let issuer_cn_units: Vec<u16> = issuer_common_name.encode_utf16().collect();
        let issuer_ava = [AttributeTypeValue {
            type_id: oid::COMMON_NAME_OID,
            value: asn1::BMPString::new_from_codepoints(&issuer_cn_units),
        }];
        let issuer_rdns = [asn1::SetOfWriter::new(&issuer_ava)];

        let subject_cn_units: Vec<u16> = common_name.encode_utf16().collect();
        let subject_ava = [AttributeTypeValue {
            type_id: oid::COMMON_NAME_OID,
            value: asn1::BMPString::new_from_codepoints(&subject_cn_units),
        }];
        let subject_rdns = [asn1::SetOfWriter::new(&subject_ava)];

        let spki_for_tbs = asn1::parse_single::<relaynet_x509::common::SubjectPublicKeyInfo<'_>>(
            &subject_spki_der,
        )
        .map_err(CertificateError::Malformed)?;

        let not_before_dt = chrono_to_asn1_datetime(validity_start);
        let not_after_dt = chrono_to_asn1_datetime(validity_end);

        let tbs = TbsCertificate {
            version: TbsCertificate::VERSION_3,
            serial_number: asn1::BigUint::new(&serial_number)
                .expect("minimal_positive_integer_bytes always yields a minimally-encoded, non-empty integer"),
            signature: sign::rsa_pss_algorithm_identifier(HashingAlgorithm::Sha256),
            issuer: Asn1ReadableOrWritable::new_write(asn1::SequenceOfWriter::new(issuer_rdns)),
            validity: Validity {
                not_before: Time::GeneralizedTime(
                    asn1::GeneralizedTime::new(not_before_dt).expect("valid datetime"),
                ),
                not_after: Time::GeneralizedTime(
                    asn1::GeneralizedTime::new(not_after_dt).expect("valid datetime"),
                ),
            },
            subject: Asn1ReadableOrWritable::new_write(asn1::SequenceOfWriter::new(subject_rdns)),
            subject_public_key_info: spki_for_tbs,
            extensions: Some(Asn1ReadableOrWritable::new_write(extensions_write)),
        };

        let tbs_der = asn1::write_single(&tbs).expect("TbsCertificate always serializes");
        let signature_value = sign::sign(&tbs_der, issuer_private_key, HashingAlgorithm::Sha256)?;

        let cert = relaynet_x509::tbs::Certificate {
            tbs_cert: tbs,
            signature_alg: sign::rsa_pss_algorithm_identifier(HashingAlgorithm::Sha256),
            signature_value: asn1::BitString::new(&signature_value, 0)
                .expect("signature has no unused trailing bits"),
        };
        let der = asn1::write_single(&cert).expect("Certificate always serializes");

        Certificate::deserialize(&der)
    }

    /// Builds the certification path from `self` to a trust anchor in
    /// `trusted_cas`. See `crate::path::get_certification_path`.
    pub fn get_certification_path<'a>(
        &'a self,
        untrusted_intermediates: &'a [Certificate],
        trusted_cas: &'a [Certificate],
    ) -> Result<Vec<&'a Certificate>> {
        crate::path::get_certification_path(self, untrusted_intermediates, trusted_cas)
    }
}

fn extensions_common_name(name: &relaynet_x509::name::Name<'_>) -> Result<String> {
    relaynet_x509::name::common_name_from_rdn_sequence(name.unwrap_read())
        .ok_or(CertificateError::SubjectMissingCommonName)
}

pub(crate) fn tbs_der(cert: &Certificate) -> &[u8] {
    &cert.tbs_der
}

pub(crate) fn signature(cert: &Certificate) -> (&[u8], HashingAlgorithm) {
    (&cert.signature_value, cert.signature_hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyPair;
    use chrono::Duration;

    #[test]
    fn test_self_issued_certificate_round_trips() {
        let pair = KeyPair::generate(2048).unwrap();
        let start = Utc::now();
        let end = start + Duration::days(365);
        let cert = Certificate::issue(
            "root",
            pair.public_key(),
            pair.private_key(),
            end,
            start,
            None,
            true,
            2,
        )
        .unwrap();

        assert_eq!(cert.common_name(), "root");
        assert!(cert.is_ca());
        assert_eq!(cert.path_len_constraint(), Some(2));
        assert_eq!(
            cert.subject_key_identifier(),
            cert.authority_key_identifier()
        );

        let der = cert.serialize();
        let parsed = Certificate::deserialize(&der).unwrap();
        assert_eq!(parsed, cert);
    }

    #[test]
    fn test_minimal_positive_integer_bytes_strips_superfluous_leading_zero() {
        assert_eq!(
            minimal_positive_integer_bytes(&[0x00, 0x01, 0x02]),
            vec![0x01, 0x02]
        );
        assert_eq!(minimal_positive_integer_bytes(&[0x00, 0x00, 0x01]), vec![0x01]);
        assert_eq!(minimal_positive_integer_bytes(&[0x01, 0x02]), vec![0x01, 0x02]);
    }

    #[test]
    fn test_minimal_positive_integer_bytes_keeps_required_leading_zero() {
        // 0x80 as the first remaining byte would read as negative without
        // the leading zero, so it must be kept.
        assert_eq!(
            minimal_positive_integer_bytes(&[0x00, 0x80, 0x01]),
            vec![0x00, 0x80, 0x01]
        );
    }

    #[test]
    fn test_issuance_never_panics_on_serial_number_encoding() {
        // random_serial_number() can legitimately produce a leading 0x00
        // byte; issuing many certificates exercises that path without
        // tripping the BigUint construction below.
        let pair = KeyPair::generate(2048).unwrap();
        let now = Utc::now();
        for _ in 0..64 {
            Certificate::issue(
                "stress",
                pair.public_key(),
                pair.private_key(),
                now + Duration::days(1),
                now,
                None,
                false,
                0,
            )
            .unwrap();
        }
    }

    #[test]
    fn test_non_ca_with_positive_path_len_rejected() {
        let pair = KeyPair::generate(2048).unwrap();
        let start = Utc::now();
        let end = start + Duration::days(1);
        let err = Certificate::issue(
            "leaf",
            pair.public_key(),
            pair.private_key(),
            end,
            start,
            None,
            false,
            1,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CertificateError::NonCaWithPathLenConstraint(1)
        ));
    }

    #[test]
    fn test_path_len_constraint_out_of_range_rejected() {
        let pair = KeyPair::generate(2048).unwrap();
        let start = Utc::now();
        let end = start + Duration::days(1);
        let err = Certificate::issue(
            "leaf", pair.public_key(), pair.private_key(), end, start, None, true, 3,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CertificateError::PathLenConstraintOutOfRange(3)
        ));
    }

    #[test]
    fn test_end_before_start_rejected() {
        let pair = KeyPair::generate(2048).unwrap();
        let now = Utc::now();
        let err = Certificate::issue(
            "leaf", pair.public_key(), pair.private_key(), now, now, None, false, 0,
        )
        .unwrap_err();
        assert!(matches!(err, CertificateError::ValidityPeriodNotPositive));
    }
}
