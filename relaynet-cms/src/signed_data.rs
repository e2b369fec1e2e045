// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

//! CMS SignedData production and verification (§4.6): attached content,
//! exactly one SignerInfo, RSA-PSS-MGF1 over the raw content octets (no
//! signed attributes). Grounded on `src/pkcs7.rs`'s `serialize_certificates`
//! flow, reworked against this crate's own ASN.1 shapes.

use relaynet_x509::common::{AlgorithmIdentifier, AlgorithmParameters, Asn1ReadableOrWritable};
use relaynet_x509::name::{AttributeTypeValue, Name};
use relaynet_x509::oid;
use relaynet_x509_validation::sign::{self, HashingAlgorithm};
use relaynet_x509_validation::Certificate;

use openssl::pkey::{PKey, Private};

use crate::content_info::{
    Content, ContentInfo, IssuerAndSerialNumber, SignedData as SignedDataAsn1, SignerInfo,
    SIGNED_DATA_VERSION, SIGNER_INFO_VERSION,
};
use crate::error::{CmsError, Result};

fn hash_algorithm_identifier<'a>(hash: HashingAlgorithm) -> AlgorithmIdentifier<'a> {
    use relaynet_x509::common::{PSS_SHA256_HASH_ALG, PSS_SHA384_HASH_ALG, PSS_SHA512_HASH_ALG};
    match hash {
        HashingAlgorithm::Sha256 => PSS_SHA256_HASH_ALG,
        HashingAlgorithm::Sha384 => PSS_SHA384_HASH_ALG,
        HashingAlgorithm::Sha512 => PSS_SHA512_HASH_ALG,
    }
}

fn hash_algorithm_from_plain_identifier(alg: &AlgorithmIdentifier<'_>) -> Result<HashingAlgorithm> {
    match &alg.params {
        AlgorithmParameters::Sha256(_) => Ok(HashingAlgorithm::Sha256),
        AlgorithmParameters::Sha384(_) => Ok(HashingAlgorithm::Sha384),
        AlgorithmParameters::Sha512(_) => Ok(HashingAlgorithm::Sha512),
        _ => Err(CmsError::UnsupportedAlgorithm),
    }
}

/// A parsed or freshly produced CMS `SignedData`, owning its DER bytes and
/// every field extracted from them (same eager-parse-and-own shape as
/// `relaynet_x509_validation::Certificate`).
#[derive(Clone)]
pub struct SignedData {
    der: Vec<u8>,
    plaintext: Vec<u8>,
    signature: Vec<u8>,
    digest_hash: HashingAlgorithm,
    signer_certificate: Certificate,
    ca_certificates: Vec<Certificate>,
}

impl SignedData {
    /// Signs `plaintext` and attaches `signer_certificate` plus any
    /// additional `ca_certificates`.
    pub fn sign(
        plaintext: &[u8],
        signer_private_key: &PKey<Private>,
        signer_certificate: &Certificate,
        ca_certificates: &[Certificate],
        hashing_algorithm: HashingAlgorithm,
    ) -> Result<SignedData> {
        let signature = sign::sign(plaintext, signer_private_key, hashing_algorithm)
            .map_err(CmsError::Certificate)?;

        let issuer_cn_units: Vec<u16> = signer_certificate.issuer_common_name().encode_utf16().collect();
        let issuer_ava = [AttributeTypeValue {
            type_id: oid::COMMON_NAME_OID,
            value: asn1::BMPString::new_from_codepoints(&issuer_cn_units),
        }];
        let issuer_rdns = [asn1::SetOfWriter::new(&issuer_ava)];
        let issuer_name: Name<'_> =
            Asn1ReadableOrWritable::new_write(asn1::SequenceOfWriter::new(issuer_rdns));

        let signer_info = SignerInfo {
            version: SIGNER_INFO_VERSION,
            issuer_and_serial_number: IssuerAndSerialNumber {
                issuer: issuer_name,
                serial_number: asn1::BigUint::new(signer_certificate.serial_number())
                    .expect("certificate serial numbers are always non-empty"),
            },
            digest_algorithm: hash_algorithm_identifier(hashing_algorithm),
            signature_algorithm: sign::rsa_pss_algorithm_identifier(hashing_algorithm),
            signature: &signature,
        };
        let signer_infos = vec![signer_info];
        let signer_infos_writer = asn1::SetOfWriter::new(signer_infos);

        let digest_algorithms = vec![hash_algorithm_identifier(hashing_algorithm)];
        let digest_algorithms_writer = asn1::SetOfWriter::new(digest_algorithms);

        let content_info = ContentInfo {
            content_type: asn1::DefinedByMarker::marker(),
            content: Content::Data(Some(asn1::Explicit::new(plaintext))),
        };

        let mut cert_ders: Vec<Vec<u8>> = Vec::with_capacity(1 + ca_certificates.len());
        cert_ders.push(signer_certificate.serialize());
        cert_ders.extend(ca_certificates.iter().map(|c| c.serialize()));
        let cert_tlvs: Vec<asn1::Tlv<'_>> = cert_ders
            .iter()
            .map(|der| asn1::parse_single::<asn1::Tlv<'_>>(der).map_err(CmsError::Malformed))
            .collect::<Result<_>>()?;
        let certificates_writer = asn1::SetOfWriter::new(cert_tlvs);

        let signed_data = SignedDataAsn1 {
            version: SIGNED_DATA_VERSION,
            digest_algorithms: Asn1ReadableOrWritable::new_write(digest_algorithms_writer),
            content_info,
            certificates: Some(Asn1ReadableOrWritable::new_write(certificates_writer)),
            crls: None,
            signer_infos: Asn1ReadableOrWritable::new_write(signer_infos_writer),
        };

        let outer = ContentInfo {
            content_type: asn1::DefinedByMarker::marker(),
            content: Content::SignedData(asn1::Explicit::new(Box::new(signed_data))),
        };
        let der = asn1::write_single(&outer).expect("SignedData always serializes");

        Ok(SignedData {
            der,
            plaintext: plaintext.to_vec(),
            signature,
            digest_hash: hashing_algorithm,
            signer_certificate: signer_certificate.clone(),
            ca_certificates: ca_certificates.to_vec(),
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.der.clone()
    }

    pub fn deserialize(der: &[u8]) -> Result<SignedData> {
        asn1::parse_single::<asn1::Tlv<'_>>(der).map_err(CmsError::Malformed)?;

        let content_info = asn1::parse_single::<ContentInfo<'_>>(der)
            .map_err(|_| CmsError::NotWrappedInContentInfo)?;
        let signed_data = match &content_info.content {
            Content::SignedData(boxed) => &**boxed,
            _ => return Err(CmsError::NotSignedData),
        };

        let plaintext = match &signed_data.content_info.content {
            Content::Data(Some(data)) => (*data).to_vec(),
            _ => return Err(CmsError::NoAttachedContent),
        };

        let signer_info = signed_data
            .signer_infos
            .unwrap_read()
            .clone()
            .next()
            .ok_or(CmsError::NoSignerInfo)?;
        let digest_hash = hash_algorithm_from_plain_identifier(&signer_info.digest_algorithm)?;

        let certs_field = signed_data
            .certificates
            .as_ref()
            .ok_or(CmsError::NoSignerCertificate)?;
        let mut certificates = Vec::new();
        for tlv in certs_field.unwrap_read().clone() {
            let cert = Certificate::deserialize(tlv.full_data()).map_err(CmsError::Certificate)?;
            certificates.push(cert);
        }
        if certificates.is_empty() {
            return Err(CmsError::NoSignerCertificate);
        }

        let signer_serial = signer_info.issuer_and_serial_number.serial_number.as_bytes();
        let signer_index = certificates
            .iter()
            .position(|c| c.serial_number() == signer_serial)
            .ok_or(CmsError::NoSignerCertificate)?;
        let signer_certificate = certificates.remove(signer_index);

        let signature = signer_info.signature.to_vec();

        Ok(SignedData {
            der: der.to_vec(),
            plaintext,
            signature,
            digest_hash,
            signer_certificate,
            ca_certificates: certificates,
        })
    }

    pub fn plaintext(&self) -> &[u8] {
        &self.plaintext
    }

    pub fn signer_certificate(&self) -> &Certificate {
        &self.signer_certificate
    }

    pub fn ca_certificates(&self) -> &[Certificate] {
        &self.ca_certificates
    }

    /// Verifies the SignerInfo's signature over the attached content,
    /// optionally asserting the plaintext matches `expected_plaintext`.
    /// Returns the signer certificate and the full attached certificate set.
    pub fn verify(&self, expected_plaintext: Option<&[u8]>) -> Result<(&Certificate, &[Certificate])> {
        if let Some(expected) = expected_plaintext {
            if expected != self.plaintext.as_slice() {
                return Err(CmsError::PlaintextMismatch);
            }
        }
        let verified = sign::verify(
            &self.plaintext,
            &self.signature,
            self.signer_certificate.public_key(),
            self.digest_hash,
        )
        .map_err(CmsError::Certificate)?;
        if !verified {
            return Err(CmsError::InvalidSignature);
        }
        Ok((&self.signer_certificate, &self.ca_certificates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use relaynet_x509_validation::KeyPair;

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

    #[test]
    fn test_sign_and_verify_roundtrip() {
        let (pair, cert) = issue_self_signed("sender");
        let plaintext = b"hello relaynet";
        let signed = SignedData::sign(plaintext, pair.private_key(), &cert, &[], HashingAlgorithm::Sha256)
            .unwrap();

        let der = signed.serialize();
        let parsed = SignedData::deserialize(&der).unwrap();
        assert_eq!(parsed.plaintext(), plaintext);

        let (signer, cas) = parsed.verify(Some(plaintext)).unwrap();
        assert_eq!(signer.common_name(), "sender");
        assert!(cas.is_empty());
    }

    #[test]
    fn test_verify_rejects_plaintext_mismatch() {
        let (pair, cert) = issue_self_signed("sender");
        let signed = SignedData::sign(b"hello", pair.private_key(), &cert, &[], HashingAlgorithm::Sha256)
            .unwrap();
        let parsed = SignedData::deserialize(&signed.serialize()).unwrap();
        let err = parsed.verify(Some(b"goodbye")).unwrap_err();
        assert!(matches!(err, CmsError::PlaintextMismatch));
    }

    #[test]
    fn test_deserialize_rejects_garbage() {
        let err = SignedData::deserialize(b"not a signed data").unwrap_err();
        assert!(matches!(
            err,
            CmsError::Malformed(_) | CmsError::NotWrappedInContentInfo
        ));
    }

    #[test]
    fn test_attached_ca_certificates_round_trip() {
        let (_, ca_cert) = issue_self_signed("ca");
        let (pair, cert) = issue_self_signed("sender");
        let signed = SignedData::sign(
            b"payload",
            pair.private_key(),
            &cert,
            std::slice::from_ref(&ca_cert),
            HashingAlgorithm::Sha256,
        )
        .unwrap();

        let parsed = SignedData::deserialize(&signed.serialize()).unwrap();
        assert_eq!(parsed.ca_certificates().len(), 1);
        assert_eq!(parsed.ca_certificates()[0].common_name(), "ca");
    }
}
