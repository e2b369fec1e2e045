// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

//! The ClientRegistration wire container (§6): a direct DER sibling of the
//! RAMF envelope rather than a RAMF subtype itself, so it is implemented
//! here instead of being left to an external collaborator. A DER SEQUENCE
//! of two implicitly `[0]`/`[1]`-tagged OCTET STRING items: the newly
//! issued client certificate and the issuer's own certificate.

use relaynet_x509_validation::Certificate;

use crate::error::{ClientRegistrationError, ClientRegistrationResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientRegistration {
    client_certificate: Certificate,
    server_certificate: Certificate,
}

impl ClientRegistration {
    pub fn new(client_certificate: Certificate, server_certificate: Certificate) -> Self {
        ClientRegistration {
            client_certificate,
            server_certificate,
        }
    }

    pub fn client_certificate(&self) -> &Certificate {
        &self.client_certificate
    }

    pub fn server_certificate(&self) -> &Certificate {
        &self.server_certificate
    }

    pub fn serialize(&self) -> Vec<u8> {
        let client_der = self.client_certificate.serialize();
        let server_der = self.server_certificate.serialize();
        let client_os =
            asn1::write_single(&client_der.as_slice()).expect("OCTET STRING always serializes");
        let server_os =
            asn1::write_single(&server_der.as_slice()).expect("OCTET STRING always serializes");

        let tlvs = [
            asn1::parse_single::<asn1::Tlv<'_>>(&client_os)
                .expect("a value this module just wrote is well-formed DER"),
            asn1::parse_single::<asn1::Tlv<'_>>(&server_os)
                .expect("a value this module just wrote is well-formed DER"),
        ];
        crate::asn1::serialize_sequence(&tlvs, false)
    }

    pub fn deserialize(bytes: &[u8]) -> ClientRegistrationResult<ClientRegistration> {
        let items = crate::asn1::deserialize_heterogeneous_sequence(bytes)
            .map_err(|_| ClientRegistrationError::NotASequence)?;
        if items.len() < 2 {
            return Err(ClientRegistrationError::TooFewItems(items.len()));
        }

        let client_der = crate::asn1::octet_string(&items[0])
            .map_err(|_| ClientRegistrationError::NotASequence)?;
        let server_der = crate::asn1::octet_string(&items[1])
            .map_err(|_| ClientRegistrationError::NotASequence)?;

        let client_certificate = Certificate::deserialize(client_der)
            .map_err(ClientRegistrationError::InvalidClientCertificate)?;
        let server_certificate = Certificate::deserialize(server_der)
            .map_err(ClientRegistrationError::InvalidServerCertificate)?;

        Ok(ClientRegistration {
            client_certificate,
            server_certificate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use relaynet_x509_validation::KeyPair;

    fn issue_self_signed(cn: &str) -> Certificate {
        let pair = KeyPair::generate(2048).unwrap();
        let now = Utc::now();
        Certificate::issue(
            cn,
            pair.public_key(),
            pair.private_key(),
            now + Duration::days(1),
            now,
            None,
            false,
            0,
        )
        .unwrap()
    }

    #[test]
    fn test_round_trips() {
        let client_cert = issue_self_signed("client");
        let server_cert = issue_self_signed("server");
        let registration = ClientRegistration::new(client_cert.clone(), server_cert.clone());

        let der = registration.serialize();
        let parsed = ClientRegistration::deserialize(&der).unwrap();
        assert_eq!(parsed.client_certificate(), &client_cert);
        assert_eq!(parsed.server_certificate(), &server_cert);
    }

    #[test]
    fn test_rejects_non_sequence() {
        let err = ClientRegistration::deserialize(b"not a sequence").unwrap_err();
        assert!(matches!(err, ClientRegistrationError::NotASequence));
    }

    #[test]
    fn test_rejects_too_few_items() {
        let only_item =
            asn1::write_single(&b"just one".as_slice()).unwrap();
        let tlv = asn1::parse_single::<asn1::Tlv<'_>>(&only_item).unwrap();
        let der = crate::asn1::serialize_sequence(&[tlv], false);
        let err = ClientRegistration::deserialize(&der).unwrap_err();
        assert!(matches!(err, ClientRegistrationError::TooFewItems(1)));
    }

    #[test]
    fn test_rejects_invalid_client_certificate() {
        let server_cert = issue_self_signed("server");
        let bogus_client = asn1::write_single(&b"not a certificate".as_slice()).unwrap();
        let server_der = asn1::write_single(&server_cert.serialize().as_slice()).unwrap();
        let tlvs = [
            asn1::parse_single::<asn1::Tlv<'_>>(&bogus_client).unwrap(),
            asn1::parse_single::<asn1::Tlv<'_>>(&server_der).unwrap(),
        ];
        let der = crate::asn1::serialize_sequence(&tlvs, false);
        let err = ClientRegistration::deserialize(&der).unwrap_err();
        assert!(matches!(
            err,
            ClientRegistrationError::InvalidClientCertificate(_)
        ));
    }
}
