// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

//! The RAMF message base (§4.9, "Dispatch across message subtypes" in §9):
//! binds a [`FieldSet`] to the sender certificate it was (or will be)
//! signed under, parameterized by the `(concrete_message_type,
//! concrete_message_version)` pair a subtype declares via
//! [`RamfMessageType`]. The codec in `crate::ramf` is payload-agnostic;
//! this module is the thin generic value subtypes like Parcel, Cargo, or
//! CargoCollectionAuthorization sit on top of, supplying their own
//! constants and payload decoder outside this crate.

use std::marker::PhantomData;

use openssl::pkey::{PKey, Private};

use relaynet_x509_validation::sign::HashingAlgorithm;
use relaynet_x509_validation::Certificate;

use crate::error::RamfResult;
use crate::ramf::{self, FieldSet};

/// The two constants a RAMF subtype contributes to the codec: its
/// `concrete_message_type` and `concrete_message_version` bytes. A
/// subtype's own payload decoder lives outside this crate entirely; the
/// codec never inspects `FieldSet::payload`.
pub trait RamfMessageType {
    const MESSAGE_TYPE: u8;
    const MESSAGE_VERSION: u8;
}

/// A RAMF message of subtype `M`: a field set plus the sender certificate
/// it is (or will be) signed under. Immutable once constructed;
/// `serialize` signs it afresh each call rather than caching a signature,
/// and `deserialize` builds a new instance from a verified wire message.
#[derive(Debug, Clone)]
pub struct RamfMessage<M: RamfMessageType> {
    field_set: FieldSet,
    sender_certificate: Certificate,
    _message_type: PhantomData<M>,
}

impl<M: RamfMessageType> RamfMessage<M> {
    pub fn new(field_set: FieldSet, sender_certificate: Certificate) -> Self {
        RamfMessage {
            field_set,
            sender_certificate,
            _message_type: PhantomData,
        }
    }

    pub fn field_set(&self) -> &FieldSet {
        &self.field_set
    }

    pub fn sender_certificate(&self) -> &Certificate {
        &self.sender_certificate
    }

    /// Signs and serializes this message under `sender_private_key`. The
    /// key must correspond to `sender_certificate`'s public key; nothing
    /// in this crate checks that itself, the same way
    /// `relaynet_cms::SignedData::sign` doesn't.
    pub fn serialize(
        &self,
        sender_private_key: &PKey<Private>,
        hashing_algorithm: HashingAlgorithm,
    ) -> RamfResult<Vec<u8>> {
        ramf::serialize(
            &self.field_set,
            M::MESSAGE_TYPE,
            M::MESSAGE_VERSION,
            sender_private_key,
            &self.sender_certificate,
            hashing_algorithm,
        )
    }

    /// Verifies and parses `bytes` as a message of subtype `M`.
    pub fn deserialize(bytes: &[u8]) -> RamfResult<Self> {
        let (field_set, sender_certificate) =
            ramf::deserialize(bytes, M::MESSAGE_TYPE, M::MESSAGE_VERSION)?;
        Ok(RamfMessage::new(field_set, sender_certificate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use relaynet_x509_validation::KeyPair;

    struct StubCargo;
    impl RamfMessageType for StubCargo {
        const MESSAGE_TYPE: u8 = 0x43;
        const MESSAGE_VERSION: u8 = 0x00;
    }

    struct StubParcel;
    impl RamfMessageType for StubParcel {
        const MESSAGE_TYPE: u8 = 0x50;
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

    #[test]
    fn test_message_round_trips_through_its_own_subtype() {
        let (pair, cert) = issue_self_signed("sender");
        let field_set = FieldSet::new(
            "https://gb.relaycorp.tech",
            "cargo-1",
            Utc::now(),
            3600,
            vec![],
        )
        .unwrap();
        let message = RamfMessage::<StubCargo>::new(field_set.clone(), cert.clone());

        let bytes = message
            .serialize(pair.private_key(), HashingAlgorithm::Sha256)
            .unwrap();
        let parsed = RamfMessage::<StubCargo>::deserialize(&bytes).unwrap();
        assert_eq!(parsed.field_set().message_id(), "cargo-1");
        assert_eq!(parsed.sender_certificate(), &cert);
    }

    #[test]
    fn test_message_rejects_a_different_subtypes_bytes() {
        let (pair, cert) = issue_self_signed("sender");
        let field_set = FieldSet::new("addr", "id", Utc::now(), 0, vec![]).unwrap();
        let message = RamfMessage::<StubCargo>::new(field_set, cert);
        let bytes = message
            .serialize(pair.private_key(), HashingAlgorithm::Sha256)
            .unwrap();
        assert!(RamfMessage::<StubParcel>::deserialize(&bytes).is_err());
    }
}
