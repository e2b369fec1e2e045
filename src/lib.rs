// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

//! Relaynet Abstract Message Format (RAMF) codec and supporting PKI.
//!
//! This crate aggregates three leaf crates the way `cryptography-rust`
//! aggregates `cryptography-x509`/`cryptography-x509-validation`/the CMS
//! handling in `pkcs7.rs` behind one public surface:
//!
//! - [`relaynet_x509`]: ASN.1 structure definitions (algorithm
//!   identifiers, names, extensions, the certificate TBS structure).
//! - [`relaynet_x509_validation`]: certificate issuance, validation, and
//!   certification-path building ([`Certificate`], [`KeyPair`]).
//! - [`relaynet_cms`]: CMS `SignedData`/`EnvelopedData` ([`SignedData`],
//!   [`EnvelopedData`]).
//!
//! On top of those, this crate adds the generic ASN.1 SEQUENCE helpers
//! (§4.1, [`asn1`]), the RAMF wire codec (§4.8, [`ramf`]), the RAMF
//! message base that binds a field set to a sender certificate for a
//! given subtype (§4.9, [`message`]), and the ClientRegistration wire
//! container (§6, [`client_registration`]).
//!
//! Message subtypes (Parcel, Cargo, CargoCollectionAuthorization) are
//! external collaborators: they implement [`message::RamfMessageType`]
//! and decode `FieldSet::payload` themselves. This crate never inspects
//! payload bytes.

pub mod asn1;
pub mod client_registration;
pub mod error;
pub mod message;
pub mod ramf;

pub use client_registration::ClientRegistration;
pub use error::{
    Asn1Error, Asn1Result, ClientRegistrationError, ClientRegistrationResult, InvalidMessageError,
    RamfError, RamfResult,
};
pub use message::{RamfMessage, RamfMessageType};
pub use ramf::FieldSet;

pub use relaynet_cms::{CmsError, EnvelopedData, SignedData, SymmetricCipher};
pub use relaynet_x509_validation::{
    generate_rsa_keypair, public_key_from_der, random_serial_number, sign::HashingAlgorithm,
    BasicConstraintsValue, Certificate, CertificateError, KeyPair, DEFAULT_MODULUS_BITS,
};
