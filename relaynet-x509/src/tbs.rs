// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

//! The DER shape of an X.509v3 certificate (RFC 5280 section 4.1), trimmed
//! to the fields and extension profile Relaynet certificates actually use.
//! This is the wire-level structure used while parsing and while building
//! the bytes to be signed; the owned, application-facing `Certificate` type
//! lives in `relaynet-x509-validation`.

use crate::common;
use crate::extensions;
use crate::name;

#[derive(asn1::Asn1Read, asn1::Asn1Write, PartialEq, Eq, Hash, Clone)]
pub struct Validity {
    pub not_before: common::Time,
    pub not_after: common::Time,
}

#[derive(asn1::Asn1Read, asn1::Asn1Write, PartialEq, Eq, Hash, Clone)]
pub struct TbsCertificate<'a> {
    #[explicit(0)]
    #[default(0u8)]
    pub version: u8,
    pub serial_number: asn1::BigUint<'a>,
    pub signature: common::AlgorithmIdentifier<'a>,
    pub issuer: name::Name<'a>,
    pub validity: Validity,
    pub subject: name::Name<'a>,
    pub subject_public_key_info: common::SubjectPublicKeyInfo<'a>,
    #[explicit(3)]
    pub extensions: Option<extensions::Extensions<'a>>,
}

#[derive(asn1::Asn1Read, asn1::Asn1Write, PartialEq, Eq, Hash, Clone)]
pub struct Certificate<'a> {
    pub tbs_cert: TbsCertificate<'a>,
    pub signature_alg: common::AlgorithmIdentifier<'a>,
    pub signature_value: asn1::BitString<'a>,
}

impl<'a> TbsCertificate<'a> {
    /// X.509v3, the only version Relaynet certificates are ever issued as.
    pub const VERSION_3: u8 = 2;
}
