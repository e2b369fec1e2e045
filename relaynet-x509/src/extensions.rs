// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

//! X.509v3 extensions (RFC 5280 section 4.2), restricted to the three
//! extensions Relaynet certificates carry: `basicConstraints`,
//! `subjectKeyIdentifier`, and `authorityKeyIdentifier`.

use crate::common;

#[derive(asn1::Asn1Read, asn1::Asn1Write, PartialEq, Eq, Hash, Clone, Debug)]
pub struct Extension<'a> {
    pub extn_id: asn1::ObjectIdentifier,
    #[default(false)]
    pub critical: bool,
    pub extn_value: &'a [u8],
}

pub type ExtensionsRead<'a> = asn1::SequenceOf<'a, Extension<'a>>;
pub type ExtensionsWrite<'a> = asn1::SequenceOfWriter<'a, Extension<'a>, Vec<Extension<'a>>>;
pub type Extensions<'a> = common::Asn1ReadableOrWritable<'a, ExtensionsRead<'a>, ExtensionsWrite<'a>>;

/// Finds the (at most one, per RFC 5280 4.2) extension with the given OID.
pub fn get_extension<'a>(
    extensions: &Extensions<'a>,
    oid: &asn1::ObjectIdentifier,
) -> Option<Extension<'a>> {
    extensions
        .unwrap_read()
        .clone()
        .find(|ext| &ext.extn_id == oid)
}

/// `BasicConstraints ::= SEQUENCE { cA BOOLEAN DEFAULT FALSE,
///    pathLenConstraint INTEGER (0..MAX) OPTIONAL }` (RFC 5280 4.2.1.9).
#[derive(asn1::Asn1Read, asn1::Asn1Write, PartialEq, Eq, Hash, Clone, Debug)]
pub struct BasicConstraints {
    #[default(false)]
    pub ca: bool,
    pub path_length: Option<u64>,
}

/// `AuthorityKeyIdentifier ::= SEQUENCE { keyIdentifier [0] IMPLICIT
///    KeyIdentifier OPTIONAL, ... }` (RFC 5280 4.2.1.1). Relaynet only ever
/// populates `keyIdentifier`; the `authorityCertIssuer`/`authorityCertSerialNumber`
/// alternatives are never produced and are ignored on read.
#[derive(asn1::Asn1Read, asn1::Asn1Write, PartialEq, Eq, Hash, Clone, Debug)]
pub struct AuthorityKeyIdentifier<'a> {
    #[implicit(0)]
    pub key_identifier: Option<&'a [u8]>,
}

/// `SubjectKeyIdentifier ::= KeyIdentifier`, i.e. a bare OCTET STRING
/// (RFC 5280 4.2.1.2). The extension value is therefore an OCTET STRING
/// whose DER-encoded content is itself an OCTET STRING.
pub fn parse_subject_key_identifier(extn_value: &[u8]) -> asn1::ParseResult<&[u8]> {
    asn1::parse_single::<&[u8]>(extn_value)
}

pub fn write_subject_key_identifier(key_identifier: &[u8]) -> Vec<u8> {
    asn1::write_single(&key_identifier).expect("octet string is always well-formed")
}
