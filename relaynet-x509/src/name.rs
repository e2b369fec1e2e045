// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

//! Relaynet subject/issuer distinguished names.
//!
//! Unlike a general X.501 `Name`, a Relaynet certificate's subject and
//! issuer are always exactly one `RelativeDistinguishedName` carrying
//! exactly one `AttributeTypeValue`: a `commonName`, encoded as a
//! `BMPString`. We model that fixed shape directly rather than the fully
//! general `SEQUENCE OF SET OF AttributeTypeValue`.

use crate::common;
use crate::oid;

#[derive(asn1::Asn1Read, asn1::Asn1Write, PartialEq, Eq, Hash, Clone, Debug)]
pub struct AttributeTypeValue<'a> {
    pub type_id: asn1::ObjectIdentifier,
    pub value: asn1::BMPString<'a>,
}

/// `RDNSequence ::= SEQUENCE OF RelativeDistinguishedName`, parsed form.
/// Relaynet names always have exactly one RDN with exactly one AVA;
/// `common_name_from_rdn_sequence` enforces that on the way out.
pub type NameRead<'a> = asn1::SequenceOf<'a, asn1::SetOf<'a, AttributeTypeValue<'a>>>;

/// Write-side counterpart. Built at the call site (see
/// `relaynet-x509-validation::issuance`) with a one-element RDN array that
/// outlives the `asn1::write_single` call, the same way `cryptography-rust`
/// builds transient `SetOfWriter`/`SequenceOfWriter` values right before
/// serializing rather than returning them from a helper.
pub type NameWrite<'a> = asn1::SequenceOfWriter<
    'a,
    asn1::SetOfWriter<'a, AttributeTypeValue<'a>>,
    [asn1::SetOfWriter<'a, AttributeTypeValue<'a>>; 1],
>;

/// Read/write dual used for the `issuer`/`subject` fields of `TbsCertificate`,
/// the same pattern `Extensions` uses for the `[3]` extensions field.
pub type Name<'a> = common::Asn1ReadableOrWritable<'a, NameRead<'a>, NameWrite<'a>>;

/// Returns the `commonName` found in a parsed `RDNSequence`, failing if the
/// name doesn't have the single-RDN/single-AVA/commonName shape Relaynet
/// requires.
pub fn common_name_from_rdn_sequence(name: &NameRead<'_>) -> Option<String> {
    let mut rdns = name.clone();
    let rdn = rdns.next()?;
    if rdns.next().is_some() {
        // More than one RDN: not a Relaynet-shaped name.
        return None;
    }
    let mut avas = rdn;
    let ava = avas.next()?;
    if avas.next().is_some() {
        return None;
    }
    if ava.type_id != oid::COMMON_NAME_OID {
        return None;
    }
    String::from_utf16(ava.value.as_utf16_slice()).ok()
}
