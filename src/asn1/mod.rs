// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

//! Generic DER SEQUENCE helpers (§4.1): this crate's own analogue of
//! `cryptography-x509`'s low-level `Tlv`/`RawTlv` utilities in
//! `common.rs`. The RAMF field set and the ClientRegistration container
//! both need the same two operations: build a SEQUENCE from
//! already-encoded, positionally-retagged elements, and take one apart
//! while reporting exactly which expectation failed. A single
//! `#[derive(Asn1Read)]` struct can't do that, since any mismatch just fails
//! the whole parse with one generic error rather than the layered
//! diagnostics §4.8 and §6 require.

use asn1::SimpleAsn1Readable;

use crate::error::{Asn1Error, Asn1Result};

mod date_time;
pub use date_time::DerDateTime;

/// The implicit context tag `[n]`, always primitive: every field this crate
/// retags (VisibleString, the DATE-TIME value, INTEGER, OCTET STRING) has a
/// primitive native encoding.
fn implicit_context_tag(n: u8) -> asn1::Tag {
    asn1::Tag::from_bytes(&[0x80 | n])
        .expect("context tag numbers below 31 always parse")
        .0
}

/// Returns the DER encoding of a SEQUENCE built from `items`. When
/// `explicit_tagging` is `false`, each element is retagged in place with an
/// implicit context tag `[0]`, `[1]`, … in order; when `true`, every
/// element keeps its own tag unchanged.
pub fn serialize_sequence(items: &[asn1::Tlv<'_>], explicit_tagging: bool) -> Vec<u8> {
    let elements: Vec<relaynet_x509::common::RawTlv<'_>> = items
        .iter()
        .enumerate()
        .map(|(i, tlv)| {
            let tag = if explicit_tagging {
                tlv.tag()
            } else {
                implicit_context_tag(i as u8)
            };
            relaynet_x509::common::RawTlv::new(tag, tlv.data())
        })
        .collect();
    asn1::write_single(&asn1::SequenceOfWriter::new(elements))
        .expect("a sequence of already-encoded TLVs always serializes")
}

/// Parses `bytes` as a DER SEQUENCE and returns its immediate children as
/// tagged, unparsed TLVs. Distinguishes "not DER at all" from "DER, but not
/// a SEQUENCE", the two failure modes §4.8 and §6 report separately.
pub fn deserialize_heterogeneous_sequence(bytes: &[u8]) -> Asn1Result<Vec<asn1::Tlv<'_>>> {
    if bytes.is_empty() {
        return Err(Asn1Error::Empty);
    }
    asn1::parse_single::<asn1::Tlv<'_>>(bytes).map_err(Asn1Error::Malformed)?;
    let seq = asn1::parse_single::<asn1::SequenceOf<'_, asn1::Tlv<'_>>>(bytes)
        .map_err(|_| Asn1Error::NotASequence)?;
    Ok(seq.collect())
}

/// Parses `bytes` as a DER SEQUENCE and asserts every child decodes as `T`,
/// failing with the given diagnostic name on the first one that doesn't.
pub fn deserialize_homogeneous_sequence<'a, T: asn1::SimpleAsn1Readable<'a>>(
    bytes: &'a [u8],
    type_name: &'static str,
) -> Asn1Result<Vec<T>> {
    deserialize_heterogeneous_sequence(bytes)?
        .into_iter()
        .map(|tlv| T::parse_data(tlv.data()).map_err(|_| Asn1Error::UnexpectedItemType(type_name)))
        .collect()
}

/// Reinterprets an implicitly tagged TLV's contents as a VisibleString.
pub fn visible_string<'a>(tlv: &asn1::Tlv<'a>) -> Asn1Result<&'a str> {
    asn1::VisibleString::parse_data(tlv.data())
        .map(|s| s.as_str())
        .map_err(|_| Asn1Error::UnexpectedItemType("VisibleString"))
}

/// Reinterprets an implicitly tagged TLV's contents as an OCTET STRING.
pub fn octet_string<'a>(tlv: &asn1::Tlv<'a>) -> Asn1Result<&'a [u8]> {
    <&[u8]>::parse_data(tlv.data()).map_err(|_| Asn1Error::UnexpectedItemType("OCTET STRING"))
}

/// Reinterprets an implicitly tagged TLV's contents as an OBJECT IDENTIFIER.
pub fn object_identifier(tlv: &asn1::Tlv<'_>) -> Asn1Result<asn1::ObjectIdentifier> {
    asn1::ObjectIdentifier::parse_data(tlv.data())
        .map_err(|_| Asn1Error::UnexpectedItemType("OBJECT IDENTIFIER"))
}

/// Reinterprets an implicitly tagged TLV's contents as a non-negative
/// INTEGER no wider than `u32` (the RAMF TTL field's native width).
pub fn u32_integer(tlv: &asn1::Tlv<'_>) -> Asn1Result<u32> {
    u32::parse_data(tlv.data()).map_err(|_| Asn1Error::UnexpectedItemType("INTEGER"))
}

/// Reinterprets an implicitly tagged TLV's contents as the custom ASN.1
/// DATE-TIME value the RAMF creationTime field uses (see
/// [`DerDateTime`]), distinct from a GeneralizedTime despite sharing the
/// same tag once implicitly retagged.
pub fn date_time(tlv: &asn1::Tlv<'_>) -> Asn1Result<DerDateTime> {
    DerDateTime::parse_data(tlv.data()).map_err(|_| Asn1Error::UnexpectedItemType("DATE-TIME"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tlv_for<'a>(buf: &'a [u8]) -> asn1::Tlv<'a> {
        asn1::parse_single::<asn1::Tlv<'a>>(buf).unwrap()
    }

    #[test]
    fn test_serialize_sequence_retags_implicitly() {
        let a = asn1::write_single(&asn1::VisibleString::new("hello").unwrap()).unwrap();
        let b = asn1::write_single(&5u32).unwrap();
        let items = [tlv_for(&a), tlv_for(&b)];
        let der = serialize_sequence(&items, false);
        // Outer SEQUENCE tag, then [0] and [1] context-specific primitive tags.
        assert_eq!(der[0], 0x30);
        let parsed = deserialize_heterogeneous_sequence(&der).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].tag(), implicit_context_tag(0));
        assert_eq!(parsed[1].tag(), implicit_context_tag(1));
    }

    #[test]
    fn test_deserialize_heterogeneous_sequence_rejects_empty() {
        assert!(matches!(
            deserialize_heterogeneous_sequence(b""),
            Err(Asn1Error::Empty)
        ));
    }

    #[test]
    fn test_deserialize_heterogeneous_sequence_rejects_garbage() {
        assert!(matches!(
            deserialize_heterogeneous_sequence(b"not der"),
            Err(Asn1Error::Malformed(_))
        ));
    }

    #[test]
    fn test_deserialize_heterogeneous_sequence_rejects_non_sequence() {
        let der = asn1::write_single(&5u32).unwrap();
        assert!(matches!(
            deserialize_heterogeneous_sequence(&der),
            Err(Asn1Error::NotASequence)
        ));
    }

    #[test]
    fn test_visible_string_and_octet_string_getters() {
        let a = asn1::write_single(&asn1::VisibleString::new("hi").unwrap()).unwrap();
        let b = asn1::write_single(&b"payload".as_slice()).unwrap();
        assert_eq!(visible_string(&tlv_for(&a)).unwrap(), "hi");
        assert_eq!(octet_string(&tlv_for(&b)).unwrap(), b"payload");
    }
}
