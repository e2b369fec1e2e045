// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

//! CMS (RFC 5652) ASN.1 shapes, restricted to what Relaynet actually puts on
//! the wire: `ContentInfo` wrapping either `SignedData` or `EnvelopedData`,
//! each with exactly one signer/recipient. Grounded on the usage patterns in
//! `src/pkcs7.rs` (`serialize_certificates`, `encrypt_and_serialize`,
//! `deserialize_and_decrypt`); the underlying shape definitions that file
//! imports from aren't in this tree, so these are authored directly against
//! RFC 5652 instead of adapted line-for-line.

use relaynet_x509::common::{AlgorithmIdentifier, RawTlv};
use relaynet_x509::name::Name;
use relaynet_x509::oid;

pub const SIGNED_DATA_VERSION: u8 = 1;
pub const ENVELOPED_DATA_VERSION: u8 = 0;
pub const SIGNER_INFO_VERSION: u8 = 1;
pub const RECIPIENT_INFO_VERSION: u8 = 0;

#[derive(asn1::Asn1Read, asn1::Asn1Write, PartialEq, Eq, Hash, Clone, Debug)]
pub struct ContentInfo<'a> {
    pub content_type: asn1::DefinedByMarker<asn1::ObjectIdentifier>,
    #[defined_by(content_type)]
    pub content: Content<'a>,
}

#[derive(asn1::Asn1DefinedByRead, asn1::Asn1DefinedByWrite, PartialEq, Eq, Hash, Clone, Debug)]
pub enum Content<'a> {
    #[defined_by(oid::PKCS7_DATA_OID)]
    Data(Option<asn1::Explicit<&'a [u8], 0>>),

    #[defined_by(oid::PKCS7_SIGNED_DATA_OID)]
    SignedData(asn1::Explicit<Box<SignedData<'a>>, 0>),

    #[defined_by(oid::PKCS7_ENVELOPED_DATA_OID)]
    EnvelopedData(asn1::Explicit<Box<EnvelopedData<'a>>, 0>),
}

pub type DigestAlgorithmsRead<'a> = asn1::SetOf<'a, AlgorithmIdentifier<'a>>;
pub type DigestAlgorithmsWrite<'a> =
    asn1::SetOfWriter<'a, AlgorithmIdentifier<'a>, Vec<AlgorithmIdentifier<'a>>>;

pub type CertificatesRead<'a> = asn1::SetOf<'a, asn1::Tlv<'a>>;
pub type CertificatesWrite<'a> = asn1::SetOfWriter<'a, asn1::Tlv<'a>, Vec<asn1::Tlv<'a>>>;

pub type SignerInfosRead<'a> = asn1::SetOf<'a, SignerInfo<'a>>;
pub type SignerInfosWrite<'a> = asn1::SetOfWriter<'a, SignerInfo<'a>, Vec<SignerInfo<'a>>>;

#[derive(asn1::Asn1Read, asn1::Asn1Write, PartialEq, Eq, Hash, Clone, Debug)]
pub struct SignedData<'a> {
    pub version: u8,
    pub digest_algorithms:
        relaynet_x509::common::Asn1ReadableOrWritable<'a, DigestAlgorithmsRead<'a>, DigestAlgorithmsWrite<'a>>,
    pub content_info: ContentInfo<'a>,
    #[implicit(0)]
    pub certificates: Option<
        relaynet_x509::common::Asn1ReadableOrWritable<'a, CertificatesRead<'a>, CertificatesWrite<'a>>,
    >,
    #[implicit(1)]
    pub crls: Option<RawTlv<'a>>,
    pub signer_infos:
        relaynet_x509::common::Asn1ReadableOrWritable<'a, SignerInfosRead<'a>, SignerInfosWrite<'a>>,
}

#[derive(asn1::Asn1Read, asn1::Asn1Write, PartialEq, Eq, Hash, Clone, Debug)]
pub struct IssuerAndSerialNumber<'a> {
    pub issuer: Name<'a>,
    pub serial_number: asn1::BigUint<'a>,
}

#[derive(asn1::Asn1Read, asn1::Asn1Write, PartialEq, Eq, Hash, Clone, Debug)]
pub struct SignerInfo<'a> {
    pub version: u8,
    pub issuer_and_serial_number: IssuerAndSerialNumber<'a>,
    pub digest_algorithm: AlgorithmIdentifier<'a>,
    pub signature_algorithm: AlgorithmIdentifier<'a>,
    pub signature: &'a [u8],
}

#[derive(asn1::Asn1Read, asn1::Asn1Write, PartialEq, Eq, Hash, Clone, Debug)]
pub struct EnvelopedData<'a> {
    pub version: u8,
    pub recipient_infos: relaynet_x509::common::Asn1ReadableOrWritable<
        'a,
        asn1::SetOf<'a, RecipientInfo<'a>>,
        asn1::SetOfWriter<'a, RecipientInfo<'a>, Vec<RecipientInfo<'a>>>,
    >,
    pub encrypted_content_info: EncryptedContentInfo<'a>,
}

#[derive(asn1::Asn1Read, asn1::Asn1Write, PartialEq, Eq, Hash, Clone, Debug)]
pub struct RecipientInfo<'a> {
    pub version: u8,
    pub issuer_and_serial_number: IssuerAndSerialNumber<'a>,
    pub key_encryption_algorithm: AlgorithmIdentifier<'a>,
    pub encrypted_key: &'a [u8],
}

#[derive(asn1::Asn1Read, asn1::Asn1Write, PartialEq, Eq, Hash, Clone, Debug)]
pub struct EncryptedContentInfo<'a> {
    pub content_type: asn1::ObjectIdentifier,
    pub content_encryption_algorithm: AlgorithmIdentifier<'a>,
    #[implicit(0)]
    pub encrypted_content: Option<&'a [u8]>,
}
