// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

//! ASN.1 structure definitions shared by the certificate and CMS layers.
//!
//! This crate mirrors `cryptography-x509`: it only defines DER shapes and
//! the glue needed to read/write them with the `asn1` crate. It performs
//! no cryptographic operations and knows nothing about issuance,
//! validation, or path building (that lives one layer up, in
//! `relaynet-x509-validation`).

pub mod common;
pub mod extensions;
pub mod name;
pub mod oid;
pub mod tbs;

pub use common::{AlgorithmIdentifier, AlgorithmParameters, RawTlv, SubjectPublicKeyInfo, Time};
pub use extensions::{AuthorityKeyIdentifier, BasicConstraints, Extension, Extensions};
pub use name::{AttributeTypeValue, Name, NameRead, NameWrite};
pub use tbs::{Certificate, TbsCertificate, Validity};
