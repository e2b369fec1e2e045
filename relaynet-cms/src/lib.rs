// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

//! Relaynet's cryptographic message layer: CMS (RFC 5652) `SignedData` for
//! attached, certificate-bearing signatures, and CMS `EnvelopedData` for
//! AES-GCM content encryption under RSA-OAEP key transport. Builds on
//! `relaynet-x509-validation`'s certificates and RSA-PSS signing the way
//! `cryptography-x509`'s `pkcs7` module builds on `cryptography-x509`'s
//! certificate shapes, but narrowed to the single-signer,
//! single-recipient shapes Relaynet actually produces.

pub mod content_info;
mod enveloped_data;
pub mod error;
mod signed_data;

pub use enveloped_data::{EnvelopedData, SymmetricCipher};
pub use error::{CmsError, Result};
pub use signed_data::SignedData;
