// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

//! RSA-PSS-MGF1 signing and verification, grounded on
//! `src/x509/sign.rs`'s `compute_signature_algorithm`/`sign_data`/
//! `verify_signature_with_oid`, reworked against `openssl`'s `Signer`/
//! `Verifier` instead of delegating to Python key objects. Relaynet only
//! ever signs with RSA-PSS, so the full key-type/hash-type matrix (EC, DSA,
//! Ed25519, Ed448, PKCS1v15) collapses to a single case.

use openssl::hash::MessageDigest;
use openssl::pkey::{HasPrivate, HasPublic, PKey};
use openssl::rsa::Padding;
use openssl::sign::{RsaPssSaltlen, Signer, Verifier};

use relaynet_x509::common::{AlgorithmIdentifier, AlgorithmParameters, RsaPssParameters};
use relaynet_x509::oid;

use crate::error::{CertificateError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashingAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl HashingAlgorithm {
    fn message_digest(self) -> MessageDigest {
        match self {
            HashingAlgorithm::Sha256 => MessageDigest::sha256(),
            HashingAlgorithm::Sha384 => MessageDigest::sha384(),
            HashingAlgorithm::Sha512 => MessageDigest::sha512(),
        }
    }

    fn salt_length(self) -> u16 {
        match self {
            HashingAlgorithm::Sha256 => 32,
            HashingAlgorithm::Sha384 => 48,
            HashingAlgorithm::Sha512 => 64,
        }
    }
}

impl Default for HashingAlgorithm {
    fn default() -> Self {
        HashingAlgorithm::Sha256
    }
}

/// Builds the `id-RSASSA-PSS` `AlgorithmIdentifier` that goes alongside a
/// signature produced with the given hash algorithm.
pub fn rsa_pss_algorithm_identifier<'a>(hash: HashingAlgorithm) -> AlgorithmIdentifier<'a> {
    use relaynet_x509::common::{
        MaskGenAlgorithm, PSS_SHA256_HASH_ALG, PSS_SHA256_MASK_GEN_ALG, PSS_SHA384_HASH_ALG,
        PSS_SHA384_MASK_GEN_ALG, PSS_SHA512_HASH_ALG, PSS_SHA512_MASK_GEN_ALG,
    };

    let (hash_algorithm, mask_gen_algorithm): (AlgorithmIdentifier<'a>, MaskGenAlgorithm<'a>) =
        match hash {
            HashingAlgorithm::Sha256 => (PSS_SHA256_HASH_ALG, PSS_SHA256_MASK_GEN_ALG),
            HashingAlgorithm::Sha384 => (PSS_SHA384_HASH_ALG, PSS_SHA384_MASK_GEN_ALG),
            HashingAlgorithm::Sha512 => (PSS_SHA512_HASH_ALG, PSS_SHA512_MASK_GEN_ALG),
        };
    AlgorithmIdentifier {
        oid: asn1::DefinedByMarker::marker(),
        params: AlgorithmParameters::RsaPss(Some(Box::new(RsaPssParameters {
            hash_algorithm,
            mask_gen_algorithm,
            salt_length: hash.salt_length(),
            _trailer_field: 1,
        }))),
    }
}

/// Recovers the hash algorithm used by a parsed `id-RSASSA-PSS`
/// `AlgorithmIdentifier`, failing closed on any other signature algorithm.
pub fn hashing_algorithm_from_identifier(alg: &AlgorithmIdentifier<'_>) -> Result<HashingAlgorithm> {
    match &alg.params {
        AlgorithmParameters::RsaPss(Some(params)) => {
            match &params.hash_algorithm.params {
                AlgorithmParameters::Sha256(_) => Ok(HashingAlgorithm::Sha256),
                AlgorithmParameters::Sha384(_) => Ok(HashingAlgorithm::Sha384),
                AlgorithmParameters::Sha512(_) => Ok(HashingAlgorithm::Sha512),
                _ => Err(CertificateError::UnsupportedSignatureAlgorithm),
            }
        }
        _ => Err(CertificateError::UnsupportedSignatureAlgorithm),
    }
}

pub fn sign<T: HasPrivate>(
    data: &[u8],
    private_key: &PKey<T>,
    hash: HashingAlgorithm,
) -> Result<Vec<u8>> {
    let digest = hash.message_digest();
    let mut signer = Signer::new(digest, private_key).map_err(CertificateError::CryptoFailure)?;
    signer
        .set_rsa_padding(Padding::PKCS1_PSS)
        .map_err(CertificateError::CryptoFailure)?;
    signer
        .set_rsa_mgf1_md(digest)
        .map_err(CertificateError::CryptoFailure)?;
    signer
        .set_rsa_pss_saltlen(RsaPssSaltlen::custom(hash.salt_length() as i32))
        .map_err(CertificateError::CryptoFailure)?;
    signer.update(data).map_err(CertificateError::CryptoFailure)?;
    signer.sign_to_vec().map_err(CertificateError::CryptoFailure)
}

pub fn verify<T: HasPublic>(
    data: &[u8],
    signature: &[u8],
    public_key: &PKey<T>,
    hash: HashingAlgorithm,
) -> Result<bool> {
    let digest = hash.message_digest();
    let mut verifier =
        Verifier::new(digest, public_key).map_err(CertificateError::CryptoFailure)?;
    verifier
        .set_rsa_padding(Padding::PKCS1_PSS)
        .map_err(CertificateError::CryptoFailure)?;
    verifier
        .set_rsa_mgf1_md(digest)
        .map_err(CertificateError::CryptoFailure)?;
    verifier
        .set_rsa_pss_saltlen(RsaPssSaltlen::custom(hash.salt_length() as i32))
        .map_err(CertificateError::CryptoFailure)?;
    verifier.update(data).map_err(CertificateError::CryptoFailure)?;
    verifier
        .verify(signature)
        .map_err(CertificateError::CryptoFailure)
}

pub fn sha256(data: &[u8]) -> Vec<u8> {
    openssl::hash::hash(MessageDigest::sha256(), data)
        .expect("sha256 is always available")
        .to_vec()
}
