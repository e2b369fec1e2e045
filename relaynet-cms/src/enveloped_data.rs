// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

//! CMS EnvelopedData production and decryption (§4.7): a single
//! KeyTransRecipientInfo wrapping a fresh AES-GCM content-encryption key
//! under the recipient's RSA-OAEP-SHA256 public key. Grounded on
//! `src/pkcs7.rs`'s `encrypt_and_serialize`/`deserialize_and_decrypt` flow,
//! reworked against `openssl::symm`'s AEAD helpers instead of Python's
//! `cryptography` hazmat primitives.

use openssl::encrypt::{Decrypter, Encrypter};
use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Padding;
use openssl::symm::{Cipher, Crypter, Mode};

use relaynet_x509::common::{
    AlgorithmIdentifier, AlgorithmParameters, Asn1ReadableOrWritable, GcmParameters,
    RsaOaepParameters, PSS_SHA256_HASH_ALG, PSS_SHA256_MASK_GEN_ALG,
};
use relaynet_x509::name::AttributeTypeValue;
use relaynet_x509::oid;
use relaynet_x509_validation::Certificate;

use crate::content_info::{
    Content, ContentInfo, EncryptedContentInfo, EnvelopedData as EnvelopedDataAsn1,
    IssuerAndSerialNumber, RecipientInfo, ENVELOPED_DATA_VERSION, RECIPIENT_INFO_VERSION,
};
use crate::error::{CmsError, Result};

const GCM_TAG_LEN: usize = 16;
const GCM_NONCE_LEN: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymmetricCipher {
    Aes128Gcm,
    Aes192Gcm,
    Aes256Gcm,
}

impl SymmetricCipher {
    fn key_len(self) -> usize {
        match self {
            SymmetricCipher::Aes128Gcm => 16,
            SymmetricCipher::Aes192Gcm => 24,
            SymmetricCipher::Aes256Gcm => 32,
        }
    }

    fn openssl_cipher(self) -> Cipher {
        match self {
            SymmetricCipher::Aes128Gcm => Cipher::aes_128_gcm(),
            SymmetricCipher::Aes192Gcm => Cipher::aes_192_gcm(),
            SymmetricCipher::Aes256Gcm => Cipher::aes_256_gcm(),
        }
    }
}

impl Default for SymmetricCipher {
    fn default() -> Self {
        SymmetricCipher::Aes128Gcm
    }
}

fn gcm_algorithm_identifier(cipher: SymmetricCipher, nonce: &[u8]) -> AlgorithmIdentifier<'_> {
    let params = GcmParameters {
        aes_nonce: nonce,
        icv_len: GCM_TAG_LEN as u16,
    };
    let params = match cipher {
        SymmetricCipher::Aes128Gcm => AlgorithmParameters::Aes128Gcm(Some(params)),
        SymmetricCipher::Aes192Gcm => AlgorithmParameters::Aes192Gcm(Some(params)),
        SymmetricCipher::Aes256Gcm => AlgorithmParameters::Aes256Gcm(Some(params)),
    };
    AlgorithmIdentifier {
        oid: asn1::DefinedByMarker::marker(),
        params,
    }
}

fn cipher_and_nonce_from_identifier(alg: &AlgorithmIdentifier<'_>) -> Result<(SymmetricCipher, Vec<u8>)> {
    match &alg.params {
        AlgorithmParameters::Aes128Gcm(Some(p)) => Ok((SymmetricCipher::Aes128Gcm, p.aes_nonce.to_vec())),
        AlgorithmParameters::Aes192Gcm(Some(p)) => Ok((SymmetricCipher::Aes192Gcm, p.aes_nonce.to_vec())),
        AlgorithmParameters::Aes256Gcm(Some(p)) => Ok((SymmetricCipher::Aes256Gcm, p.aes_nonce.to_vec())),
        _ => Err(CmsError::UnsupportedAlgorithm),
    }
}

fn rsa_oaep_sha256_identifier<'a>() -> AlgorithmIdentifier<'a> {
    AlgorithmIdentifier {
        oid: asn1::DefinedByMarker::marker(),
        params: AlgorithmParameters::RsaOaep(Some(Box::new(RsaOaepParameters {
            hash_algorithm: PSS_SHA256_HASH_ALG,
            mask_gen_algorithm: PSS_SHA256_MASK_GEN_ALG,
            p_source_func: None,
        }))),
    }
}

fn wrap_key(cek: &[u8], recipient_public_key: &PKey<openssl::pkey::Public>) -> Result<Vec<u8>> {
    let mut encrypter = Encrypter::new(recipient_public_key).map_err(CmsError::CryptoFailure)?;
    encrypter
        .set_rsa_padding(Padding::PKCS1_OAEP)
        .map_err(CmsError::CryptoFailure)?;
    encrypter
        .set_rsa_oaep_md(MessageDigest::sha256())
        .map_err(CmsError::CryptoFailure)?;
    encrypter
        .set_rsa_mgf1_md(MessageDigest::sha256())
        .map_err(CmsError::CryptoFailure)?;
    let len = encrypter
        .encrypt_len(cek)
        .map_err(CmsError::CryptoFailure)?;
    let mut wrapped = vec![0u8; len];
    let written = encrypter
        .encrypt(cek, &mut wrapped)
        .map_err(CmsError::CryptoFailure)?;
    wrapped.truncate(written);
    Ok(wrapped)
}

fn unwrap_key(encrypted_key: &[u8], recipient_private_key: &PKey<Private>) -> Result<Vec<u8>> {
    let mut decrypter = Decrypter::new(recipient_private_key).map_err(CmsError::CryptoFailure)?;
    decrypter
        .set_rsa_padding(Padding::PKCS1_OAEP)
        .map_err(CmsError::CryptoFailure)?;
    decrypter
        .set_rsa_oaep_md(MessageDigest::sha256())
        .map_err(CmsError::CryptoFailure)?;
    decrypter
        .set_rsa_mgf1_md(MessageDigest::sha256())
        .map_err(CmsError::CryptoFailure)?;
    let len = decrypter
        .decrypt_len(encrypted_key)
        .map_err(CmsError::CryptoFailure)?;
    let mut cek = vec![0u8; len];
    let written = decrypter
        .decrypt(encrypted_key, &mut cek)
        .map_err(|_| CmsError::UnknownRecipient)?;
    cek.truncate(written);
    Ok(cek)
}

fn aes_gcm_encrypt(cipher: SymmetricCipher, key: &[u8], nonce: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let mut crypter = Crypter::new(cipher.openssl_cipher(), Mode::Encrypt, key, Some(nonce))
        .map_err(CmsError::CryptoFailure)?;
    let mut ciphertext = vec![0u8; plaintext.len() + cipher.openssl_cipher().block_size()];
    let mut written = crypter
        .update(plaintext, &mut ciphertext)
        .map_err(CmsError::CryptoFailure)?;
    written += crypter
        .finalize(&mut ciphertext[written..])
        .map_err(CmsError::CryptoFailure)?;
    ciphertext.truncate(written);
    let mut tag = vec![0u8; GCM_TAG_LEN];
    crypter.get_tag(&mut tag).map_err(CmsError::CryptoFailure)?;
    ciphertext.extend_from_slice(&tag);
    Ok(ciphertext)
}

fn aes_gcm_decrypt(
    cipher: SymmetricCipher,
    key: &[u8],
    nonce: &[u8],
    ciphertext_and_tag: &[u8],
) -> Result<Vec<u8>> {
    if ciphertext_and_tag.len() < GCM_TAG_LEN {
        return Err(CmsError::NoEncryptedContent);
    }
    let split = ciphertext_and_tag.len() - GCM_TAG_LEN;
    let (ciphertext, tag) = ciphertext_and_tag.split_at(split);
    let mut crypter = Crypter::new(cipher.openssl_cipher(), Mode::Decrypt, key, Some(nonce))
        .map_err(CmsError::CryptoFailure)?;
    crypter.set_tag(tag).map_err(CmsError::CryptoFailure)?;
    let mut plaintext = vec![0u8; ciphertext.len() + cipher.openssl_cipher().block_size()];
    let mut written = crypter
        .update(ciphertext, &mut plaintext)
        .map_err(CmsError::CryptoFailure)?;
    written += crypter
        .finalize(&mut plaintext[written..])
        .map_err(|_| CmsError::DecryptionFailed)?;
    plaintext.truncate(written);
    Ok(plaintext)
}

/// A parsed or freshly produced CMS `EnvelopedData`, owning its DER bytes
/// and the (still-encrypted) fields extracted from them.
#[derive(Clone)]
pub struct EnvelopedData {
    der: Vec<u8>,
    cipher: SymmetricCipher,
    nonce: Vec<u8>,
    ciphertext_and_tag: Vec<u8>,
    encrypted_key: Vec<u8>,
}

impl EnvelopedData {
    /// Encrypts `plaintext` for `recipient_certificate`. A fresh
    /// content-encryption key and nonce are generated for this call alone.
    pub fn encrypt(
        plaintext: &[u8],
        recipient_certificate: &Certificate,
        symmetric_cipher: SymmetricCipher,
    ) -> Result<EnvelopedData> {
        let mut cek = vec![0u8; symmetric_cipher.key_len()];
        openssl::rand::rand_bytes(&mut cek).map_err(CmsError::CryptoFailure)?;
        let mut nonce = vec![0u8; GCM_NONCE_LEN];
        openssl::rand::rand_bytes(&mut nonce).map_err(CmsError::CryptoFailure)?;

        let ciphertext_and_tag = aes_gcm_encrypt(symmetric_cipher, &cek, &nonce, plaintext)?;
        let encrypted_key = wrap_key(&cek, recipient_certificate.public_key())?;

        let issuer_cn_units: Vec<u16> = recipient_certificate
            .issuer_common_name()
            .encode_utf16()
            .collect();
        let issuer_ava = [AttributeTypeValue {
            type_id: oid::COMMON_NAME_OID,
            value: asn1::BMPString::new_from_codepoints(&issuer_cn_units),
        }];
        let issuer_rdns = [asn1::SetOfWriter::new(&issuer_ava)];
        let issuer_name = Asn1ReadableOrWritable::new_write(asn1::SequenceOfWriter::new(issuer_rdns));

        let recipient_info = RecipientInfo {
            version: RECIPIENT_INFO_VERSION,
            issuer_and_serial_number: IssuerAndSerialNumber {
                issuer: issuer_name,
                serial_number: asn1::BigUint::new(recipient_certificate.serial_number())
                    .expect("certificate serial numbers are always non-empty"),
            },
            key_encryption_algorithm: rsa_oaep_sha256_identifier(),
            encrypted_key: &encrypted_key,
        };
        let recipient_infos = vec![recipient_info];
        let recipient_infos_writer = asn1::SetOfWriter::new(recipient_infos);

        let encrypted_content_info = EncryptedContentInfo {
            content_type: oid::PKCS7_DATA_OID,
            content_encryption_algorithm: gcm_algorithm_identifier(symmetric_cipher, &nonce),
            encrypted_content: Some(&ciphertext_and_tag),
        };

        let enveloped_data = EnvelopedDataAsn1 {
            version: ENVELOPED_DATA_VERSION,
            recipient_infos: Asn1ReadableOrWritable::new_write(recipient_infos_writer),
            encrypted_content_info,
        };

        let outer = ContentInfo {
            content_type: asn1::DefinedByMarker::marker(),
            content: Content::EnvelopedData(asn1::Explicit::new(Box::new(enveloped_data))),
        };
        let der = asn1::write_single(&outer).expect("EnvelopedData always serializes");

        Ok(EnvelopedData {
            der,
            cipher: symmetric_cipher,
            nonce,
            ciphertext_and_tag,
            encrypted_key,
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.der.clone()
    }

    pub fn deserialize(der: &[u8]) -> Result<EnvelopedData> {
        asn1::parse_single::<asn1::Tlv<'_>>(der).map_err(CmsError::Malformed)?;

        let content_info = asn1::parse_single::<ContentInfo<'_>>(der)
            .map_err(|_| CmsError::NotWrappedInContentInfo)?;
        let enveloped_data = match &content_info.content {
            Content::EnvelopedData(boxed) => &**boxed,
            _ => return Err(CmsError::NotEnvelopedData),
        };

        let recipient_info = enveloped_data
            .recipient_infos
            .unwrap_read()
            .clone()
            .next()
            .ok_or(CmsError::NoRecipientInfo)?;

        let (cipher, nonce) =
            cipher_and_nonce_from_identifier(&enveloped_data.encrypted_content_info.content_encryption_algorithm)?;
        let ciphertext_and_tag = enveloped_data
            .encrypted_content_info
            .encrypted_content
            .ok_or(CmsError::NoEncryptedContent)?
            .to_vec();

        Ok(EnvelopedData {
            der: der.to_vec(),
            cipher,
            nonce,
            ciphertext_and_tag,
            encrypted_key: recipient_info.encrypted_key.to_vec(),
        })
    }

    /// Unwraps the content-encryption key under `recipient_private_key` and
    /// decrypts the attached content.
    pub fn decrypt(&self, recipient_private_key: &PKey<Private>) -> Result<Vec<u8>> {
        let cek = unwrap_key(&self.encrypted_key, recipient_private_key)?;
        aes_gcm_decrypt(self.cipher, &cek, &self.nonce, &self.ciphertext_and_tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use relaynet_x509_validation::KeyPair;

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
    fn test_encrypt_and_decrypt_roundtrip() {
        let (pair, cert) = issue_self_signed("recipient");
        let plaintext = b"a secret relaynet payload";
        let enveloped =
            EnvelopedData::encrypt(plaintext, &cert, SymmetricCipher::Aes128Gcm).unwrap();

        let der = enveloped.serialize();
        let parsed = EnvelopedData::deserialize(&der).unwrap();
        let decrypted = parsed.decrypt(pair.private_key()).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_decrypt_with_wrong_key_fails() {
        let (_, cert) = issue_self_signed("recipient");
        let (other_pair, _) = issue_self_signed("someone-else");
        let enveloped =
            EnvelopedData::encrypt(b"payload", &cert, SymmetricCipher::Aes128Gcm).unwrap();
        let parsed = EnvelopedData::deserialize(&enveloped.serialize()).unwrap();
        assert!(parsed.decrypt(other_pair.private_key()).is_err());
    }

    #[test]
    fn test_each_call_uses_a_fresh_key_and_nonce() {
        let (_, cert) = issue_self_signed("recipient");
        let a = EnvelopedData::encrypt(b"same plaintext", &cert, SymmetricCipher::Aes128Gcm).unwrap();
        let b = EnvelopedData::encrypt(b"same plaintext", &cert, SymmetricCipher::Aes128Gcm).unwrap();
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext_and_tag, b.ciphertext_and_tag);
    }
}
