// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

//! RSA key generation, grounded on the key-handling conventions of
//! `cryptography-key-parsing`, reworked against the `openssl` crate's safe
//! API instead of a raw FFI wrapper (`cryptography-openssl`), which has no
//! counterpart here.

use openssl::pkey::{Private, Public};
use openssl::pkey::PKey;
use openssl::rsa::Rsa;

use crate::error::{CertificateError, Result};

pub const DEFAULT_MODULUS_BITS: u32 = 2048;

/// An RSA (public, private) pair. Modulus size is always one of 2048, 3072,
/// or 4096 bits; anything smaller is rejected at generation time.
pub struct KeyPair {
    private_key: PKey<Private>,
    public_key: PKey<Public>,
}

impl KeyPair {
    pub fn generate(modulus_bits: u32) -> Result<Self> {
        if modulus_bits < 2048 {
            return Err(CertificateError::ModulusTooSmall(modulus_bits));
        }
        let rsa = Rsa::generate(modulus_bits).map_err(CertificateError::CryptoFailure)?;
        let private_key = PKey::from_rsa(rsa).map_err(CertificateError::InvalidKey)?;
        let public_der = private_key
            .public_key_to_der()
            .map_err(CertificateError::InvalidKey)?;
        let public_key = PKey::public_key_from_der(&public_der).map_err(CertificateError::InvalidKey)?;
        Ok(KeyPair {
            private_key,
            public_key,
        })
    }

    pub fn from_private_key_der(der: &[u8]) -> Result<Self> {
        let private_key = PKey::private_key_from_der(der).map_err(CertificateError::InvalidKey)?;
        let public_der = private_key
            .public_key_to_der()
            .map_err(CertificateError::InvalidKey)?;
        let public_key = PKey::public_key_from_der(&public_der).map_err(CertificateError::InvalidKey)?;
        Ok(KeyPair {
            private_key,
            public_key,
        })
    }

    pub fn private_key(&self) -> &PKey<Private> {
        &self.private_key
    }

    pub fn public_key(&self) -> &PKey<Public> {
        &self.public_key
    }
}

/// Standalone counterpart to `KeyPair::from_private_key_der`, for callers
/// who only hold a peer's public key (e.g. a certificate's subject key).
pub fn public_key_from_der(der: &[u8]) -> Result<PKey<Public>> {
    PKey::public_key_from_der(der).map_err(CertificateError::InvalidKey)
}

pub fn generate_rsa_keypair(modulus_bits: u32) -> Result<KeyPair> {
    KeyPair::generate(modulus_bits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_rejects_small_modulus() {
        let err = KeyPair::generate(1024).unwrap_err();
        assert!(matches!(err, CertificateError::ModulusTooSmall(1024)));
    }

    #[test]
    fn test_generate_default_modulus_succeeds() {
        let pair = KeyPair::generate(DEFAULT_MODULUS_BITS).unwrap();
        assert_eq!(pair.public_key().bits(), DEFAULT_MODULUS_BITS);
    }
}
