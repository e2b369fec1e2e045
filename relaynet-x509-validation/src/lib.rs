// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

//! Certificate issuance, serialization, validation, and certification-path
//! construction for Relaynet's X.509 PKI. Builds on the DER shapes in
//! `relaynet-x509` the way `cryptography-x509-validation` builds on
//! `cryptography-x509`, but replaces that crate's CA/B Forum webpki policy
//! engine with Relaynet's own fixed issuance rules.

mod certificate;
pub mod error;
mod keys;
mod path;
pub mod sign;

pub use certificate::{BasicConstraintsValue, Certificate};
pub use error::{CertificateError, Result};
pub use keys::{generate_rsa_keypair, public_key_from_der, KeyPair, DEFAULT_MODULUS_BITS};
pub use path::get_certification_path;
pub use sign::{hashing_algorithm_from_identifier, rsa_pss_algorithm_identifier, HashingAlgorithm};

/// A cryptographically random positive 64-bit serial number, per §4.3: the
/// top bit is cleared so the DER INTEGER encoding never needs a leading
/// sign-padding byte.
pub fn random_serial_number() -> [u8; 8] {
    let mut bytes = [0u8; 8];
    openssl::rand::rand_bytes(&mut bytes).expect("system RNG is always available");
    bytes[0] &= 0x7f;
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_serial_number_is_positive() {
        let serial = random_serial_number();
        assert_eq!(serial.len(), 8);
        assert_eq!(serial[0] & 0x80, 0);
    }
}
