// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

/// Failures from CMS SignedData and EnvelopedData production, parsing, and
/// verification. Message text is part of the stable contract.
#[derive(thiserror::Error, Debug)]
pub enum CmsError {
    #[error("Value is not DER-encoded")]
    Malformed(#[source] asn1::ParseError),

    #[error("SignedData value is not wrapped in ContentInfo")]
    NotWrappedInContentInfo,

    #[error("ContentInfo wraps invalid SignedData value")]
    NotSignedData,

    #[error("ContentInfo wraps invalid EnvelopedData value")]
    NotEnvelopedData,

    #[error("SignedData has no SignerInfo")]
    NoSignerInfo,

    #[error("SignedData has no attached content")]
    NoAttachedContent,

    #[error("SignedData has no attached signer certificate")]
    NoSignerCertificate,

    #[error("SignedData signature is invalid")]
    InvalidSignature,

    #[error("Plaintext does not match the expected value")]
    PlaintextMismatch,

    #[error("EnvelopedData has no RecipientInfo")]
    NoRecipientInfo,

    #[error("EnvelopedData has no matching recipient")]
    UnknownRecipient,

    #[error("EnvelopedData has no encrypted content")]
    NoEncryptedContent,

    #[error("Content decryption failed; the key or authentication tag is invalid")]
    DecryptionFailed,

    #[error("Unsupported digest or content-encryption algorithm")]
    UnsupportedAlgorithm,

    #[error(transparent)]
    Certificate(#[from] relaynet_x509_validation::CertificateError),

    #[error("Cryptographic operation failed")]
    CryptoFailure(#[source] openssl::error::ErrorStack),
}

pub type Result<T> = std::result::Result<T, CmsError>;
