// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

/// Failures from certificate issuance, parsing, validation, and path
/// building. Message text for the variants quoted by callers is part of the
/// stable contract and must not be reworded.
#[derive(thiserror::Error, Debug)]
pub enum CertificateError {
    #[error("Subject should be a CA if pathLenConstraint={0}")]
    NonCaWithPathLenConstraint(i32),

    #[error("pathLenConstraint should be between 0 and 2 (got {0})")]
    PathLenConstraintOutOfRange(i32),

    #[error("The end date must be later than the start date")]
    ValidityPeriodNotPositive,

    #[error("Issuer certificate should have basic constraints extension")]
    IssuerMissingBasicConstraints,

    #[error("Issuer certificate should be marked as CA")]
    IssuerNotMarkedAsCa,

    #[error("Issuer must have the SubjectKeyIdentifier extension")]
    IssuerMissingSubjectKeyIdentifier,

    #[error("Subject should have a Common Name")]
    SubjectMissingCommonName,

    #[error("Certificate is not yet valid")]
    NotYetValid,

    #[error("Certificate already expired")]
    Expired,

    #[error("Value should be a DER-encoded, X.509 v3 certificate")]
    Malformed(#[source] asn1::ParseError),

    #[error("Value should be a DER-encoded, X.509 v3 certificate")]
    NotVersion3,

    #[error("Failed to initialize path builder; set of trusted CAs might be empty")]
    NoTrustedCas,

    #[error("No certification path could be found")]
    NoCertificationPath,

    #[error("RSA modulus must be at least 2048 bits (got {0})")]
    ModulusTooSmall(u32),

    #[error("Key is not a well-formed RSA key")]
    InvalidKey(#[source] openssl::error::ErrorStack),

    #[error("Unsupported signature algorithm")]
    UnsupportedSignatureAlgorithm,

    #[error("Cryptographic operation failed")]
    CryptoFailure(#[source] openssl::error::ErrorStack),
}

pub type Result<T> = std::result::Result<T, CertificateError>;
