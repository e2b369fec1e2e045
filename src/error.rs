// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

//! One error enum per subsystem (§7): the generic ASN.1 sequence helpers,
//! the RAMF codec, the ClientRegistration container, and a catch-all for
//! subtype payload decoding. Message text quoted by callers is part of the
//! stable contract; lower-layer causes are chained via `#[source]`/`#[from]`
//! rather than stringified early.

/// Failures from the generic DER SEQUENCE helpers in [`crate::asn1`].
#[derive(thiserror::Error, Debug)]
pub enum Asn1Error {
    #[error("Value is empty")]
    Empty,

    #[error("Value is not DER-encoded")]
    Malformed(#[source] asn1::ParseError),

    #[error("Value is not an ASN.1 sequence")]
    NotASequence,

    #[error("Sequence contains an item of an unexpected type ({0})")]
    UnexpectedItemType(&'static str),
}

pub type Asn1Result<T> = std::result::Result<T, Asn1Error>;

/// Failures from RAMF message serialization and deserialization (§4.8).
#[derive(thiserror::Error, Debug)]
pub enum RamfError {
    #[error("Recipient address exceeds the 1024-character limit (got {0})")]
    RecipientAddressTooLong(usize),

    #[error("Recipient address contains characters outside the VisibleString range")]
    RecipientAddressNotVisibleString,

    #[error("Message id exceeds the 64-character limit (got {0})")]
    MessageIdTooLong(usize),

    #[error("Message id contains characters outside the VisibleString range")]
    MessageIdNotVisibleString,

    #[error("TTL must be between 0 and {} seconds (got {0})", crate::ramf::TTL_MAX_SECONDS)]
    TtlOutOfRange(i64),

    #[error("Payload exceeds the 8 MiB limit (got {0} bytes)")]
    PayloadTooLarge(usize),

    #[error("Serialization is too short to contain format signature")]
    TooShortForFormatSignature,

    #[error("Format signature should start with magic constant 'Relaynet'")]
    InvalidMagicConstant,

    #[error("Message type should be {expected} (got {actual})")]
    UnexpectedMessageType { expected: u8, actual: u8 },

    #[error("Message version should be {expected} (got {actual})")]
    UnexpectedMessageVersion { expected: u8, actual: u8 },

    #[error("Message fields are not a DER-encoded")]
    FieldsMalformed(#[source] Asn1Error),

    #[error("Message fields are not a ASN.1 sequence")]
    FieldsNotASequence,

    #[error("Field sequence should contain {expected} items (got {actual})")]
    UnexpectedFieldCount { expected: usize, actual: usize },

    #[error("Creation time should be an ASN.1 DATE-TIME value")]
    CreationTimeNotDateTime,

    #[error("Field sequence contains an invalid {0}")]
    InvalidField(&'static str, #[source] Asn1Error),

    #[error(transparent)]
    Signing(#[from] relaynet_cms::CmsError),
}

pub type RamfResult<T> = std::result::Result<T, RamfError>;

/// Failures from the ClientRegistration container (§6).
#[derive(thiserror::Error, Debug)]
pub enum ClientRegistrationError {
    #[error("Client registration is not a DER sequence")]
    NotASequence,

    #[error("Client registration sequence should have at least two items (got {0})")]
    TooFewItems(usize),

    #[error("Client registration contains invalid client certificate")]
    InvalidClientCertificate(#[source] relaynet_x509_validation::CertificateError),

    #[error("Client registration contains invalid server certificate")]
    InvalidServerCertificate(#[source] relaynet_x509_validation::CertificateError),
}

pub type ClientRegistrationResult<T> = std::result::Result<T, ClientRegistrationError>;

/// Wraps a subtype's payload-decode failure behind a uniform cause, for
/// consumers that decode a RAMF payload (Parcel, Cargo, …) on top of this
/// crate's codec but want to report failures through one error type.
#[derive(thiserror::Error, Debug)]
#[error("Invalid message")]
pub struct InvalidMessageError(#[source] pub Box<dyn std::error::Error + Send + Sync + 'static>);

impl InvalidMessageError {
    pub fn new(cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        InvalidMessageError(Box::new(cause))
    }
}
