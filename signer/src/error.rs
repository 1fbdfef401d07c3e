//! Error types for the signer.
//!
//! Every fallible operation in this crate returns a [`SignerError`]. The
//! variants fall into four families (see [`ErrorKind`]) so callers can branch
//! on *what* went wrong without string-matching error messages:
//!
//! - **Validation**: a required input field was never supplied.
//! - **Decoding**: a hex field or key did not decode to the expected bytes.
//! - **Signing**: key derivation or signature generation failed.
//! - **Encoding**: the canonical codec refused a value or a byte stream.
//!
//! None of these are retried internally. A failure anywhere aborts the whole
//! transaction build; a partially witnessed transaction is never returned.

use std::fmt;

use thiserror::Error;

/// The fields an input must carry before it can be validated.
///
/// The first five are common to every input kind and are checked in this
/// order. `SourceId` only applies to inputs that consume a prior output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredField {
    AssetId,
    Amount,
    Program,
    KeyIndex,
    RootPrivateKey,
    SourceId,
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AssetId => write!(f, "asset id"),
            Self::Amount => write!(f, "amount"),
            Self::Program => write!(f, "program"),
            Self::KeyIndex => write!(f, "key index"),
            Self::RootPrivateKey => write!(f, "root private key"),
            Self::SourceId => write!(f, "source id"),
        }
    }
}

/// Coarse classification of a [`SignerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Decoding,
    Signing,
    Encoding,
}

/// Everything that can go wrong while building and signing a transaction.
#[derive(Debug, Error)]
pub enum SignerError {
    /// A required field was not set before `validate()`/`build()`.
    #[error("the {0} of input must be specified")]
    MissingField(RequiredField),

    /// A hex-encoded field could not be decoded.
    #[error("invalid hex in {field}: {source}")]
    Decoding {
        /// Name of the offending field.
        field: &'static str,
        #[source]
        source: hex::FromHexError,
    },

    /// A decoded field has the wrong number of bytes.
    #[error("invalid length for {field}: expected {expected} bytes, got {got}")]
    InvalidLength {
        /// Name of the offending field.
        field: &'static str,
        /// Required length in bytes.
        expected: usize,
        /// Length actually supplied.
        got: usize,
    },

    /// Key derivation or signature generation failed.
    #[error("signing failed: {0}")]
    Signing(String),

    /// A varint value outside the 63-bit range the ledger accepts.
    #[error("varint value {0} exceeds the 63-bit limit")]
    VarintOverflow(u64),

    /// A byte stream did not follow the canonical encoding.
    #[error("malformed encoding: {0}")]
    Malformed(String),

    /// Transaction-level preconditions (no inputs, too many outputs, ...).
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),
}

impl SignerError {
    /// Returns the family this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingField(_) | Self::InvalidTransaction(_) => ErrorKind::Validation,
            Self::Decoding { .. } | Self::InvalidLength { .. } => ErrorKind::Decoding,
            Self::Signing(_) => ErrorKind::Signing,
            Self::VarintOverflow(_) | Self::Malformed(_) => ErrorKind::Encoding,
        }
    }

    /// Helper for `map_err` on `hex::decode` results.
    pub(crate) fn decoding(field: &'static str) -> impl FnOnce(hex::FromHexError) -> Self {
        move |source| Self::Decoding { field, source }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SignerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_message_names_the_field() {
        let err = SignerError::MissingField(RequiredField::KeyIndex);
        assert_eq!(err.to_string(), "the key index of input must be specified");
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn decoding_errors_keep_their_source() {
        let source = hex::decode("zz").unwrap_err();
        let err = SignerError::decoding("asset id")(source);
        assert_eq!(err.kind(), ErrorKind::Decoding);
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("invalid hex in asset id"));
    }

    #[test]
    fn kinds_are_distinct_per_family() {
        assert_eq!(SignerError::Signing("x".into()).kind(), ErrorKind::Signing);
        assert_eq!(SignerError::VarintOverflow(1 << 63).kind(), ErrorKind::Encoding);
        assert_eq!(
            SignerError::InvalidLength {
                field: "source id",
                expected: 32,
                got: 3
            }
            .kind(),
            ErrorKind::Decoding
        );
    }
}
