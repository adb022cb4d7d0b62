//! Preference Layer Error Hierarchy
//!
//! Defines error types for the declarative preference mapping layer,
//! categorized by the stage that produced them: contract interpretation,
//! value conversion, call arguments and backing storage.

use std::io;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Contract shape violations (excess parameters, ambiguous
    /// setter-with-return, duplicate metadata). Raised eagerly at bind
    /// time where detectable, otherwise at the first offending call.
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// Conversion failures, including requests for payload types no
    /// registered converter supports. Raised lazily, only when the
    /// specific call path is exercised.
    #[error(transparent)]
    Convert(#[from] ConvertError),

    /// A call supplied arguments the resolved operation cannot accept,
    /// e.g. a watch-style read without the required seed default.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Backing store failures
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Settings loading failures
    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    /// A single method declaration breaks an invocation rule.
    /// Attributed to the declaring contract and method for diagnosability.
    #[error("{contract}.{method}: {reason}")]
    InvalidMethod {
        contract: String,
        method: String,
        reason: String,
    },

    /// Contract-level violation (duplicate names, conflicting key metadata)
    #[error("{contract}: {reason}")]
    InvalidContract { contract: String, reason: String },

    /// A call referenced a method the contract never declared
    #[error("{contract}: unknown method `{method}`")]
    UnknownMethod { contract: String, method: String },

    /// Call-time argument count does not match the declared signature
    #[error("{contract}.{method}: expected {expected} argument(s), received {received}")]
    ArityMismatch {
        contract: String,
        method: String,
        expected: String,
        received: usize,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// No converter registered for the requested payload type
    #[error("no converter registered for type `{type_name}`")]
    UnsupportedType { type_name: String },

    /// A converter received a payload of a different type than it was
    /// registered for
    #[error("converter payload mismatch: expected `{expected}`")]
    PayloadMismatch { expected: String },

    /// Structural (binary) codec failures
    #[error(transparent)]
    Bincode(#[from] bincode::Error),

    /// JSON codec failures
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Corrupt string armor on a persisted payload
    #[error(transparent)]
    Base64(#[from] base64::DecodeError),

    /// Text-marshalled codec failures
    #[error("text decode failed for `{type_name}`: {reason}")]
    TextDecode { type_name: String, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Disk I/O failures while opening or flushing the store
    #[error(transparent)]
    IoError(#[from] io::Error),

    /// Embedded database errors
    #[error("Embedded database error: {0}")]
    DbError(String),

    /// A persisted value is not valid UTF-8
    #[error("Corrupt stored value for key `{key}`")]
    Corrupt { key: String },
}

// ============== Conversion Implementations ============== //

impl From<sled::Error> for Error {
    fn from(err: sled::Error) -> Self {
        StorageError::DbError(err.to_string()).into()
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        ConvertError::Bincode(err).into()
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        ConvertError::Json(err).into()
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        ConvertError::Base64(err).into()
    }
}
