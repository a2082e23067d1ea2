//! Error types for the object model and its codecs.

use thiserror::Error;

/// Errors that can occur while building, encoding or decoding objects.
#[derive(Debug, Error)]
pub enum ObjectError {
    /// The value has no representation in the object model.
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// A CBOR tag outside the reserved table.
    #[error("unknown tag: {0}")]
    UnknownTag(u64),

    #[error("payload of {size} bytes exceeds limit of {limit} bytes")]
    SizeLimitExceeded { size: usize, limit: usize },

    /// Truncated, corrupt or mis-shaped input.
    #[error("malformed encoding: {0}")]
    MalformedEncoding(String),

    /// Export lookup miss on a module.
    #[error("function not found: {0}")]
    FunctionNotFound(String),

    /// Input decodes but is not in canonical form (strict mode only).
    #[error("non-canonical form: {0}")]
    NonCanonicalForm(String),

    /// Actor id derivation needs at least one nonce.
    #[error("derivation path is empty")]
    EmptyPath,

    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

/// Result type for object operations.
pub type Result<T> = std::result::Result<T, ObjectError>;
