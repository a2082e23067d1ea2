//! Opaque byte identifiers for actors and modules.

use bytes::Bytes;
use std::fmt;

use crate::error::Result;

/// A byte identifier.
///
/// Content-addressed identifiers (see [`Id::derive_child`]) are always
/// [`Id::LEN`] bytes. Identifiers built directly may be shorter, which is
/// handy for bootstrap and test ids.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(Bytes);

impl Id {
    /// Length of a content-addressed identifier.
    pub const LEN: usize = 20;

    /// Create an identifier from raw bytes.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    /// The all-zero identifier.
    pub fn zero() -> Self {
        static ZERO: [u8; Id::LEN] = [0u8; Id::LEN];
        Self(Bytes::from_static(&ZERO))
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Get the underlying buffer.
    pub fn bytes(&self) -> &Bytes {
        &self.0
    }

    /// Whether this id has the length of a derived identifier.
    pub fn is_content_addressed(&self) -> bool {
        self.0.len() == Self::LEN
    }

    /// Convert to lowercase hex (no prefix).
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Parse from hex, with or without a `0x` prefix.
    ///
    /// Fails with [`ObjectError::InvalidHex`](crate::error::ObjectError::InvalidHex).
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        Ok(Self(hex::decode(s)?.into()))
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.to_hex())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl AsRef<[u8]> for Id {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; Id::LEN]> for Id {
    fn from(bytes: [u8; Id::LEN]) -> Self {
        Self(Bytes::copy_from_slice(&bytes))
    }
}

impl From<Vec<u8>> for Id {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes.into())
    }
}
