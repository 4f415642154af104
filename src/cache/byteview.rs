//! Byte View Module
//!
//! Defines the immutable value type held by the cache and handed to callers.

use std::fmt;

use bytes::Bytes;

use crate::cache::Weighted;

// == Byte View ==
/// An immutable view over cached bytes.
///
/// Cloning is cheap and never copies the payload; nothing can mutate the
/// bytes once they are wrapped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ByteView(Bytes);

impl ByteView {
    // == Constructor ==
    /// Creates a view by copying `data`.
    pub fn copy_from_slice(data: &[u8]) -> Self {
        Self(Bytes::copy_from_slice(data))
    }

    /// Number of bytes in the view.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrows the underlying bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Returns an owned copy of the bytes.
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// Returns the shared buffer without copying.
    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl Weighted for ByteView {
    fn weight(&self) -> usize {
        self.len()
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(data: Vec<u8>) -> Self {
        Self(Bytes::from(data))
    }
}

impl From<Bytes> for ByteView {
    fn from(data: Bytes) -> Self {
        Self(data)
    }
}

impl From<&str> for ByteView {
    fn from(data: &str) -> Self {
        Self::copy_from_slice(data.as_bytes())
    }
}

impl AsRef<[u8]> for ByteView {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl fmt::Display for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}
