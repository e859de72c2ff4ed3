//! Parameter and command payloads
//!
//! Streams answer parameter reads and command invocations with a
//! [`ParameterBin`]: an owned byte buffer the connection caches until the
//! client collects it with its result token.

use bytes::Bytes;

/// Identifier of a stream parameter
pub type ParameterId = i32;

/// Identifier of a stream command
pub type CommandId = i32;

/// Owned result of a parameter read or command invocation
///
/// Dropping the bin releases its storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterBin {
    data: Bytes,
}

impl ParameterBin {
    /// Create a result from its bytes
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    /// Result size in bytes
    pub fn byte_length(&self) -> usize {
        self.data.len()
    }

    /// Result bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the bin, returning its bytes
    pub fn into_bytes(self) -> Bytes {
        self.data
    }
}

impl From<Bytes> for ParameterBin {
    fn from(data: Bytes) -> Self {
        Self { data }
    }
}

impl From<Vec<u8>> for ParameterBin {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}
