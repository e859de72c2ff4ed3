//! Frame and bin identity types
//!
//! This module defines the frames handed out by a bin's front buffer and
//! the event a bin raises when a new front buffer becomes available.

use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;

/// Monotonically increasing index of a frame produced by a bin
pub type FrameIndex = i64;

/// Stable opaque identity of a bin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BinHandle(u64);

impl BinHandle {
    /// Allocate a process-unique handle
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw handle value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for BinHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bin#{}", self.0)
    }
}

/// A frame read from a bin's front buffer
///
/// Cheap to clone: the payload is reference counted via `Bytes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Index assigned by the producing bin
    pub index: FrameIndex,
    /// Frame payload
    pub data: Bytes,
}

impl Frame {
    /// Create a frame
    pub fn new(index: FrameIndex, data: impl Into<Bytes>) -> Self {
        Self {
            index,
            data: data.into(),
        }
    }

    /// Payload size in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the payload is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Raised by a bin when a new front buffer is ready
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontBufferReady {
    /// Bin that raised the event
    pub bin: BinHandle,
    /// Index of the frame now in the front buffer
    pub frame_index: FrameIndex,
}
