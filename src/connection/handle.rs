//! Connection identity and events

use std::sync::atomic::{AtomicU64, Ordering};

use crate::frame_bin::FrameIndex;

/// Opaque identity of a connection, stable for its lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionHandle(u64);

impl ConnectionHandle {
    /// Allocate a process-unique handle
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub(crate) const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw handle value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ConnectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn#{}", self.0)
    }
}

/// Raised by a connection when its bin has a new frame ready
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReady {
    /// Connection raising the event
    pub connection: ConnectionHandle,
    /// Index of the frame now readable through `lock()`
    pub frame_index: FrameIndex,
}
