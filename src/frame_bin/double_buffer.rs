//! Double-buffered bin
//!
//! A simple front/back buffer pair. The producer writes into the back buffer
//! with [`DoubleBufferedBin::present`]; the back buffer is promoted to the
//! front as soon as no consumer holds the front buffer locked, and every
//! promotion raises a front-buffer-ready event.

use std::sync::atomic::{AtomicU32, Ordering};

use bytes::Bytes;
use parking_lot::Mutex;

use crate::signal::{Callback, CallbackId, Signal};

use super::frame::{BinHandle, Frame, FrameIndex, FrontBufferReady};
use super::source::Bin;

#[derive(Debug)]
struct Buffers {
    /// Frame consumers read from
    front: Option<Frame>,
    /// Newest frame waiting for the front to be released
    back: Option<Frame>,
    /// Outstanding front buffer locks
    front_locks: u32,
    /// Index assigned to the next presented frame
    next_index: FrameIndex,
}

/// In-memory double-buffered frame bin
pub struct DoubleBufferedBin {
    handle: BinHandle,
    buffers: Mutex<Buffers>,
    connected: AtomicU32,
    front_buffer_ready: Signal<FrontBufferReady>,
}

impl DoubleBufferedBin {
    /// Create an empty bin
    pub fn new() -> Self {
        Self {
            handle: BinHandle::next(),
            buffers: Mutex::new(Buffers {
                front: None,
                back: None,
                front_locks: 0,
                next_index: 0,
            }),
            connected: AtomicU32::new(0),
            front_buffer_ready: Signal::new(),
        }
    }

    /// Publish a new frame
    ///
    /// Returns the index assigned to the frame. If the front buffer is
    /// currently locked the frame waits in the back buffer, replacing any
    /// older frame that was waiting there.
    pub fn present(&self, data: impl Into<Bytes>) -> FrameIndex {
        let (index, promoted) = {
            let mut buffers = self.buffers.lock();
            let index = buffers.next_index;
            buffers.next_index += 1;

            let frame = Frame::new(index, data);
            if buffers.front_locks > 0 {
                if buffers.back.replace(frame).is_some() {
                    tracing::trace!(bin = %self.handle, "Back buffer overwritten before swap");
                }
                (index, false)
            } else {
                buffers.front = Some(frame);
                buffers.back = None;
                (index, true)
            }
        };

        if promoted {
            self.raise_ready(index);
        }
        index
    }

    /// Number of connections currently attached
    pub fn connected_count(&self) -> u32 {
        self.connected.load(Ordering::Relaxed)
    }

    /// Index of the frame in the front buffer, if any
    pub fn front_index(&self) -> Option<FrameIndex> {
        self.buffers.lock().front.as_ref().map(|f| f.index)
    }

    /// Number of outstanding front buffer locks
    pub fn front_lock_count(&self) -> u32 {
        self.buffers.lock().front_locks
    }

    /// Number of front-buffer-ready subscribers
    pub fn callback_count(&self) -> usize {
        self.front_buffer_ready.len()
    }

    fn raise_ready(&self, frame_index: FrameIndex) {
        tracing::trace!(bin = %self.handle, frame_index, "Front buffer ready");
        self.front_buffer_ready.raise(&FrontBufferReady {
            bin: self.handle,
            frame_index,
        });
    }
}

impl Default for DoubleBufferedBin {
    fn default() -> Self {
        Self::new()
    }
}

impl Bin for DoubleBufferedBin {
    fn handle(&self) -> BinHandle {
        self.handle
    }

    fn lock_front_buffer(&self) -> Option<Frame> {
        let mut buffers = self.buffers.lock();
        let frame = buffers.front.clone()?;
        buffers.front_locks += 1;
        Some(frame)
    }

    fn unlock_front_buffer(&self) {
        let promoted = {
            let mut buffers = self.buffers.lock();
            if buffers.front_locks == 0 {
                tracing::warn!(bin = %self.handle, "Front buffer unlocked while not locked");
                return;
            }

            buffers.front_locks -= 1;
            if buffers.front_locks == 0 {
                match buffers.back.take() {
                    Some(frame) => {
                        let index = frame.index;
                        buffers.front = Some(frame);
                        Some(index)
                    }
                    None => None,
                }
            } else {
                None
            }
        };

        if let Some(index) = promoted {
            self.raise_ready(index);
        }
    }

    fn inc_connected(&self) {
        let prev = self.connected.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(bin = %self.handle, connected = prev + 1, "Connection attached");
    }

    fn dec_connected(&self) {
        let result = self
            .connected
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));

        match result {
            Ok(prev) => {
                tracing::debug!(bin = %self.handle, connected = prev - 1, "Connection detached");
            }
            Err(_) => {
                tracing::warn!(bin = %self.handle, "Connected count underflow ignored");
            }
        }
    }

    fn register_front_buffer_ready_callback(
        &self,
        callback: Callback<FrontBufferReady>,
    ) -> CallbackId {
        self.front_buffer_ready.subscribe_shared(callback)
    }

    fn unregister_front_buffer_ready_callback(&self, id: &mut CallbackId) {
        self.front_buffer_ready.unsubscribe(id);
    }
}

impl std::fmt::Debug for DoubleBufferedBin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DoubleBufferedBin")
            .field("handle", &self.handle)
            .field("connected", &self.connected_count())
            .field("callbacks", &self.callback_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn record_ready(bin: &DoubleBufferedBin) -> Arc<Mutex<Vec<FrameIndex>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        bin.register_front_buffer_ready_callback(Arc::new(move |e: &FrontBufferReady| {
            sink.lock().push(e.frame_index)
        }));
        seen
    }

    #[test]
    fn test_empty_bin_has_no_front() {
        let bin = DoubleBufferedBin::new();

        assert!(bin.lock_front_buffer().is_none());
        assert_eq!(bin.front_lock_count(), 0);
        assert_eq!(bin.front_index(), None);
    }

    #[test]
    fn test_present_promotes_when_unlocked() {
        let bin = DoubleBufferedBin::new();
        let seen = record_ready(&bin);

        assert_eq!(bin.present(Bytes::from_static(b"a")), 0);
        assert_eq!(bin.present(Bytes::from_static(b"b")), 1);

        assert_eq!(bin.front_index(), Some(1));
        assert_eq!(*seen.lock(), vec![0, 1]);
    }

    #[test]
    fn test_present_waits_while_front_locked() {
        let bin = DoubleBufferedBin::new();
        let seen = record_ready(&bin);

        bin.present(Bytes::from_static(b"a"));
        let frame = bin.lock_front_buffer().unwrap();
        assert_eq!(frame.index, 0);

        bin.present(Bytes::from_static(b"b"));
        bin.present(Bytes::from_static(b"c"));
        assert_eq!(bin.front_index(), Some(0));
        assert_eq!(*seen.lock(), vec![0]);

        // Release promotes the newest pending frame only
        bin.unlock_front_buffer();
        assert_eq!(bin.front_index(), Some(2));
        assert_eq!(*seen.lock(), vec![0, 2]);
    }

    #[test]
    fn test_unlock_without_lock_is_ignored() {
        let bin = DoubleBufferedBin::new();
        bin.present(Bytes::from_static(b"a"));

        bin.unlock_front_buffer();
        assert_eq!(bin.front_lock_count(), 0);
        assert_eq!(bin.front_index(), Some(0));
    }

    #[test]
    fn test_connected_count() {
        let bin = DoubleBufferedBin::new();

        bin.inc_connected();
        bin.inc_connected();
        assert_eq!(bin.connected_count(), 2);

        bin.dec_connected();
        bin.dec_connected();
        bin.dec_connected();
        assert_eq!(bin.connected_count(), 0);
    }

    #[test]
    fn test_unregister_callback() {
        let bin = DoubleBufferedBin::new();

        let mut id = bin.register_front_buffer_ready_callback(Arc::new(|_: &FrontBufferReady| {}));
        assert_eq!(bin.callback_count(), 1);

        bin.unregister_front_buffer_ready_callback(&mut id);
        assert!(id.is_none());
        assert_eq!(bin.callback_count(), 0);
    }
}
