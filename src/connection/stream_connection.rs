//! Stream connection
//!
//! The client-facing connection object: lock/unlock over the attached bin's
//! front buffer, bin attachment, frame-ready callbacks, and the
//! single-outstanding-result protocol for parameters and commands.

use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::error::Result;
use crate::frame_bin::{Bin, BinHandle, Frame};
use crate::signal::{CallbackId, Signal};
use crate::stats::ConnectionStats;
use crate::stream::{CommandId, ParameterBin, ParameterId, Stream, StreamDescription};

use super::attachment::Attachment;
use super::config::{ConnectionConfig, EmptyFrameUnlock};
use super::diagnostics::Diagnostics;
use super::handle::{ConnectionHandle, FrameReady};
use super::result::{ResultToken, Status};
use super::state::{ConnectionState, LockState};
use super::watch::FrameReadyReceiver;

/// State shared between a connection and the callbacks it hands out
pub(crate) struct Shared {
    pub(crate) handle: ConnectionHandle,
    pub(crate) state: Mutex<ConnectionState>,
    pub(crate) frame_ready: Signal<FrameReady>,
    pub(crate) diagnostics: Diagnostics,
}

/// A client's stateful handle onto a stream
///
/// Borrowing the stream ties the connection's lifetime to it. The connection
/// is meant for a single owner; the only concurrent entry point is the
/// front-buffer-ready notification from its bin.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use framelink::{DoubleBufferedBin, Stream, StreamConnection};
///
/// # fn example(stream: &dyn Stream) {
/// let bin = Arc::new(DoubleBufferedBin::new());
/// let mut conn = StreamConnection::new(stream);
/// conn.attach_bin(bin.clone());
///
/// conn.register_frame_ready_callback(|event| {
///     println!("frame {} ready", event.frame_index);
/// });
///
/// bin.present(vec![0u8; 640 * 480]);
/// if let Some(frame) = conn.lock() {
///     println!("read {} bytes", frame.len());
/// }
/// conn.unlock();
/// # }
/// ```
pub struct StreamConnection<'s> {
    stream: &'s dyn Stream,
    config: ConnectionConfig,
    shared: Arc<Shared>,
}

impl<'s> StreamConnection<'s> {
    /// Create a connection with default configuration
    pub fn new(stream: &'s dyn Stream) -> Self {
        Self::with_config(stream, ConnectionConfig::default())
    }

    /// Create a connection with custom configuration
    pub fn with_config(stream: &'s dyn Stream, config: ConnectionConfig) -> Self {
        let handle = ConnectionHandle::next();
        let diagnostics = Diagnostics::new(config.dispatch.clone(), handle);

        let shared = Arc::new(Shared {
            handle,
            state: Mutex::new(ConnectionState::new(handle)),
            frame_ready: Signal::new(),
            diagnostics,
        });

        shared.diagnostics.scope(|| {
            tracing::debug!(stream = %stream.description(), "Connection created");
        });

        Self {
            stream,
            config,
            shared,
        }
    }

    /// Connection identity
    pub fn handle(&self) -> ConnectionHandle {
        self.shared.handle
    }

    /// Connection configuration
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Description of the stream this connection reads
    pub fn description(&self) -> StreamDescription {
        self.stream.description()
    }

    /// Handle of the attached bin, if any
    pub fn bin_handle(&self) -> Option<BinHandle> {
        self.shared
            .state
            .lock()
            .attachment
            .as_ref()
            .map(|a| a.handle())
    }

    /// Lock the current frame
    ///
    /// While locked, repeated calls return the same frame without touching
    /// the bin. `None` means no frame was available (no bin attached, or the
    /// bin had nothing in its front buffer).
    pub fn lock(&mut self) -> Option<Frame> {
        let shared = &self.shared;
        shared.diagnostics.scope(|| {
            let bin = {
                let state = shared.state.lock();
                if let LockState::Locked(frame) = &state.lock_state {
                    return frame.clone();
                }
                state.bin().cloned()
            };

            let frame = bin.as_ref().and_then(|bin| bin.lock_front_buffer());

            let mut state = shared.state.lock();
            match &frame {
                Some(frame) => {
                    state.stats.frames_locked += 1;
                    tracing::trace!(frame_index = frame.index, "Locked");
                }
                None => {
                    state.stats.empty_locks += 1;
                    tracing::trace!(attached = bin.is_some(), "Locked on empty frame");
                }
            }
            state.held_from = if frame.is_some() { bin } else { None };
            state.lock_state = LockState::Locked(frame.clone());
            frame
        })
    }

    /// Release the locked frame
    ///
    /// Unlocking while not locked is a usage error: it is logged, asserted
    /// when `assert_on_misuse` is set, and otherwise ignored. A connection
    /// holding a frame returns it to its bin and becomes unlocked. A
    /// connection holding an empty frame, or whose bin was detached, follows
    /// [`EmptyFrameUnlock`].
    pub fn unlock(&mut self) {
        let shared = &self.shared;
        let assert_on_misuse = self.config.assert_on_misuse;
        let empty_frame_unlock = self.config.empty_frame_unlock;

        shared.diagnostics.scope(|| {
            let release = {
                let mut state = shared.state.lock();

                let holds_frame = match &state.lock_state {
                    LockState::Unlocked => None,
                    LockState::Locked(frame) => Some(frame.is_some()),
                };

                match holds_frame {
                    None => {
                        state.stats.usage_errors += 1;
                        drop(state);
                        tracing::warn!("unlock() called while not locked");
                        assert!(!assert_on_misuse, "unlock() called while not locked");
                        return;
                    }
                    Some(true) if state.attachment.is_some() => {}
                    Some(_) => {
                        if empty_frame_unlock == EmptyFrameUnlock::StayLocked {
                            tracing::trace!(
                                attached = state.attachment.is_some(),
                                "Unlock ignored"
                            );
                            return;
                        }
                    }
                }

                let frame_index = state.lock_state.frame().map(|f| f.index);
                state.lock_state = LockState::Unlocked;
                let held = state.held_from.take();
                if held.is_some() {
                    state.stats.frames_released += 1;
                }
                tracing::trace!(frame_index = ?frame_index, "Unlocked");
                held
            };

            if let Some(bin) = release {
                bin.unlock_front_buffer();
            }
        })
    }

    /// Check if the connection is locked
    pub fn is_locked(&self) -> bool {
        self.shared.state.lock().lock_state.is_locked()
    }

    /// Current lock state
    pub fn lock_state(&self) -> LockState {
        self.shared.state.lock().lock_state.clone()
    }

    /// Mark the connection started
    pub fn start(&mut self) {
        let mut state = self.shared.state.lock();
        if state.started {
            return;
        }
        state.started = true;
        drop(state);

        self.shared
            .diagnostics
            .scope(|| tracing::debug!("Connection started"));
    }

    /// Mark the connection stopped
    pub fn stop(&mut self) {
        let mut state = self.shared.state.lock();
        if !state.started {
            return;
        }
        state.started = false;
        drop(state);

        self.shared
            .diagnostics
            .scope(|| tracing::debug!("Connection stopped"));
    }

    /// Check if the connection is started
    pub fn is_started(&self) -> bool {
        self.shared.state.lock().started
    }

    /// Attach to `bin`, or detach with `None`
    ///
    /// Always detaches from the current bin first (unsubscribe, then
    /// decrement its connected count), even when `bin` is the bin already
    /// attached. Notifications from the previous attachment are dropped from
    /// this point on.
    pub fn set_bin(&mut self, bin: Option<Arc<dyn Bin>>) {
        let shared = &self.shared;
        shared.diagnostics.scope(|| {
            let (previous, epoch) = {
                let mut state = shared.state.lock();
                state.attach_epoch += 1;
                (state.attachment.take(), state.attach_epoch)
            };

            if let Some(previous) = previous {
                previous.detach();
            }

            let attachment = bin.map(|bin| Attachment::attach(shared, bin, epoch));
            shared.state.lock().attachment = attachment;
        })
    }

    /// Attach to `bin`
    pub fn attach_bin(&mut self, bin: Arc<dyn Bin>) {
        self.set_bin(Some(bin));
    }

    /// Detach from the current bin, if any
    pub fn detach_bin(&mut self) {
        self.set_bin(None);
    }

    /// Subscribe to frame-ready events
    pub fn register_frame_ready_callback<F>(&self, callback: F) -> CallbackId
    where
        F: Fn(&FrameReady) + Send + Sync + 'static,
    {
        self.shared.frame_ready.subscribe(callback)
    }

    /// Unsubscribe from frame-ready events and reset `id`
    pub fn unregister_frame_ready_callback(&self, id: &mut CallbackId) {
        self.shared.frame_ready.unsubscribe(id);
    }

    /// Receive frame-ready events through an async channel
    ///
    /// `capacity` bounds how many events a slow receiver can fall behind
    /// before it observes a lag.
    pub fn watch_frames(&self, capacity: usize) -> FrameReadyReceiver {
        let (tx, rx) = broadcast::channel(capacity);
        let callback_id = self.shared.frame_ready.subscribe(move |event: &FrameReady| {
            let _ = tx.send(*event);
        });

        FrameReadyReceiver::new(rx, callback_id, Arc::downgrade(&self.shared))
    }

    /// Apply a stream parameter
    ///
    /// Produces no result and leaves any pending result untouched.
    pub fn set_parameter(&mut self, id: ParameterId, data: &[u8]) {
        self.stream.set_parameter(self.shared.handle, id, data);
    }

    /// Read a stream parameter
    ///
    /// Returns the result length and the token to collect it with. Any
    /// previously pending result is discarded.
    pub fn get_parameter(&mut self, id: ParameterId) -> (usize, ResultToken) {
        let result = self.stream.get_parameter(self.shared.handle, id);
        self.cache_result(result)
    }

    /// Invoke a stream command
    ///
    /// Returns the result length and the token to collect it with. Any
    /// previously pending result is discarded.
    pub fn invoke(&mut self, command: CommandId, data: &[u8]) -> (usize, ResultToken) {
        let result = self.stream.invoke(self.shared.handle, command, data);
        self.cache_result(result)
    }

    /// Collect the pending result identified by `token`
    ///
    /// Results are read-once. Any failure discards the pending result as
    /// well, so the request must be issued again.
    pub fn take_result(&mut self, token: ResultToken) -> Result<Bytes> {
        let shared = &self.shared;
        shared.diagnostics.scope(|| {
            let mut state = shared.state.lock();
            let had_pending = state.results.is_pending();

            match state.results.take(token) {
                Ok(bin) => {
                    state.stats.results_retrieved += 1;
                    Ok(bin.into_bytes())
                }
                Err(err) => {
                    state.stats.invalid_tokens += 1;
                    if had_pending {
                        state.stats.results_discarded += 1;
                    }
                    drop(state);
                    tracing::warn!(error = %err, discarded = had_pending, "Rejected result token");
                    Err(err)
                }
            }
        })
    }

    /// Copy the pending result identified by `token` into `destination`
    ///
    /// Copies `length` bytes, bounded by the result and destination sizes.
    pub fn get_result(
        &mut self,
        token: ResultToken,
        length: usize,
        destination: &mut [u8],
    ) -> Status {
        match self.take_result(token) {
            Ok(data) => {
                let n = length.min(data.len()).min(destination.len());
                destination[..n].copy_from_slice(&data[..n]);
                Status::Success
            }
            Err(err) => err.status(),
        }
    }

    /// Check if a result is waiting to be collected
    pub fn has_pending_result(&self) -> bool {
        self.shared.state.lock().results.is_pending()
    }

    /// Snapshot of this connection's counters
    pub fn stats(&self) -> ConnectionStats {
        self.shared.state.lock().stats.clone()
    }

    fn cache_result(&mut self, result: Option<ParameterBin>) -> (usize, ResultToken) {
        let shared = &self.shared;
        shared.diagnostics.scope(|| {
            let mut state = shared.state.lock();
            let discarded = state.results.is_pending();
            let (len, token) = state.results.cache(result);

            if discarded {
                state.stats.results_discarded += 1;
                tracing::debug!("Discarded unread result");
            }
            if !token.is_null() {
                state.stats.results_issued += 1;
            }

            tracing::trace!(token = %token, len, "Result cached");
            (len, token)
        })
    }
}

impl Drop for StreamConnection<'_> {
    fn drop(&mut self) {
        let held = {
            let mut state = self.shared.state.lock();
            if state.results.clear() {
                state.stats.results_discarded += 1;
            }
            state.lock_state = LockState::Unlocked;
            state.held_from.take()
        };

        if let Some(bin) = held {
            bin.unlock_front_buffer();
        }

        self.set_bin(None);
        self.shared
            .diagnostics
            .scope(|| tracing::debug!("Connection dropped"));
    }
}

impl std::fmt::Debug for StreamConnection<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("StreamConnection")
            .field("handle", &self.shared.handle)
            .field("lock", &state.lock_state)
            .field("started", &state.started)
            .field("attachment", &state.attachment)
            .field("pending_result", &state.results.pending_token())
            .finish()
    }
}
