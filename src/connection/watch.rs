//! Async frame-ready notifications
//!
//! Bridges a connection's frame-ready signal into a `tokio::sync::broadcast`
//! channel so async consumers can await new frames instead of registering a
//! callback.

use std::sync::Weak;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

use crate::signal::CallbackId;

use super::handle::FrameReady;
use super::stream_connection::Shared;

/// Receiver of a connection's frame-ready events
///
/// Dropping the receiver unsubscribes it from the connection.
pub struct FrameReadyReceiver {
    rx: broadcast::Receiver<FrameReady>,
    callback_id: CallbackId,
    shared: Weak<Shared>,
}

impl FrameReadyReceiver {
    pub(crate) fn new(
        rx: broadcast::Receiver<FrameReady>,
        callback_id: CallbackId,
        shared: Weak<Shared>,
    ) -> Self {
        Self {
            rx,
            callback_id,
            shared,
        }
    }

    /// Wait for the next frame-ready event
    ///
    /// Returns `RecvError::Lagged` if events were dropped because the
    /// receiver fell behind, and `RecvError::Closed` once the connection is
    /// gone.
    pub async fn recv(&mut self) -> Result<FrameReady, RecvError> {
        self.rx.recv().await
    }

    /// Take the next event without waiting
    pub fn try_recv(&mut self) -> Result<FrameReady, TryRecvError> {
        self.rx.try_recv()
    }

    /// Subscription id on the connection's frame-ready signal
    pub fn callback_id(&self) -> CallbackId {
        self.callback_id
    }
}

impl Drop for FrameReadyReceiver {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.frame_ready.unsubscribe(&mut self.callback_id);
        }
    }
}

impl std::fmt::Debug for FrameReadyReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameReadyReceiver")
            .field("callback_id", &self.callback_id)
            .finish()
    }
}
