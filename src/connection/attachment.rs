//! Bin attachment
//!
//! A connection is attached to at most one bin. Attachment and the bin-side
//! front-buffer-ready subscription are created and destroyed together:
//!
//! - attach: increment the bin's connected count, then subscribe
//! - detach: unsubscribe, then decrement the connected count
//!
//! The subscribed callback holds only a `Weak` reference to the connection
//! and the epoch it was attached under, so a bin can never call into a
//! dropped connection and a callback left over from an earlier attachment is
//! recognised as stale.

use std::sync::{Arc, Weak};

use crate::frame_bin::{Bin, BinHandle, FrontBufferReady};
use crate::signal::{Callback, CallbackId};

use super::handle::FrameReady;
use super::stream_connection::Shared;

pub(crate) struct Attachment {
    /// Attached bin
    pub bin: Arc<dyn Bin>,
    /// Our subscription on the bin's front-buffer-ready event
    callback_id: CallbackId,
    /// Epoch this attachment was made under
    epoch: u64,
}

impl Attachment {
    /// Attach `shared` to `bin` under `epoch`
    pub(crate) fn attach(shared: &Arc<Shared>, bin: Arc<dyn Bin>, epoch: u64) -> Self {
        bin.inc_connected();

        let callback = forwarding_callback(Arc::downgrade(shared), bin.handle(), epoch);
        let callback_id = bin.register_front_buffer_ready_callback(callback);

        tracing::debug!(
            bin = %bin.handle(),
            callback_id = %callback_id,
            epoch,
            "Attached to bin"
        );

        Self {
            bin,
            callback_id,
            epoch,
        }
    }

    /// Unsubscribe from the bin and release our connected count
    pub(crate) fn detach(mut self) {
        self.bin
            .unregister_front_buffer_ready_callback(&mut self.callback_id);
        self.bin.dec_connected();

        tracing::debug!(bin = %self.bin.handle(), epoch = self.epoch, "Detached from bin");
    }

    pub(crate) fn handle(&self) -> BinHandle {
        self.bin.handle()
    }
}

impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("bin", &self.bin.handle())
            .field("callback_id", &self.callback_id)
            .field("epoch", &self.epoch)
            .finish()
    }
}

fn forwarding_callback(
    shared: Weak<Shared>,
    expected: BinHandle,
    epoch: u64,
) -> Callback<FrontBufferReady> {
    Arc::new(move |event: &FrontBufferReady| {
        let Some(shared) = shared.upgrade() else {
            return;
        };
        on_bin_front_buffer_ready(&shared, expected, epoch, event);
    })
}

fn on_bin_front_buffer_ready(
    shared: &Shared,
    expected: BinHandle,
    epoch: u64,
    event: &FrontBufferReady,
) {
    let current = {
        let mut state = shared.state.lock();
        let current = state.attach_epoch == epoch && event.bin == expected;
        if current {
            state.stats.frame_ready_events += 1;
        } else {
            state.stats.stale_notifications += 1;
        }
        current
    };

    if !current {
        shared.diagnostics.scope(|| {
            tracing::debug!(
                bin = %event.bin,
                expected = %expected,
                frame_index = event.frame_index,
                "Dropped front buffer notification from stale attachment"
            );
        });
        return;
    }

    // Raised with the state lock released
    shared.frame_ready.raise(&FrameReady {
        connection: shared.handle,
        frame_index: event.frame_index,
    });
}
