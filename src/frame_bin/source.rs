//! Bin collaborator interface

use crate::signal::{Callback, CallbackId};

use super::frame::{BinHandle, Frame, FrontBufferReady};

/// Shared frame pool feeding one or more connections
///
/// Connections only reach a bin through this trait. Implementations must be
/// callable from any thread; the front-buffer-ready event may be raised from
/// a producer thread.
pub trait Bin: Send + Sync {
    /// Stable identity used for attachment checks
    fn handle(&self) -> BinHandle;

    /// Acquire the current front buffer
    ///
    /// `None` means no frame is available; that is not an error.
    fn lock_front_buffer(&self) -> Option<Frame>;

    /// Release a front buffer previously acquired with [`Bin::lock_front_buffer`]
    fn unlock_front_buffer(&self);

    /// Record one more attached connection
    fn inc_connected(&self);

    /// Record one less attached connection
    fn dec_connected(&self);

    /// Subscribe to front-buffer-ready events
    fn register_front_buffer_ready_callback(
        &self,
        callback: Callback<FrontBufferReady>,
    ) -> CallbackId;

    /// Remove a front-buffer-ready subscription and reset `id`
    fn unregister_front_buffer_ready_callback(&self, id: &mut CallbackId);
}
