//! Connection state
//!
//! Mutable per-connection state, guarded by a single mutex in the
//! connection. Bins are never called while that mutex is held.

use std::sync::Arc;

use crate::frame_bin::{Bin, Frame};
use crate::stats::ConnectionStats;

use super::attachment::Attachment;
use super::handle::ConnectionHandle;
use super::result::ResultSlot;

/// Lock state of a connection
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LockState {
    /// No frame held
    #[default]
    Unlocked,
    /// Locked; `None` when no frame was available
    Locked(Option<Frame>),
}

impl LockState {
    /// Check if locked
    pub fn is_locked(&self) -> bool {
        matches!(self, LockState::Locked(_))
    }

    /// Frame held while locked
    pub fn frame(&self) -> Option<&Frame> {
        match self {
            LockState::Locked(frame) => frame.as_ref(),
            LockState::Unlocked => None,
        }
    }
}

pub(crate) struct ConnectionState {
    /// Current lock state
    pub lock_state: LockState,

    /// Bin the held frame was acquired from
    pub held_from: Option<Arc<dyn Bin>>,

    /// Started flag
    pub started: bool,

    /// Current bin attachment
    pub attachment: Option<Attachment>,

    /// Epoch of the current attachment; forwarding callbacks from any other
    /// epoch are stale
    pub attach_epoch: u64,

    /// Pending parameter/command result
    pub results: ResultSlot,

    /// Counters
    pub stats: ConnectionStats,
}

impl ConnectionState {
    pub(crate) fn new(handle: ConnectionHandle) -> Self {
        Self {
            lock_state: LockState::Unlocked,
            held_from: None,
            started: false,
            attachment: None,
            attach_epoch: 0,
            results: ResultSlot::new(handle),
            stats: ConnectionStats::new(),
        }
    }

    /// Bin currently attached, if any
    pub(crate) fn bin(&self) -> Option<&Arc<dyn Bin>> {
        self.attachment.as_ref().map(|a| &a.bin)
    }
}
