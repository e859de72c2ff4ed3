//! Per-client stream connections over shared frame bins
//!
//! A [`StreamConnection`] is one client's stateful handle onto a stream. It
//! mediates between a shared, double-buffered frame source (a *bin*) and a
//! single consumer:
//!
//! - lock/unlock access to the bin's current front buffer
//! - fan-out of "new frame ready" notifications to the client's callbacks
//! - a single-outstanding-result protocol for parameter and command exchange
//!
//! # Architecture
//!
//! ```text
//!     [Producer]                                      [Client]
//!   bin.present()                                 conn.lock() / unlock()
//!         │                                               │
//!         ▼                                               ▼
//!   ┌──────────────┐  front_buffer_ready   ┌──────────────────────────┐
//!   │  Bin         │ ────────────────────► │ StreamConnection         │
//!   │  front/back  │   (Weak forwarding)   │   state: Mutex<...>      │
//!   │  Signal<..>  │ ◄──────────────────── │   frame_ready: Signal    │──► callbacks
//!   └──────────────┘  lock_front_buffer    │   pending result slot    │
//!                                          └────────────┬─────────────┘
//!                                                       │ get_parameter / invoke
//!                                                       ▼
//!                                                 [Stream impl]
//! ```

pub mod connection;
pub mod error;
pub mod frame_bin;
pub mod signal;
pub mod stats;
pub mod stream;

#[cfg(test)]
pub(crate) mod testing;

pub use connection::{
    ConnectionConfig, ConnectionHandle, EmptyFrameUnlock, FrameReady, FrameReadyReceiver,
    LockState, ResultToken, Status, StreamConnection,
};
pub use error::{Error, Result};
pub use frame_bin::{Bin, BinHandle, DoubleBufferedBin, Frame, FrameIndex, FrontBufferReady};
pub use signal::{Callback, CallbackId, Signal};
pub use stats::ConnectionStats;
pub use stream::{CommandId, ParameterBin, ParameterId, Stream, StreamDescription};
