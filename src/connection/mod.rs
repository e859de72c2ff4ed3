//! Stream connections
//!
//! A [`StreamConnection`] composes three pieces:
//!
//! - the lock/unlock state machine over its bin's front buffer
//! - the bin attachment, which reference-counts membership in a bin and
//!   forwards the bin's front-buffer-ready events to the connection's own
//!   frame-ready [`Signal`](crate::signal::Signal)
//! - a single-slot result cache for parameter and command results, reached
//!   through read-once [`ResultToken`]s
//!
//! # Locking Discipline
//!
//! All mutable state sits behind one mutex. Bins are only called with that
//! mutex released, and frame-ready fan-out happens after it is released, so
//! a bin may raise synchronously from `unlock_front_buffer()` and callbacks
//! may call back into the connection.

mod attachment;
pub mod config;
mod diagnostics;
pub mod handle;
pub mod result;
pub mod state;
pub mod stream_connection;
pub mod watch;

pub use config::{ConnectionConfig, EmptyFrameUnlock};
pub use handle::{ConnectionHandle, FrameReady};
pub use result::{ResultToken, Status};
pub use state::LockState;
pub use stream_connection::StreamConnection;
pub use watch::FrameReadyReceiver;
