//! Shared frame bins
//!
//! A bin is a double-buffered frame pool shared by every connection with the
//! same stream configuration. Producers fill the back buffer while consumers
//! read the front buffer; each promotion of a new front buffer is announced
//! through a front-buffer-ready event.
//!
//! Connections depend only on the [`Bin`] trait. [`DoubleBufferedBin`] is an
//! in-memory implementation suitable for embedding and tests.

pub mod double_buffer;
pub mod frame;
pub mod source;

pub use double_buffer::DoubleBufferedBin;
pub use frame::{BinHandle, Frame, FrameIndex, FrontBufferReady};
pub use source::Bin;
