//! Multi-subscriber callback registry
//!
//! A [`Signal`] keeps an ordered list of callbacks keyed by [`CallbackId`] and
//! invokes all of them synchronously on the raising thread.
//!
//! # Copy-on-Write Subscribers
//!
//! The subscriber list is held as `Arc<Vec<_>>`. `raise()` clones the `Arc`
//! and iterates the snapshot without holding the registry lock, so callbacks
//! may subscribe or unsubscribe reentrantly. Mutation goes through
//! `Arc::make_mut`, which only copies the list while a raise is in flight.

mod registry;

pub use registry::{Callback, CallbackId, Signal};
