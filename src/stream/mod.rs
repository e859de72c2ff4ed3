//! Stream collaborator types
//!
//! The owning stream's parameter and command logic lives outside this crate;
//! connections reach it through the [`Stream`] trait.

pub mod description;
pub mod parameter;
pub mod provider;

pub use description::{StreamDescription, StreamSubtype, StreamType};
pub use parameter::{CommandId, ParameterBin, ParameterId};
pub use provider::Stream;
