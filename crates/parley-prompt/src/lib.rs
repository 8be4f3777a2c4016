//! Prompt assembly for the parley chat SDK.
//!
//! * [`assembler`] – turns a system instruction, the history and the new
//!   input into a [`RequestPayload`](parley_core::payload::RequestPayload)
//! * [`builder`] – `Label: content` transcript builder
//! * [`template`] – single-prompt templates embedding the whole history
pub mod assembler;
pub mod builder;
pub mod template;

pub use assembler::{Assembler, RoleLabeling, assemble};
pub use template::HistoryTemplate;
