//! Traits a concrete backend crate implements.
//!
//! Only one outward call exists: open a streaming completion for a
//! [`RequestPayload`](crate::payload::RequestPayload). Everything else
//! (fragment extraction, empty filtering, failure classification) lives in
//! [`crate::stream`] so every backend behaves the same towards the caller.
mod stream_complete;

pub use stream_complete::{BackendElement, StreamingCompletionProvider};
