//! Unified error type exposed by **`parley-core`**.
//!
//! Backend crates convert their internal errors into
//! [`ParleyError::Backend`] before bubbling them up. The
//! [`FragmentStream`](crate::stream::FragmentStream) then classifies every
//! backend failure by *when* it happened:
//!
//! * before the backend produced anything → [`ParleyError::Request`]
//! * after the stream had started → [`ParleyError::MidStream`]
//!
//! so callers can tell "nothing arrived" apart from "the reply is truncated".

use thiserror::Error;

/// Convenient alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, ParleyError>;

/// Boxed, thread-safe source error carried by backend related variants.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum ParleyError {
    /// The backend client could not be initialised (bad endpoint, missing
    /// model, HTTP client failure). Raised before any turn starts.
    #[error("backend could not be constructed: {0}")]
    Construction(String),

    /// The backend rejected the request or the stream could not be opened.
    /// No fragment was produced.
    #[error("backend rejected the request: {0}")]
    Request(#[source] BoxError),

    /// The backend stream terminated abnormally after it had started.
    /// `emitted` fragments were already delivered to the caller.
    #[error("stream failed after {emitted} fragment(s): {source}")]
    MidStream {
        emitted: usize,
        #[source]
        source: BoxError,
    },

    /// Raw backend failure as reported by a provider crate, not yet
    /// classified by the fragment stream.
    #[error("backend returned an error: {0}")]
    Backend(#[source] BoxError),

    /// A backend element did not have the shape the extraction rule expects.
    #[error("unexpected element shape: expected {expected}, found {found}")]
    ShapeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// Failure while serialising or deserialising JSON payloads.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

