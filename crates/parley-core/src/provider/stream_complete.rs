use std::sync::Arc;

use futures_core::stream::Stream;

use crate::{
    error::Result,
    payload::{PromptMode, RequestPayload},
    stream::ExtractionRule,
};

/// One item emitted by a backend's streaming call.
///
/// Completion-style endpoints hand out bare text deltas, chat-style
/// endpoints hand out JSON chunk objects whose text sits somewhere inside.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendElement {
    /// A raw text delta.
    Delta(String),
    /// A structured chunk; the text is located by an
    /// [`ExtractionRule::Pointer`].
    Record(serde_json::Value),
}

impl BackendElement {
    /// Short name of the variant, used in shape-mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            BackendElement::Delta(_) => "raw delta",
            BackendElement::Record(_) => "structured record",
        }
    }
}

/// A **backend** turns a request payload into a network call to a concrete
/// provider (LM Studio, Ollama, …) and yields the provider's stream
/// elements as they arrive.
///
/// The trait is intentionally minimal:
///
/// * **One associated stream type** – returned by `start_stream`. It must be
///   `Unpin` (boxing is fine) so the fragment adapter can poll it without
///   pin projections.
/// * **One call** – `start_stream`, invoked exactly once per turn. Opening
///   the connection may be deferred until the first poll; a failure to open
///   it surfaces as the first item of the stream.
/// * **One static fact** – `extraction_rule`, the shape of the elements the
///   backend emits for a given payload mode. Callers resolve it once at
///   configuration time.
///
/// Dropping the returned stream must release the underlying connection.
pub trait StreamingCompletionProvider: Send + Sync {
    type ElementStream<'s>: Stream<Item = Result<BackendElement>> + Send + Unpin + 's
    where
        Self: 's;

    /// Open a streaming completion for `payload`.
    fn start_stream<'s>(&'s self, payload: RequestPayload) -> Self::ElementStream<'s>;

    /// How to pull text out of the elements emitted for `mode`.
    fn extraction_rule(&self, mode: PromptMode) -> ExtractionRule;
}

impl<B: StreamingCompletionProvider> StreamingCompletionProvider for Arc<B> {
    type ElementStream<'s>
        = B::ElementStream<'s>
    where
        Self: 's;

    fn start_stream<'s>(&'s self, payload: RequestPayload) -> Self::ElementStream<'s> {
        B::start_stream(self, payload)
    }

    fn extraction_rule(&self, mode: PromptMode) -> ExtractionRule {
        B::extraction_rule(self, mode)
    }
}
