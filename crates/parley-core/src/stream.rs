//! The streaming response adapter.
//!
//! [`FragmentStream`] wraps whatever a backend's streaming call returns and
//! re-exposes it as a lazy, finite, non-restartable sequence of non-empty
//! text fragments:
//!
//! ```text
//!  backend elements            extraction            fragments
//!  Delta("")          ──►  RawDelta  ──► ""      ──► (dropped)
//!  Delta("hello")     ──►  RawDelta  ──► "hello" ──► Ok("hello")
//!  Record({...})      ──►  Pointer   ──► "a"     ──► Ok("a")
//!  Err(Backend(e))    ──►  classify           ──► Err(Request | MidStream)
//! ```
//!
//! Exhaustion of the stream is the completion signal, there is no explicit
//! end marker. Dropping the stream early drops the backend stream with it,
//! which releases the HTTP response and its connection.
use std::{
    borrow::Cow,
    pin::Pin,
    task::{Context, Poll, ready},
};

use futures_core::{FusedStream, Stream};
use serde_json::Value;

use crate::{
    error::{ParleyError, Result},
    payload::RequestPayload,
    provider::{BackendElement, StreamingCompletionProvider},
};

/// How a text fragment is pulled out of a [`BackendElement`].
///
/// The rule is chosen when a client is configured, never by inspecting
/// elements at runtime: a raw element arriving under a pointer rule (or the
/// other way round) is an error, not a fallback.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExtractionRule {
    /// The element itself is the fragment text.
    RawDelta,
    /// The fragment is the string found at this JSON pointer
    /// (`/message/content`, `/choices/0/delta/content`, …). A missing or
    /// non-string value counts as an empty fragment.
    Pointer(Cow<'static, str>),
}

impl ExtractionRule {
    pub fn pointer(path: impl Into<Cow<'static, str>>) -> Self {
        ExtractionRule::Pointer(path.into())
    }

    fn expects(&self) -> &'static str {
        match self {
            ExtractionRule::RawDelta => "raw delta",
            ExtractionRule::Pointer(_) => "structured record",
        }
    }

    /// Extract the fragment text carried by `element`.
    ///
    /// ```rust
    /// use parley_core::{provider::BackendElement, stream::ExtractionRule};
    ///
    /// let rule = ExtractionRule::pointer("/message/content");
    /// let element = BackendElement::Record(serde_json::json!({"message": {"content": "a"}}));
    /// assert_eq!(rule.extract(element).unwrap(), "a");
    /// ```
    pub fn extract(&self, element: BackendElement) -> Result<String> {
        match (self, element) {
            (ExtractionRule::RawDelta, BackendElement::Delta(text)) => Ok(text),
            (ExtractionRule::Pointer(path), BackendElement::Record(mut value)) => {
                match value.pointer_mut(path).map(Value::take) {
                    Some(Value::String(text)) => Ok(text),
                    _ => Ok(String::new()),
                }
            }
            (rule, element) => Err(ParleyError::ShapeMismatch {
                expected: rule.expects(),
                found: element.kind(),
            }),
        }
    }
}

/// Lifecycle of a single turn.
///
/// ```text
/// Idle ─► Requesting ─► Streaming ─► Completed
///              │             │
///              └─────────────┴─────► Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TurnState {
    /// No request has been issued yet.
    #[default]
    Idle,
    /// The backend call was issued, nothing has arrived yet.
    Requesting,
    /// At least one element arrived from the backend.
    Streaming,
    /// The backend stream ended normally.
    Completed,
    /// A backend error was propagated to the caller.
    Failed,
}

impl TurnState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TurnState::Completed | TurnState::Failed)
    }
}

/// Invoke `provider` once with `payload` and adapt its output into
/// fragments using `rule`.
pub fn stream<'s, P>(
    provider: &'s P,
    payload: RequestPayload,
    rule: ExtractionRule,
) -> FragmentStream<P::ElementStream<'s>>
where
    P: StreamingCompletionProvider + ?Sized,
{
    FragmentStream::new(provider.start_stream(payload), rule)
}

/// Lazy sequence of non-empty text fragments for one turn.
///
/// Yields `Ok(fragment)` for every non-empty extracted text, in backend
/// order. A failure is yielded at most once, after all fragments that
/// preceded it, and ends the sequence. Once ended the stream keeps
/// returning `None`.
#[derive(Debug)]
pub struct FragmentStream<S> {
    inner: Option<S>,
    rule: ExtractionRule,
    state: TurnState,
    emitted: usize,
}

impl<S> FragmentStream<S>
where
    S: Stream<Item = Result<BackendElement>> + Unpin,
{
    /// Wrap an already started backend stream. The turn is considered
    /// [`TurnState::Requesting`] from here on.
    pub fn new(inner: S, rule: ExtractionRule) -> Self {
        #[cfg(feature = "tracing")]
        tracing::debug!(?rule, "turn requesting");

        Self {
            inner: Some(inner),
            rule,
            state: TurnState::Requesting,
            emitted: 0,
        }
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    /// Number of fragments handed out so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    pub fn rule(&self) -> &ExtractionRule {
        &self.rule
    }

    fn transition(&mut self, next: TurnState) {
        #[cfg(feature = "tracing")]
        tracing::debug!(from = ?self.state, to = ?next, emitted = self.emitted, "turn state");

        self.state = next;
        if next.is_terminal() {
            // release the backend stream (and its connection) right away
            self.inner = None;
        }
    }

    fn classify(&self, err: ParleyError) -> ParleyError {
        match err {
            ParleyError::Backend(source) if self.state == TurnState::Requesting => {
                ParleyError::Request(source)
            }
            ParleyError::Backend(source) => ParleyError::MidStream {
                emitted: self.emitted,
                source,
            },
            other => other,
        }
    }

    fn fail(&mut self, err: ParleyError) -> Poll<Option<Result<String>>> {
        let err = self.classify(err);

        #[cfg(feature = "tracing")]
        tracing::warn!(error = %err, "turn failed");

        self.transition(TurnState::Failed);
        Poll::Ready(Some(Err(err)))
    }
}

impl<S> Stream for FragmentStream<S>
where
    S: Stream<Item = Result<BackendElement>> + Unpin,
{
    type Item = Result<String>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            let Some(inner) = this.inner.as_mut() else {
                return Poll::Ready(None);
            };

            match ready!(Pin::new(inner).poll_next(cx)) {
                None => {
                    this.transition(TurnState::Completed);
                    return Poll::Ready(None);
                }
                Some(Err(err)) => return this.fail(err),
                Some(Ok(element)) => {
                    if this.state == TurnState::Requesting {
                        this.transition(TurnState::Streaming);
                    }

                    match this.rule.extract(element) {
                        Err(err) => return this.fail(err),
                        Ok(text) if text.is_empty() => {
                            #[cfg(feature = "tracing")]
                            tracing::trace!("dropping empty fragment");
                            continue;
                        }
                        Ok(text) => {
                            this.emitted += 1;
                            return Poll::Ready(Some(Ok(text)));
                        }
                    }
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            // empty elements are filtered, so no lower bound
            Some(inner) => (0, inner.size_hint().1),
            None => (0, Some(0)),
        }
    }
}

impl<S> FusedStream for FragmentStream<S>
where
    S: Stream<Item = Result<BackendElement>> + Unpin,
{
    fn is_terminated(&self) -> bool {
        self.inner.is_none()
    }
}
