//! Push-based helpers layered on top of the pull-based fragment stream.
//!
//! A UI that wants "append this fragment to the chat bubble" callbacks
//! implements [`DisplaySink`] and lets [`drain_into`] drive the turn.
use futures_core::Stream;
use futures_util::StreamExt;

use crate::error::ParleyError;

/// Anything that can display fragments as they arrive.
pub trait DisplaySink {
    fn push(&mut self, fragment: &str);
}

impl DisplaySink for String {
    fn push(&mut self, fragment: &str) {
        self.push_str(fragment);
    }
}

impl DisplaySink for Vec<String> {
    fn push(&mut self, fragment: &str) {
        Vec::push(self, fragment.to_owned());
    }
}

impl<T: DisplaySink + ?Sized> DisplaySink for &mut T {
    fn push(&mut self, fragment: &str) {
        T::push(*self, fragment);
    }
}

/// A turn that ended with an error. `partial` holds everything that was
/// delivered before the failure.
#[derive(Debug, thiserror::Error)]
#[error("turn failed with partial output retained: {error}")]
pub struct TurnFailure {
    pub partial: String,
    #[source]
    pub error: ParleyError,
}

/// Pull every fragment from `fragments`, pushing each one to `sink`, and
/// return the complete response text.
///
/// On failure the fragments that already reached the sink stay there and
/// are also returned in [`TurnFailure::partial`].
pub async fn drain_into<St, D>(fragments: St, mut sink: D) -> Result<String, TurnFailure>
where
    St: Stream<Item = crate::error::Result<String>>,
    D: DisplaySink,
{
    let mut response = String::new();
    let mut fragments = std::pin::pin!(fragments);

    while let Some(fragment) = fragments.next().await {
        match fragment {
            Ok(text) => {
                sink.push(&text);
                response.push_str(&text);
            }
            Err(error) => {
                return Err(TurnFailure {
                    partial: response,
                    error,
                });
            }
        }
    }

    Ok(response)
}
