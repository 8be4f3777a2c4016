use std::pin::Pin;

use futures_core::stream::Stream;
use parley_core::{
    error::{ParleyError, Result},
    payload::{ChatRecord, PromptMode, RequestPayload},
    provider::{BackendElement, StreamingCompletionProvider},
    stream::ExtractionRule,
};

use crate::{
    OpenAiAdapter,
    api_v1::{ChatCompletionRequest, CompletionRequest},
};

/// Where the text delta sits inside a `/chat/completions` stream chunk.
pub const CHAT_DELTA_POINTER: &str = "/choices/0/delta/content";

impl OpenAiAdapter {
    fn completion_request(&self, prompt: String) -> CompletionRequest {
        let mut request = CompletionRequest::new(self.model.clone(), prompt);
        request.temperature = self.temperature;
        request.max_tokens = self.max_tokens;
        request
    }

    fn chat_request(&self, records: Vec<ChatRecord>) -> ChatCompletionRequest {
        let messages = records.into_iter().map(Into::into).collect();
        let mut request = ChatCompletionRequest::new(self.model.clone(), messages);
        request.temperature = self.temperature;
        request.max_tokens = self.max_tokens;
        request
    }
}

/// Text payloads go to `/completions` and come back as raw deltas,
/// structured payloads go to `/chat/completions` and come back as chunk
/// records.
impl StreamingCompletionProvider for OpenAiAdapter {
    type ElementStream<'s>
        = Pin<Box<dyn Stream<Item = Result<BackendElement>> + Send + 's>>
    where
        Self: 's;

    fn start_stream<'s>(&'s self, payload: RequestPayload) -> Self::ElementStream<'s> {
        let client = &self.client;

        match payload {
            RequestPayload::Text(prompt) => {
                let request = self.completion_request(prompt);

                Box::pin(async_stream::try_stream! {
                    use futures_util::StreamExt;

                    let stream = client.completion_stream(request);
                    futures_util::pin_mut!(stream);

                    while let Some(chunk) = stream.next().await {
                        let chunk = chunk.map_err(ParleyError::from)?;
                        yield BackendElement::Delta(chunk.into_text());
                    }
                })
            }
            RequestPayload::Structured(records) => {
                let request = self.chat_request(records);

                Box::pin(async_stream::try_stream! {
                    use futures_util::StreamExt;

                    let stream = client.chat_completion_stream(request);
                    futures_util::pin_mut!(stream);

                    while let Some(chunk) = stream.next().await {
                        let chunk = chunk.map_err(ParleyError::from)?;
                        yield BackendElement::Record(chunk);
                    }
                })
            }
        }
    }

    fn extraction_rule(&self, mode: PromptMode) -> ExtractionRule {
        match mode {
            PromptMode::Text => ExtractionRule::RawDelta,
            PromptMode::Structured => ExtractionRule::pointer(CHAT_DELTA_POINTER),
        }
    }
}
