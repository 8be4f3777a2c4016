use std::pin::Pin;

use futures_core::stream::Stream;
use parley_core::{
    error::{ParleyError, Result},
    payload::{ChatRecord, PromptMode, RequestPayload},
    provider::{BackendElement, StreamingCompletionProvider},
    stream::ExtractionRule,
};

use crate::{
    OllamaAdapter,
    api::{ChatRequest, GenerateRequest, Options},
};

/// Where the text delta sits inside an `/api/chat` stream line.
pub const CHAT_CONTENT_POINTER: &str = "/message/content";

impl OllamaAdapter {
    fn options(&self) -> Options {
        Options {
            temperature: self.temperature,
            num_predict: self.max_tokens,
        }
    }

    fn generate_request(&self, prompt: String) -> GenerateRequest {
        GenerateRequest::new(self.model.clone(), prompt).with_options(self.options())
    }

    fn chat_request(&self, records: Vec<ChatRecord>) -> ChatRequest {
        let messages = records.into_iter().map(Into::into).collect();
        ChatRequest::new(self.model.clone(), messages).with_options(self.options())
    }
}

impl StreamingCompletionProvider for OllamaAdapter {
    type ElementStream<'s>
        = Pin<Box<dyn Stream<Item = Result<BackendElement>> + Send + 's>>
    where
        Self: 's;

    fn start_stream<'s>(&'s self, payload: RequestPayload) -> Self::ElementStream<'s> {
        let client = &self.client;

        match payload {
            RequestPayload::Text(prompt) => {
                let request = self.generate_request(prompt);

                Box::pin(async_stream::try_stream! {
                    use futures_util::StreamExt;

                    let stream = client.generate_stream(request);
                    futures_util::pin_mut!(stream);

                    while let Some(chunk) = stream.next().await {
                        let chunk = chunk.map_err(ParleyError::from)?;
                        yield BackendElement::Delta(chunk.response);
                    }
                })
            }
            RequestPayload::Structured(records) => {
                let request = self.chat_request(records);

                Box::pin(async_stream::try_stream! {
                    use futures_util::StreamExt;

                    let stream = client.chat_stream(request);
                    futures_util::pin_mut!(stream);

                    while let Some(line) = stream.next().await {
                        let line = line.map_err(ParleyError::from)?;
                        yield BackendElement::Record(line);
                    }
                })
            }
        }
    }

    fn extraction_rule(&self, mode: PromptMode) -> ExtractionRule {
        match mode {
            PromptMode::Text => ExtractionRule::RawDelta,
            PromptMode::Structured => ExtractionRule::pointer(CHAT_CONTENT_POINTER),
        }
    }
}
