use async_stream::try_stream;

use futures_core::Stream;
use futures_util::StreamExt;
use reqwest::{
    Client as HttpClient,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde::Serialize;
use serde_json::Value;

use crate::{
    api_v1::{ChatCompletionRequest, CompletionChunkResponse, CompletionRequest},
    error::OpenAiError,
    sse::SseDecoder,
};

/// Minimal HTTP client for the streaming endpoints of an OpenAI-compatible
/// server.
///
/// * Streaming only: every call returns a lazy stream, the request is sent
///   on first poll.
/// * Accepts the `api_v1` request structs defined in this crate.
/// * Shares a single `reqwest::Client`, so cloning `OpenAiClient` is cheap.
/// * The `Authorization` header is only sent when an API key is configured.
#[derive(Clone)]
pub struct OpenAiClient {
    api_key: Option<String>,
    http: HttpClient,
    base: String,
}

impl OpenAiClient {
    /// Build with a custom `reqwest::Client` in case the caller needs proxy
    /// settings, custom TLS, etc. `base_url` must not end with a slash.
    pub fn with_http(api_key: Option<String>, http: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            http,
            base: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn headers(&self) -> Result<HeaderMap, OpenAiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));

        if let Some(api_key) = &self.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|_| OpenAiError::InvalidApiKey)?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    /// Perform a **streaming** text completion (`/completions`).
    pub fn completion_stream(
        &self,
        request: CompletionRequest,
    ) -> impl Stream<Item = Result<CompletionChunkResponse, OpenAiError>> + Send + '_ {
        try_stream! {
            let events = self.event_stream("completions", request.stream(true));
            futures_util::pin_mut!(events);

            while let Some(event) = events.next().await {
                let chunk: CompletionChunkResponse = serde_json::from_value(event?)?;
                yield chunk;
            }
        }
    }

    /// Perform a **streaming** chat completion (`/chat/completions`).
    ///
    /// Chunks are handed out as raw JSON; callers pick the fields they need.
    pub fn chat_completion_stream(
        &self,
        request: ChatCompletionRequest,
    ) -> impl Stream<Item = Result<Value, OpenAiError>> + Send + '_ {
        self.event_stream("chat/completions", request.stream(true))
    }

    fn event_stream<B>(
        &self,
        path: &'static str,
        body: B,
    ) -> impl Stream<Item = Result<Value, OpenAiError>> + Send + '_
    where
        B: Serialize + Send + Sync + 'static,
    {
        let url = format!("{}/{}", self.base, path);

        try_stream! {
            #[cfg(feature = "tracing")]
            tracing::debug!(%url, "opening event stream");

            let headers = self.headers()?;
            let resp = self.http.post(url).headers(headers).json(&body).send().await?;

            if !resp.status().is_success() {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                return Err(OpenAiError::Api { status, body })?;
            }

            let mut bytes_stream = resp.bytes_stream();
            let mut decoder = SseDecoder::default();

            while let Some(chunk) = bytes_stream.next().await {
                let chunk = chunk?;

                for data in decoder.push(&chunk)? {
                    match parse_event(&data)? {
                        Some(value) => {
                            yield value;
                        }
                        None => return,
                    }
                }
            }

            if let Some(data) = decoder.finish()? {
                if let Some(value) = parse_event(&data)? {
                    yield value;
                }
            }
        }
    }
}

/// `None` marks the `[DONE]` sentinel.
fn parse_event(data: &str) -> Result<Option<Value>, OpenAiError> {
    let data = data.trim();
    if data == "[DONE]" {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(data)?;
    if let Some(error) = value.get("error").filter(|error| !error.is_null()) {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_else(|| error.to_string());
        return Err(OpenAiError::Stream(message));
    }

    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn done_sentinel_ends_the_stream() {
        assert!(parse_event(" [DONE] ").unwrap().is_none());
    }

    #[test]
    fn in_band_errors_are_surfaced() {
        let err = parse_event(r#"{"error":{"message":"model not loaded"}}"#).unwrap_err();
        assert!(matches!(err, OpenAiError::Stream(msg) if msg == "model not loaded"));
    }

    #[test]
    fn malformed_json_is_a_serde_error() {
        assert!(matches!(parse_event("{oops"), Err(OpenAiError::Serde(_))));
    }
}
