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
    api::{ChatRequest, GenerateChunk, GenerateRequest},
    error::OllamaError,
    ndjson::LineDecoder,
};

/// HTTP client for the streaming endpoints of an Ollama server.
///
/// Requests are sent on first poll. Ollama needs no credentials, but a key
/// is forwarded as a bearer token for servers sitting behind an
/// authenticating proxy.
#[derive(Clone)]
pub struct OllamaClient {
    api_key: Option<String>,
    http: HttpClient,
    base: String,
}

impl OllamaClient {
    /// `base_url` is the server root (`http://localhost:11434`) without a
    /// trailing slash.
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

    fn headers(&self) -> Result<HeaderMap, OllamaError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/x-ndjson"));

        if let Some(api_key) = &self.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|_| OllamaError::InvalidApiKey)?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    /// Stream a raw prompt through `/api/generate`.
    pub fn generate_stream(
        &self,
        request: GenerateRequest,
    ) -> impl Stream<Item = Result<GenerateChunk, OllamaError>> + Send + '_ {
        try_stream! {
            let lines = self.line_stream("api/generate", request);
            futures_util::pin_mut!(lines);

            while let Some(line) = lines.next().await {
                let chunk: GenerateChunk = serde_json::from_value(line?)?;
                yield chunk;
            }
        }
    }

    /// Stream a message list through `/api/chat`. Lines are handed out as
    /// raw JSON.
    pub fn chat_stream(
        &self,
        request: ChatRequest,
    ) -> impl Stream<Item = Result<Value, OllamaError>> + Send + '_ {
        self.line_stream("api/chat", request)
    }

    fn line_stream<B>(
        &self,
        path: &'static str,
        body: B,
    ) -> impl Stream<Item = Result<Value, OllamaError>> + Send + '_
    where
        B: Serialize + Send + Sync + 'static,
    {
        let url = format!("{}/{}", self.base, path);

        try_stream! {
            #[cfg(feature = "tracing")]
            tracing::debug!(%url, "opening ndjson stream");

            let headers = self.headers()?;
            let resp = self.http.post(url).headers(headers).json(&body).send().await?;

            if !resp.status().is_success() {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                return Err(OllamaError::Api { status, body })?;
            }

            let mut bytes_stream = resp.bytes_stream();
            let mut decoder = LineDecoder::default();

            while let Some(chunk) = bytes_stream.next().await {
                let chunk = chunk?;

                for line in decoder.push(&chunk)? {
                    let (value, done) = parse_line(&line)?;
                    yield value;
                    if done {
                        return;
                    }
                }
            }

            if let Some(line) = decoder.finish()? {
                let (value, _) = parse_line(&line)?;
                yield value;
            }
        }
    }
}

/// Returns the line and whether it is the final one of the response.
fn parse_line(line: &str) -> Result<(Value, bool), OllamaError> {
    let value: Value = serde_json::from_str(line)?;

    if let Some(error) = value.get("error").filter(|error| !error.is_null()) {
        let message = error
            .as_str()
            .map(str::to_owned)
            .unwrap_or_else(|| error.to_string());
        return Err(OllamaError::Stream(message));
    }

    let done = value.get("done").and_then(Value::as_bool).unwrap_or(false);
    Ok((value, done))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn done_flag_is_reported() {
        let (_, done) = parse_line(r#"{"message":{"content":""},"done":true}"#).unwrap();
        assert!(done);

        let (value, done) = parse_line(r#"{"message":{"content":"hi"},"done":false}"#).unwrap();
        assert!(!done);
        assert_eq!(value["message"]["content"], "hi");
    }

    #[test]
    fn error_lines_are_surfaced() {
        let err = parse_line(r#"{"error":"model 'nope' not found"}"#).unwrap_err();
        assert!(matches!(err, OllamaError::Stream(msg) if msg == "model 'nope' not found"));
    }

    #[test]
    fn malformed_lines_are_serde_errors() {
        assert!(matches!(parse_line("{oops"), Err(OllamaError::Serde(_))));
    }
}
