//! Wire types of the legacy `/v1/completions` endpoint.
//!
//! Local inference servers (LM Studio, llama.cpp, vLLM) still expose it, and
//! it is the only OpenAI-compatible endpoint that accepts a bare text
//! prompt.
use serde::{Deserialize, Serialize};

use crate::impl_builder_methods;

use super::common::Usage;

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

impl CompletionRequest {
    pub fn new(model: String, prompt: String) -> Self {
        Self {
            model,
            prompt,
            temperature: None,
            max_tokens: None,
            stop: None,
            stream: None,
        }
    }
}

impl_builder_methods!(
    CompletionRequest,
    temperature: f64,
    max_tokens: u32,
    stop: Vec<String>,
    stream: bool
);

/// A single streaming choice payload.
#[allow(dead_code)]
#[derive(Debug, Deserialize)]
pub struct CompletionChunkChoice {
    #[serde(default)]
    pub index: i64,
    #[serde(default)]
    pub text: String,
    pub finish_reason: Option<String>,
}

/// The outermost object sent for each SSE chunk of a text completion.
#[allow(dead_code)]
#[derive(Debug, Deserialize)]
pub struct CompletionChunkResponse {
    pub id: Option<String>,
    pub object: Option<String>,
    pub created: Option<i64>,
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<CompletionChunkChoice>,
    pub usage: Option<Usage>,
}

impl CompletionChunkResponse {
    /// Text of the first choice, empty if the chunk carries none (e.g. a
    /// trailing usage-only chunk).
    pub fn into_text(self) -> String {
        self.choices
            .into_iter()
            .find(|choice| choice.index == 0)
            .map(|choice| choice.text)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_omits_unset_fields() {
        let request = CompletionRequest::new("local-model".into(), "System: hi".into()).stream(true);
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"model":"local-model","prompt":"System: hi","stream":true}"#
        );
    }

    #[test]
    fn usage_only_chunk_has_empty_text() {
        let chunk: CompletionChunkResponse = serde_json::from_str(
            r#"{"id":"c","object":"text_completion","created":1,"model":"m","choices":[],
                "usage":{"prompt_tokens":3,"completion_tokens":2,"total_tokens":5}}"#,
        )
        .unwrap();
        assert_eq!(chunk.usage.map(|u| u.total_tokens), Some(5));
        assert_eq!(chunk.into_text(), "");
    }
}
