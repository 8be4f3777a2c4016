//! Request and response bodies of Ollama's native `/api` endpoints.
use parley_core::{generic::Role, payload::ChatRecord};
use serde::{Deserialize, Serialize};

/// Sampling options. Only the ones the adapter exposes are modelled.
#[derive(Debug, Default, Clone, Serialize, PartialEq)]
pub struct Options {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Ollama's name for a token limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<u32>,
}

impl Options {
    pub fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.num_predict.is_none()
    }
}

/// `POST /api/generate`
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Options>,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            stream: true,
            options: None,
        }
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = (!options.is_empty()).then_some(options);
        self
    }
}

/// One line of a streaming `/api/generate` response.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateChunk {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl From<ChatRecord> for ChatMessage {
    fn from(record: ChatRecord) -> Self {
        Self {
            role: record.role,
            content: record.content,
        }
    }
}

/// `POST /api/chat`
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Options>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            stream: true,
            options: None,
        }
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = (!options.is_empty()).then_some(options);
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn chat_request_serialises_native_shape() {
        let request = ChatRequest::new(
            "llama3",
            vec![ChatRecord::new(Role::User, "hi").into()],
        )
        .with_options(Options {
            temperature: Some(0.2),
            num_predict: None,
        });

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "model": "llama3",
                "messages": [{"role": "user", "content": "hi"}],
                "stream": true,
                "options": {"temperature": 0.2}
            })
        );
    }

    #[test]
    fn empty_options_are_omitted() {
        let request = GenerateRequest::new("llama3", "hi").with_options(Options::default());
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("options").is_none());
    }

    #[test]
    fn generate_chunk_tolerates_missing_fields() {
        let chunk: GenerateChunk = serde_json::from_str(r#"{"done":true}"#).unwrap();
        assert!(chunk.done);
        assert!(chunk.response.is_empty());
    }
}
