use parley_core::error::ParleyError;
use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum OllamaError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("couldn’t (de)serialise body: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("server returned non-success status {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error("response stream is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("API key is not a valid header value")]
    InvalidApiKey,

    #[error("ollama reported an error: {0}")]
    Stream(String),
}

impl From<OllamaError> for ParleyError {
    fn from(value: OllamaError) -> Self {
        ParleyError::Backend(Box::new(value))
    }
}
