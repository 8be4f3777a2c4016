use parley_core::error::ParleyError;
use reqwest::StatusCode;

/// High-level error type covering every failure mode the client can hit.
#[derive(Debug, thiserror::Error)]
pub enum OpenAiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("couldn’t (de)serialise body: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("server returned non-success status {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error("event stream is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("API key is not a valid header value")]
    InvalidApiKey,

    #[error("server reported an error in the stream: {0}")]
    Stream(String),
}

impl From<OpenAiError> for ParleyError {
    fn from(value: OpenAiError) -> Self {
        ParleyError::Backend(Box::new(value))
    }
}
