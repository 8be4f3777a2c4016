//! Streaming backend for OpenAI-compatible inference servers (LM Studio,
//! llama.cpp server, vLLM, OpenAI itself).
mod adapter;
mod client;
mod provider_impl;
mod sse;

pub use adapter::{
    API_KEY_ENV_VAR, BASE_URL_ENV_VAR, DEFAULT_API_KEY, DEFAULT_BASE_URL, DEFAULT_MODEL,
    MODEL_ENV_VAR, OpenAiAdapter, OpenAiAdapterBuilder,
};
pub use client::OpenAiClient;
pub use provider_impl::CHAT_DELTA_POINTER;
pub mod api_v1;
pub mod error;
