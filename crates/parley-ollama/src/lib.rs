//! Streaming backend for a local [Ollama](https://ollama.com) server, using
//! its native NDJSON endpoints.
mod adapter;
mod client;
mod ndjson;
mod provider_impl;

pub use adapter::{
    DEFAULT_HOST, DEFAULT_MODEL, HOST_ENV_VAR, MODEL_ENV_VAR, OllamaAdapter, OllamaAdapterBuilder,
};
pub use client::OllamaClient;
pub use provider_impl::CHAT_CONTENT_POINTER;
pub mod api;
pub mod error;
