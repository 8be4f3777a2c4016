//! # `parley` – The umbrella crate
//!
//! One dependency for a streaming chat front-end. It glues together the
//! building-block crates of the workspace:
//!
//! | Crate               | What it provides                                                              |
//! |---------------------|-------------------------------------------------------------------------------|
//! | **`parley-core`**   | Messages, payloads, the backend trait, the fragment stream, errors, sinks     |
//! | **`parley-prompt`** | The prompt assembler, transcript builder and history templates               |
//! | **`parley-openai`** | Backend for OpenAI-compatible servers such as LM Studio *(feature `openai`)*  |
//! | **`parley-ollama`** | Backend for a local Ollama server *(feature `ollama`)*                        |
//!
//! On top of the re-exports this crate adds [`ChatClient`], the per-turn
//! driver, and [`Backend`], a backend picked at runtime from the
//! environment.
//!
//! ## Quick example
//!
//! ```rust,no_run
//! use futures_util::StreamExt;
//! use parley::{ChatClient, generic::Message, openai::OpenAiAdapterBuilder};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // LM Studio on localhost:1234 unless OPENAI_BASE_URL says otherwise.
//!     let backend = OpenAiAdapterBuilder::new_from_env().build()?;
//!     let client = ChatClient::new(backend);
//!
//!     let history = vec![Message::user("hi")];
//!     let mut fragments = client.respond(&history, "how are you");
//!
//!     while let Some(fragment) = fragments.next().await {
//!         print!("{}", fragment?);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! * `openai` *(default)* – re-export `parley-openai` as [`openai`].
//! * `ollama` *(default)* – re-export `parley-ollama` as [`ollama`].
//! * `tracing` – emit `tracing` events from every crate of the stack.
#![doc(html_root_url = "https://docs.rs/parley/latest")]

#[cfg(any(feature = "openai", feature = "ollama"))]
mod backend;
mod client;

pub use parley_core::*;

pub use parley_prompt as prompt;
pub use parley_prompt::{Assembler, HistoryTemplate, RoleLabeling, assemble};

#[cfg(any(feature = "openai", feature = "ollama"))]
pub use backend::{BACKEND_ENV_VAR, Backend};
pub use client::{ChatClient, DEFAULT_SYSTEM_INSTRUCTION, SYSTEM_PROMPT_ENV_VAR};

#[cfg(feature = "openai")]
pub use parley_openai as openai;

#[cfg(feature = "ollama")]
pub use parley_ollama as ollama;
