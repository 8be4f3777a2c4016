//! Backend chosen at runtime.
//!
//! `PARLEY_BACKEND=openai` (LM Studio and friends) or `PARLEY_BACKEND=ollama`
//! selects the adapter; each adapter then reads its own variables
//! (`OPENAI_*`, `OLLAMA_*`).
use std::{env, pin::Pin};

use futures_core::Stream;
use parley_core::{
    error::{ParleyError, Result},
    payload::{PromptMode, RequestPayload},
    provider::{BackendElement, StreamingCompletionProvider},
    stream::ExtractionRule,
};

#[cfg(feature = "ollama")]
use parley_ollama::{OllamaAdapter, OllamaAdapterBuilder};
#[cfg(feature = "openai")]
use parley_openai::{OpenAiAdapter, OpenAiAdapterBuilder};

pub const BACKEND_ENV_VAR: &str = "PARLEY_BACKEND";

/// Either of the bundled HTTP backends.
#[derive(Clone)]
pub enum Backend {
    #[cfg(feature = "openai")]
    OpenAi(OpenAiAdapter),
    #[cfg(feature = "ollama")]
    Ollama(OllamaAdapter),
}

impl Backend {
    /// Build the backend named by `PARLEY_BACKEND`. When unset, the
    /// OpenAI-compatible backend is used if it was compiled in.
    ///
    /// # Errors
    ///
    /// * [`ParleyError::Construction`] – unknown backend name, a backend
    ///   whose feature is disabled, or an invalid adapter configuration.
    pub fn from_env() -> Result<Self> {
        let name = env::var(BACKEND_ENV_VAR)
            .ok()
            .filter(|name| !name.trim().is_empty());

        Self::by_name(name.as_deref())
    }

    fn by_name(name: Option<&str>) -> Result<Self> {
        let name = name.map(|n| n.trim().to_ascii_lowercase());

        match name.as_deref() {
            #[cfg(feature = "openai")]
            None | Some("openai" | "lmstudio" | "lm-studio") => {
                Ok(Backend::OpenAi(OpenAiAdapterBuilder::new_from_env().build()?))
            }
            #[cfg(all(feature = "ollama", not(feature = "openai")))]
            None => Ok(Backend::Ollama(OllamaAdapterBuilder::new_from_env().build()?)),
            #[cfg(feature = "ollama")]
            Some("ollama") => Ok(Backend::Ollama(OllamaAdapterBuilder::new_from_env().build()?)),
            Some(other) => Err(ParleyError::Construction(format!(
                "unknown or disabled backend `{other}`"
            ))),
        }
    }

    /// Short name for log lines and banners.
    pub fn name(&self) -> &'static str {
        match self {
            #[cfg(feature = "openai")]
            Backend::OpenAi(_) => "openai",
            #[cfg(feature = "ollama")]
            Backend::Ollama(_) => "ollama",
        }
    }

    pub fn model(&self) -> &str {
        match self {
            #[cfg(feature = "openai")]
            Backend::OpenAi(adapter) => adapter.model(),
            #[cfg(feature = "ollama")]
            Backend::Ollama(adapter) => adapter.model(),
        }
    }
}

#[cfg(feature = "openai")]
impl From<OpenAiAdapter> for Backend {
    fn from(adapter: OpenAiAdapter) -> Self {
        Backend::OpenAi(adapter)
    }
}

#[cfg(feature = "ollama")]
impl From<OllamaAdapter> for Backend {
    fn from(adapter: OllamaAdapter) -> Self {
        Backend::Ollama(adapter)
    }
}

impl StreamingCompletionProvider for Backend {
    type ElementStream<'s>
        = Pin<Box<dyn Stream<Item = Result<BackendElement>> + Send + 's>>
    where
        Self: 's;

    fn start_stream<'s>(&'s self, payload: RequestPayload) -> Self::ElementStream<'s> {
        match self {
            #[cfg(feature = "openai")]
            Backend::OpenAi(adapter) => adapter.start_stream(payload),
            #[cfg(feature = "ollama")]
            Backend::Ollama(adapter) => adapter.start_stream(payload),
        }
    }

    fn extraction_rule(&self, mode: PromptMode) -> ExtractionRule {
        match self {
            #[cfg(feature = "openai")]
            Backend::OpenAi(adapter) => adapter.extraction_rule(mode),
            #[cfg(feature = "ollama")]
            Backend::Ollama(adapter) => adapter.extraction_rule(mode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_backend_is_a_construction_error() {
        let result = Backend::by_name(Some("kobold"));
        assert!(matches!(result, Err(ParleyError::Construction(msg)) if msg.contains("kobold")));
    }

    #[cfg(feature = "ollama")]
    #[test]
    fn ollama_is_selected_by_name() {
        let backend = Backend::by_name(Some(" Ollama ")).unwrap();
        assert_eq!(backend.name(), "ollama");
        assert_eq!(
            backend.extraction_rule(PromptMode::Structured),
            ExtractionRule::pointer(parley_ollama::CHAT_CONTENT_POINTER)
        );
    }

    #[cfg(feature = "openai")]
    #[test]
    fn openai_dispatches_its_own_rule() {
        let backend = Backend::from(OpenAiAdapterBuilder::new().build().unwrap());
        assert_eq!(backend.name(), "openai");
        assert_eq!(
            backend.extraction_rule(PromptMode::Structured),
            ExtractionRule::pointer(parley_openai::CHAT_DELTA_POINTER)
        );
        assert_eq!(backend.extraction_rule(PromptMode::Text), ExtractionRule::RawDelta);
    }
}
