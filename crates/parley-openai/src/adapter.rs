use std::{sync::Arc, time::Duration};

use parley_core::{
    config::BackendConfig,
    error::{ParleyError, Result},
};
use reqwest::{Client as HttpClient, header::HeaderValue};

use crate::client::OpenAiClient;

/// Base URL of a local LM Studio inference server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:1234/v1";
/// LM Studio accepts any key; this is the one its docs use.
pub const DEFAULT_API_KEY: &str = "lm-studio";
/// LM Studio serves whichever model is loaded regardless of this name.
pub const DEFAULT_MODEL: &str = "local-model";

pub const BASE_URL_ENV_VAR: &str = "OPENAI_BASE_URL";
pub const API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";
pub const MODEL_ENV_VAR: &str = "OPENAI_MODEL";

/// Thin wrapper that wires the HTTP client [`OpenAiClient`] into a value
/// that implements [`parley_core::provider::StreamingCompletionProvider`].
///
/// * owns a shareable, connection-pooled `reqwest::Client`,
/// * remembers the model identifier and sampling options,
/// * is built through [`OpenAiAdapterBuilder`] so callers don’t have to
///   juggle `Option<String>` manually.
///
/// Construct it once at process start and reuse it for every turn.
#[derive(Clone)]
pub struct OpenAiAdapter {
    pub(crate) client: Arc<OpenAiClient>,
    pub(crate) model: String,
    pub(crate) temperature: Option<f64>,
    pub(crate) max_tokens: Option<u32>,
}

impl OpenAiAdapter {
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }
}

/// Builder for [`OpenAiAdapter`].
///
/// # Typical usage
///
/// ```rust,no_run
/// use parley_openai::OpenAiAdapterBuilder;
///
/// // LM Studio on localhost, or whatever OPENAI_BASE_URL points at.
/// let backend = OpenAiAdapterBuilder::new_from_env()
///     .build()
///     .expect("valid backend configuration");
/// ```
#[derive(Default)]
pub struct OpenAiAdapterBuilder {
    pub(crate) base_url: Option<String>,
    pub(crate) api_key: Option<String>,
    pub(crate) anonymous: bool,
    pub(crate) model: Option<String>,
    pub(crate) http: Option<HttpClient>,
    pub(crate) temperature: Option<f64>,
    pub(crate) max_tokens: Option<u32>,
}

impl OpenAiAdapterBuilder {
    /// Create an *empty* builder; every unset option falls back to the LM
    /// Studio defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pre-filled from `OPENAI_BASE_URL`, `OPENAI_API_KEY` and
    /// `OPENAI_MODEL`. Unset or blank variables keep the LM Studio defaults.
    ///
    /// # Panics
    ///
    /// Never panics. Invalid values only surface during [`Self::build`].
    pub fn new_from_env() -> Self {
        Self::from_env_vars(BASE_URL_ENV_VAR, API_KEY_ENV_VAR, MODEL_ENV_VAR)
    }

    fn from_env_vars(base_url_var: &str, api_key_var: &str, model_var: &str) -> Self {
        let config = BackendConfig::new(DEFAULT_BASE_URL, DEFAULT_MODEL).overlay_env(
            base_url_var,
            Some(api_key_var),
            model_var,
        );

        // a missing key still falls back to `DEFAULT_API_KEY` in `build`
        Self {
            base_url: Some(config.endpoint),
            api_key: config.api_key,
            model: Some(config.model),
            ..Self::default()
        }
    }

    /// Take endpoint, key and model from an explicit configuration.
    pub fn with_config(mut self, config: BackendConfig) -> Self {
        self.base_url = Some(config.endpoint);
        self.anonymous = config.api_key.is_none();
        self.api_key = config.api_key;
        self.model = Some(config.model);
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self.anonymous = false;
        self
    }

    /// Send no `Authorization` header at all.
    pub fn without_api_key(mut self) -> Self {
        self.api_key = None;
        self.anonymous = true;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Use a preconfigured `reqwest::Client` (proxies, custom TLS, …).
    pub fn with_http_client(mut self, http: HttpClient) -> Self {
        self.http = Some(http);
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Finalise the builder and return a ready-to-use adapter.
    ///
    /// # Errors
    ///
    /// * [`ParleyError::Construction`] – invalid base URL, empty model, an
    ///   API key that cannot be sent as a header, or a failure building the
    ///   HTTP client.
    pub fn build(self) -> Result<OpenAiAdapter> {
        let api_key = match (self.api_key, self.anonymous) {
            (Some(key), _) => Some(key),
            (None, true) => None,
            (None, false) => Some(DEFAULT_API_KEY.to_owned()),
        };

        let config = BackendConfig {
            endpoint: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            api_key,
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
        };
        config.validate()?;

        if let Some(key) = &config.api_key {
            HeaderValue::from_str(&format!("Bearer {key}")).map_err(|_| {
                ParleyError::Construction("API key contains characters not allowed in a header".into())
            })?;
        }

        let http = match self.http {
            Some(http) => http,
            // no overall timeout: a long generation must not be cut off
            None => HttpClient::builder()
                .connect_timeout(Duration::from_secs(10))
                .build()
                .map_err(|e| ParleyError::Construction(format!("building HTTP client: {e}")))?,
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(?config, "openai-compatible backend configured");

        let client = OpenAiClient::with_http(config.api_key.clone(), http, config.base_url());

        Ok(OpenAiAdapter {
            client: Arc::new(client),
            model: config.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_lm_studio() {
        let adapter = OpenAiAdapterBuilder::new().build().unwrap();
        assert_eq!(adapter.base_url(), DEFAULT_BASE_URL);
        assert_eq!(adapter.model(), DEFAULT_MODEL);
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let adapter = OpenAiAdapterBuilder::new()
            .with_base_url("http://127.0.0.1:8080/v1/")
            .build()
            .unwrap();
        assert_eq!(adapter.base_url(), "http://127.0.0.1:8080/v1");
    }

    #[test]
    fn blank_environment_falls_back_to_defaults() {
        // SAFETY: these names are unique to this test.
        unsafe {
            std::env::set_var("PARLEY_TEST_OPENAI_BASE_URL", "");
            std::env::set_var("PARLEY_TEST_OPENAI_API_KEY", "");
            std::env::set_var("PARLEY_TEST_OPENAI_MODEL", "qwen2.5-7b-instruct");
        }

        let builder = OpenAiAdapterBuilder::from_env_vars(
            "PARLEY_TEST_OPENAI_BASE_URL",
            "PARLEY_TEST_OPENAI_API_KEY",
            "PARLEY_TEST_OPENAI_MODEL",
        );
        assert_eq!(builder.api_key, None);
        assert!(!builder.anonymous);

        let adapter = builder.build().unwrap();
        assert_eq!(adapter.base_url(), DEFAULT_BASE_URL);
        assert_eq!(adapter.model(), "qwen2.5-7b-instruct");
    }

    #[test]
    fn invalid_configuration_is_a_construction_error() {
        let bad_url = OpenAiAdapterBuilder::new().with_base_url("localhost:1234").build();
        assert!(matches!(bad_url, Err(ParleyError::Construction(_))));

        let no_host = OpenAiAdapterBuilder::new().with_base_url("http://").build();
        assert!(matches!(no_host, Err(ParleyError::Construction(_))));

        let space = OpenAiAdapterBuilder::new()
            .with_base_url("http://local host:1234/v1")
            .build();
        assert!(matches!(space, Err(ParleyError::Construction(_))));

        let bad_key = OpenAiAdapterBuilder::new().with_api_key("line\nbreak").build();
        assert!(matches!(bad_key, Err(ParleyError::Construction(_))));
    }
}
