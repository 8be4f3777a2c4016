use std::{sync::Arc, time::Duration};

use parley_core::{
    config::BackendConfig,
    error::{ParleyError, Result},
};
use reqwest::{Client as HttpClient, header::HeaderValue};

use crate::client::OllamaClient;

pub const DEFAULT_HOST: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3";

pub const HOST_ENV_VAR: &str = "OLLAMA_HOST";
pub const MODEL_ENV_VAR: &str = "OLLAMA_MODEL";

/// Ollama backend implementing
/// [`parley_core::provider::StreamingCompletionProvider`].
///
/// Build once through [`OllamaAdapterBuilder`] and share it between turns.
#[derive(Clone)]
pub struct OllamaAdapter {
    pub(crate) client: Arc<OllamaClient>,
    pub(crate) model: String,
    pub(crate) temperature: Option<f64>,
    pub(crate) max_tokens: Option<u32>,
}

impl OllamaAdapter {
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }
}

/// Builder for [`OllamaAdapter`].
///
/// ```rust,no_run
/// use parley_ollama::OllamaAdapterBuilder;
///
/// let backend = OllamaAdapterBuilder::new_from_env()
///     .with_model("mistral")
///     .build()
///     .expect("valid backend configuration");
/// ```
#[derive(Default)]
pub struct OllamaAdapterBuilder {
    pub(crate) host: Option<String>,
    pub(crate) api_key: Option<String>,
    pub(crate) model: Option<String>,
    pub(crate) http: Option<HttpClient>,
    pub(crate) temperature: Option<f64>,
    pub(crate) max_tokens: Option<u32>,
}

impl OllamaAdapterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pre-filled from `OLLAMA_HOST` and `OLLAMA_MODEL`. Unset or
    /// blank variables keep the local defaults.
    pub fn new_from_env() -> Self {
        Self::from_env_vars(HOST_ENV_VAR, MODEL_ENV_VAR)
    }

    fn from_env_vars(host_var: &str, model_var: &str) -> Self {
        let config =
            BackendConfig::new(DEFAULT_HOST, DEFAULT_MODEL).overlay_env(host_var, None, model_var);
        Self::new().with_config(config)
    }

    pub fn with_config(mut self, config: BackendConfig) -> Self {
        self.host = Some(config.endpoint);
        self.api_key = config.api_key;
        self.model = Some(config.model);
        self
    }

    /// Server root. A bare `host:port`, as `OLLAMA_HOST` commonly holds, is
    /// read as plain `http`.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_http_client(mut self, http: HttpClient) -> Self {
        self.http = Some(http);
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sent to Ollama as `num_predict`.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// # Errors
    ///
    /// * [`ParleyError::Construction`] – unusable host, empty model, a key
    ///   that cannot be sent as a header, or a failure building the HTTP
    ///   client.
    pub fn build(self) -> Result<OllamaAdapter> {
        let host = self.host.unwrap_or_else(|| DEFAULT_HOST.to_owned());

        let config = BackendConfig {
            endpoint: with_scheme(host.trim()),
            api_key: self.api_key,
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
            None => HttpClient::builder()
                .connect_timeout(Duration::from_secs(10))
                .build()
                .map_err(|e| ParleyError::Construction(format!("building HTTP client: {e}")))?,
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(?config, "ollama backend configured");

        let client = OllamaClient::with_http(config.api_key.clone(), http, config.base_url());

        Ok(OllamaAdapter {
            client: Arc::new(client),
            model: config.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        })
    }
}

fn with_scheme(host: &str) -> String {
    if host.contains("://") {
        host.to_owned()
    } else {
        format!("http://{host}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_ollama() {
        let adapter = OllamaAdapterBuilder::new().build().unwrap();
        assert_eq!(adapter.base_url(), DEFAULT_HOST);
        assert_eq!(adapter.model(), DEFAULT_MODEL);
    }

    #[test]
    fn bare_host_gets_http_scheme() {
        let adapter = OllamaAdapterBuilder::new()
            .with_host("127.0.0.1:11434/")
            .build()
            .unwrap();
        assert_eq!(adapter.base_url(), "http://127.0.0.1:11434");
    }

    #[test]
    fn blank_environment_falls_back_to_defaults() {
        // SAFETY: these names are unique to this test.
        unsafe {
            std::env::set_var("PARLEY_TEST_OLLAMA_HOST", " ");
            std::env::set_var("PARLEY_TEST_OLLAMA_MODEL", "");
        }

        let adapter = OllamaAdapterBuilder::from_env_vars(
            "PARLEY_TEST_OLLAMA_HOST",
            "PARLEY_TEST_OLLAMA_MODEL",
        )
        .build()
        .unwrap();
        assert_eq!(adapter.base_url(), DEFAULT_HOST);
        assert_eq!(adapter.model(), DEFAULT_MODEL);
    }

    #[test]
    fn unsupported_scheme_is_rejected() {
        let result = OllamaAdapterBuilder::new().with_host("ftp://ollama").build();
        assert!(matches!(result, Err(ParleyError::Construction(_))));

        let result = OllamaAdapterBuilder::new().with_model(" ").build();
        assert!(matches!(result, Err(ParleyError::Construction(_))));
    }
}
