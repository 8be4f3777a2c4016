//! Opaque backend configuration supplied at construction time.
//!
//! Backend crates accept a [`BackendConfig`] in their builders. The core
//! never opens connections itself; environment variables are only read
//! through [`BackendConfig::overlay_env`].
use std::{env, fmt};

use url::Url;

use crate::error::{ParleyError, Result};

/// Where a backend lives and which model it should run.
#[derive(Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
}

impl BackendConfig {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: None,
            model: model.into(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Override fields from environment variables when they are set and
    /// non-empty. Unset variables keep the current value.
    /// Backends without credentials pass `None` for `api_key_var`.
    pub fn overlay_env(mut self, endpoint_var: &str, api_key_var: Option<&str>, model_var: &str) -> Self {
        if let Some(endpoint) = non_empty_var(endpoint_var) {
            self.endpoint = endpoint;
        }
        if let Some(api_key) = api_key_var.and_then(non_empty_var) {
            self.api_key = Some(api_key);
        }
        if let Some(model) = non_empty_var(model_var) {
            self.model = model;
        }
        self
    }

    /// Endpoint without trailing slashes, so paths can be appended with a
    /// single `/`.
    pub fn base_url(&self) -> &str {
        self.endpoint.trim().trim_end_matches('/')
    }

    /// Reject configurations no backend could use.
    ///
    /// # Errors
    ///
    /// * [`ParleyError::Construction`] – empty model, or an endpoint that
    ///   is not an absolute `http://` / `https://` URL with a host.
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(ParleyError::Construction("model identifier is empty".into()));
        }

        let endpoint = self.endpoint.trim();
        let url = Url::parse(endpoint).map_err(|e| {
            ParleyError::Construction(format!("endpoint `{endpoint}` is not a valid URL: {e}"))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ParleyError::Construction(format!(
                "endpoint `{endpoint}` is not an http(s) URL"
            )));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(ParleyError::Construction(format!(
                "endpoint `{endpoint}` has no host"
            )));
        }

        Ok(())
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

// keep api keys out of logs
impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_strips_trailing_slashes() {
        let config = BackendConfig::new("http://localhost:1234/v1//", "local-model");
        assert_eq!(config.base_url(), "http://localhost:1234/v1");
    }

    #[test]
    fn validate_rejects_bad_endpoint_and_empty_model() {
        let bad_endpoint = BackendConfig::new("localhost:11434", "llama3");
        assert!(matches!(
            bad_endpoint.validate(),
            Err(ParleyError::Construction(_))
        ));

        let empty_model = BackendConfig::new("http://localhost:11434", " ");
        assert!(matches!(
            empty_model.validate(),
            Err(ParleyError::Construction(_))
        ));

        assert!(BackendConfig::new("http://localhost:11434", "llama3").validate().is_ok());
    }

    #[test]
    fn validate_rejects_malformed_urls() {
        for endpoint in [
            "http://",
            "http://local host:1234/v1",
            "https://[::1",
            "ftp://localhost:1234",
            "",
        ] {
            let result = BackendConfig::new(endpoint, "m").validate();
            assert!(
                matches!(result, Err(ParleyError::Construction(_))),
                "`{endpoint}` should be rejected"
            );
        }

        assert!(BackendConfig::new("http://[::1]:8080/v1", "m").validate().is_ok());
        assert!(BackendConfig::new(" https://api.openai.com/v1 ", "m").validate().is_ok());
    }

    #[test]
    fn unset_variables_keep_current_values() {
        let config = BackendConfig::new("http://localhost:11434", "llama3").overlay_env(
            "PARLEY_TEST_UNSET_ENDPOINT",
            Some("PARLEY_TEST_UNSET_KEY"),
            "PARLEY_TEST_UNSET_MODEL",
        );
        assert_eq!(config, BackendConfig::new("http://localhost:11434", "llama3"));
    }

    #[test]
    fn blank_variables_keep_current_values() {
        // SAFETY: these names are unique to this test.
        unsafe {
            env::set_var("PARLEY_TEST_BLANK_ENDPOINT", "");
            env::set_var("PARLEY_TEST_BLANK_KEY", "  ");
            env::set_var("PARLEY_TEST_SET_MODEL", "mistral");
        }

        let config = BackendConfig::new("http://localhost:11434", "llama3").overlay_env(
            "PARLEY_TEST_BLANK_ENDPOINT",
            Some("PARLEY_TEST_BLANK_KEY"),
            "PARLEY_TEST_SET_MODEL",
        );

        assert_eq!(config.endpoint, "http://localhost:11434");
        assert_eq!(config.api_key, None);
        assert_eq!(config.model, "mistral");
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let config = BackendConfig::new("http://localhost:1234/v1", "m").with_api_key("sk-secret");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
