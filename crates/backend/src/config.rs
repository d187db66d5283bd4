use std::fmt::Debug;

use crate::ProviderKind;

/// Builder for [`BackendConfig`].
#[derive(Clone, PartialEq)]
pub struct BackendConfigBuilder {
    kind: ProviderKind,
    api_key: String,
    model: Option<String>,
    base_url: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

impl BackendConfigBuilder {
    /// Creates a builder for the given backend with an API key.
    #[inline]
    pub fn new<S: Into<String>>(kind: ProviderKind, api_key: S) -> Self {
        Self {
            kind,
            api_key: api_key.into(),
            model: None,
            base_url: None,
            max_tokens: None,
            temperature: None,
        }
    }

    /// Sets the model to use.
    #[inline]
    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets a custom base URL.
    #[inline]
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the generation cap. The messages style backend requires this
    /// on every call, so the configuration always carries a value.
    #[inline]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Sets the sampling temperature.
    #[inline]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Builds the configuration, filling per-backend defaults.
    pub fn build(self) -> BackendConfig {
        let (default_model, default_base_url) = match self.kind {
            ProviderKind::OpenAi => ("gpt-4o", "https://api.openai.com/v1"),
            ProviderKind::Anthropic => {
                ("claude-3-5-sonnet-20241022", "https://api.anthropic.com")
            }
        };
        BackendConfig {
            kind: self.kind,
            api_key: self.api_key,
            model: self.model.unwrap_or_else(|| default_model.to_owned()),
            base_url: self
                .base_url
                .unwrap_or_else(|| default_base_url.to_owned()),
            max_tokens: self.max_tokens.unwrap_or(4096),
            temperature: self.temperature.unwrap_or(0.7),
        }
    }
}

impl Debug for BackendConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfigBuilder")
            .field("kind", &self.kind)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Configuration for a [`BackendClient`](crate::BackendClient).
#[derive(Clone, PartialEq)]
pub struct BackendConfig {
    pub(crate) kind: ProviderKind,
    pub(crate) api_key: String,
    pub(crate) model: String,
    pub(crate) base_url: String,
    pub(crate) max_tokens: u32,
    pub(crate) temperature: f32,
}

impl BackendConfig {
    /// The backend this configuration targets.
    #[inline]
    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    /// The model name sent with every request.
    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }

    pub(crate) fn api_key(&self) -> &str {
        &self.api_key
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("kind", &self.kind)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}
