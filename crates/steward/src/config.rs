use std::env;
use std::error::Error as StdError;
use std::fmt::{self, Display};

use steward_backend::{BackendConfig, BackendConfigBuilder, ProviderKind};

/// A startup configuration problem: unknown provider, missing API key, or
/// an unparsable override.
#[derive(Debug)]
pub struct ConfigError(String);

impl Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for ConfigError {}

/// Builds the backend configuration from the environment.
///
/// The provider comes from the `--provider` flag when given, otherwise
/// from `DEFAULT_LLM_PROVIDER`, defaulting to `openai`. Each provider has
/// its own key/model variables; a missing key is a startup error rather
/// than a deferred failure on the first call.
pub fn load(provider_flag: Option<&str>) -> Result<BackendConfig, ConfigError> {
    let name = match provider_flag {
        Some(name) => name.to_owned(),
        None => env::var("DEFAULT_LLM_PROVIDER").unwrap_or_else(|_| "openai".to_owned()),
    };
    let kind: ProviderKind = name
        .parse()
        .map_err(|err| ConfigError(format!("{err}")))?;

    let (key_var, model_var) = match kind {
        ProviderKind::OpenAi => ("OPENAI_API_KEY", "OPENAI_MODEL"),
        ProviderKind::Anthropic => ("ANTHROPIC_API_KEY", "ANTHROPIC_MODEL"),
    };
    let api_key = env::var(key_var)
        .map_err(|_| ConfigError(format!("{key_var} environment variable is not set")))?;

    let mut builder = BackendConfigBuilder::new(kind, api_key);
    if let Ok(model) = env::var(model_var) {
        builder = builder.with_model(model);
    }
    if kind == ProviderKind::OpenAi {
        if let Ok(base_url) = env::var("OPENAI_BASE_URL") {
            builder = builder.with_base_url(base_url);
        }
    }
    if let Ok(value) = env::var("STEWARD_MAX_TOKENS") {
        let max_tokens = value.parse().map_err(|_| {
            ConfigError(format!("STEWARD_MAX_TOKENS is not a number: {value:?}"))
        })?;
        builder = builder.with_max_tokens(max_tokens);
    }
    if let Ok(value) = env::var("STEWARD_TEMPERATURE") {
        let temperature = value.parse().map_err(|_| {
            ConfigError(format!("STEWARD_TEMPERATURE is not a number: {value:?}"))
        })?;
        builder = builder.with_temperature(temperature);
    }

    Ok(builder.build())
}
