use std::{env, fmt, time::Duration};

use thiserror::Error;

pub const API_KEY_VAR: &str = "GROQ_API_KEY";

pub const DEFAULT_UPSTREAM_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_TEXT_MODEL: &str = "deepseek-r1-distill-llama-70b";
pub const DEFAULT_VISION_MODEL: &str = "meta-llama/llama-4-scout-17b-16e-instruct";
pub const DEFAULT_PORT: u16 = 10000;

/// "What is shown in this photo?"
pub const DEFAULT_VISION_PROMPT: &str = "इस फोटो में क्या दिख रहा है?";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable must be set")]
    Missing(&'static str),

    #[error("{0} cannot be empty")]
    Empty(&'static str),

    #[error("Invalid {var}: {value:?}")]
    Invalid { var: &'static str, value: Box<str> },
}

/// Process-wide relay settings, read once at startup and shared read-only.
#[derive(Clone)]
pub struct RelayConfig {
    pub api_key: Box<str>,
    pub upstream_url: Box<str>,
    pub text_model: Box<str>,
    pub vision_model: Box<str>,
    pub port: u16,
    pub chat_timeout: Duration,
    pub vision_timeout: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
    pub default_vision_prompt: Box<str>,
}

impl RelayConfig {
    /// Builds a config with the stock upstream settings around `api_key`.
    pub fn new(api_key: impl Into<Box<str>>) -> Self {
        Self {
            api_key: api_key.into(),
            upstream_url: DEFAULT_UPSTREAM_URL.into(),
            text_model: DEFAULT_TEXT_MODEL.into(),
            vision_model: DEFAULT_VISION_MODEL.into(),
            port: DEFAULT_PORT,
            chat_timeout: Duration::from_secs(20),
            vision_timeout: Duration::from_secs(30),
            temperature: 0.5,
            max_tokens: 1024,
            default_vision_prompt: DEFAULT_VISION_PROMPT.into(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Reads settings through `lookup`, so callers other than the process
    /// environment (tests) can supply them.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR).ok_or(ConfigError::Missing(API_KEY_VAR))?;
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(ConfigError::Empty(API_KEY_VAR));
        }

        let mut config = Self::new(api_key);

        let non_empty = |var: &str| lookup(var).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        if let Some(url) = non_empty("UPSTREAM_URL") {
            config.upstream_url = url.into();
        }
        if let Some(model) = non_empty("TEXT_MODEL") {
            config.text_model = model.into();
        }
        if let Some(model) = non_empty("VISION_MODEL") {
            config.vision_model = model.into();
        }
        if let Some(port) = non_empty("PORT") {
            config.port = port.parse().map_err(|_| ConfigError::Invalid {
                var: "PORT",
                value: port.into(),
            })?;
        }

        Ok(config)
    }
}

// The key stays out of logs.
impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("api_key", &"<redacted>")
            .field("upstream_url", &self.upstream_url)
            .field("text_model", &self.text_model)
            .field("vision_model", &self.vision_model)
            .field("port", &self.port)
            .field("chat_timeout", &self.chat_timeout)
            .field("vision_timeout", &self.vision_timeout)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish_non_exhaustive()
    }
}
