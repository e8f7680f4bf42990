//! Runtime settings for planchain.
//!
//! Settings come from the process environment (a `.env` file is loaded
//! by the entry point before this runs) and are validated once, before
//! any phase executes. A validation failure means zero completion calls.

use crate::errors::ConfigError;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 512;

/// Validated configuration for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through an arbitrary variable lookup. The
    /// environment-independent core, used directly by tests.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("OPENAI_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let api_base = lookup("OPENAI_API_BASE")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let model = lookup("PLANCHAIN_MODEL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let temperature = match lookup("PLANCHAIN_TEMPERATURE") {
            Some(raw) => {
                raw.trim()
                    .parse::<f32>()
                    .map_err(|e| ConfigError::InvalidSetting {
                        name: "PLANCHAIN_TEMPERATURE",
                        value: raw.clone(),
                        reason: e.to_string(),
                    })?
            }
            None => DEFAULT_TEMPERATURE,
        };

        let max_tokens = match lookup("PLANCHAIN_MAX_TOKENS") {
            Some(raw) => {
                raw.trim()
                    .parse::<u32>()
                    .map_err(|e| ConfigError::InvalidSetting {
                        name: "PLANCHAIN_MAX_TOKENS",
                        value: raw.clone(),
                        reason: e.to_string(),
                    })?
            }
            None => DEFAULT_MAX_TOKENS,
        };

        Ok(Self {
            api_key,
            api_base,
            model,
            temperature,
            max_tokens,
        })
    }

    /// Apply a command-line model override, if one was given.
    pub fn with_model_override(mut self, model: Option<&str>) -> Self {
        if let Some(model) = model {
            self.model = model.to_string();
        }
        self
    }
}
