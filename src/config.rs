use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "llama3-8b-8192";
pub const DEFAULT_TIMEOUT_SECS: u64 = 45;
pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_BACKOFF_MS: u64 = 1500;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "GROQ_API_KEY is not set. Set it in your environment, e.g.:\n  \
         Windows PowerShell:  $env:GROQ_API_KEY = 'your_key_here'\n  \
         Bash:                export GROQ_API_KEY='your_key_here'"
    )]
    MissingApiKey,

    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Settings for the upstream chat completions API.
#[derive(Clone)]
pub struct UpstreamConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub backoff_unit: Duration,
}

impl UpstreamConfig {
    /// Upstream settings with the stock defaults and the given key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_unit: Duration::from_millis(DEFAULT_BACKOFF_MS),
        }
    }
}

// Keep the key out of logs.
impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("request_timeout", &self.request_timeout)
            .field("max_retries", &self.max_retries)
            .field("backoff_unit", &self.backoff_unit)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub upstream: UpstreamConfig,
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub templates_dir: String,
    pub static_dir: String,
}

impl Config {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GROQ_API_KEY")
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let string_or = |name: &str, default: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let request_timeout_secs = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        if request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "REQUEST_TIMEOUT_SECS",
                value: request_timeout_secs.to_string(),
            });
        }

        let upstream = UpstreamConfig {
            api_key,
            api_url: string_or("GROQ_API_URL", DEFAULT_API_URL),
            model: string_or("GROQ_MODEL", DEFAULT_MODEL),
            request_timeout: Duration::from_secs(request_timeout_secs),
            max_retries: parse_or(&lookup, "MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
            backoff_unit: Duration::from_millis(parse_or(&lookup, "BACKOFF_MS", DEFAULT_BACKOFF_MS)?),
        };

        Ok(Self {
            upstream,
            host: string_or("HOST", "0.0.0.0"),
            port: parse_or(&lookup, "PORT", 5000)?,
            database_path: string_or("DATABASE_PATH", "chat.db"),
            templates_dir: string_or("TEMPLATES_DIR", "templates"),
            static_dir: string_or("STATIC_DIR", "static"),
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { name, value }),
        _ => Ok(default),
    }
}
