//! Application configuration settings
//!
//! Reads the relay credentials and ambient options from the environment

use crate::shim::ClientCredentials;
use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

/// Default relay address
pub const DEFAULT_BASE_URL: &str = "https://aihubmix.com";

/// Default model name
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Settings {
    /// Relay configuration
    pub gemini: GeminiConfig,
    /// Upload bypass configuration
    pub upload: UploadConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Relay configuration
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Relay token; absent disables the shim
    pub api_key: Option<SecretString>,
    /// Relay base URL
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Request timeout in seconds
    pub timeout: u64,
}

/// Upload bypass configuration
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Seconds a captured upload stays resolvable, 0 keeps it forever
    pub cache_ttl_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (text/json)
    pub format: String,
}

impl Settings {
    /// Create a new configuration instance from the process environment
    pub fn new() -> Result<Self> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let settings = Self {
            gemini: GeminiConfig {
                api_key: get_env(&lookup, "GEMINI_API_KEY").map(SecretString::from),
                base_url: get_env_or_default(&lookup, "GEMINI_BASE_URL", DEFAULT_BASE_URL),
                model: get_env_or_default(&lookup, "GEMINI_MODEL", DEFAULT_MODEL),
                timeout: get_env_or_default(&lookup, "GEMINI_TIMEOUT_SECS", "60")
                    .parse()
                    .context("Invalid timeout value")?,
            },
            upload: UploadConfig {
                cache_ttl_secs: get_env_or_default(&lookup, "UPLOAD_CACHE_TTL_SECS", "0")
                    .parse()
                    .context("Invalid upload cache TTL")?,
            },
            logging: LoggingConfig {
                level: get_env_or_default(&lookup, "RUST_LOG", "info"),
                format: get_env_or_default(&lookup, "LOG_FORMAT", "text"),
            },
        };

        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration validity
    fn validate(&self) -> Result<()> {
        if !self.gemini.base_url.starts_with("http") {
            anyhow::bail!("Invalid Gemini base URL format, should start with 'http'");
        }

        if let Some(key) = &self.gemini.api_key {
            if key.expose_secret().contains(char::is_whitespace) {
                anyhow::bail!("Gemini API key cannot contain whitespace characters");
            }
        }

        if self.gemini.timeout == 0 {
            anyhow::bail!("Timeout value cannot be 0");
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            anyhow::bail!("Invalid log format: {}", self.logging.format);
        }

        Ok(())
    }

    /// Whether the relay is configured
    pub fn feature_enabled(&self) -> bool {
        self.gemini.api_key.is_some()
    }

    /// Credentials for the shim, if the relay is configured
    pub fn credentials(&self) -> Option<ClientCredentials> {
        self.gemini.api_key.as_ref().map(|key| {
            ClientCredentials::new(key.clone(), self.gemini.base_url.clone(), self.gemini.model.clone())
        })
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.gemini.timeout)
    }

    /// Lifetime of captured uploads, `None` for no expiry
    pub fn upload_ttl(&self) -> Option<Duration> {
        match self.upload.cache_ttl_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

/// Look up a key, treating empty values as unset
fn get_env<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|v| !v.trim().is_empty())
}

/// Get environment variable or default value
fn get_env_or_default<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    get_env(lookup, key).unwrap_or_else(|| default.to_string())
}
