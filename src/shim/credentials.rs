//! Relay credentials

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// Credentials every redirected client is built with
#[derive(Clone)]
pub struct ClientCredentials {
    api_key: SecretString,
    base_url: String,
    model_name: String,
}

impl ClientCredentials {
    pub fn new(api_key: SecretString, base_url: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into(),
            model_name: model_name.into(),
        }
    }

    /// Plaintext key, only for the authorization step
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("api_key", &"[redacted]")
            .field("base_url", &self.base_url)
            .field("model_name", &self.model_name)
            .finish()
    }
}
