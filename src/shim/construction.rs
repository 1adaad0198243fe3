//! Construction interceptor
//!
//! Rewrites the key and base URL of every client built through the factory

use super::credentials::ClientCredentials;
use super::endpoint::normalize_base_url;
use super::rewrite::InlineRewriteModels;
use super::store::PendingUploadStore;
use super::upload::BypassFiles;
use crate::genai::{Client, ClientFactory, ClientOptions, ContentNormalizer, HttpOptions};
use crate::utils::error::{helpers, ShimResult};
use std::sync::Arc;
use tracing::info;

/// Pieces needed to decorate clients with the upload bypass
#[derive(Clone)]
pub struct UploadBypass {
    pub store: Arc<PendingUploadStore>,
    pub normalizer: Arc<dyn ContentNormalizer>,
}

/// Factory that redirects every client to the relay
pub struct RedirectingFactory {
    inner: Arc<dyn ClientFactory>,
    credentials: ClientCredentials,
    bypass: Option<UploadBypass>,
}

impl RedirectingFactory {
    /// Wrap `inner`, checking that the credentials form a usable endpoint
    pub fn new(inner: Arc<dyn ClientFactory>, credentials: ClientCredentials) -> ShimResult<Self> {
        if credentials.api_key().is_empty() {
            return Err(helpers::invalid_config("relay API key is empty"));
        }

        let endpoint = normalize_base_url(credentials.base_url());
        reqwest::Url::parse(&endpoint)
            .map_err(|e| helpers::invalid_config(format!("invalid relay URL '{}': {}", endpoint, e)))?;

        Ok(Self {
            inner,
            credentials,
            bypass: None,
        })
    }

    /// Also decorate constructed clients with the upload bypass
    pub fn with_upload_bypass(mut self, bypass: UploadBypass) -> Self {
        self.bypass = Some(bypass);
        self
    }

    pub fn has_upload_bypass(&self) -> bool {
        self.bypass.is_some()
    }

    /// Replace the caller's key and transport options with the relay's
    ///
    /// Only the caller's timeout survives. Headers and api version are
    /// dropped so no caller credential reaches the relay.
    fn redirect(&self, options: ClientOptions) -> ClientOptions {
        let endpoint = normalize_base_url(self.credentials.base_url());

        ClientOptions {
            api_key: Some(self.credentials.api_key().to_string()),
            http_options: HttpOptions {
                base_url: Some(endpoint),
                timeout: options.http_options.timeout,
                ..Default::default()
            },
        }
    }
}

impl ClientFactory for RedirectingFactory {
    fn create(&self, options: ClientOptions) -> ShimResult<Client> {
        let options = self.redirect(options);

        info!(
            "🚀 AiHubMix redirect applied | model: {} | endpoint: {}",
            self.credentials.model_name(),
            options.http_options.base_url.as_deref().unwrap_or_default()
        );

        let client = self.inner.create(options)?;

        match &self.bypass {
            Some(bypass) => {
                let files = Arc::new(BypassFiles::new(bypass.store.clone()));
                let models = Arc::new(InlineRewriteModels::new(
                    client.models().clone(),
                    bypass.normalizer.clone(),
                    bypass.store.clone(),
                ));
                Ok(client.with_apis(files, models))
            }
            None => Ok(client),
        }
    }
}
