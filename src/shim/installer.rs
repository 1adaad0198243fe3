//! Patch installer
//!
//! Applies the relay redirect and, when the library allows it, the upload
//! bypass. Failures are logged and contained here; they never reach the
//! application.

use super::construction::{RedirectingFactory, UploadBypass};
use super::credentials::ClientCredentials;
use super::store::{EvictionPolicy, PendingUploadStore};
use crate::config::Settings;
use crate::genai::GenAiLibrary;
use crate::utils::error::{helpers, ShimResult};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// What the installer managed to put in place
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShimCapabilities {
    pub construction_redirect: bool,
    pub upload_bypass: bool,
}

/// Result of an installation attempt
#[derive(Debug, Clone)]
pub struct Installation {
    /// Library to hand to the application, patched or original
    pub library: GenAiLibrary,
    pub capabilities: ShimCapabilities,
    /// Store backing the upload bypass, when installed
    pub store: Option<Arc<PendingUploadStore>>,
}

impl Installation {
    fn unpatched(library: GenAiLibrary) -> Self {
        Self {
            library,
            capabilities: ShimCapabilities::default(),
            store: None,
        }
    }
}

/// Installs the shim onto a client library
#[derive(Debug, Clone)]
pub struct PatchInstaller {
    credentials: Option<ClientCredentials>,
    eviction: EvictionPolicy,
}

impl PatchInstaller {
    pub fn new(credentials: Option<ClientCredentials>) -> Self {
        Self {
            credentials,
            eviction: EvictionPolicy::Never,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.credentials()).with_eviction(settings.upload_ttl().into())
    }

    pub fn with_eviction(mut self, eviction: EvictionPolicy) -> Self {
        self.eviction = eviction;
        self
    }

    /// Whether a credential is configured
    pub fn feature_enabled(&self) -> bool {
        self.credentials.is_some()
    }

    pub fn install(&self, library: GenAiLibrary) -> Installation {
        let Some(credentials) = self.credentials.clone() else {
            debug!("No relay key configured, leaving client library untouched");
            return Installation::unpatched(library);
        };

        let Some(factory) = library.factory.clone() else {
            error!(
                "❌ AiHubMix patch failed: client factory not found in library {}",
                library.version
            );
            return Installation::unpatched(library);
        };

        let redirecting = match RedirectingFactory::new(factory, credentials) {
            Ok(factory) => factory,
            Err(e) => {
                error!("❌ AiHubMix patch failed to install construction redirect: {}", e);
                return Installation::unpatched(library);
            }
        };

        // Optional pair: a failure here must leave the redirect active
        let (redirecting, store) = match self.negotiate_upload_bypass(&library) {
            Ok(bypass) => {
                let store = bypass.store.clone();
                info!("🚀 Upload bypass installed (eviction: {:?})", self.eviction);
                (redirecting.with_upload_bypass(bypass), Some(store))
            }
            Err(e) => {
                warn!("⚠️ Upload bypass unavailable (library version mismatch?): {}", e);
                warn!("⚠️ Falling back to native uploads, which the relay may reject with 400");
                (redirecting, None)
            }
        };

        let capabilities = ShimCapabilities {
            construction_redirect: true,
            upload_bypass: redirecting.has_upload_bypass(),
        };
        info!("🚀 AiHubMix patch applied: {:?}", capabilities);

        Installation {
            library: GenAiLibrary {
                version: library.version,
                factory: Some(Arc::new(redirecting)),
                normalizer: library.normalizer,
            },
            capabilities,
            store,
        }
    }

    fn negotiate_upload_bypass(&self, library: &GenAiLibrary) -> ShimResult<UploadBypass> {
        let normalizer = library.normalizer.clone().ok_or_else(|| {
            helpers::unsupported(format!(
                "contents normalizer not available in library {}",
                library.version
            ))
        })?;

        Ok(UploadBypass {
            store: Arc::new(PendingUploadStore::new(self.eviction)),
            normalizer,
        })
    }
}

/// Install the shim as configured by `settings`
pub fn install(settings: &Settings, library: GenAiLibrary) -> Installation {
    PatchInstaller::from_settings(settings).install(library)
}
