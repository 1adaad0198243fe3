//! AiHubMix shim
//!
//! Decorators that redirect a Gemini client to the relay and route uploads
//! through inline request data

pub mod construction;
pub mod credentials;
pub mod endpoint;
pub mod installer;
pub mod rewrite;
pub mod store;
pub mod upload;

pub use construction::{RedirectingFactory, UploadBypass};
pub use credentials::ClientCredentials;
pub use endpoint::normalize_base_url;
pub use installer::{install, Installation, PatchInstaller, ShimCapabilities};
pub use rewrite::{inline_pending_uploads, InlineRewriteModels};
pub use store::{EvictionPolicy, PendingUpload, PendingUploadStore};
pub use upload::{BypassFiles, BYPASS_MIME_TYPE};
