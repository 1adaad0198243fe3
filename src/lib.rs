//! AiHubMix Shim Library
//!
//! Redirects a Gemini client to the AiHubMix relay and inlines uploaded
//! files into generate-content requests

pub mod config;
pub mod genai;
pub mod shim;
pub mod utils;

// Re-export common types
pub use config::Settings;
pub use genai::{Client, ClientOptions, GenAiLibrary};
pub use shim::{install, Installation, PatchInstaller, ShimCapabilities};
pub use utils::error::{ShimError, ShimResult};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get version information
pub fn version_info() -> String {
    format!("{} v{} - {}", NAME, VERSION, DESCRIPTION)
}
