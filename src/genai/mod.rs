//! Gemini client module
//!
//! Capability traits of the generative-AI client plus the default
//! HTTP-backed implementation. The shim decorates these traits instead of
//! touching the client itself.

pub mod http;
pub mod normalize;
pub mod source;
pub mod types;

use crate::utils::error::ShimResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub use http::HttpClientFactory;
pub use normalize::StandardNormalizer;
pub use source::FileSource;
pub use types::*;

/// Transport options of a client
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HttpOptions {
    /// Base URL (defaults to the public Gemini endpoint)
    pub base_url: Option<String>,
    /// API version path segment (defaults to "v1beta")
    pub api_version: Option<String>,
    /// Request timeout
    pub timeout: Option<Duration>,
    /// Extra headers added to every request
    pub headers: HashMap<String, String>,
}

/// Client construction arguments
#[derive(Clone, Default)]
pub struct ClientOptions {
    pub api_key: Option<String>,
    pub http_options: HttpOptions,
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("http_options", &self.http_options)
            .finish()
    }
}

/// Asynchronous files API
#[async_trait]
pub trait FilesApi: Send + Sync {
    /// Upload a file and return its handle
    async fn upload(&self, file: FileSource, config: Option<UploadFileConfig>) -> ShimResult<File>;
}

/// Asynchronous models API
#[async_trait]
pub trait ModelsApi: Send + Sync {
    /// Send a generateContent request
    async fn generate_content(
        &self,
        model: &str,
        contents: ContentsInput,
        config: Option<GenerateContentConfig>,
    ) -> ShimResult<GenerateContentResponse>;
}

/// Turns any accepted `contents` shape into a list of contents
pub trait ContentNormalizer: Send + Sync {
    fn contents_to_list(&self, contents: ContentsInput) -> ShimResult<Vec<Content>>;
}

/// Client constructor
pub trait ClientFactory: Send + Sync {
    fn create(&self, options: ClientOptions) -> ShimResult<Client>;
}

/// A constructed client
#[derive(Clone)]
pub struct Client {
    options: ClientOptions,
    files: Arc<dyn FilesApi>,
    models: Arc<dyn ModelsApi>,
}

impl Client {
    pub fn new(options: ClientOptions, files: Arc<dyn FilesApi>, models: Arc<dyn ModelsApi>) -> Self {
        Self { options, files, models }
    }

    /// Options the client was built with
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Effective API key
    pub fn api_key(&self) -> Option<&str> {
        self.options.api_key.as_deref()
    }

    /// Effective base URL
    pub fn base_url(&self) -> Option<&str> {
        self.options.http_options.base_url.as_deref()
    }

    pub fn files(&self) -> &Arc<dyn FilesApi> {
        &self.files
    }

    pub fn models(&self) -> &Arc<dyn ModelsApi> {
        &self.models
    }

    /// Replace the files and models APIs, keeping the options
    pub fn with_apis(self, files: Arc<dyn FilesApi>, models: Arc<dyn ModelsApi>) -> Self {
        Self {
            options: self.options,
            files,
            models,
        }
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client").field("options", &self.options).finish()
    }
}

/// Entry points of a client library
///
/// A library built against an older or newer interface may miss the
/// normalization routine, in which case the upload bypass cannot be offered.
#[derive(Clone)]
pub struct GenAiLibrary {
    pub version: String,
    pub factory: Option<Arc<dyn ClientFactory>>,
    pub normalizer: Option<Arc<dyn ContentNormalizer>>,
}

impl GenAiLibrary {
    /// The bundled HTTP library
    pub fn http() -> Self {
        Self {
            version: crate::VERSION.to_string(),
            factory: Some(Arc::new(HttpClientFactory::new())),
            normalizer: Some(Arc::new(StandardNormalizer)),
        }
    }

    /// Construct a client through the library's factory
    pub fn create_client(&self, options: ClientOptions) -> ShimResult<Client> {
        match &self.factory {
            Some(factory) => factory.create(options),
            None => Err(crate::utils::error::helpers::unsupported(
                "client factory is not available",
            )),
        }
    }
}

impl fmt::Debug for GenAiLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenAiLibrary")
            .field("version", &self.version)
            .field("factory", &self.factory.is_some())
            .field("normalizer", &self.normalizer.is_some())
            .finish()
    }
}
