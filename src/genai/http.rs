//! HTTP Gemini client
//!
//! Non-streaming client for the generateContent and files endpoints

use super::normalize::contents_to_list;
use super::source::FileSource;
use super::types::*;
use super::{Client, ClientFactory, ClientOptions, FilesApi, ModelsApi};
use crate::utils::error::{helpers, ShimError, ShimResult};
use crate::utils::logging::create_contents_log_summary;
use async_trait::async_trait;
use reqwest::RequestBuilder;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// Public Gemini endpoint
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default API version
pub const DEFAULT_API_VERSION: &str = "v1beta";

const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_UPLOAD_MIME_TYPE: &str = "application/octet-stream";

/// Factory for HTTP-backed clients
#[derive(Debug, Clone, Default)]
pub struct HttpClientFactory;

impl HttpClientFactory {
    pub fn new() -> Self {
        Self
    }
}

impl ClientFactory for HttpClientFactory {
    fn create(&self, options: ClientOptions) -> ShimResult<Client> {
        let transport = Arc::new(HttpTransport::new(&options)?);
        let files = Arc::new(HttpFiles {
            transport: transport.clone(),
        });
        let models = Arc::new(HttpModels { transport });
        Ok(Client::new(options, files, models))
    }
}

/// Shared connection state of one client
struct HttpTransport {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    api_version: String,
    headers: HashMap<String, String>,
}

impl HttpTransport {
    fn new(options: &ClientOptions) -> ShimResult<Self> {
        let api_key = match options.api_key.as_deref() {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => return Err(helpers::invalid_config("API key is required to build a client")),
        };

        let http = &options.http_options;
        let timeout = http
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("aihubmix-shim/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: http
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_version: http
                .api_version
                .clone()
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            headers: http.headers.clone(),
        })
    }

    fn generate_url(&self, model: &str) -> String {
        let model = model.strip_prefix("models/").unwrap_or(model);
        format!(
            "{}/{}/models/{}:generateContent",
            self.base_url, self.api_version, model
        )
    }

    fn upload_url(&self) -> String {
        format!("{}/upload/{}/files", self.base_url, self.api_version)
    }

    /// Add authentication and custom headers
    fn decorate(&self, builder: RequestBuilder) -> RequestBuilder {
        let mut builder = builder.header("x-goog-api-key", &self.api_key);
        for (key, value) in &self.headers {
            builder = builder.header(key, value);
        }
        builder
    }

    async fn send<T: serde::de::DeserializeOwned>(&self, builder: RequestBuilder) -> ShimResult<T> {
        let response = self.decorate(builder).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            serde_json::from_str(&body).map_err(|e| {
                error!("Failed to parse Gemini response: {}", e);
                ShimError::Serialization(e)
            })
        } else {
            error!("Gemini API request failed: {} - {}", status, body);
            Err(ShimError::from_api_response(status, &body))
        }
    }
}

/// Files API over HTTP
struct HttpFiles {
    transport: Arc<HttpTransport>,
}

#[async_trait]
impl FilesApi for HttpFiles {
    async fn upload(&self, file: FileSource, config: Option<UploadFileConfig>) -> ShimResult<File> {
        let config = config.unwrap_or_default();
        let bytes = file.read_all().await?;
        let mime_type = config
            .mime_type
            .unwrap_or_else(|| DEFAULT_UPLOAD_MIME_TYPE.to_string());

        debug!("📤 Uploading {} bytes ({})", bytes.len(), mime_type);

        let mut builder = self
            .transport
            .client
            .post(self.transport.upload_url())
            .header("X-Goog-Upload-Protocol", "raw")
            .header("Content-Type", mime_type)
            .body(bytes);
        if let Some(display_name) = config.display_name {
            builder = builder.header("X-Goog-Upload-File-Name", display_name);
        }

        let uploaded: UploadFileResponse = self.transport.send(builder).await?;
        debug!("📥 Uploaded file: {}", uploaded.file.name);
        Ok(uploaded.file)
    }
}

/// Models API over HTTP
struct HttpModels {
    transport: Arc<HttpTransport>,
}

#[async_trait]
impl ModelsApi for HttpModels {
    async fn generate_content(
        &self,
        model: &str,
        contents: ContentsInput,
        config: Option<GenerateContentConfig>,
    ) -> ShimResult<GenerateContentResponse> {
        let config = config.unwrap_or_default();
        let request = GenerateContentRequest {
            contents: contents_to_list(contents),
            system_instruction: config.system_instruction,
            generation_config: config.generation,
        };

        debug!(
            "📤 generateContent {}: {}",
            model,
            create_contents_log_summary(&request.contents)
        );

        let builder = self
            .transport
            .client
            .post(self.transport.generate_url(model))
            .json(&request);

        let response: GenerateContentResponse = self.transport.send(builder).await?;
        debug!("Gemini request completed with {} candidates", response.candidates.len());
        Ok(response)
    }
}
