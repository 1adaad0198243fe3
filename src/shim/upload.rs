//! Upload interceptor
//!
//! Captures file bytes locally instead of sending them to the files API

use super::store::PendingUploadStore;
use crate::genai::{File, FileSource, FileState, FilesApi, UploadFileConfig};
use crate::utils::error::ShimResult;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

/// Mime type reported for captured uploads and their inline payloads
pub const BYPASS_MIME_TYPE: &str = "image/png";

/// Files API that never touches the network
pub struct BypassFiles {
    store: Arc<PendingUploadStore>,
}

impl BypassFiles {
    pub fn new(store: Arc<PendingUploadStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl FilesApi for BypassFiles {
    async fn upload(&self, file: FileSource, config: Option<UploadFileConfig>) -> ShimResult<File> {
        let display_name = config
            .and_then(|c| c.display_name)
            .or_else(|| file.file_name());
        let bytes = file.read_all().await?;
        let size = bytes.len() as u64;

        let upload = self.store.insert(bytes);
        debug!("📦 Upload bypassed, referencing {} locally", upload.synthetic_id);

        Ok(File {
            name: upload.synthetic_id.clone(),
            display_name,
            mime_type: Some(BYPASS_MIME_TYPE.to_string()),
            size_bytes: Some(size),
            create_time: Some(Utc::now()),
            uri: upload.synthetic_id,
            state: Some(FileState::Active),
        })
    }
}
