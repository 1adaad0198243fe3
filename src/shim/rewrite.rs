//! Content-rewrite interceptor
//!
//! Replaces references to captured uploads with inline bytes before the
//! request leaves the process

use super::store::PendingUploadStore;
use super::upload::BYPASS_MIME_TYPE;
use crate::genai::{
    Content, ContentNormalizer, ContentsInput, GenerateContentConfig, GenerateContentResponse,
    ModelsApi, Part,
};
use crate::utils::error::ShimResult;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Swap known file references for inline payloads, returning the count
pub fn inline_pending_uploads(contents: &mut [Content], store: &PendingUploadStore) -> usize {
    let mut replaced = 0;
    for content in contents.iter_mut() {
        for part in content.parts.iter_mut() {
            let Some(uri) = part.file_uri() else {
                continue;
            };
            if let Some(bytes) = store.get(uri) {
                debug!("💉 Inlining {} ({} bytes)", uri, bytes.len());
                *part = Part::from_bytes(bytes.as_ref().clone(), BYPASS_MIME_TYPE);
                replaced += 1;
            }
        }
    }
    replaced
}

/// Models API decorator that inlines captured uploads
pub struct InlineRewriteModels {
    inner: Arc<dyn ModelsApi>,
    normalizer: Arc<dyn ContentNormalizer>,
    store: Arc<PendingUploadStore>,
}

impl InlineRewriteModels {
    pub fn new(
        inner: Arc<dyn ModelsApi>,
        normalizer: Arc<dyn ContentNormalizer>,
        store: Arc<PendingUploadStore>,
    ) -> Self {
        Self {
            inner,
            normalizer,
            store,
        }
    }
}

#[async_trait]
impl ModelsApi for InlineRewriteModels {
    async fn generate_content(
        &self,
        model: &str,
        contents: ContentsInput,
        config: Option<GenerateContentConfig>,
    ) -> ShimResult<GenerateContentResponse> {
        let mut normalized = self.normalizer.contents_to_list(contents)?;

        let replaced = inline_pending_uploads(&mut normalized, &self.store);
        if replaced > 0 {
            debug!("Rewrote {} file references for {}", replaced, model);
        }

        self.inner
            .generate_content(model, ContentsInput::Contents(normalized), config)
            .await
    }
}
