//! Contents normalization
//!
//! Canonicalizes the `contents` argument into `Vec<Content>`

use super::types::{Content, ContentItem, ContentsInput, File, Part};
use super::ContentNormalizer;
use crate::utils::error::ShimResult;

/// Default mime type when a file handle does not carry one
const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Normalizer shipped with the HTTP library
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardNormalizer;

impl ContentNormalizer for StandardNormalizer {
    fn contents_to_list(&self, contents: ContentsInput) -> ShimResult<Vec<Content>> {
        Ok(contents_to_list(contents))
    }
}

fn file_part(file: File) -> Part {
    let mime_type = file
        .mime_type
        .unwrap_or_else(|| FALLBACK_MIME_TYPE.to_string());
    Part::from_uri(file.uri, mime_type)
}

/// Normalize any accepted shape into a list of contents
pub fn contents_to_list(contents: ContentsInput) -> Vec<Content> {
    match contents {
        ContentsInput::Text(text) => vec![Content::user(vec![Part::text(text)])],
        ContentsInput::Part(part) => vec![Content::user(vec![part])],
        ContentsInput::Parts(parts) if parts.is_empty() => Vec::new(),
        ContentsInput::Parts(parts) => vec![Content::user(parts)],
        ContentsInput::Content(content) => vec![content],
        ContentsInput::Contents(contents) => contents,
        ContentsInput::File(file) => vec![Content::user(vec![file_part(file)])],
        ContentsInput::Mixed(items) => coalesce(items),
    }
}

// Consecutive bare parts are grouped into one user turn
fn coalesce(items: Vec<ContentItem>) -> Vec<Content> {
    let mut result = Vec::new();
    let mut pending: Vec<Part> = Vec::new();

    for item in items {
        let part = match item {
            ContentItem::Content(content) => {
                if !pending.is_empty() {
                    result.push(Content::user(std::mem::take(&mut pending)));
                }
                result.push(content);
                continue;
            }
            ContentItem::Text(text) => Part::text(text),
            ContentItem::Part(part) => part,
            ContentItem::File(file) => file_part(file),
        };
        pending.push(part);
    }

    if !pending.is_empty() {
        result.push(Content::user(pending));
    }

    result
}
