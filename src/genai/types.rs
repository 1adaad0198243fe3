//! Gemini API data models
//!
//! Request, response and file structures exchanged with the generateContent
//! and files endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role used for contents built from bare parts
pub const USER_ROLE: &str = "user";

/// A single turn of the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// Role (user/model)
    #[serde(default = "default_role")]
    pub role: String,
    /// Ordered parts of this turn
    #[serde(default)]
    pub parts: Vec<Part>,
}

fn default_role() -> String {
    USER_ROLE.to_string()
}

impl Content {
    /// Create a user content from parts
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: USER_ROLE.to_string(),
            parts,
        }
    }

    /// Create a content with an explicit role
    pub fn with_role(role: impl Into<String>, parts: Vec<Part>) -> Self {
        Self {
            role: role.into(),
            parts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: Blob,
    },
    FileData {
        #[serde(rename = "fileData")]
        file_data: FileData,
    },
    FunctionCall {
        #[serde(rename = "functionCall")]
        function_call: FunctionCall,
    },
    FunctionResponse {
        #[serde(rename = "functionResponse")]
        function_response: FunctionResponse,
    },
    /// Part kinds not modelled here, kept verbatim
    Other(serde_json::Value),
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    /// Inline byte payload
    pub fn from_bytes(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Part::InlineData {
            inline_data: Blob {
                mime_type: mime_type.into(),
                data,
            },
        }
    }

    /// By-reference file pointer
    pub fn from_uri(file_uri: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Part::FileData {
            file_data: FileData {
                mime_type: Some(mime_type.into()),
                file_uri: file_uri.into(),
            },
        }
    }

    /// Uri of a file-data part
    pub fn file_uri(&self) -> Option<&str> {
        match self {
            Part::FileData { file_data } => Some(file_data.file_uri.as_str()),
            _ => None,
        }
    }
}

/// Inline bytes, base64 encoded on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blob {
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileData {
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(rename = "fileUri")]
    pub file_uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    pub name: String,
    pub response: serde_json::Value,
}

/// Uploaded file handle as returned by the files API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "string_u64")]
    pub size_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<FileState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileState {
    StateUnspecified,
    Processing,
    Active,
    Failed,
}

/// Files API upload response wrapper
#[derive(Debug, Clone, Deserialize)]
pub struct UploadFileResponse {
    pub file: File,
}

/// Options accepted by `FilesApi::upload`
#[derive(Debug, Clone, Default)]
pub struct UploadFileConfig {
    pub mime_type: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
}

/// Pass-through options of `ModelsApi::generate_content`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateContentConfig {
    pub system_instruction: Option<Content>,
    pub generation: Option<GenerationConfig>,
}

/// Wire body of a generateContent call
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<UsageMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate
    pub fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let content = candidate.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| match p {
                Part::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub index: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: Option<u32>,
    #[serde(default)]
    pub candidates_token_count: Option<u32>,
    #[serde(default)]
    pub total_token_count: Option<u32>,
}

/// Every shape accepted for the `contents` argument
#[derive(Debug, Clone, PartialEq)]
pub enum ContentsInput {
    Text(String),
    Part(Part),
    Parts(Vec<Part>),
    Content(Content),
    Contents(Vec<Content>),
    File(File),
    Mixed(Vec<ContentItem>),
}

/// One element of a mixed contents list
#[derive(Debug, Clone, PartialEq)]
pub enum ContentItem {
    Text(String),
    Part(Part),
    File(File),
    Content(Content),
}

impl From<&str> for ContentsInput {
    fn from(text: &str) -> Self {
        ContentsInput::Text(text.to_string())
    }
}

impl From<String> for ContentsInput {
    fn from(text: String) -> Self {
        ContentsInput::Text(text)
    }
}

impl From<Vec<Content>> for ContentsInput {
    fn from(contents: Vec<Content>) -> Self {
        ContentsInput::Contents(contents)
    }
}

impl From<Vec<ContentItem>> for ContentsInput {
    fn from(items: Vec<ContentItem>) -> Self {
        ContentsInput::Mixed(items)
    }
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

// The files API reports sizes as decimal strings
mod string_u64 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_str(&v.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Str(String),
            Num(u64),
        }

        match Option::<Raw>::deserialize(deserializer)? {
            Some(Raw::Str(s)) => s.parse().map(Some).map_err(serde::de::Error::custom),
            Some(Raw::Num(n)) => Ok(Some(n)),
            None => Ok(None),
        }
    }
}
