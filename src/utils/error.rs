//! Error handling module
//!
//! Defines error types shared by the shim and the wrapped client

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shim error types
#[derive(Error, Debug)]
pub enum ShimError {
    /// Local read error (upload source)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Backend returned a non-success status
    #[error("Gemini API error ({status}): {message}")]
    Api {
        status: StatusCode,
        message: String,
    },

    /// Library capability is not available
    #[error("Unsupported capability: {0}")]
    Unsupported(String),

}

/// Gemini API error body
#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiErrorResponse {
    pub error: GeminiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiErrorDetail {
    #[serde(default)]
    pub code: Option<u16>,
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl ShimError {
    /// Build an API error from a response status and raw body
    pub fn from_api_response(status: StatusCode, body: &str) -> Self {
        let message = match serde_json::from_str::<GeminiErrorResponse>(body) {
            Ok(parsed) => parsed.error.message,
            Err(_) => body.to_string(),
        };
        ShimError::Api { status, message }
    }

    /// HTTP status of the backend failure, if any
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            ShimError::Api { status, .. } => Some(*status),
            ShimError::HttpClient(e) => e.status(),
            _ => None,
        }
    }
}

/// Result type alias
pub type ShimResult<T> = Result<T, ShimError>;

/// Error handling helper functions
pub mod helpers {
    use super::*;

    /// Create invalid configuration error
    pub fn invalid_config(message: impl Into<String>) -> ShimError {
        ShimError::InvalidConfig(message.into())
    }

    /// Create unsupported capability error
    pub fn unsupported(message: impl Into<String>) -> ShimError {
        ShimError::Unsupported(message.into())
    }

}
