//! Logging utilities
//!
//! Subscriber setup and request summaries that keep inline bytes out of logs

use crate::config::settings::LoggingConfig;
use crate::genai::{Content, Part};
use tracing::info;

/// Set to true to include full text parts in debug logs
/// Default is false to reduce log verbosity
pub const VERBOSE_REQUEST_LOGGING: bool = false;

/// Initialize logging system
pub fn init_logging(config: &LoggingConfig) {
    let subscriber: Box<dyn tracing::Subscriber + Send + Sync> = if config.format == "json" {
        // JSON format logs (production environment)
        Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(config.level.as_str())
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .finish(),
        )
    } else {
        // Human readable format (development environment)
        Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(config.level.as_str())
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .finish(),
        )
    };

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        // Already installed by the host application
        return;
    }

    info!("Logging system initialized");
}

/// Truncate a string with a note about original length
fn truncate_content(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... ({} chars truncated)", &s[..end], s.len() - end)
}

fn filter_part(part: &Part) -> serde_json::Value {
    match part {
        Part::Text { text } => {
            let text = if VERBOSE_REQUEST_LOGGING {
                text.clone()
            } else {
                truncate_content(text, 200)
            };
            serde_json::json!({"text": text})
        }
        Part::InlineData { inline_data } => serde_json::json!({
            "inlineData": {
                "mimeType": inline_data.mime_type,
                "data": format!("[{} bytes]", inline_data.data.len()),
            }
        }),
        Part::FileData { file_data } => serde_json::json!({"fileData": {"fileUri": file_data.file_uri}}),
        Part::FunctionCall { function_call } => {
            serde_json::json!({"functionCall": {"name": function_call.name, "args": "[truncated]"}})
        }
        Part::FunctionResponse { function_response } => {
            serde_json::json!({"functionResponse": {"name": function_response.name, "response": "[truncated]"}})
        }
        Part::Other(_) => serde_json::json!("[other part]"),
    }
}

/// Create a filtered summary of request contents for logging
pub fn create_contents_log_summary(contents: &[Content]) -> serde_json::Value {
    let filtered: Vec<serde_json::Value> = contents
        .iter()
        .map(|c| {
            serde_json::json!({
                "role": c.role,
                "parts": c.parts.iter().map(filter_part).collect::<Vec<_>>(),
            })
        })
        .collect();
    serde_json::Value::Array(filtered)
}
