//! Conversation client error types.

use crate::convai::audio::AudioError;
use thiserror::Error;

/// Format an ElevenLabs API error for display, extracting the message from JSON if present.
///
/// Handles the shapes the API returns:
/// - `{"detail": {"status": "...", "message": "..."}}`
/// - `{"detail": "..."}`
/// - `{"message": "..."}`
/// - Plain text → returned as-is
#[must_use]
pub fn format_api_error(error: &str) -> String {
    if let Some(json_start) = error.find('{')
        && let Ok(json) = serde_json::from_str::<serde_json::Value>(&error[json_start..])
        && let Some(msg) = extract_error_message(&json)
    {
        // Preserve HTTP status prefix if present
        let prefix = error[..json_start].trim();
        if prefix.is_empty() {
            return msg;
        }
        return format!("{prefix} {msg}");
    }

    error.to_string()
}

fn extract_error_message(json: &serde_json::Value) -> Option<String> {
    if let Some(detail) = json.get("detail") {
        if let Some(msg) = detail.get("message").and_then(|v| v.as_str()) {
            return Some(match detail.get("status").and_then(|v| v.as_str()) {
                Some(status) => format!("{msg} (status: {status})"),
                None => msg.to_string(),
            });
        }
        if let Some(msg) = detail.as_str() {
            return Some(msg.to_string());
        }
    }

    json.get("message")
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("API error: {0}")]
    Api(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Connection error: {0}")]
    WebSocket(#[from] Box<tokio_tungstenite::tungstenite::Error>),

    #[error("Connection closed by server ({code}): {reason}")]
    Closed { code: u16, reason: String },

    #[error("Malformed message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed audio payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),
}

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::WebSocket(Box::new(e))
    }
}
