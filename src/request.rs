//! JSON request/response marshalling for service callers.
//!
//! Mirrors the wire shape HTTP front ends already speak:
//!
//! ```json
//! { "content": "<p class=MsoNormal>…</p>",
//!   "options": { "cleanupLevel": "moderate", "preserveImages": true,
//!                "preserveTables": true, "removeComments": true } }
//! ```
//!
//! Missing options take their defaults. Authentication, rate limiting and
//! persistence stay with the caller.

use crate::config::{CleanupOptions, ConversionConfig};
use crate::convert::convert;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A cleanup request as received from a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertRequest {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub options: CleanupOptions,
}

/// The response sent back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertResponse {
    pub success: bool,
    #[serde(rename = "cleanHTML")]
    pub clean_html: String,
    pub original_size: usize,
    pub cleaned_size: usize,
    /// Wall-clock milliseconds spent in the transform.
    pub processing_time: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConvertResponse {
    fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            clean_html: String::new(),
            original_size: 0,
            cleaned_size: 0,
            processing_time: 0,
            error: Some(error.into()),
        }
    }
}

/// Handle one request.
///
/// The request's options override those in `config`; the size limit comes
/// from `config`. Never fails: rejected requests produce a response with
/// `success: false` and an `error` message.
pub fn handle_request(request: &ConvertRequest, config: &ConversionConfig) -> ConvertResponse {
    let config = ConversionConfig {
        options: request.options,
        ..config.clone()
    };

    match convert(&request.content, &config) {
        Ok(output) => ConvertResponse {
            success: true,
            clean_html: output.html,
            original_size: output.metrics.original_size,
            cleaned_size: output.metrics.cleaned_size,
            processing_time: output.metrics.processing_duration_ms,
            error: None,
        },
        Err(e) => {
            warn!("Request rejected: {}", e);
            ConvertResponse::failure(e.to_string())
        }
    }
}

/// Parse a JSON request body and handle it.
///
/// A body that is not a valid request yields a failure response rather than
/// an error, matching [`handle_request`].
pub fn handle_json(body: &str, config: &ConversionConfig) -> ConvertResponse {
    match serde_json::from_str::<ConvertRequest>(body) {
        Ok(request) => handle_request(&request, config),
        Err(e) => {
            warn!("Malformed request body: {}", e);
            ConvertResponse::failure(format!("Invalid request: {e}"))
        }
    }
}
