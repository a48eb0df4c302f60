//! Result types returned by the conversion entry points, and the size
//! helpers that fill them in.

use crate::error::FileError;
use crate::pipeline::classify;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Size and timing figures for one conversion.
///
/// Sizes are UTF-8 byte counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConversionMetrics {
    pub original_size: usize,
    pub cleaned_size: usize,
    /// Rounded percentage of bytes removed; negative if the output grew.
    pub reduction_percentage: i64,
    pub processing_duration_ms: u64,
}

impl ConversionMetrics {
    pub fn new(original_size: usize, cleaned_size: usize, processing_duration_ms: u64) -> Self {
        Self {
            original_size,
            cleaned_size,
            reduction_percentage: reduction_percentage(original_size, cleaned_size),
            processing_duration_ms,
        }
    }
}

/// Statistics comparing an original document with its cleaned form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentStats {
    pub original_length: usize,
    pub cleaned_length: usize,
    pub reduction_percentage: i64,
    pub is_word_content: bool,
}

/// A cleaned document with its metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionOutput {
    pub html: String,
    pub metrics: ConversionMetrics,
    /// Whether the input carried word-processor fingerprints.
    pub word_origin: bool,
}

/// Outcome for one file of a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResult {
    /// 0-based position in the input list.
    pub index: usize,
    pub path: PathBuf,
    /// Present when the file converted.
    pub output: Option<ConversionOutput>,
    /// Present when the file failed; the rest of the batch is unaffected.
    pub error: Option<FileError>,
}

impl FileResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Percentage of `original` removed, rounded half-up to an integer.
///
/// Returns 0 for an empty original.
pub fn reduction_percentage(original: usize, cleaned: usize) -> i64 {
    if original == 0 {
        return 0;
    }
    let ratio = (original as f64 - cleaned as f64) / original as f64 * 100.0;
    (ratio + 0.5).floor() as i64
}

/// Compare an original document with its cleaned form.
pub fn content_stats(original: &str, cleaned: &str) -> ContentStats {
    ContentStats {
        original_length: original.len(),
        cleaned_length: cleaned.len(),
        reduction_percentage: reduction_percentage(original.len(), cleaned.len()),
        is_word_content: classify::looks_like_word_origin(original),
    }
}

/// Human-readable byte count: `0 Bytes`, `512 Bytes`, `1.5 KB`, `2.25 MB`.
pub fn format_bytes(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduction_examples() {
        assert_eq!(reduction_percentage(1000, 250), 75);
        assert_eq!(reduction_percentage(0, 0), 0);
        assert_eq!(reduction_percentage(0, 10), 0);
        assert_eq!(reduction_percentage(100, 100), 0);
        assert_eq!(reduction_percentage(100, 150), -50);
    }

    #[test]
    fn reduction_rounds_half_up() {
        // 1/8 = 12.5 %
        assert_eq!(reduction_percentage(8, 7), 13);
        // -12.5 % rounds towards positive infinity
        assert_eq!(reduction_percentage(8, 9), -12);
    }

    #[test]
    fn stats_use_byte_lengths() {
        let stats = content_stats("<p class=MsoNormal>é</p>", "<p>é</p>");
        assert_eq!(stats.original_length, 25);
        assert_eq!(stats.cleaned_length, 9);
        assert_eq!(stats.reduction_percentage, 64);
        assert!(stats.is_word_content);
    }

    #[test]
    fn stats_serialise_camel_case() {
        let json = serde_json::to_value(content_stats("<p>x</p>", "<p>x</p>")).unwrap();
        assert_eq!(json["originalLength"], 8);
        assert_eq!(json["isWordContent"], false);
    }

    #[test]
    fn bytes_formatting() {
        assert_eq!(format_bytes(0), "0 Bytes");
        assert_eq!(format_bytes(512), "512 Bytes");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(10 * 1024 * 1024), "10 MB");
    }
}
