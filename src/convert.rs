//! Eager conversion entry points.
//!
//! [`convert`] is the synchronous core entry point: validate, transform,
//! measure. The file helpers wrap it with async I/O; [`convert_files`]
//! collects a whole batch, while [`crate::stream::convert_stream`] yields
//! results as files finish.

use crate::config::ConversionConfig;
use crate::error::CleanError;
use crate::output::{ConversionMetrics, ConversionOutput, FileResult};
use crate::pipeline::{self, classify};
use crate::stream::convert_stream;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Clean one document.
///
/// This is the primary entry point for the library.
///
/// # Errors
/// - [`CleanError::EmptyDocument`] if `document` is empty
/// - [`CleanError::DocumentTooLarge`] if it exceeds
///   [`ConversionConfig::max_input_bytes`]
///
/// # Example
/// ```rust
/// use word_cleaner::{convert, ConversionConfig};
///
/// let output = convert(r#"<p class="MsoNormal">Hi<o:p></o:p></p>"#, &ConversionConfig::default()).unwrap();
/// assert_eq!(output.html, "<p>Hi</p>");
/// assert!(output.word_origin);
/// ```
pub fn convert(document: &str, config: &ConversionConfig) -> Result<ConversionOutput, CleanError> {
    if document.is_empty() {
        return Err(CleanError::EmptyDocument);
    }
    if document.len() > config.max_input_bytes {
        return Err(CleanError::DocumentTooLarge {
            size: document.len(),
            limit: config.max_input_bytes,
        });
    }

    let start = Instant::now();
    let word_origin = classify::looks_like_word_origin(document);
    let html = pipeline::transform(document, &config.options);
    let metrics = ConversionMetrics::new(
        document.len(),
        html.len(),
        start.elapsed().as_millis() as u64,
    );

    info!(
        level = %config.options.level,
        original = metrics.original_size,
        cleaned = metrics.cleaned_size,
        reduction = metrics.reduction_percentage,
        "Conversion complete in {}ms",
        metrics.processing_duration_ms
    );

    Ok(ConversionOutput {
        html,
        metrics,
        word_origin,
    })
}

/// Read and clean one file.
///
/// The transform runs on the blocking pool so large documents do not stall
/// the async runtime.
pub async fn convert_file(
    path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, CleanError> {
    let path = path.as_ref();
    let document = read_document(path).await?;
    debug!("Read {} bytes from {}", document.len(), path.display());

    let config = config.clone();
    tokio::task::spawn_blocking(move || convert(&document, &config))
        .await
        .map_err(|e| CleanError::Internal(format!("conversion task failed: {e}")))?
}

/// Clean a file and write the result to `output_path`.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn convert_to_file(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionMetrics, CleanError> {
    let output = convert_file(input_path, config).await?;
    write_output(output_path.as_ref(), &output.html).await?;
    Ok(output.metrics)
}

/// Clean many files concurrently and return every result, in input order.
///
/// Failures are per file: check [`FileResult::error`].
pub async fn convert_files(paths: Vec<PathBuf>, config: &ConversionConfig) -> Vec<FileResult> {
    let mut results: Vec<FileResult> = convert_stream(paths, config).collect().await;
    results.sort_by_key(|r| r.index);
    results
}

// ── Internal helpers ─────────────────────────────────────────────────────

pub(crate) async fn read_document(path: &Path) -> Result<String, CleanError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| CleanError::from_read(path.to_path_buf(), e))?;
    String::from_utf8(bytes).map_err(|_| CleanError::NotUtf8 {
        path: path.to_path_buf(),
    })
}

/// Write a cleaned document to `path`, creating parent directories.
///
/// Atomic write: write to a sibling temp file, then rename over `path`.
pub async fn write_output(path: &Path, html: &str) -> Result<(), CleanError> {
    let write_err = |e| CleanError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    tokio::fs::write(&tmp_path, html).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CleanupLevel;

    #[test]
    fn empty_document_is_an_error() {
        let err = convert("", &ConversionConfig::default()).unwrap_err();
        assert!(matches!(err, CleanError::EmptyDocument));
    }

    #[test]
    fn size_limit_is_inclusive() {
        let config = ConversionConfig::builder().max_input_bytes(8).build().unwrap();
        assert!(convert("<p>x</p>", &config).is_ok());
        let err = convert("<p>xy</p>", &config).unwrap_err();
        assert!(matches!(
            err,
            CleanError::DocumentTooLarge { size: 9, limit: 8 }
        ));
    }

    #[test]
    fn metrics_are_byte_counts() {
        let config = ConversionConfig::builder()
            .level(CleanupLevel::Aggressive)
            .build()
            .unwrap();
        let input = r#"<div class=WordSection1><p class=MsoNormal style="mso-list:l0">é</p></div>"#;
        let out = convert(input, &config).unwrap();
        assert_eq!(out.html, "<p>é</p>");
        assert_eq!(out.metrics.original_size, input.len());
        assert_eq!(out.metrics.cleaned_size, 9);
        assert!(out.metrics.reduction_percentage > 80);
        assert!(out.word_origin);
    }

    #[test]
    fn plain_html_is_not_word_origin() {
        let out = convert("<p>Hello</p>", &ConversionConfig::default()).unwrap();
        assert_eq!(out.html, "<p>Hello</p>");
        assert!(!out.word_origin);
        assert_eq!(out.metrics.reduction_percentage, 0);
    }
}
