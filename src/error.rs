//! Error types for the word-cleaner library.
//!
//! The transform itself cannot fail: any string in gives a string out. Errors
//! only arise at the caller surface around it, in two kinds:
//!
//! * [`CleanError`] — **Fatal** for the call: the document is empty or over
//!   the size limit, a file cannot be read or written, the configuration is
//!   invalid. Returned as `Err(CleanError)` from the `convert*` functions.
//!
//! * [`FileError`] — **Non-fatal**: one file of a batch failed but the rest
//!   are fine. Stored inside [`crate::output::FileResult`] so callers can
//!   inspect partial success instead of losing the whole batch.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the word-cleaner library.
#[derive(Debug, Error)]
pub enum CleanError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The request carried no document.
    #[error("Content is required")]
    EmptyDocument,

    /// The document exceeds the configured size limit.
    #[error("Document is {size} bytes, over the {limit}-byte limit")]
    DocumentTooLarge { size: usize, limit: usize },

    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file was read but is not valid UTF-8 text.
    #[error("File is not valid UTF-8: '{path}'\nRe-save it as UTF-8 HTML (\"Web Page, Filtered\").")]
    NotUtf8 { path: PathBuf },

    /// Any other read failure.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A cleanup level name that is not `basic`, `moderate` or `aggressive`.
    #[error("Unknown cleanup level '{value}' (expected basic, moderate or aggressive)")]
    UnknownLevel { value: String },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CleanError {
    /// Map an I/O error from reading `path` onto the matching variant.
    pub(crate) fn from_read(path: PathBuf, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => CleanError::FileNotFound { path },
            std::io::ErrorKind::PermissionDenied => CleanError::PermissionDenied { path },
            std::io::ErrorKind::InvalidData => CleanError::NotUtf8 { path },
            _ => CleanError::ReadFailed { path, source: err },
        }
    }
}

/// A non-fatal error for a single file of a batch.
///
/// Stored alongside [`crate::output::FileResult`] when a file fails. The
/// batch continues with the remaining files.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum FileError {
    /// The file could not be read.
    #[error("File {index}: read failed: {detail}")]
    ReadFailed { index: usize, detail: String },

    /// The file was read but rejected before cleaning.
    #[error("File {index}: rejected: {detail}")]
    Rejected { index: usize, detail: String },

    /// The cleaned document could not be written.
    #[error("File {index}: write failed: {detail}")]
    WriteFailed { index: usize, detail: String },
}

impl FileError {
    /// Classify a fatal single-file error for storage in a batch result.
    pub fn from_clean_error(index: usize, err: &CleanError) -> Self {
        let detail = err.to_string();
        match err {
            CleanError::EmptyDocument
            | CleanError::DocumentTooLarge { .. }
            | CleanError::InvalidConfig(_)
            | CleanError::UnknownLevel { .. } => FileError::Rejected { index, detail },
            CleanError::OutputWriteFailed { .. } => FileError::WriteFailed { index, detail },
            _ => FileError::ReadFailed { index, detail },
        }
    }
}
