//! Progress-callback trait for per-file batch conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as [`crate::convert_stream`] processes each file.
//!
//! # Example
//!
//! ```rust
//! use word_cleaner::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: Arc<AtomicUsize>,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_file_complete(&self, index: usize, total: usize, cleaned_len: usize) {
//!         let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
//!         eprintln!("File {}/{} done ({} bytes, {} so far)", index + 1, total, cleaned_len, done);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     completed: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by batch conversion as it processes each file.
///
/// Files are converted concurrently, so `on_file_start`, `on_file_complete`
/// and `on_file_error` may be called from different threads and in any
/// order. All methods default to no-ops.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before any file is read.
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called just before a file is read.
    ///
    /// # Arguments
    /// * `index` — 0-based position of the file in the input list
    /// * `total` — number of files in the batch
    fn on_file_start(&self, index: usize, total: usize) {
        let _ = (index, total);
    }

    /// Called when a file was cleaned successfully.
    ///
    /// `cleaned_len` is the byte length of the cleaned document.
    fn on_file_complete(&self, index: usize, total: usize, cleaned_len: usize) {
        let _ = (index, total, cleaned_len);
    }

    /// Called when a file could not be read or cleaned.
    fn on_file_error(&self, index: usize, total: usize, error: &str) {
        let _ = (index, total, error);
    }

    /// Called once after every file has been attempted.
    fn on_batch_complete(&self, total_files: usize, success_count: usize) {
        let _ = (total_files, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_batch_start(2);
        cb.on_file_start(0, 2);
        cb.on_file_complete(0, 2, 42);
        cb.on_file_error(1, 2, "not found");
        cb.on_batch_complete(2, 1);
    }

    #[test]
    fn callback_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn ConversionProgressCallback>();
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        let cloned = Arc::clone(&cb);
        std::thread::spawn(move || cloned.on_batch_complete(1, 1))
            .join()
            .unwrap();
    }
}
