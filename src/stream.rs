//! Streaming batch API: emit per-file results as they complete.
//!
//! Unlike the eager [`crate::convert::convert_files`] which returns only after
//! every file finishes, [`convert_stream`] yields [`FileResult`] items via a
//! `Stream` as each file completes. Files are processed concurrently, so
//! results may arrive out of order (sort by `index` if order matters).

use crate::config::ConversionConfig;
use crate::convert::convert_file;
use crate::error::FileError;
use crate::output::FileResult;
use futures::future;
use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_stream::Stream;
use tracing::{info, warn};

/// A boxed stream of per-file results.
pub type FileStream = Pin<Box<dyn Stream<Item = FileResult> + Send>>;

/// Clean many files, streaming results as they are ready.
///
/// At most [`ConversionConfig::concurrency`] files are in flight at once.
/// A failing file yields a [`FileResult`] with `error` set; it never stops
/// the batch. The progress callback's `on_batch_complete` fires once the
/// stream has been drained.
///
/// # Example
/// ```rust,no_run
/// use word_cleaner::{convert_stream, ConversionConfig};
/// use futures::StreamExt;
///
/// # #[tokio::main]
/// # async fn main() {
/// let paths = vec!["a.htm".into(), "b.htm".into()];
/// let mut results = convert_stream(paths, &ConversionConfig::default());
/// while let Some(r) = results.next().await {
///     match (&r.output, &r.error) {
///         (Some(out), _) => println!("{}: {} bytes", r.path.display(), out.metrics.cleaned_size),
///         (_, Some(e)) => eprintln!("{e}"),
///         _ => {}
///     }
/// }
/// # }
/// ```
pub fn convert_stream(paths: Vec<PathBuf>, config: &ConversionConfig) -> FileStream {
    let total = paths.len();
    info!("Starting batch conversion of {} files", total);

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let successes = Arc::new(AtomicUsize::new(0));
    let cfg = config.clone();
    let counter = Arc::clone(&successes);
    let results = stream::iter(paths.into_iter().enumerate().map(move |(index, path)| {
        let cfg = cfg.clone();
        let counter = Arc::clone(&counter);
        async move { convert_one(index, total, path, &cfg, &counter).await }
    }))
    .buffer_unordered(config.concurrency);

    let callback = config.progress_callback.clone();
    let finish = stream::once(async move {
        let done = successes.load(Ordering::SeqCst);
        info!("Batch complete: {}/{} files converted", done, total);
        if let Some(cb) = callback {
            cb.on_batch_complete(total, done);
        }
    })
    .filter_map(|()| future::ready(None::<FileResult>));

    Box::pin(results.chain(finish))
}

async fn convert_one(
    index: usize,
    total: usize,
    path: PathBuf,
    config: &ConversionConfig,
    successes: &AtomicUsize,
) -> FileResult {
    if let Some(ref cb) = config.progress_callback {
        cb.on_file_start(index, total);
    }

    match convert_file(&path, config).await {
        Ok(output) => {
            successes.fetch_add(1, Ordering::SeqCst);
            if let Some(ref cb) = config.progress_callback {
                cb.on_file_complete(index, total, output.html.len());
            }
            FileResult {
                index,
                path,
                output: Some(output),
                error: None,
            }
        }
        Err(e) => {
            warn!("Failed to convert {}: {}", path.display(), e);
            let error = FileError::from_clean_error(index, &e);
            if let Some(ref cb) = config.progress_callback {
                cb.on_file_error(index, total, &error.to_string());
            }
            FileResult {
                index,
                path,
                output: None,
                error: Some(error),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::ConversionProgressCallback;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Events(Mutex<Vec<String>>);

    impl ConversionProgressCallback for Events {
        fn on_batch_start(&self, total_files: usize) {
            self.0.lock().unwrap().push(format!("start {total_files}"));
        }

        fn on_file_error(&self, index: usize, _total: usize, _error: &str) {
            self.0.lock().unwrap().push(format!("error {index}"));
        }

        fn on_batch_complete(&self, total_files: usize, success_count: usize) {
            self.0
                .lock()
                .unwrap()
                .push(format!("done {success_count}/{total_files}"));
        }
    }

    fn config_with(events: &Arc<Events>) -> ConversionConfig {
        ConversionConfig::builder()
            .progress_callback(Arc::clone(events) as Arc<dyn ConversionProgressCallback>)
            .build()
            .unwrap()
    }

    #[test]
    fn empty_batch_still_completes() {
        let events = Arc::new(Events::default());
        let results: Vec<FileResult> =
            tokio_test::block_on(convert_stream(Vec::new(), &config_with(&events)).collect());
        assert!(results.is_empty());
        assert_eq!(*events.0.lock().unwrap(), vec!["start 0", "done 0/0"]);
    }

    #[tokio::test]
    async fn missing_file_is_reported_not_raised() {
        let events = Arc::new(Events::default());
        let paths = vec![PathBuf::from("/nonexistent/word-cleaner/a.htm")];
        let results: Vec<FileResult> = convert_stream(paths, &config_with(&events)).collect().await;

        assert_eq!(results.len(), 1);
        assert!(!results[0].is_success());
        assert!(matches!(
            results[0].error,
            Some(FileError::ReadFailed { index: 0, .. })
        ));
        assert_eq!(
            *events.0.lock().unwrap(),
            vec!["start 1", "error 0", "done 0/1"]
        );
    }
}
