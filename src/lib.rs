//! # word-cleaner
//!
//! Clean HTML produced by word processors into minimal, portable HTML.
//!
//! ## Why this crate?
//!
//! HTML copied or exported from a word processor is dominated by proprietary
//! markup: `mso-` style properties, `Mso*` classes, `<o:p>` elements,
//! conditional comments, embedded style sheets and nested layout wrappers.
//! This crate strips that noise while keeping the structure the caller asked
//! for, at one of three escalating cleanup levels.
//!
//! ## Pipeline Overview
//!
//! ```text
//! document
//!  │
//!  ├─ 1. Pre-pass    XML prologs, o:/v:/w: elements, meta/link, style, comments
//!  ├─ 2. Rewrite     basic / moderate / aggressive attribute and tag rules
//!  ├─ 3. Whitespace  collapse runs and line breaks, drop empty paragraphs
//!  └─ 4. Metrics     byte sizes, reduction percentage, origin fingerprints
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use word_cleaner::{convert, CleanupLevel, ConversionConfig};
//!
//! let config = ConversionConfig::builder()
//!     .level(CleanupLevel::Aggressive)
//!     .build()?;
//! let html = r#"<p class="MsoNormal"><o:p>&nbsp;</o:p>Hello <b>World</b></p>"#;
//! let output = convert(html, &config)?;
//! assert_eq!(output.html, "<p>Hello <b>World</b></p>");
//! println!("{}% smaller", output.metrics.reduction_percentage);
//! # Ok::<(), word_cleaner::CleanError>(())
//! ```
//!
//! For the bare transform with no validation or metrics, call
//! [`transform`] directly.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `wordclean` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! word-cleaner = { version = "0.1", default-features = false }
//! ```
//!
//! ## Choosing a Level
//!
//! | Level | Keeps | Typical use |
//! |-------|-------|-------------|
//! | `basic` | all tags and non-`mso` attributes | light touch, keep authored classes |
//! | `moderate` | tags, essential span styles | default for pasting into an editor |
//! | `aggressive` | allowlisted tags, `href`/`src`/`alt` only | content migration, plain HTML |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod request;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    CleanupLevel, CleanupOptions, ConversionConfig, ConversionConfigBuilder,
    DEFAULT_MAX_INPUT_BYTES,
};
pub use convert::{convert, convert_file, convert_files, convert_to_file, write_output};
pub use error::{CleanError, FileError};
pub use output::{
    content_stats, format_bytes, reduction_percentage, ContentStats, ConversionMetrics,
    ConversionOutput, FileResult,
};
pub use pipeline::classify::{fingerprints, looks_like_word_origin, Fingerprint};
pub use pipeline::rewrite::TagAllowlist;
pub use pipeline::transform;
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use request::{handle_json, handle_request, ConvertRequest, ConvertResponse};
pub use stream::{convert_stream, FileStream};
