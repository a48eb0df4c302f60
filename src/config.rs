//! Configuration types for word-processor HTML cleanup.
//!
//! Two layers:
//!
//! * [`CleanupOptions`] — what the transform does. Four fields, `Copy`,
//!   serialised with the same camelCase names the JSON request uses, so a
//!   request body deserialises straight into it.
//! * [`ConversionConfig`] — how the caller surface runs the transform: the
//!   options plus input limits and batch concurrency. Built via its
//!   [`ConversionConfigBuilder`], whose `build()` validates the limits.

use crate::error::CleanError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default upper bound on an input document: 10 MiB.
pub const DEFAULT_MAX_INPUT_BYTES: usize = 10 * 1024 * 1024;

/// Ordinal cleanup aggressiveness. Each level applies every rule of the
/// levels below it, so `Basic < Moderate < Aggressive`.
///
/// | Level | Adds |
/// |-------|------|
/// | `Basic` | drop `mso` classes/styles, conditional-comment remnants |
/// | `Moderate` | drop all classes and empty attributes, unwrap `div`/`font`, trim span styles, optional image removal |
/// | `Aggressive` | drop all styles and non-essential attributes, reduce to the tag allowlist |
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CleanupLevel {
    Basic,
    /// The default, matching what most callers want from a paste cleaner.
    #[default]
    Moderate,
    Aggressive,
}

impl CleanupLevel {
    pub const ALL: [CleanupLevel; 3] = [
        CleanupLevel::Basic,
        CleanupLevel::Moderate,
        CleanupLevel::Aggressive,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CleanupLevel::Basic => "basic",
            CleanupLevel::Moderate => "moderate",
            CleanupLevel::Aggressive => "aggressive",
        }
    }
}

impl fmt::Display for CleanupLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CleanupLevel {
    type Err = CleanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        CleanupLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CleanError::UnknownLevel {
                value: s.to_string(),
            })
    }
}

/// Per-invocation options for the cleanup transform.
///
/// Missing fields in a deserialised request fall back to the defaults:
/// moderate level, images, tables and comment removal all on. An empty or
/// null `cleanupLevel` also means moderate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CleanupOptions {
    /// Cleanup aggressiveness.
    #[serde(rename = "cleanupLevel", deserialize_with = "level_or_default")]
    pub level: CleanupLevel,

    /// Keep `<img>` elements. When false they are removed from the moderate
    /// level upwards.
    pub preserve_images: bool,

    /// Keep the table family (`table tr td th thead tbody tfoot`) at the
    /// aggressive level. Lower levels never touch tables.
    pub preserve_tables: bool,

    /// Strip every markup comment in the pre-pass, conditional comments
    /// included.
    pub remove_comments: bool,
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self {
            level: CleanupLevel::default(),
            preserve_images: true,
            preserve_tables: true,
            remove_comments: true,
        }
    }
}

fn level_or_default<'de, D>(deserializer: D) -> Result<CleanupLevel, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(CleanupLevel::default()),
        Some(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

impl CleanupOptions {
    /// Default options at the given level.
    pub fn with_level(level: CleanupLevel) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }
}

/// Configuration for the caller surface around the transform.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use word_cleaner::{CleanupLevel, ConversionConfig};
///
/// let config = ConversionConfig::builder()
///     .level(CleanupLevel::Aggressive)
///     .preserve_images(false)
///     .concurrency(4)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Options handed to the transform.
    pub options: CleanupOptions,

    /// Largest accepted input document in bytes. Default: 10 MiB.
    ///
    /// The transform itself is linear and would accept anything; this is the
    /// caller-side guard the request boundary is expected to impose.
    pub max_input_bytes: usize,

    /// Number of files converted at once in batch mode. Default: 8.
    pub concurrency: usize,

    /// Optional per-file progress events for batch conversion.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            options: CleanupOptions::default(),
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            concurrency: 8,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("options", &self.options)
            .field("max_input_bytes", &self.max_input_bytes)
            .field("concurrency", &self.concurrency)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn options(mut self, options: CleanupOptions) -> Self {
        self.config.options = options;
        self
    }

    pub fn level(mut self, level: CleanupLevel) -> Self {
        self.config.options.level = level;
        self
    }

    pub fn preserve_images(mut self, v: bool) -> Self {
        self.config.options.preserve_images = v;
        self
    }

    pub fn preserve_tables(mut self, v: bool) -> Self {
        self.config.options.preserve_tables = v;
        self
    }

    pub fn remove_comments(mut self, v: bool) -> Self {
        self.config.options.remove_comments = v;
        self
    }

    pub fn max_input_bytes(mut self, bytes: usize) -> Self {
        self.config.max_input_bytes = bytes;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n;
        self
    }

    /// Receive per-file events during batch conversion.
    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, CleanError> {
        let c = &self.config;
        if c.max_input_bytes == 0 {
            return Err(CleanError::InvalidConfig(
                "max_input_bytes must be ≥ 1".into(),
            ));
        }
        if c.concurrency == 0 {
            return Err(CleanError::InvalidConfig("Concurrency must be ≥ 1".into()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered() {
        assert!(CleanupLevel::Basic < CleanupLevel::Moderate);
        assert!(CleanupLevel::Moderate < CleanupLevel::Aggressive);
    }

    #[test]
    fn level_parses_case_insensitively() {
        assert_eq!(
            "Aggressive".parse::<CleanupLevel>().unwrap(),
            CleanupLevel::Aggressive
        );
        assert_eq!(" basic ".parse::<CleanupLevel>().unwrap(), CleanupLevel::Basic);
        let err = "extreme".parse::<CleanupLevel>().unwrap_err();
        assert!(err.to_string().contains("extreme"));
    }

    #[test]
    fn options_default_matches_request_defaults() {
        let o = CleanupOptions::default();
        assert_eq!(o.level, CleanupLevel::Moderate);
        assert!(o.preserve_images && o.preserve_tables && o.remove_comments);
    }

    #[test]
    fn options_deserialise_with_missing_fields() {
        let o: CleanupOptions =
            serde_json::from_str(r#"{"cleanupLevel":"aggressive","preserveImages":false}"#)
                .unwrap();
        assert_eq!(o.level, CleanupLevel::Aggressive);
        assert!(!o.preserve_images);
        assert!(o.preserve_tables);
        assert!(o.remove_comments);
    }

    #[test]
    fn empty_or_null_level_means_moderate() {
        for body in [r#"{"cleanupLevel":""}"#, r#"{"cleanupLevel":null}"#, r#"{"cleanupLevel":"  "}"#] {
            let o: CleanupOptions = serde_json::from_str(body).unwrap();
            assert_eq!(o.level, CleanupLevel::Moderate, "{body}");
        }
        assert!(serde_json::from_str::<CleanupOptions>(r#"{"cleanupLevel":"extreme"}"#).is_err());
    }

    #[test]
    fn options_serialise_with_wire_names() {
        let json = serde_json::to_value(CleanupOptions::default()).unwrap();
        assert_eq!(json["cleanupLevel"], "moderate");
        assert_eq!(json["removeComments"], true);
    }

    #[test]
    fn builder_rejects_zero_concurrency() {
        let err = ConversionConfig::builder().concurrency(0).build().unwrap_err();
        assert!(matches!(err, CleanError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_zero_limit() {
        assert!(ConversionConfig::builder().max_input_bytes(0).build().is_err());
    }

    #[test]
    fn builder_sets_options() {
        let c = ConversionConfig::builder()
            .level(CleanupLevel::Basic)
            .remove_comments(false)
            .build()
            .unwrap();
        assert_eq!(c.options.level, CleanupLevel::Basic);
        assert!(!c.options.remove_comments);
        assert_eq!(c.max_input_bytes, DEFAULT_MAX_INPUT_BYTES);
    }
}
