//! Pipeline stages for word-processor HTML cleanup.
//!
//! Each submodule implements exactly one transformation step over the same
//! token stream, so each is independently testable.
//!
//! ## Data Flow
//!
//! ```text
//! document ──▶ prepass ──▶ rewrite ──▶ whitespace ──▶ clean document
//!              (level-      (basic /     (idempotent
//!               independent) moderate /   tidy-up)
//!                            aggressive)
//! ```
//!
//! 1. [`prepass`]    — strip XML prologs, namespaced elements, meta/link
//!    tags, style blocks and (optionally) comments
//! 2. [`rewrite`]    — attribute and tag rules for the chosen level
//! 3. [`whitespace`] — collapse whitespace and line breaks, drop empty
//!    paragraphs
//!
//! [`classify`] is a side channel: it inspects the original document and
//! never influences the transform.
//!
//! [`token`] and [`markup`] are the shared lexical layer; [`style`] holds
//! the CSS property table used by the moderate span rule.

pub mod classify;
pub mod markup;
pub mod prepass;
pub mod rewrite;
pub mod style;
pub mod token;
pub mod whitespace;

use crate::config::{CleanupLevel, CleanupOptions};
use tracing::debug;

/// Run the full cleanup transform.
///
/// Pure and total: no I/O, no error path, empty input gives empty output.
pub fn transform(document: &str, options: &CleanupOptions) -> String {
    if document.is_empty() {
        return String::new();
    }

    let stripped = prepass::strip(document, options.remove_comments);
    debug!(
        before = document.len(),
        after = stripped.len(),
        "pre-pass done"
    );

    let rewritten = rewrite::rewrite(&stripped, options);
    debug!(
        level = %options.level,
        before = stripped.len(),
        after = rewritten.len(),
        "level rules applied"
    );

    let mut normalized = whitespace::normalize(&rewritten);
    debug!(
        before = rewritten.len(),
        after = normalized.len(),
        "whitespace normalized"
    );

    if options.level == CleanupLevel::Aggressive {
        normalized = settle_allowlist(normalized, options);
    }

    normalized
}

/// Repeat the aggressive rules until nothing changes.
///
/// Unwrapping a tag or dropping an empty paragraph can join a stray `<`
/// with the text after it into a tag the allowlist never saw
/// (`<<div>script>` becomes `<script>`). Every round is length
/// non-increasing, so this terminates.
fn settle_allowlist(mut document: String, options: &CleanupOptions) -> String {
    let mut rounds = 0;
    loop {
        let next = whitespace::normalize(&rewrite::rewrite(&document, options));
        if next == document {
            break;
        }
        document = next;
        rounds += 1;
    }
    if rounds > 0 {
        debug!(rounds, after = document.len(), "allowlist re-applied");
    }
    document
}
