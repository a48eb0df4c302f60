//! Word-processor origin detection.
//!
//! Advisory only: drives hints in callers and the CLI `--detect` mode, never
//! gates the transform.

use once_cell::sync::Lazy;
use regex::RegexSet;
use serde::Serialize;
use std::fmt;

/// One marker that word-processor HTML tends to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Fingerprint {
    /// An `mso-` style property.
    MsoStyle,
    /// The literal product name.
    ProductName,
    /// The proprietary XML namespace URI.
    OfficeNamespace,
    /// A conditional comment opener, `<!--[if`.
    ConditionalComment,
    /// The `<o:p>` paragraph marker element.
    ParagraphMarker,
    /// A `Mso…` CSS class.
    MsoClass,
}

const FINGERPRINTS: [(Fingerprint, &str); 6] = [
    (Fingerprint::MsoStyle, r"(?i)mso-"),
    (Fingerprint::ProductName, r"(?i)Microsoft\s+Word"),
    (Fingerprint::OfficeNamespace, r"(?i)urn:schemas-microsoft-com"),
    (Fingerprint::ConditionalComment, r"(?i)<!--\[if"),
    (Fingerprint::ParagraphMarker, r"(?i)<o:p>"),
    (Fingerprint::MsoClass, r#"(?i)class="?Mso"#),
];

static RE_FINGERPRINTS: Lazy<RegexSet> =
    Lazy::new(|| RegexSet::new(FINGERPRINTS.iter().map(|(_, p)| *p)).unwrap());

impl Fingerprint {
    pub fn description(self) -> &'static str {
        match self {
            Fingerprint::MsoStyle => "mso- style property",
            Fingerprint::ProductName => "\"Microsoft Word\" generator name",
            Fingerprint::OfficeNamespace => "urn:schemas-microsoft-com namespace",
            Fingerprint::ConditionalComment => "conditional comment",
            Fingerprint::ParagraphMarker => "<o:p> paragraph marker",
            Fingerprint::MsoClass => "Mso* CSS class",
        }
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// True if the document matches any word-processor fingerprint.
pub fn looks_like_word_origin(document: &str) -> bool {
    RE_FINGERPRINTS.is_match(document)
}

/// Every fingerprint the document matches, in table order.
pub fn fingerprints(document: &str) -> Vec<Fingerprint> {
    RE_FINGERPRINTS
        .matches(document)
        .into_iter()
        .map(|i| FINGERPRINTS[i].0)
        .collect()
}
