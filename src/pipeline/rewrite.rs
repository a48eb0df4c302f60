//! Level-specific rewriting: the heart of the cleanup.
//!
//! Three ordinal levels, each applying every rule of the levels below it.
//! The rules live in two declarative tables so a level is data, not code:
//!
//! * [`ATTR_RULES`] — `(minimum level, predicate)` pairs; an attribute is
//!   dropped when any rule at or below the current level matches it.
//! * [`TagTable`] — tag name → [`TagRule`], built per invocation from the
//!   options. The basic table keeps everything, the moderate table unwraps
//!   layout wrappers, the aggressive table is the allowlist.
//!
//! Two moderate rules need to pair an open tag with its close tag (the
//! `<font color>` → `<span style>` rewrite and unwrapping spans whose style
//! had nothing essential left). Both are resolved with a stack per tag name
//! while streaming, so the rewriter stays a single pass.

use super::markup::{Attribute, Tag};
use super::style;
use super::token::{starts_with_ignore_case, tokenize, TokenKind};
use crate::config::{CleanupLevel, CleanupOptions};
use tracing::trace;

// ── Tag allowlist ────────────────────────────────────────────────────────────

/// Tags considered semantic at the aggressive level.
pub const BASE_ALLOWLIST: &[&str] = &[
    "p", "br", "strong", "b", "em", "i", "u", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol",
    "li", "a", "blockquote", "code", "pre",
];

/// Added to the allowlist when tables are preserved.
pub const TABLE_FAMILY: &[&str] = &["table", "tr", "td", "th", "thead", "tbody", "tfoot"];

/// Added to the allowlist when images are preserved.
pub const IMAGE_TAG: &str = "img";

/// The set of tag names that survive aggressive cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagAllowlist {
    names: Vec<&'static str>,
}

impl TagAllowlist {
    pub fn for_options(options: &CleanupOptions) -> Self {
        let mut names = BASE_ALLOWLIST.to_vec();
        if options.preserve_tables {
            names.extend_from_slice(TABLE_FAMILY);
        }
        if options.preserve_images {
            names.push(IMAGE_TAG);
        }
        Self { names }
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n.eq_ignore_ascii_case(name))
    }

    pub fn names(&self) -> &[&'static str] {
        &self.names
    }
}

// ── Attribute rules ──────────────────────────────────────────────────────────

struct AttrRule {
    level: CleanupLevel,
    drops: fn(&Attribute<'_>) -> bool,
}

const ATTR_RULES: &[AttrRule] = &[
    AttrRule {
        level: CleanupLevel::Basic,
        drops: mso_class,
    },
    AttrRule {
        level: CleanupLevel::Basic,
        drops: mso_style,
    },
    AttrRule {
        level: CleanupLevel::Moderate,
        drops: any_class,
    },
    AttrRule {
        level: CleanupLevel::Moderate,
        drops: empty_value,
    },
    AttrRule {
        level: CleanupLevel::Aggressive,
        drops: any_style,
    },
    AttrRule {
        level: CleanupLevel::Aggressive,
        drops: non_essential,
    },
];

fn mso_class(attr: &Attribute<'_>) -> bool {
    attr.is_named("class") && attr.value().is_some_and(style::has_mso_marker)
}

fn mso_style(attr: &Attribute<'_>) -> bool {
    attr.is_named("style") && attr.value().is_some_and(style::has_mso_marker)
}

fn any_class(attr: &Attribute<'_>) -> bool {
    attr.is_named("class")
}

fn empty_value(attr: &Attribute<'_>) -> bool {
    attr.value() == Some("")
}

fn any_style(attr: &Attribute<'_>) -> bool {
    attr.is_named("style")
}

fn non_essential(attr: &Attribute<'_>) -> bool {
    const NAMES: &[&str] = &["id", "name", "title", "lang", "dir"];
    let name = attr.name();
    NAMES.iter().any(|n| n.eq_ignore_ascii_case(name)) || is_event_handler(name)
}

/// `onclick`, `onMouseOver`, …: `on` followed by letters only.
fn is_event_handler(name: &str) -> bool {
    name.len() > 2
        && starts_with_ignore_case(name, "on")
        && name[2..].bytes().all(|b| b.is_ascii_alphabetic())
}

// ── Tag table ────────────────────────────────────────────────────────────────

/// What the rewriter does with a tag token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagRule {
    /// Leave the tag with whatever attributes survived.
    Keep,
    /// Delete the tag token; the content around it stays in place.
    Unwrap,
    /// Keep the tag, lowercase, with only the listed attributes.
    Allow(&'static [&'static str]),
}

/// Tag name → rule, with a fallback for unlisted names.
#[derive(Debug, Clone)]
pub struct TagTable {
    fallback: TagRule,
    entries: Vec<(&'static str, TagRule)>,
}

impl TagTable {
    pub fn for_options(options: &CleanupOptions) -> Self {
        match options.level {
            CleanupLevel::Basic => Self {
                fallback: TagRule::Keep,
                entries: Vec::new(),
            },
            CleanupLevel::Moderate => {
                let mut entries = vec![("div", TagRule::Unwrap), ("font", TagRule::Unwrap)];
                if !options.preserve_images {
                    entries.push((IMAGE_TAG, TagRule::Unwrap));
                }
                Self {
                    fallback: TagRule::Keep,
                    entries,
                }
            }
            CleanupLevel::Aggressive => {
                let entries = TagAllowlist::for_options(options)
                    .names()
                    .iter()
                    .map(|&name| {
                        let rule = match name {
                            "a" => TagRule::Allow(&["href"]),
                            IMAGE_TAG => TagRule::Allow(&["src", "alt"]),
                            _ => TagRule::Allow(&[]),
                        };
                        (name, rule)
                    })
                    .collect();
                Self {
                    fallback: TagRule::Unwrap,
                    entries,
                }
            }
        }
    }

    pub fn rule(&self, name: &str) -> TagRule {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|&(_, rule)| rule)
            .unwrap_or(self.fallback)
    }
}

// ── Rewriter ─────────────────────────────────────────────────────────────────

/// Apply the level-specific rules to a document that went through the
/// pre-pass.
pub fn rewrite(input: &str, options: &CleanupOptions) -> String {
    let mut rewriter = Rewriter::new(options);
    let mut out = String::with_capacity(input.len());

    for token in tokenize(input) {
        match token.kind {
            TokenKind::Comment | TokenKind::Declaration if token.is_conditional_comment() => {
                trace!(text = token.text, "dropping conditional comment remnant");
            }
            TokenKind::OpenTag | TokenKind::CloseTag => match token.tag() {
                Some(tag) => {
                    if let Some(tag) = rewriter.tag(tag) {
                        out.push_str(&tag.render());
                    }
                }
                None => out.push_str(token.text),
            },
            _ => out.push_str(token.text),
        }
    }

    out
}

struct Rewriter {
    level: CleanupLevel,
    table: TagTable,
    /// One entry per open `<span>`: whether its close tag is kept.
    spans: Vec<bool>,
    /// One entry per open `<font>`: whether it became a `<span>`.
    fonts: Vec<bool>,
}

impl Rewriter {
    fn new(options: &CleanupOptions) -> Self {
        Self {
            level: options.level,
            table: TagTable::for_options(options),
            spans: Vec::new(),
            fonts: Vec::new(),
        }
    }

    fn tag<'a>(&mut self, mut tag: Tag<'a>) -> Option<Tag<'a>> {
        let level = self.level;
        tag.retain_attrs(|attr| {
            !ATTR_RULES
                .iter()
                .any(|rule| rule.level <= level && (rule.drops)(attr))
        });

        if level >= CleanupLevel::Moderate && !tag.is_self_closing() {
            if tag.is_named("span") {
                tag = self.span(tag)?;
            } else if tag.is_named("font") {
                tag = self.font(tag);
            }
        }

        match self.table.rule(tag.name()) {
            TagRule::Keep => Some(tag),
            TagRule::Unwrap => None,
            TagRule::Allow(attrs) => Some(tag.reduce_to(attrs)),
        }
    }

    /// Trim a span's style to the essential properties, unwrapping the span
    /// (open and matching close) when none are left.
    fn span<'a>(&mut self, tag: Tag<'a>) -> Option<Tag<'a>> {
        if tag.is_closing() {
            return match self.spans.pop() {
                Some(false) => None,
                _ => Some(tag),
            };
        }

        let Some(attr) = tag.attr("style").filter(|a| a.value().is_some()).cloned() else {
            self.spans.push(true);
            return Some(tag);
        };
        let original = attr.value().unwrap_or_default();

        match style::filter_declarations(original) {
            Some(kept) if kept == original => {
                self.spans.push(true);
                Some(Tag::open("span").with_attr(attr))
            }
            Some(kept) => {
                self.spans.push(true);
                Some(Tag::open("span").with_attr(attr.with_value(kept)))
            }
            None => {
                self.spans.push(false);
                None
            }
        }
    }

    /// Turn `<font color=…>` into a styled span; any other font tag is left
    /// for the tag table to unwrap.
    fn font<'a>(&mut self, tag: Tag<'a>) -> Tag<'a> {
        if tag.is_closing() {
            return match self.fonts.pop() {
                Some(true) => Tag::close("span"),
                _ => tag,
            };
        }

        let color = tag
            .attr_value("color")
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(style::color_declaration);

        match color {
            Some(declaration) => {
                self.fonts.push(true);
                Tag::open("span").with_attr(Attribute::new("style", declaration))
            }
            None => {
                self.fonts.push(false);
                tag
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(level: CleanupLevel) -> CleanupOptions {
        CleanupOptions::with_level(level)
    }

    #[test]
    fn test_basic_drops_mso_class_and_style() {
        let input = r#"<p class="MsoNormal" style="mso-margin-top-alt:auto">x</p><p class="intro" style="color:red">y</p>"#;
        assert_eq!(
            rewrite(input, &at(CleanupLevel::Basic)),
            r#"<p>x</p><p class="intro" style="color:red">y</p>"#
        );
    }

    #[test]
    fn test_basic_drops_conditional_remnants() {
        let input = "<![if !supportLists]><span>1.</span><![endif]>Item<!--[if gte mso 9]><xml></xml><![endif]--><!-- keep -->";
        assert_eq!(
            rewrite(input, &at(CleanupLevel::Basic)),
            "<span>1.</span>Item<!-- keep -->"
        );
    }

    #[test]
    fn test_moderate_drops_all_classes_and_empty_attributes() {
        let input = r#"<p class="intro" align="" title=''>x</p>"#;
        assert_eq!(rewrite(input, &at(CleanupLevel::Moderate)), "<p>x</p>");
    }

    #[test]
    fn test_moderate_font_color_becomes_span() {
        let input = r##"<font face="Arial" color="#FF0000">red <font size=2>small</font></font>"##;
        assert_eq!(
            rewrite(input, &at(CleanupLevel::Moderate)),
            r##"<span style="color:#FF0000">red small</span>"##
        );
    }

    #[test]
    fn test_moderate_span_keeps_essential_styles() {
        let input = r#"<span lang=EN-US style="font-size:18pt;font-weight:bold">T</span>"#;
        assert_eq!(
            rewrite(input, &at(CleanupLevel::Moderate)),
            r#"<span style="font-weight:bold">T</span>"#
        );
    }

    #[test]
    fn test_moderate_unwraps_span_without_essential_styles() {
        let input = r#"<span style="font-family:Symbol"><span>·</span></span>Item"#;
        assert_eq!(
            rewrite(input, &at(CleanupLevel::Moderate)),
            "<span>·</span>Item"
        );
    }

    #[test]
    fn test_span_style_keeps_source_quoting() {
        let moderate = at(CleanupLevel::Moderate);
        assert_eq!(
            rewrite("<span style=color:red>x</span>", &moderate),
            "<span style=color:red>x</span>"
        );
        assert_eq!(
            rewrite("<span lang=EN style='color:red;font-size:9pt'>x</span>", &moderate),
            "<span style='color:red'>x</span>"
        );
        assert_eq!(
            rewrite("<span style=color:red;font-family:Arial>x</span>", &moderate),
            "<span style=color:red>x</span>"
        );
    }

    #[test]
    fn test_mso_style_removed_before_span_rule() {
        let input = r#"<span style="color:red;mso-bidi-font-weight:bold">x</span>"#;
        assert_eq!(
            rewrite(input, &at(CleanupLevel::Moderate)),
            "<span>x</span>"
        );
    }

    #[test]
    fn test_moderate_unwraps_divs() {
        let input = "<div class=WordSection1>\n<p>x</p>\n</div>";
        assert_eq!(rewrite(input, &at(CleanupLevel::Moderate)), "\n<p>x</p>\n");
    }

    #[test]
    fn test_moderate_image_handling() {
        let input = r#"<p><img src="a.png" width=10>x</p>"#;
        assert_eq!(rewrite(input, &at(CleanupLevel::Moderate)), input);

        let options = CleanupOptions {
            preserve_images: false,
            ..at(CleanupLevel::Moderate)
        };
        assert_eq!(rewrite(input, &options), "<p>x</p>");
    }

    #[test]
    fn test_aggressive_allowlist() {
        let input = r#"<div><h1 id=t style="x">Title</h1><span>a</span> <a href="https://x.test" onclick="go()" target=_blank>link</a><o:p></o:p><script>s()</script></div>"#;
        assert_eq!(
            rewrite(input, &at(CleanupLevel::Aggressive)),
            r#"<h1>Title</h1>a <a href="https://x.test">link</a>s()"#
        );
    }

    #[test]
    fn test_aggressive_bare_tags_and_lowercase() {
        let input = "<P ALIGN=center>x<BR/>y</P>";
        assert_eq!(
            rewrite(input, &at(CleanupLevel::Aggressive)),
            "<p>x<br>y</p>"
        );
    }

    #[test]
    fn test_aggressive_images() {
        let input = r#"<img width=5 alt="pic" src="a.png" title=t>"#;
        assert_eq!(
            rewrite(input, &at(CleanupLevel::Aggressive)),
            r#"<img src="a.png" alt="pic">"#
        );

        let options = CleanupOptions {
            preserve_images: false,
            ..at(CleanupLevel::Aggressive)
        };
        assert_eq!(rewrite(input, &options), "");
    }

    #[test]
    fn test_aggressive_tables() {
        let input = "<table border=1><tr><td width=5>x</td></tr></table>";
        assert_eq!(
            rewrite(input, &at(CleanupLevel::Aggressive)),
            "<table><tr><td>x</td></tr></table>"
        );

        let options = CleanupOptions {
            preserve_tables: false,
            ..at(CleanupLevel::Aggressive)
        };
        assert_eq!(rewrite(input, &options), "x");
    }

    #[test]
    fn test_allowlist_membership() {
        let all = TagAllowlist::for_options(&CleanupOptions::default());
        assert!(all.contains("TD"));
        assert!(all.contains("img"));
        assert!(!all.contains("span"));

        let bare = TagAllowlist::for_options(&CleanupOptions {
            preserve_images: false,
            preserve_tables: false,
            ..CleanupOptions::default()
        });
        assert!(bare.contains("Blockquote"));
        assert!(!bare.contains("table"));
        assert!(!bare.contains("img"));
    }

    #[test]
    fn test_event_handler_detection() {
        assert!(is_event_handler("onMouseOver"));
        assert!(is_event_handler("ONLOAD"));
        assert!(!is_event_handler("on"));
        assert!(!is_event_handler("one-of"));
    }
}
