//! On-demand view of a single tag token: name, attributes, closing flags.
//!
//! Parsing is deliberately shallow. A tag is split into its name and a list
//! of attributes, each keeping the exact source text it came from, so a tag
//! that no rule touched is re-emitted byte for byte and a tag that lost an
//! attribute keeps the quoting of the ones that survived.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

static RE_TAG_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<(/?)([A-Za-z][A-Za-z0-9:._-]*)").unwrap());

static RE_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#).unwrap()
});

/// One `name=value` pair inside a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a> {
    name: Cow<'a, str>,
    value: Option<Cow<'a, str>>,
    raw: Cow<'a, str>,
}

impl<'a> Attribute<'a> {
    /// Build a new attribute, quoted with `"` unless the value contains one.
    pub fn new(name: impl Into<Cow<'a, str>>, value: impl Into<Cow<'a, str>>) -> Self {
        let name = name.into();
        let value = value.into();
        let raw = if value.contains('"') {
            format!("{name}='{value}'")
        } else {
            format!("{name}=\"{value}\"")
        };
        Self {
            name,
            value: Some(value),
            raw: Cow::Owned(raw),
        }
    }

    /// A copy carrying `value`, quoted the way this attribute was in the
    /// source. Falls back to `"` when the value cannot go unquoted, and
    /// swaps quote characters when it contains the original one.
    pub fn with_value(&self, value: impl Into<Cow<'a, str>>) -> Self {
        let value = value.into();
        let source_quote = self
            .raw
            .get(self.name.len()..)
            .unwrap_or_default()
            .trim_start()
            .strip_prefix('=')
            .and_then(|rest| rest.trim_start().chars().next());
        let quote = match source_quote {
            Some(c) if c != '"' && c != '\'' && is_unquotable(&value) => None,
            Some('\'') if !value.contains('\'') => Some('\''),
            _ if value.contains('"') => Some('\''),
            _ => Some('"'),
        };
        let raw = match quote {
            Some(q) => format!("{}={q}{value}{q}", self.name),
            None => format!("{}={value}", self.name),
        };
        Self {
            name: self.name.clone(),
            value: Some(value),
            raw: Cow::Owned(raw),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The unquoted value; `None` for a bare attribute such as `nowrap`.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// The attribute exactly as written in the source.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// True if `value` can be written without quotes.
fn is_unquotable(value: &str) -> bool {
    !value.is_empty()
        && !value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '=' | '<' | '>' | '`'))
}

/// A parsed open or close tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag<'a> {
    raw: &'a str,
    name: Cow<'a, str>,
    closing: bool,
    self_closing: bool,
    attrs: Vec<Attribute<'a>>,
    dirty: bool,
}

impl<'a> Tag<'a> {
    /// Parse `<name attr=value …>` or `</name>`.
    ///
    /// Returns `None` when `raw` does not start with a tag name.
    pub fn parse(raw: &'a str) -> Option<Self> {
        let caps = RE_TAG_NAME.captures(raw)?;
        let closing = !caps[1].is_empty();
        let name_match = caps.get(2)?;
        let name = &raw[name_match.start()..name_match.end()];

        let body = raw[name_match.end()..]
            .strip_suffix('>')
            .unwrap_or(&raw[name_match.end()..]);
        let trimmed = body.trim_end();
        let self_closing = !closing && trimmed.ends_with('/');
        let body = if self_closing {
            &trimmed[..trimmed.len() - 1]
        } else {
            body
        };

        let attrs = RE_ATTR
            .captures_iter(body)
            .filter_map(|c| {
                let whole = c.get(0)?;
                let name = c.get(1)?.as_str();
                let value = c.get(2).or_else(|| c.get(3)).or_else(|| c.get(4));
                Some(Attribute {
                    name: Cow::Borrowed(name),
                    value: value.map(|v| Cow::Borrowed(v.as_str())),
                    raw: Cow::Borrowed(whole.as_str()),
                })
            })
            .collect();

        Some(Self {
            raw,
            name: Cow::Borrowed(name),
            closing,
            self_closing,
            attrs,
            dirty: false,
        })
    }

    /// A fresh open tag with no attributes.
    pub fn open(name: impl Into<Cow<'a, str>>) -> Self {
        Self::synthetic(name.into(), false)
    }

    /// A fresh close tag.
    pub fn close(name: impl Into<Cow<'a, str>>) -> Self {
        Self::synthetic(name.into(), true)
    }

    fn synthetic(name: Cow<'a, str>, closing: bool) -> Self {
        Self {
            raw: "",
            name,
            closing,
            self_closing: false,
            attrs: Vec::new(),
            dirty: true,
        }
    }

    pub fn with_attr(mut self, attr: Attribute<'a>) -> Self {
        self.attrs.push(attr);
        self.dirty = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn is_closing(&self) -> bool {
        self.closing
    }

    pub fn is_self_closing(&self) -> bool {
        self.self_closing
    }

    /// True for names with a one-letter namespace prefix, e.g. `o:p`, `v:shape`.
    pub fn is_namespaced(&self) -> bool {
        let bytes = self.name.as_bytes();
        bytes.len() > 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
    }

    pub fn attrs(&self) -> &[Attribute<'a>] {
        &self.attrs
    }

    /// First attribute with the given name, compared case-insensitively.
    pub fn attr(&self, name: &str) -> Option<&Attribute<'a>> {
        self.attrs.iter().find(|a| a.is_named(name))
    }

    /// Value of the first attribute with the given name.
    pub fn attr_value(&self, name: &str) -> Option<&str> {
        self.attr(name).and_then(Attribute::value)
    }

    /// Drop every attribute for which `keep` returns false.
    pub fn retain_attrs(&mut self, mut keep: impl FnMut(&Attribute<'a>) -> bool) {
        let before = self.attrs.len();
        self.attrs.retain(|a| keep(a));
        if self.attrs.len() != before {
            self.dirty = true;
        }
    }

    /// Reduce the tag to its lowercase name plus the listed attributes, in
    /// list order. Attributes without a value are dropped.
    pub fn reduce_to(&self, allowed: &[&str]) -> Tag<'a> {
        let name = self.name.to_ascii_lowercase();
        if self.closing {
            return Tag::close(name);
        }
        let mut reduced = Tag::open(name);
        for wanted in allowed {
            if let Some(attr) = self.attr(wanted).filter(|a| a.value().is_some()) {
                reduced = reduced.with_attr(attr.clone());
            }
        }
        reduced
    }

    /// Render the tag. Untouched tags come back exactly as parsed.
    pub fn render(&self) -> Cow<'a, str> {
        if !self.dirty {
            return Cow::Borrowed(self.raw);
        }
        let mut out = String::with_capacity(self.name.len() + 2 + self.attrs.len() * 16);
        out.push('<');
        if self.closing {
            out.push('/');
        }
        out.push_str(&self.name);
        for attr in &self.attrs {
            out.push(' ');
            out.push_str(attr.raw());
        }
        if self.self_closing {
            out.push('/');
        }
        out.push('>');
        Cow::Owned(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_open_tag_with_mixed_quoting() {
        let tag = Tag::parse(r#"<p class=MsoNormal style='margin:0' id="x" nowrap>"#).unwrap();
        assert_eq!(tag.name(), "p");
        assert!(!tag.is_closing());
        assert_eq!(tag.attrs().len(), 4);
        assert_eq!(tag.attr_value("class"), Some("MsoNormal"));
        assert_eq!(tag.attr_value("STYLE"), Some("margin:0"));
        assert_eq!(tag.attr_value("id"), Some("x"));
        assert_eq!(tag.attr("nowrap").and_then(Attribute::value), None);
    }

    #[test]
    fn test_parse_close_and_self_closing() {
        let close = Tag::parse("</o:p>").unwrap();
        assert!(close.is_closing());
        assert!(close.is_namespaced());

        let img = Tag::parse(r#"<img src="a.png" />"#).unwrap();
        assert!(img.is_self_closing());
        assert_eq!(img.attr_value("src"), Some("a.png"));
    }

    #[test]
    fn test_untouched_tag_renders_verbatim() {
        let raw = "<td  width=50 valign=top >";
        let tag = Tag::parse(raw).unwrap();
        assert_eq!(tag.render(), raw);
    }

    #[test]
    fn test_retain_keeps_original_quoting() {
        let mut tag = Tag::parse(r#"<p class=MsoNormal align=center title='t'>"#).unwrap();
        tag.retain_attrs(|a| !a.is_named("class"));
        assert_eq!(tag.render(), "<p align=center title='t'>");
    }

    #[test]
    fn test_reduce_to_allowed_attributes() {
        let tag = Tag::parse(r#"<A HREF="https://x.test" target=_blank id=top>"#).unwrap();
        assert_eq!(tag.reduce_to(&["href"]).render(), r#"<a HREF="https://x.test">"#);

        let tag = Tag::parse("<a name=anchor>").unwrap();
        assert_eq!(tag.reduce_to(&["href"]).render(), "<a>");

        let close = Tag::parse("</A>").unwrap();
        assert_eq!(close.reduce_to(&["href"]).render(), "</a>");
    }

    #[test]
    fn test_synthetic_tag_quotes_values() {
        let span = Tag::open("span").with_attr(Attribute::new("style", "color:red"));
        assert_eq!(span.render(), r#"<span style="color:red">"#);
        let quoted = Tag::open("span").with_attr(Attribute::new("title", r#"say "hi""#));
        assert_eq!(quoted.render(), r#"<span title='say "hi"'>"#);
    }

    #[test]
    fn test_with_value_keeps_source_quoting() {
        let tag = Tag::parse(r#"<span a=x:1;y:2 b='x:1;y:2' c="x:1;y:2" d = 'x'>"#).unwrap();
        let rewritten: Vec<String> = tag
            .attrs()
            .iter()
            .map(|a| a.with_value("x:1").raw().to_string())
            .collect();
        assert_eq!(rewritten, vec!["a=x:1", "b='x:1'", r#"c="x:1""#, "d='x:1'"]);

        let unquoted = &tag.attrs()[0];
        assert_eq!(unquoted.with_value("a b").raw(), r#"a="a b""#);
        let single = &tag.attrs()[1];
        assert_eq!(single.with_value("it's").raw(), r#"b="it's""#);
    }

    #[test]
    fn test_not_a_tag() {
        assert!(Tag::parse("< p>").is_none());
        assert!(Tag::parse("<!-- x -->").is_none());
    }
}
