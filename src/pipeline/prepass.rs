//! Pre-pass: level-independent removal of document-level noise.
//!
//! Runs before any level rule. Removes, in one pass over the token vector:
//!
//! 1. comments, conditional comments included (only when requested)
//! 2. `<?xml …?>` declarations and `<?xml:namespace …/>` instructions
//! 3. tags with a one-letter namespace prefix. Office and VML elements
//!    (`o:p`, `v:shape`) and Word's settings blocks (`w:WordDocument`) go
//!    with their content when a matching close tag exists; any other
//!    namespaced element (`w:Sdt` content controls, `m:oMath`) loses only
//!    its tags so the text inside survives
//! 4. `<meta>` and `<link>` tags
//! 5. `<style>` blocks through the first `</style>`, contents included
//!
//! None of these can overlap in the spans they remove, so a single
//! left-to-right walk is equivalent to applying them one at a time.

use super::markup::Tag;
use super::token::{starts_with_ignore_case, tokenize, Token, TokenKind};
use std::collections::HashMap;

/// Strip document-level noise from `input`.
pub fn strip(input: &str, remove_comments: bool) -> String {
    let tokens: Vec<Token<'_>> = tokenize(input).collect();
    let tags: Vec<Option<Tag<'_>>> = tokens.iter().map(Token::tag).collect();
    let element_end = match_removable_elements(&tags);

    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        let drop = match token.kind {
            TokenKind::Comment => remove_comments,
            TokenKind::Instruction => starts_with_ignore_case(token.text, "<?xml"),
            TokenKind::OpenTag | TokenKind::CloseTag => match &tags[i] {
                Some(tag) => {
                    if let Some(end) = element_end[i] {
                        i = end + 1;
                        continue;
                    }
                    tag.is_namespaced() || tag.is_named("meta") || tag.is_named("link")
                }
                None => false,
            },
            _ => false,
        };
        if !drop {
            out.push_str(token.text);
        }
        i += 1;
    }

    out
}

/// Word's document-settings elements, dropped with their content.
const WORD_SETTINGS: &[&str] = &["w:WordDocument", "w:LatentStyles"];

/// True for namespaced elements whose content is never document text.
fn drops_content(tag: &Tag<'_>) -> bool {
    let name = tag.name();
    starts_with_ignore_case(name, "o:")
        || starts_with_ignore_case(name, "v:")
        || WORD_SETTINGS.iter().any(|w| w.eq_ignore_ascii_case(name))
}

/// For every open tag that starts a removable element, the index of the
/// token that closes it.
///
/// Content-dropping namespaced elements pair with the nearest unmatched
/// close of the same name, counting nesting. A `<style>` pairs with the first `</style>` after
/// it. Open tags without a partner get `None` and are handled token by token.
fn match_removable_elements(tags: &[Option<Tag<'_>>]) -> Vec<Option<usize>> {
    let mut end = vec![None; tags.len()];
    let mut namespaced: HashMap<String, Vec<usize>> = HashMap::new();
    let mut styles: Vec<usize> = Vec::new();

    for (i, tag) in tags.iter().enumerate() {
        let Some(tag) = tag else { continue };
        if tag.is_self_closing() {
            continue;
        }

        if tag.is_namespaced() && drops_content(tag) {
            let key = tag.name().to_ascii_lowercase();
            if tag.is_closing() {
                if let Some(open) = namespaced.get_mut(&key).and_then(Vec::pop) {
                    end[open] = Some(i);
                }
            } else {
                namespaced.entry(key).or_default().push(i);
            }
        } else if tag.is_named("style") {
            if tag.is_closing() {
                for open in styles.drain(..) {
                    end[open] = Some(i);
                }
            } else {
                styles.push(i);
            }
        }
    }

    end
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespaced_element_removed_with_content() {
        assert_eq!(
            strip("<p><o:p>&nbsp;</o:p>Hello</p>", true),
            "<p>Hello</p>"
        );
    }

    #[test]
    fn test_nested_namespaced_elements() {
        let input = r#"<v:shape id="a"><v:shape><v:imagedata src="x"/></v:shape></v:shape>after"#;
        assert_eq!(strip(input, true), "after");
    }

    #[test]
    fn test_unmatched_namespaced_tag_removes_token_only() {
        assert_eq!(strip("<o:p>text<b>bold</b>", true), "text<b>bold</b>");
        assert_eq!(strip("x</w:r>y", true), "xy");
    }

    #[test]
    fn test_content_control_keeps_its_text() {
        let input = "<p><w:Sdt id=1><w:r>Signed by</w:r> Jane</w:Sdt></p>";
        assert_eq!(strip(input, true), "<p>Signed by Jane</p>");
    }

    #[test]
    fn test_word_settings_block_removed_with_content() {
        let input = "<w:WordDocument><w:View>Print</w:View><w:Zoom>100</w:Zoom></w:WordDocument><p>x</p>";
        assert_eq!(strip(input, true), "<p>x</p>");
    }

    #[test]
    fn test_multi_letter_prefix_is_kept() {
        let input = "<st1:place>London</st1:place>";
        assert_eq!(strip(input, true), input);
    }

    #[test]
    fn test_xml_declarations_removed() {
        let input = r#"<?xml version="1.0"?><?xml:namespace prefix = o ns = "urn:schemas-microsoft-com:office:office" /><p>x</p>"#;
        assert_eq!(strip(input, false), "<p>x</p>");
    }

    #[test]
    fn test_meta_link_and_style_removed() {
        let input = "<head><meta charset=utf-8><link rel=File-List href=x><style><!-- p.MsoNormal {margin:0} --></style></head>";
        assert_eq!(strip(input, false), "<head></head>");
    }

    #[test]
    fn test_unterminated_style_is_left_alone() {
        let input = "<style>p {margin:0}";
        assert_eq!(strip(input, true), input);
    }

    #[test]
    fn test_comments_follow_option() {
        let input = "a<!--[if gte mso 9]><xml><w:WordDocument/></xml><![endif]-->b<!-- note -->c";
        assert_eq!(strip(input, true), "abc");
        assert_eq!(
            strip(input, false),
            "a<!--[if gte mso 9]><xml><w:WordDocument/></xml><![endif]-->b<!-- note -->c"
        );
    }

    #[test]
    fn test_metadata_tag_is_not_meta() {
        let input = "<metadata>x</metadata>";
        assert_eq!(strip(input, true), input);
    }
}
