//! Whitespace normalization, applied once as the last stage.
//!
//! Rules:
//!
//! - every whitespace run becomes one space, inside markup too
//! - whitespace directly before a tag's closing `>` is removed
//! - every `<br>` variant (`<BR>`, `<br/>`, `<br clear=all>`) becomes `<br>`
//! - more than two consecutive `<br>` collapse to two
//! - whitespace next to `<br>`, `<p …>` and `</p>` is removed
//! - paragraphs that end up empty are deleted
//! - the document is trimmed
//!
//! Only real tags count as markup. A `<` that does not open a tag (`a < b`,
//! `< b>`) is text and the space after it is kept.
//!
//! The output is built as a stack of [`Piece`]s and every decision looks only
//! at the top of that stack, so removing an empty paragraph immediately
//! exposes whatever came before it to the tokens that follow. That is what
//! makes the result stable under a second application.

use super::token::{tokenize, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Text(String),
    Break,
    ParaOpen(String),
    ParaClose(String),
    Markup(String),
}

impl Piece {
    fn is_block_edge(&self) -> bool {
        matches!(self, Piece::Break | Piece::ParaOpen(_) | Piece::ParaClose(_))
    }

    fn as_str(&self) -> &str {
        match self {
            Piece::Text(s) | Piece::ParaOpen(s) | Piece::ParaClose(s) | Piece::Markup(s) => s,
            Piece::Break => "<br>",
        }
    }
}

/// Normalize whitespace, line breaks and empty paragraphs.
pub fn normalize(input: &str) -> String {
    let mut pass = Normalizer::run(input);
    // Deleting an empty paragraph can splice two text runs into something
    // that tokenizes differently (`<` + `br>`). Repeat until stable; every
    // pass is length non-increasing, so this terminates.
    while pass.spliced {
        let next = Normalizer::run(&pass.output);
        if next.output == pass.output {
            break;
        }
        pass = next;
    }
    pass.output
}

struct Pass {
    output: String,
    spliced: bool,
}

#[derive(Default)]
struct Normalizer {
    pieces: Vec<Piece>,
    spliced: bool,
}

impl Normalizer {
    fn run(input: &str) -> Pass {
        let mut n = Normalizer::default();

        for token in tokenize(input) {
            match token.kind {
                TokenKind::Text => n.push_text(collapse_whitespace(token.text)),
                TokenKind::OpenTag | TokenKind::CloseTag => match token.tag() {
                    Some(tag) if tag.is_named("br") && !tag.is_closing() => n.push_break(),
                    Some(tag) if tag.is_named("p") && !tag.is_self_closing() => {
                        let text = tidy_markup(token.text);
                        if tag.is_closing() {
                            n.close_paragraph(text);
                        } else {
                            n.trim_tail();
                            n.pieces.push(Piece::ParaOpen(text));
                        }
                    }
                    _ => n.pieces.push(Piece::Markup(tidy_markup(token.text))),
                },
                _ => n.pieces.push(Piece::Markup(tidy_markup(token.text))),
            }
        }

        n.finish()
    }

    fn push_text(&mut self, text: String) {
        let text = match self.pieces.last() {
            Some(p) if p.is_block_edge() => text.trim_start().to_string(),
            _ => text,
        };
        if text.is_empty() {
            return;
        }
        if let Some(Piece::Text(last)) = self.pieces.last_mut() {
            if last.ends_with(' ') && text.starts_with(' ') {
                last.push_str(&text[1..]);
            } else {
                last.push_str(&text);
            }
            return;
        }
        self.pieces.push(Piece::Text(text));
    }

    fn push_break(&mut self) {
        self.trim_tail();
        let run = self
            .pieces
            .iter()
            .rev()
            .take_while(|p| **p == Piece::Break)
            .count();
        if run < 2 {
            self.pieces.push(Piece::Break);
        }
    }

    fn close_paragraph(&mut self, text: String) {
        self.trim_tail();
        if matches!(self.pieces.last(), Some(Piece::ParaOpen(_))) {
            self.pieces.pop();
            if matches!(self.pieces.last(), Some(Piece::Text(_))) {
                self.spliced = true;
            }
        } else {
            self.pieces.push(Piece::ParaClose(text));
        }
    }

    /// Remove trailing whitespace from a text piece on top of the stack,
    /// dropping the piece if nothing is left.
    fn trim_tail(&mut self) {
        if let Some(Piece::Text(last)) = self.pieces.last_mut() {
            let len = last.trim_end().len();
            last.truncate(len);
            if last.is_empty() {
                self.pieces.pop();
            }
        }
    }

    fn finish(mut self) -> Pass {
        self.trim_tail();
        if let Some(Piece::Text(first)) = self.pieces.first_mut() {
            let start = first.len() - first.trim_start().len();
            first.drain(..start);
        }

        let output = self.pieces.iter().map(Piece::as_str).collect();
        Pass {
            output,
            spliced: self.spliced,
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_run = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_run {
                out.push(' ');
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}

/// Collapse whitespace inside a markup token and drop any left before `>`.
fn tidy_markup(text: &str) -> String {
    let collapsed = collapse_whitespace(text);
    match collapsed.strip_suffix('>') {
        Some(body) => format!("{}>", body.trim_end()),
        None => collapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_runs() {
        assert_eq!(normalize("a \n\t b"), "a b");
        assert_eq!(normalize("<p>Hello   <b>World</b></p>"), "<p>Hello <b>World</b></p>");
    }

    #[test]
    fn test_whitespace_before_closing_delimiter() {
        assert_eq!(normalize("<a href=x >y</a >"), "<a href=x>y</a>");
        assert_eq!(normalize("<td\n  width=5\n>x</td>"), "<td width=5>x</td>");
    }

    #[test]
    fn test_break_variants_canonicalized() {
        assert_eq!(normalize("a<BR>b<br/>c<br />d<br clear=all>e"), "a<br>b<br>c<br>d<br>e");
        assert_eq!(normalize("a <br> b"), "a<br>b");
    }

    #[test]
    fn test_break_runs_capped_at_two() {
        assert_eq!(normalize("a<br><br><br><br>b"), "a<br><br>b");
        assert_eq!(normalize("a<br> <br>\n<br>b"), "a<br><br>b");
    }

    #[test]
    fn test_empty_paragraphs_removed() {
        assert_eq!(normalize("<p>x</p><p> </p><p class=a>&#8203;</p>"), "<p>x</p><p class=a>&#8203;</p>");
        assert_eq!(normalize("<p></p><p>\n</p>"), "");
        assert_eq!(normalize("<p><p></p></p>x"), "x");
    }

    #[test]
    fn test_paragraph_edges_trimmed() {
        assert_eq!(normalize("<p>  Hello  </p>\n<p> World</p>"), "<p>Hello</p><p>World</p>");
    }

    #[test]
    fn test_removal_cascades() {
        assert_eq!(normalize("a<br><br><p></p><br>b"), "a<br><br>b");
        assert_eq!(normalize("x <p></p> y"), "x y");
    }

    #[test]
    fn test_document_trimmed() {
        assert_eq!(normalize("\n\n  <b>x</b>  \n"), "<b>x</b>");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_bracket_in_text_is_not_markup() {
        assert_eq!(normalize("if a < b  and c >  d"), "if a < b and c > d");
        assert_eq!(normalize("<p>< b> x</p>"), "<p>< b> x</p>");
    }

    #[test]
    fn test_splice_is_resolved() {
        let once = normalize("x <<p></p>br> y");
        assert_eq!(once, "x<br>y");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_idempotent_on_samples() {
        for sample in [
            "<p> a <br/> <br/> <br/> b </p>\n\n<p>\u{a0}</p>",
            "1 < 2 <b >bold </b>",
            "<!--  c  --> <P>x</P>",
            "<p>a <p></p></p>",
        ] {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "input: {sample:?}");
        }
    }
}
