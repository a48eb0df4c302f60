//! Tokenizer: split a document into tags, comments, declarations and text.
//!
//! Every later stage is a filter over this token stream instead of a chain
//! of whole-string regex substitutions. The token kinds are defined with the
//! logos derive macro, which compiles them into a single DFA, so tokenizing
//! is one forward scan with no backtracking regardless of how malformed the
//! markup is.
//!
//! The tokenizer is total: bytes that match no kind (a stray `<`, an
//! unterminated `<!--`) come out as [`TokenKind::Text`], and concatenating
//! the text of every token reproduces the input exactly.

use logos::Logos;

use super::markup::Tag;

/// Lexical category of a [`Token`].
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `<!-- … -->`, including conditional comments. Ends at the first `-->`.
    #[token("<!--", lex_comment)]
    Comment,

    /// `<?xml … ?>`, `<?xml:namespace … />` and other processing instructions.
    #[regex(r"<\?[^>]*>")]
    Instruction,

    /// `<!DOCTYPE …>`, `<![if …]>`, `<![endif]>`.
    #[regex(r"<![^>\-][^>]*>")]
    Declaration,

    #[regex(r"<[A-Za-z][^>]*>")]
    OpenTag,

    #[regex(r"</[A-Za-z][^>]*>")]
    CloseTag,

    #[regex(r"[^<]+")]
    Text,
}

/// Consume a comment body up to and including the first `-->`.
///
/// Returning `false` for an unterminated comment turns the `<!--` into an
/// error token, which [`Tokens`] hands out as plain text.
fn lex_comment(lex: &mut logos::Lexer<'_, TokenKind>) -> bool {
    match lex.remainder().find("-->") {
        Some(end) => {
            lex.bump(end + 3);
            true
        }
        None => false,
    }
}

/// One lexical unit, borrowing its text from the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

impl<'a> Token<'a> {
    pub fn is_tag(&self) -> bool {
        matches!(self.kind, TokenKind::OpenTag | TokenKind::CloseTag)
    }

    /// Parse an open or close tag token. Returns `None` for every other kind.
    pub fn tag(&self) -> Option<Tag<'a>> {
        if self.is_tag() {
            Tag::parse(self.text)
        } else {
            None
        }
    }

    /// True for the markers of a conditional comment, in either form:
    ///
    /// * downlevel-hidden: `<!--[if gte mso 9]> … <![endif]-->`,
    ///   `<!--[if !supportLists]-->`, `<!--[endif]-->`
    /// * downlevel-revealed: `<![if !vml]>`, `<![endif]>`
    pub fn is_conditional_comment(&self) -> bool {
        let body = match self.kind {
            TokenKind::Comment => &self.text[4..],
            TokenKind::Declaration => &self.text[2..],
            _ => return false,
        };
        let body = body.trim_start();
        starts_with_ignore_case(body, "[if") || starts_with_ignore_case(body, "[endif")
    }
}

/// Lazy token iterator returned by [`tokenize`].
pub struct Tokens<'a> {
    lexer: logos::Lexer<'a, TokenKind>,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let kind = self.lexer.next()?.unwrap_or(TokenKind::Text);
        Some(Token {
            kind,
            text: self.lexer.slice(),
        })
    }
}

/// Tokenize a document lazily.
pub fn tokenize(source: &str) -> Tokens<'_> {
    Tokens {
        lexer: TokenKind::lexer(source),
    }
}

pub(crate) fn starts_with_ignore_case(haystack: &str, prefix: &str) -> bool {
    haystack
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
