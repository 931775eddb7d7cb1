//! Logos-based lexer for the table-definition (TMDL) dialect.
//!
//! Fast tokenization using the logos crate. Nothing is skipped: the block
//! scanners need whitespace and newline tokens to anchor declarations to
//! line starts, and token offsets to slice raw expression text back out of
//! the source.

use logos::Logos;

/// A token with its kind, text, and byte offset into the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub offset: usize,
}

impl<'a> Token<'a> {
    /// Byte offset one past the end of this token.
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }

    /// True for space and newline tokens.
    pub fn is_trivia(&self) -> bool {
        matches!(self.kind, TokenKind::Space | TokenKind::Newline)
    }
}

/// Token categories the block scanners dispatch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Space,
    Newline,
    /// Bare identifier or keyword (`table`, `dataType`, `double`, ...).
    Ident,
    /// Single-quoted name, quotes included: `'Total Sales'`.
    QuotedName,
    /// Double-quoted string with backslash escapes, quotes included.
    String,
    LBrace,
    RBrace,
    Colon,
    Comma,
    Eq,
    Semicolon,
    /// Any other run of non-structural characters (numbers, operators,
    /// bracketed DAX references, ...).
    Text,
    Error,
}

/// Lexer wrapping the logos-generated tokenizer.
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, LogosToken>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: LogosToken::lexer(input),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let logos_token = self.inner.next()?;
        let text = self.inner.slice();
        let offset = self.inner.span().start;

        let kind = match logos_token {
            Ok(t) => t.into(),
            Err(()) => TokenKind::Error,
        };

        Some(Token { kind, text, offset })
    }
}

/// Tokenize an entire string into a Vec.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Logos token enum - maps to TokenKind.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
enum LogosToken {
    #[regex(r"[ \t]+")]
    Space,

    #[regex(r"\r?\n")]
    Newline,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", priority = 5)]
    Ident,

    // Single-line: an unterminated quote must not swallow the rest of the
    // file.
    #[regex(r"'[^'\n]*'")]
    QuotedName,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    String,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token(":")]
    Colon,

    #[token(",")]
    Comma,

    #[token("=")]
    Eq,

    #[token(";")]
    Semicolon,

    #[regex(r#"[^ \t\r\nA-Za-z_'"{}:,=;][^ \t\r\n{}:,=;]*"#, priority = 2)]
    Text,
}

impl From<LogosToken> for TokenKind {
    fn from(token: LogosToken) -> Self {
        match token {
            LogosToken::Space => TokenKind::Space,
            LogosToken::Newline => TokenKind::Newline,
            LogosToken::Ident => TokenKind::Ident,
            LogosToken::QuotedName => TokenKind::QuotedName,
            LogosToken::String => TokenKind::String,
            LogosToken::LBrace => TokenKind::LBrace,
            LogosToken::RBrace => TokenKind::RBrace,
            LogosToken::Colon => TokenKind::Colon,
            LogosToken::Comma => TokenKind::Comma,
            LogosToken::Eq => TokenKind::Eq,
            LogosToken::Semicolon => TokenKind::Semicolon,
            LogosToken::Text => TokenKind::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_declaration_line() {
        let tokens = tokenize("column Amount {");
        assert_eq!(tokens[0].kind, TokenKind::Ident);
        assert_eq!(tokens[0].text, "column");
        assert_eq!(tokens[2].kind, TokenKind::Ident);
        assert_eq!(tokens[2].text, "Amount");
        assert_eq!(tokens[4].kind, TokenKind::LBrace);
    }

    #[test]
    fn test_quoted_name() {
        let tokens = tokenize("table 'Total Sales'");
        assert_eq!(tokens[2].kind, TokenKind::QuotedName);
        assert_eq!(tokens[2].text, "'Total Sales'");
    }

    #[test]
    fn test_string_with_escapes() {
        let tokens = tokenize(r#"Value: "a \"quoted\" value""#);
        let string = tokens.iter().find(|t| t.kind == TokenKind::String).unwrap();
        assert_eq!(string.text, r#""a \"quoted\" value""#);
    }

    #[test]
    fn test_attribute_value_stops_at_comma() {
        assert_eq!(
            kinds("dataType: int64,"),
            vec![
                TokenKind::Ident,
                TokenKind::Colon,
                TokenKind::Space,
                TokenKind::Ident,
                TokenKind::Comma,
            ]
        );
    }

    #[test]
    fn test_offsets_slice_back_into_source() {
        let input = "measure Total = SUM(Sales[Amount])";
        let tokens = tokenize(input);
        for token in &tokens {
            assert_eq!(&input[token.offset..token.end()], token.text);
        }
    }

    #[test]
    fn test_unterminated_quote_stays_on_line() {
        let tokens = tokenize("table 'Sales\ncolumn Amount");
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Newline));
        assert!(
            tokens
                .iter()
                .any(|t| t.kind == TokenKind::Ident && t.text == "column")
        );
    }
}
