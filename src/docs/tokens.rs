//! Token definitions for doc comment bodies
//!
//! Only the lexical categories that decide what a line is are distinguished; the grammar works
//! on classified lines, and line content is always taken from the raw text.

use logos::Logos;

#[derive(Logos, Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum DocToken {
    /// Code fence delimiter.
    #[token("```")]
    Fence,

    /// Table row delimiter.
    #[token("|")]
    Pipe,

    /// Title delimiter, one `#` per heading level.
    #[regex(r"#+")]
    Hash,

    /// List item delimiter.
    #[token("-")]
    Dash,

    /// Block tag keyword: `@param`, `\returns`, ...
    #[regex(r"[@\\][A-Za-z]+")]
    Tag,

    /// Lone `@`, `\` or backtick.
    #[regex(r"[@\\`]")]
    Symbol,

    #[regex(r"[ \t\r]+")]
    Whitespace,

    #[token("\n")]
    Newline,

    #[regex(r"[^\s|#\-@\\`]+")]
    Word,
}

/// Tokenize a comment body, keeping spans. Input the lexer rejects is returned as `Err`.
pub fn tokenize_with_spans(source: &str) -> Vec<(Result<DocToken, ()>, logos::Span)> {
    let mut lexer = DocToken::lexer(source);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        tokens.push((result, lexer.span()));
    }
    tokens
}
