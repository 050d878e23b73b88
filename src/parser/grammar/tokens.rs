//! Token definitions for the C header grammar
//!
//! Plain comments are skipped, doc comments are kept and split into block and trailing docs.
//! Every preprocessor line (with its continuations) is one [CToken::Directive] token.

use std::ops::Range;

use logos::Logos;

#[derive(Logos, Debug, PartialEq, Eq, Hash, Clone, Copy)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum CToken {
    /// `/**< ... */` or `///< ...`
    #[regex(r"/\*\*<([^*]|\*+[^*/])*\*+/", priority = 20)]
    #[regex(r"///<[^\n]*", priority = 20)]
    TrailingDoc,

    /// `/** ... */` or `/// ...`
    #[regex(r"/\*\*([^*]|\*+[^*/])*\*+/", priority = 10)]
    #[regex(r"///[^\n]*", priority = 10)]
    BlockDoc,

    #[regex(r"/\*([^*]|\*+[^*/])*\*+/", logos::skip, priority = 2)]
    #[regex(r"//[^\n]*", logos::skip, priority = 2)]
    Comment,

    #[regex(r"#([^\n\\]|\\\r?\n|\\[^\r\n])*")]
    Directive,

    #[token("extern")]
    Extern,
    #[token("typedef")]
    Typedef,
    #[token("struct")]
    Struct,
    #[token("union")]
    Union,
    #[token("enum")]
    Enum,
    #[token("inline")]
    Inline,
    #[token("static")]
    Static,
    #[token("void")]
    Void,

    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,
    #[token("=")]
    Assign,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    Str,
    #[regex(r"'([^'\\\n]|\\.)*'")]
    Char,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[regex(r"[0-9][0-9A-Za-z_.]*")]
    Number,

    /// Any other single character: operators, brackets, sigils.
    #[regex(r"[^\sA-Za-z0-9_{}();,=]", priority = 1)]
    Punct,
}

pub type TokenSpan = (CToken, Range<usize>);

/// Tokenize header source. Input the lexer rejects becomes [CToken::Punct].
pub fn tokenize(source: &str) -> Vec<TokenSpan> {
    let mut lexer = CToken::lexer(source);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        tokens.push((result.unwrap_or(CToken::Punct), lexer.span()));
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<CToken> {
        tokenize(source).into_iter().map(|(token, _)| token).collect()
    }

    #[test]
    fn test_doc_comments_are_classified() {
        assert_eq!(
            kinds("/** doc */ /**< trailing */ /* plain */ // line\n/// line doc\n///< trailing line"),
            vec![CToken::BlockDoc, CToken::TrailingDoc, CToken::BlockDoc, CToken::TrailingDoc]
        );
    }

    #[test]
    fn test_directive_swallows_continuations() {
        let source = "#define X(a) \\\n    (a + 1)\nint x;";
        let tokens = tokenize(source);
        assert_eq!(tokens[0].0, CToken::Directive);
        assert_eq!(&source[tokens[0].1.clone()], "#define X(a) \\\n    (a + 1)");
        assert_eq!(tokens[1].0, CToken::Ident);
    }

    #[test]
    fn test_keywords_and_punctuation() {
        assert_eq!(
            kinds("typedef struct S *P;"),
            vec![CToken::Typedef, CToken::Struct, CToken::Ident, CToken::Punct, CToken::Ident, CToken::Semi]
        );
        assert_eq!(kinds("extern \"C\" {"), vec![CToken::Extern, CToken::Str, CToken::LBrace]);
    }
}
