//! Grammar of the C header language
//!
//! ```text
//! header        = item* EOF
//! item          = doc | directive | externC | structDef | enumDef | declaration | definition
//! externC       = EXTERN STRING "{" item* "}"
//! structDef     = TYPEDEF? (STRUCT | UNION) IDENT? "{" structItem* "}" IDENT? ";"
//! structItem    = doc | directive | structDef | enumDef | declaration
//! enumDef       = TYPEDEF? ENUM IDENT? "{" (doc | directive | enumItem | enumItemLast)* "}" IDENT? ";"
//! enumItem      = IDENT ("=" value)? ","
//! enumItemLast  = IDENT ("=" value)?
//! declaration   = token+ ";"            (functionDecl, aliasDef, callbackDef, var)
//! definition    = token+ body ";"?      (functionDef)
//! ```
//!
//! Declarations are recognized by shape only; which declaration a statement is gets decided
//! when the tree is lowered, by the same analysis the line-based tokenizer uses.

use std::ops::Range;

use chumsky::prelude::*;

use super::tokens::{CToken, TokenSpan};

pub type ParserError = Simple<TokenSpan>;

/// Parse tree node. Spans are byte ranges into the source.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Doc {
        trailing: bool,
        span: Range<usize>,
    },
    Directive(Range<usize>),
    /// A `;`-terminated statement: its tokens and the `;`.
    Declaration {
        tokens: Vec<Range<usize>>,
        end: Range<usize>,
    },
    /// A function definition: header tokens and the braced body.
    Definition {
        head: Vec<Range<usize>>,
        body: Range<usize>,
    },
    /// `struct`/`union`/`enum` body. `close` runs from `}` through `;`.
    Block {
        head: Vec<Range<usize>>,
        open: Range<usize>,
        members: Vec<Node>,
        close: Range<usize>,
        closer: Option<Range<usize>>,
    },
    Enumerator {
        tokens: Vec<Range<usize>>,
        end: Range<usize>,
    },
    ExternC(Vec<Node>),
}

fn token(kind: CToken) -> impl Parser<TokenSpan, Range<usize>, Error = ParserError> + Clone {
    filter(move |(token, _): &TokenSpan| *token == kind).map(|(_, span)| span)
}

fn token_but(excluded: &'static [CToken]) -> impl Parser<TokenSpan, Range<usize>, Error = ParserError> + Clone {
    filter(move |(token, _): &TokenSpan| !excluded.contains(token)).map(|(_, span)| span)
}

const NOT_IN_STATEMENT: &[CToken] = &[
    CToken::LBrace,
    CToken::RBrace,
    CToken::Semi,
    CToken::Directive,
    CToken::BlockDoc,
    CToken::TrailingDoc,
];

const NOT_IN_PARENS: &[CToken] = &[CToken::LParen, CToken::RParen];

const NOT_IN_VALUE: &[CToken] = &[
    CToken::LParen,
    CToken::RParen,
    CToken::Comma,
    CToken::LBrace,
    CToken::RBrace,
    CToken::Semi,
    CToken::Directive,
    CToken::BlockDoc,
    CToken::TrailingDoc,
];

const NOT_BRACES: &[CToken] = &[CToken::LBrace, CToken::RBrace];

fn doc() -> impl Parser<TokenSpan, Node, Error = ParserError> + Clone {
    choice((
        token(CToken::BlockDoc).map(|span| Node::Doc { trailing: false, span }),
        token(CToken::TrailingDoc).map(|span| Node::Doc { trailing: true, span }),
    ))
}

fn directive() -> impl Parser<TokenSpan, Node, Error = ParserError> + Clone {
    token(CToken::Directive).map(Node::Directive)
}

fn declaration() -> impl Parser<TokenSpan, Node, Error = ParserError> + Clone {
    token_but(NOT_IN_STATEMENT)
        .repeated()
        .at_least(1)
        .then(token(CToken::Semi))
        .map(|(tokens, end)| Node::Declaration { tokens, end })
}

/// A braced body with nested braces, as one span.
fn body() -> impl Parser<TokenSpan, Range<usize>, Error = ParserError> + Clone {
    recursive(|body| {
        token(CToken::LBrace)
            .then(choice((body, token_but(NOT_BRACES))).repeated())
            .then(token(CToken::RBrace))
            .map(|((open, _), close)| open.start..close.end)
    })
}

fn definition() -> impl Parser<TokenSpan, Node, Error = ParserError> + Clone {
    token_but(NOT_IN_STATEMENT)
        .repeated()
        .at_least(1)
        .then(body())
        .then_ignore(token(CToken::Semi).or_not())
        .map(|(head, body)| Node::Definition { head, body })
}

/// Parenthesized group with nested parentheses, flattened to its tokens.
fn parens() -> impl Parser<TokenSpan, Vec<Range<usize>>, Error = ParserError> + Clone {
    recursive(|parens| {
        token(CToken::LParen)
            .then(choice((parens, token_but(NOT_IN_PARENS).map(|span| vec![span]))).repeated())
            .then(token(CToken::RParen))
            .map(|((open, inner), close)| {
                let mut tokens = vec![open];
                tokens.extend(inner.into_iter().flatten());
                tokens.push(close);
                tokens
            })
    })
}

fn enum_def() -> impl Parser<TokenSpan, Node, Error = ParserError> + Clone {
    let value = choice((parens(), token_but(NOT_IN_VALUE).map(|span| vec![span])))
        .repeated()
        .at_least(1)
        .map(|groups| groups.into_iter().flatten().collect::<Vec<_>>());
    let item = token(CToken::Ident)
        .then(token(CToken::Assign).then(value).or_not())
        .map(|(name, value)| {
            let mut tokens = vec![name];
            if let Some((assign, value)) = value {
                tokens.push(assign);
                tokens.extend(value);
            }
            tokens
        });
    let enum_item = item
        .clone()
        .then(token(CToken::Comma))
        .map(|(tokens, end)| Node::Enumerator { tokens, end });
    let enum_item_last = item.map(|tokens| {
        let end = tokens.last().cloned().unwrap_or_default();
        Node::Enumerator { tokens, end }
    });

    let head = token(CToken::Typedef)
        .or_not()
        .then(token(CToken::Enum))
        .then(token(CToken::Ident).or_not())
        .map(|((typedef, keyword), name)| typedef.into_iter().chain([keyword]).chain(name).collect::<Vec<_>>());
    block(head, choice((doc(), directive(), enum_item, enum_item_last)))
}

fn struct_def(member: impl Parser<TokenSpan, Node, Error = ParserError> + Clone) -> impl Parser<TokenSpan, Node, Error = ParserError> + Clone {
    let head = token(CToken::Typedef)
        .or_not()
        .then(choice((token(CToken::Struct), token(CToken::Union))))
        .then(token(CToken::Ident).or_not())
        .map(|((typedef, keyword), name)| typedef.into_iter().chain([keyword]).chain(name).collect::<Vec<_>>());
    block(head, member)
}

fn block(
    head: impl Parser<TokenSpan, Vec<Range<usize>>, Error = ParserError> + Clone,
    member: impl Parser<TokenSpan, Node, Error = ParserError> + Clone,
) -> impl Parser<TokenSpan, Node, Error = ParserError> + Clone {
    head.then(token(CToken::LBrace))
        .then(member.repeated())
        .then(token(CToken::RBrace))
        .then(token(CToken::Ident).or_not())
        .then(token(CToken::Semi))
        .map(|(((((head, open), members), brace), closer), semi)| Node::Block {
            head,
            open,
            members,
            close: brace.start..semi.end,
            closer,
        })
}

/// `struct`, `union` and `enum` definitions, nesting to any depth.
fn type_def() -> impl Parser<TokenSpan, Node, Error = ParserError> + Clone {
    recursive(|type_def| {
        let member = choice((doc(), directive(), type_def, declaration()));
        choice((struct_def(member), enum_def()))
    })
}

/// The whole header.
pub fn header() -> impl Parser<TokenSpan, Vec<Node>, Error = ParserError> {
    let items = recursive(|items| {
        let extern_c = token(CToken::Extern)
            .then(token(CToken::Str))
            .then(token(CToken::LBrace))
            .ignore_then(items)
            .then_ignore(token(CToken::RBrace))
            .map(Node::ExternC);
        choice((doc(), directive(), extern_c, type_def(), declaration(), definition())).repeated()
    });
    items.then_ignore(end())
}
