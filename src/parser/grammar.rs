//! Grammar-driven parser
//!
//! A formal-grammar alternative to the line-based strategy, for the C headers:
//!
//! 1. [tokens]: logos lexer (keywords, punctuation, literals, whole-line directives, block and
//!    trailing doc comments).
//! 2. [rules]: chumsky grammar producing a [Node] tree of extern "C" blocks, type definitions,
//!    declarations and definitions.
//! 3. Lowering: the tree is flattened back into the [FileToken] vocabulary (declaration text is
//!    classified by [crate::lexer::patterns]) and assembled by the shared entry cursor.
//!
//! Input the grammar does not accept is a structural error for the whole file.

pub mod rules;
pub mod tokens;

use std::ops::Range;

use chumsky::Parser;

use self::rules::Node;
use super::linebased;
use super::{HeaderParser, ParseOptions};
use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::lexer::scanner::{comment_body, indentation, line_doc_body};
use crate::lexer::patterns::{self, Opener};
use crate::lexer::{BlockKeyword, FileToken, TokenKind, MAX_TOKEN_LINES};
use crate::model::ApiFile;
use crate::parser::decl;

pub struct GrammarParser;

impl HeaderParser for GrammarParser {
    fn parse(&self, name: &str, source: &str, _options: &ParseOptions, diagnostics: &Diagnostics) -> Result<ApiFile> {
        let tokens = tokens::tokenize(source);
        let lines = LineIndex::new(source);
        let nodes = rules::header().parse(tokens.clone()).map_err(|errors| {
            let offset = errors
                .first()
                .and_then(|error| tokens.get(error.span().start))
                .map_or(source.len(), |(_, span)| span.start);
            Error::parse(
                name,
                lines.line(offset) + 1,
                "unexpected token where a declaration was expected",
            )
        })?;

        let mut lowering = Lowering {
            file: name,
            source,
            lines: &lines,
            diagnostics,
            tokens: Vec::new(),
            conditionals: Vec::new(),
            stopped: false,
        };
        lowering.nodes(&nodes, false)?;
        linebased::assemble(name, &lowering.tokens)
    }
}

/// Byte offset to 0-based line lookup.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(source.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    fn line(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset).saturating_sub(1)
    }
}

struct Lowering<'a> {
    file: &'a str,
    source: &'a str,
    lines: &'a LineIndex,
    diagnostics: &'a Diagnostics,
    tokens: Vec<FileToken>,
    conditionals: Vec<bool>,
    stopped: bool,
}

impl<'a> Lowering<'a> {
    fn nodes(&mut self, nodes: &[Node], in_aggregate: bool) -> Result<()> {
        let source = self.source;
        let mut index = 0;
        while index < nodes.len() && !self.stopped {
            let node = &nodes[index];
            index += 1;
            match node {
                Node::Doc { trailing, span } if !trailing && source[span.clone()].starts_with("///") => {
                    // A run of `///` lines is one doc.
                    let mut last = span.clone();
                    let mut parts = vec![&source[span.clone()]];
                    while let Some(Node::Doc { trailing: false, span: next }) = nodes.get(index) {
                        let text = &source[next.clone()];
                        if !text.starts_with("///") || self.lines.line(next.start) != self.lines.line(last.start) + 1 {
                            break;
                        }
                        parts.push(text);
                        last = next.clone();
                        index += 1;
                    }
                    let text = line_doc_body(&parts);
                    self.push(span.start..last.end, TokenKind::Doc { text, trailing: false })?;
                }
                Node::Doc { trailing, span } => {
                    let text = doc_body(&source[span.clone()]);
                    self.push(span.clone(), TokenKind::Doc { text, trailing: *trailing })?;
                }
                Node::Directive(span) => self.directive(span)?,
                Node::Declaration { tokens, end } => {
                    let text = self.text(tokens);
                    let text = text.trim();
                    if patterns::is_ignorable(text) {
                        continue;
                    }
                    match patterns::classify_statement(text, in_aggregate, false) {
                        Some(kind) => self.push(tokens[0].start..end.end, kind)?,
                        None => self.unrecognized(tokens[0].start, text)?,
                    }
                }
                Node::Definition { head, body } => {
                    let text = self.text(head);
                    match patterns::classify_opener(&text, in_aggregate) {
                        Opener::Function(kind) => self.push(head[0].start..body.end, kind)?,
                        _ => self.unrecognized(head[0].start, &text)?,
                    }
                }
                Node::Block {
                    head,
                    open,
                    members,
                    close,
                    closer,
                } => {
                    let text = self.text(head);
                    let Opener::Block(kind) = patterns::classify_opener(&text, in_aggregate) else {
                        self.unrecognized(head[0].start, &text)?;
                        continue;
                    };
                    let is_enum = matches!(
                        kind,
                        TokenKind::Block {
                            keyword: BlockKeyword::Enum,
                            ..
                        }
                    );
                    self.push(head[0].start..open.end, kind)?;
                    self.nodes(members, !is_enum)?;
                    let name = closer.as_ref().map(|span| source[span.clone()].to_string());
                    self.push(close.start..close.start + 1, TokenKind::EndStruct { name })?;
                }
                Node::Enumerator { tokens, end } => {
                    let text = self.text(tokens);
                    match patterns::parse_enumerator(&text) {
                        Some(kind) => self.push(tokens[0].start..end.end, kind)?,
                        None => self.unrecognized(tokens[0].start, &text)?,
                    }
                }
                Node::ExternC(items) => self.nodes(items, in_aggregate)?,
            }
        }
        Ok(())
    }

    fn directive(&mut self, span: &Range<usize>) -> Result<()> {
        let text = self.source[span.clone()]
            .split('\n')
            .map(|piece| piece.trim().trim_end_matches('\\').trim_end())
            .collect::<Vec<_>>()
            .join(" ");
        let Some(kinds) = patterns::directive_tokens(&text, &mut self.conditionals) else {
            return self.unrecognized(span.start, &text);
        };
        for kind in kinds {
            self.stopped |= kind == TokenKind::ImplMarker;
            self.push(span.clone(), kind)?;
        }
        Ok(())
    }

    /// Source text of a token sequence; gaps holding comments read as one space.
    fn text(&self, spans: &[Range<usize>]) -> String {
        let mut text = String::new();
        for (i, span) in spans.iter().enumerate() {
            if i > 0 {
                let gap = &self.source[spans[i - 1].end..span.start];
                text.push_str(if gap.trim().is_empty() { gap } else { " " });
            }
            text.push_str(&self.source[span.clone()]);
        }
        text
    }

    fn push(&mut self, span: Range<usize>, kind: TokenKind) -> Result<()> {
        let first = self.lines.line(span.start);
        let last = self.lines.line(span.end.saturating_sub(1).max(span.start));
        let line_text = self.source.lines().nth(first).unwrap_or("");
        let token = FileToken {
            begin: first + 1,
            end: last + 2,
            spaces: indentation(line_text),
            kind,
        };
        if token.end - token.begin > MAX_TOKEN_LINES {
            self.diagnostics.warn(format!(
                "{}:{}: {} token spans {} lines",
                self.file,
                token.begin,
                token.kind.describe(),
                token.end - token.begin
            ))?;
        }
        self.tokens.push(token);
        Ok(())
    }

    fn unrecognized(&self, offset: usize, text: &str) -> Result<()> {
        if patterns::is_ignorable(text) {
            return Ok(());
        }
        self.diagnostics.warn(format!(
            "{}:{}: skipping unrecognized declaration `{}`",
            self.file,
            self.lines.line(offset) + 1,
            decl::collapse_whitespace(text)
        ))
    }
}

/// Body of a `/** */` or `/**< */` comment.
fn doc_body(comment: &str) -> String {
    if comment.starts_with("///") {
        return line_doc_body(&[comment]);
    }
    let inner = comment
        .strip_prefix("/**<")
        .or_else(|| comment.strip_prefix("/**"))
        .unwrap_or(comment);
    let inner = inner.strip_suffix("*/").unwrap_or(inner);
    let parts: Vec<&str> = inner.split('\n').collect();
    comment_body(&parts)
}
