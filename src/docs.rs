//! Doc comment parser
//!
//!     Turns the body of a doc comment (delimiters and leading `*` already stripped by the
//!     tokenizer) into a list of [DocBlock]s: titles, paragraphs, lists, tables, code blocks,
//!     tagged sections and empty lines.
//!
//! Pipeline
//!
//!     1. [tokens]: logos lexer for the lexical categories (fence, pipe, hash, dash, tag, word).
//!     2. [lines]: every line is classified by its first significant token, using the
//!        [DocLexicon] to decide which `@word`s open tagged blocks.
//!     3. [grammar]: a chumsky grammar groups classified lines into blocks.
//!
//!     Doc parsing is best-effort decoration. It never fails on malformed input: anomalies are
//!     reported on the [Diagnostics] channel and whatever was recognized is returned.

pub mod grammar;
pub mod lexicon;
pub mod lines;
pub mod tokens;

pub use lexicon::DocLexicon;

use chumsky::Parser;

use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::model::{ApiEntries, ApiFile, Doc, DocBlock};

/// Parse one comment body.
///
/// The `Err` case only happens when the diagnostics are strict and a warning was raised.
pub fn parse_doc(text: &str, lexicon: &DocLexicon, diagnostics: &Diagnostics) -> Result<Vec<DocBlock>> {
    let lines = lines::classify_lines(text.trim_end(), lexicon, diagnostics)?;
    match grammar::document().parse(lines) {
        Ok((mut blocks, rest)) => {
            if let Some((first, span)) = rest.first() {
                diagnostics.warn(format!(
                    "doc comment: unterminated code block at line {}: `{}`",
                    span.start + 1,
                    first.raw
                ))?;
                let content = rest
                    .iter()
                    .map(|(line, _)| line.raw.as_str())
                    .collect::<Vec<_>>()
                    .join("\n");
                blocks.push(DocBlock::Verbatim { content });
            }
            Ok(blocks)
        }
        Err(errors) => {
            for error in errors {
                diagnostics.warn(format!("doc comment: syntax error at line {}", error.span().start + 1))?;
            }
            Ok(Vec::new())
        }
    }
}

/// Replace every raw doc of a file (file doc and entries, recursively) by its parsed form.
pub fn parse_file_docs(file: &mut ApiFile, lexicon: &DocLexicon, diagnostics: &Diagnostics) -> Result<()> {
    if let Some(doc) = file.doc.as_mut() {
        parse_in_place(doc, lexicon, diagnostics)?;
    }
    parse_entries_docs(&mut file.entries, lexicon, diagnostics)
}

fn parse_entries_docs(entries: &mut ApiEntries, lexicon: &DocLexicon, diagnostics: &Diagnostics) -> Result<()> {
    for entry in entries.values_mut() {
        let mut variant = Some(entry);
        while let Some(current) = variant {
            if let Some(doc) = current.doc.as_mut() {
                parse_in_place(doc, lexicon, diagnostics)?;
            }
            if let Some(children) = current.entries_mut() {
                parse_entries_docs(children, lexicon, diagnostics)?;
            }
            variant = current.overload.as_deref_mut();
        }
    }
    Ok(())
}

fn parse_in_place(doc: &mut Doc, lexicon: &DocLexicon, diagnostics: &Diagnostics) -> Result<()> {
    if let Doc::Raw(text) = doc {
        *doc = Doc::Parsed(parse_doc(text, lexicon, diagnostics)?);
    }
    Ok(())
}
