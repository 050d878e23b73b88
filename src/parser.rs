//! Header parsers
//!
//! This module contains two independent strategies that extract an [ApiFile] from header text:
//!
//! - **Linebased**: consumes the [crate::lexer] token stream with a stateful cursor. It handles
//!   both the C headers and the C++ headers this tool writes (namespaces, templates, member
//!   functions, access labels).
//! - **Grammar**: a logos lexer plus a chumsky grammar of the C header language (extern "C",
//!   directives, typedefs, struct/enum bodies, function declarations and definitions).
//!
//! Both share [decl] for declarator analysis and [builder] for entry construction, so for C
//! headers they produce the same entries.
//!
//! Docs are attached raw; [ParseOptions::parse_docs] runs the [crate::docs] parser over them
//! afterwards. Parsers never produce hints.

pub mod builder;
pub mod decl;
pub mod grammar;
pub mod linebased;

use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostics;
use crate::docs::{self, DocLexicon};
use crate::error::Result;
use crate::model::{ApiEntries, ApiFile};

/// Parser implementation to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserKind {
    #[default]
    Linebased,
    Grammar,
}

impl ParserKind {
    pub fn name(&self) -> &'static str {
        match self {
            ParserKind::Linebased => "linebased",
            ParserKind::Grammar => "grammar",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "linebased" => Some(ParserKind::Linebased),
            "grammar" => Some(ParserKind::Grammar),
            _ => None,
        }
    }

    fn parser(&self) -> Box<dyn HeaderParser> {
        match self {
            ParserKind::Linebased => Box::new(linebased::LinebasedParser),
            ParserKind::Grammar => Box::new(grammar::GrammarParser),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Record begin/decl/end lines on entries and the file doc/entries spans.
    pub track_lines: bool,
    /// Replace raw doc text by parsed doc blocks.
    pub parse_docs: bool,
    pub lexicon: DocLexicon,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            track_lines: false,
            parse_docs: false,
            lexicon: DocLexicon::default(),
        }
    }
}

impl ParseOptions {
    pub fn tracking_lines() -> Self {
        Self {
            track_lines: true,
            ..Self::default()
        }
    }
}

/// Common interface of the parser strategies.
pub trait HeaderParser {
    /// Extract raw entries (docs unparsed, line spans per `options.track_lines`).
    fn parse(&self, name: &str, source: &str, options: &ParseOptions, diagnostics: &Diagnostics) -> Result<ApiFile>;
}

/// Parse one header with the selected strategy, then its docs when requested.
pub fn parse_header(
    name: &str,
    source: &str,
    kind: ParserKind,
    options: &ParseOptions,
    diagnostics: &Diagnostics,
) -> Result<ApiFile> {
    tracing::debug!(file = name, parser = kind.name(), "parsing header");
    let mut file = kind.parser().parse(name, source, options, diagnostics)?;
    if !options.track_lines {
        clear_lines(&mut file);
    }
    if options.parse_docs {
        docs::parse_file_docs(&mut file, &options.lexicon, diagnostics)?;
    }
    tracing::debug!(file = name, entries = file.entries.len(), "parsed header");
    Ok(file)
}

fn clear_lines(file: &mut ApiFile) {
    file.doc_begin = None;
    file.doc_end = None;
    file.entries_begin = None;
    file.entries_end = None;
    clear_entry_lines(&mut file.entries);
}

fn clear_entry_lines(entries: &mut ApiEntries) {
    for entry in entries.values_mut() {
        let mut variant = Some(entry);
        while let Some(current) = variant {
            current.begin = None;
            current.decl = None;
            current.end = None;
            if let Some(children) = current.entries_mut() {
                clear_entry_lines(children);
            }
            variant = current.overload.as_deref_mut();
        }
    }
}
