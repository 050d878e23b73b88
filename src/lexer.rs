//! Header tokenizer
//!
//! This module turns header source into a flat list of [FileToken]s, each covering the lines of
//! one syntactic unit: a doc comment, a macro, a declaration, a block opener or closer.
//!
//! Statement Layering
//!
//! Tokenizing happens in two steps, similar to how indentation is handled as its own pass
//! before parsing in line-oriented formats:
//!
//! - The [scanner] isolates statement text with a brace-depth aware cursor. It knows about
//!   comments, literals, directives and scopes, but nothing about declarations.
//! - The [patterns] module classifies each statement (alias, callback, function, var, ...),
//!   using the declaration analysis in [crate::parser::decl].
//!
//! The tokenizer is lossy on purpose: statements it cannot classify produce a warning on the
//! [Diagnostics] channel and are skipped.

pub mod patterns;
pub mod scanner;
pub mod tokens;

pub use scanner::{Scanner, MAX_TOKEN_LINES};
pub use tokens::{BlockKeyword, FileToken, TokenKind};

use crate::diagnostics::Diagnostics;
use crate::error::Result;

/// Tokenize header `source`. `file` is only used in messages.
pub fn tokenize(file: &str, source: &str, diagnostics: &Diagnostics) -> Result<Vec<FileToken>> {
    Scanner::new(file, source, diagnostics).run()
}
