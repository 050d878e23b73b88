//! Line classification for doc comment bodies
//!
//! Each physical line is classified by its first significant token. The grammar then only has
//! to decide how consecutive lines group into blocks.

use std::ops::Range;

use super::lexicon::DocLexicon;
use super::tokens::{tokenize_with_spans, DocToken};
use crate::diagnostics::Diagnostics;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    Blank,
    Fence,
    Title,
    Row,
    Item,
    Tag,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocLine {
    pub kind: LineKind,
    /// Title delimiter, indented list delimiter or normalized tag. Empty for other kinds.
    pub marker: String,
    /// Content after the marker, trimmed.
    pub text: String,
    /// The line as written, without trailing whitespace.
    pub raw: String,
}

/// A classified line with its line index range.
pub type LineSpan = (DocLine, Range<usize>);

impl DocLine {
    fn new(kind: LineKind, marker: impl Into<String>, text: &str, raw: &str) -> Self {
        Self {
            kind,
            marker: marker.into(),
            text: text.trim().to_string(),
            raw: raw.trim_end().to_string(),
        }
    }

    /// Classify one line from its tokens. Token spans are relative to the line.
    fn classify(raw: &str, tokens: &[(DocToken, Range<usize>)], lexicon: &DocLexicon) -> Self {
        let mut significant = tokens
            .iter()
            .skip_while(|(token, _)| *token == DocToken::Whitespace)
            .peekable();
        let Some((first, span)) = significant.next() else {
            return DocLine::new(LineKind::Blank, "", "", raw);
        };
        let followed_by_space = significant
            .peek()
            .map_or(true, |(token, _)| *token == DocToken::Whitespace);
        let rest = &raw[span.end..];
        let word = &raw[span.clone()];

        match first {
            DocToken::Fence => DocLine::new(LineKind::Fence, word, rest, raw),
            DocToken::Pipe => DocLine::new(LineKind::Row, "", raw, raw),
            DocToken::Hash if followed_by_space => DocLine::new(LineKind::Title, word, rest, raw),
            DocToken::Dash if followed_by_space => {
                let marker = format!("{}-", " ".repeat(span.start));
                DocLine::new(LineKind::Item, marker, rest, raw)
            }
            DocToken::Tag if lexicon.is_block_tag(&word[1..]) => {
                DocLine::new(LineKind::Tag, lexicon.normalize(word), rest, raw)
            }
            _ => DocLine::new(LineKind::Text, "", raw, raw),
        }
    }
}

/// Split a comment body into classified lines.
pub fn classify_lines(text: &str, lexicon: &DocLexicon, diagnostics: &Diagnostics) -> Result<Vec<LineSpan>> {
    let mut lines = Vec::new();
    let mut current: Vec<(DocToken, Range<usize>)> = Vec::new();
    let mut line_start = 0;

    let mut flush = |start: usize, end: usize, current: &mut Vec<(DocToken, Range<usize>)>| {
        let raw = &text[start..end];
        let relative: Vec<(DocToken, Range<usize>)> = current
            .drain(..)
            .map(|(token, span)| (token, span.start - start..span.end - start))
            .collect();
        let index = lines.len();
        lines.push((DocLine::classify(raw, &relative, lexicon), index..index + 1));
    };

    for (token, span) in tokenize_with_spans(text) {
        match token {
            Ok(DocToken::Newline) => {
                flush(line_start, span.start, &mut current);
                line_start = span.end;
            }
            Ok(token) => current.push((token, span)),
            Err(()) => diagnostics.warn(format!("doc comment: unexpected input `{}`", &text[span]))?,
        }
    }
    if line_start < text.len() || !current.is_empty() {
        flush(line_start, text.len(), &mut current);
    }
    Ok(lines)
}
