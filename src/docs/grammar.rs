//! Doc comment grammar
//!
//! ```text
//! doc            = block* EOF
//! block          = codeblock | title | table | list | taggedSection | paragraph | empty
//! codeblock      = FENCE line* FENCE
//! list           = (ITEM TEXT*)+
//! taggedSection  = (TAG TEXT*)+
//! table          = ROW+
//! paragraph      = TEXT+
//! ```
//!
//! The parser is built with chumsky over classified lines. Lines left over when no block
//! matches (an unterminated code fence) are returned to the caller instead of failing.

use chumsky::prelude::*;

use super::lines::{DocLine, LineKind, LineSpan};
use crate::model::{DocBlock, TaggedBlock};
use crate::parser::decl::collapse_whitespace;

type ParserError = Simple<LineSpan>;

/// Match one line of the given kind.
fn line(kind: LineKind) -> impl Parser<LineSpan, DocLine, Error = ParserError> + Clone {
    filter(move |(line, _): &LineSpan| line.kind == kind).map(|(line, _)| line)
}

fn any_line_but(kind: LineKind) -> impl Parser<LineSpan, DocLine, Error = ParserError> + Clone {
    filter(move |(line, _): &LineSpan| line.kind != kind).map(|(line, _)| line)
}

fn join_text<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    collapse_whitespace(&parts.into_iter().collect::<Vec<_>>().join(" "))
}

fn verbatim(lines: &[DocLine]) -> DocBlock {
    let content = lines
        .iter()
        .map(|line| line.raw.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    DocBlock::Verbatim {
        content: content.trim_end().to_string(),
    }
}

/// Singletons unwrap to a bare tagged block, pluralities stay a group.
fn group(items: Vec<TaggedBlock>) -> DocBlock {
    match <[TaggedBlock; 1]>::try_from(items) {
        Ok([item]) => DocBlock::Tagged(item),
        Err(items) => DocBlock::Group(items),
    }
}

/// A marker line followed by its continuation text lines.
fn marked(kind: LineKind) -> impl Parser<LineSpan, TaggedBlock, Error = ParserError> + Clone {
    line(kind)
        .then(line(LineKind::Text).repeated())
        .map(|(head, rest)| {
            let content = join_text(std::iter::once(head.text.as_str()).chain(rest.iter().map(|l| l.text.as_str())));
            TaggedBlock::new(head.marker, content)
        })
}

fn code_block() -> impl Parser<LineSpan, DocBlock, Error = ParserError> + Clone {
    line(LineKind::Fence)
        .then(any_line_but(LineKind::Fence).repeated())
        .then(line(LineKind::Fence))
        .map(|((open, body), close)| {
            let mut lines = Vec::with_capacity(body.len() + 2);
            lines.push(open);
            lines.extend(body);
            lines.push(close);
            verbatim(&lines)
        })
}

fn title() -> impl Parser<LineSpan, DocBlock, Error = ParserError> + Clone {
    line(LineKind::Title).map(|line| DocBlock::Tagged(TaggedBlock::new(line.marker, line.text)))
}

fn table() -> impl Parser<LineSpan, DocBlock, Error = ParserError> + Clone {
    line(LineKind::Row).repeated().at_least(1).map(|rows| verbatim(&rows))
}

fn list() -> impl Parser<LineSpan, DocBlock, Error = ParserError> + Clone {
    marked(LineKind::Item).repeated().at_least(1).map(group)
}

fn tagged_section() -> impl Parser<LineSpan, DocBlock, Error = ParserError> + Clone {
    marked(LineKind::Tag).repeated().at_least(1).map(group)
}

fn paragraph() -> impl Parser<LineSpan, DocBlock, Error = ParserError> + Clone {
    line(LineKind::Text)
        .repeated()
        .at_least(1)
        .map(|lines| DocBlock::Paragraph(join_text(lines.iter().map(|l| l.text.as_str()))))
}

fn empty() -> impl Parser<LineSpan, DocBlock, Error = ParserError> + Clone {
    line(LineKind::Blank).to(DocBlock::Empty)
}

/// Blocks, followed by the lines no block could consume.
pub fn document() -> impl Parser<LineSpan, (Vec<DocBlock>, Vec<LineSpan>), Error = ParserError> {
    let block = choice((
        code_block(),
        title(),
        table(),
        list(),
        tagged_section(),
        paragraph(),
        empty(),
    ));
    block
        .repeated()
        .then(any().repeated())
        .then_ignore(end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostics;
    use crate::docs::lexicon::DocLexicon;
    use crate::docs::lines::classify_lines;

    fn parse(text: &str) -> (Vec<DocBlock>, Vec<LineSpan>) {
        let lines = classify_lines(text, &DocLexicon::default(), &Diagnostics::silent()).unwrap();
        document().parse(lines).unwrap()
    }

    #[test]
    fn test_paragraph_joins_lines() {
        let (blocks, rest) = parse("First   line\nsecond line.");
        assert!(rest.is_empty());
        assert_eq!(blocks, vec![DocBlock::Paragraph("First line second line.".to_string())]);
    }

    #[test]
    fn test_list_item_continuation() {
        let (blocks, _) = parse("- one\n  continued\n- two");
        assert_eq!(
            blocks,
            vec![DocBlock::Group(vec![
                TaggedBlock::new("-", "one continued"),
                TaggedBlock::new("-", "two")
            ])]
        );
    }

    #[test]
    fn test_single_tag_unwraps() {
        let (blocks, _) = parse("@returns true on success.");
        assert_eq!(blocks, vec![DocBlock::Tagged(TaggedBlock::new("@returns", "true on success."))]);
    }

    #[test]
    fn test_code_block_is_verbatim() {
        let (blocks, _) = parse("```c\nint  x;\n\n- not a list\n```");
        assert_eq!(
            blocks,
            vec![DocBlock::Verbatim {
                content: "```c\nint  x;\n\n- not a list\n```".to_string()
            }]
        );
    }

    #[test]
    fn test_table_rows() {
        let (blocks, _) = parse("| a | b |\n|---|---|\n| 1 | 2 |\ntext");
        assert_eq!(blocks.len(), 2);
        assert!(matches!(&blocks[0], DocBlock::Verbatim { content } if content.lines().count() == 3));
    }

    #[test]
    fn test_unterminated_fence_is_left_over() {
        let (blocks, rest) = parse("text\n```\ncode");
        assert_eq!(blocks, vec![DocBlock::Paragraph("text".to_string())]);
        assert_eq!(rest.len(), 2);
    }
}
