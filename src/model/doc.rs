//! Documentation attached to files and entries
//!
//! Documentation exists in two representations. Right after header parsing it is the raw
//! comment body ([Doc::Raw]); once the doc-comment parser ran it is a list of blocks
//! ([Doc::Parsed]). Consumers match on the variant instead of guessing the field type.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Doc {
    Raw(String),
    Parsed(Vec<DocBlock>),
}

/// One block of a parsed doc comment.
///
/// The JSON shapes are: `null` for an empty line, a bare string for a paragraph, a
/// `{tag, content}` object for titles, list items and tagged blocks, an array of those when a
/// block produced more than one item, and a tagless `{content}` object for verbatim blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocBlock {
    Empty,
    Paragraph(String),
    Tagged(TaggedBlock),
    Group(Vec<TaggedBlock>),
    Verbatim { content: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedBlock {
    pub tag: String,
    pub content: String,
}

impl TaggedBlock {
    pub fn new(tag: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            content: content.into(),
        }
    }

    fn render(&self) -> String {
        if self.content.is_empty() {
            self.tag.clone()
        } else {
            format!("{} {}", self.tag, self.content)
        }
    }
}

impl Doc {
    pub fn is_empty(&self) -> bool {
        match self {
            Doc::Raw(text) => text.trim().is_empty(),
            Doc::Parsed(blocks) => blocks.is_empty(),
        }
    }

    /// Comment body text, one source line per line.
    pub fn text(&self) -> String {
        match self {
            Doc::Raw(text) => text.clone(),
            Doc::Parsed(blocks) => blocks
                .iter()
                .map(DocBlock::render)
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl From<&str> for Doc {
    fn from(text: &str) -> Self {
        Doc::Raw(text.to_string())
    }
}

impl DocBlock {
    fn render(&self) -> String {
        match self {
            DocBlock::Empty => String::new(),
            DocBlock::Paragraph(text) => text.clone(),
            DocBlock::Tagged(tagged) => tagged.render(),
            DocBlock::Group(items) => items
                .iter()
                .map(TaggedBlock::render)
                .collect::<Vec<_>>()
                .join("\n"),
            DocBlock::Verbatim { content } => content.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_json_shapes() {
        let blocks = vec![
            DocBlock::Tagged(TaggedBlock::new("#", "Title")),
            DocBlock::Paragraph("Text line.".to_string()),
            DocBlock::Empty,
            DocBlock::Group(vec![TaggedBlock::new("-", "one"), TaggedBlock::new("-", "two")]),
            DocBlock::Verbatim {
                content: "| a | b |".to_string(),
            },
        ];
        let json = serde_json::to_value(&blocks).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"tag": "#", "content": "Title"},
                "Text line.",
                null,
                [{"tag": "-", "content": "one"}, {"tag": "-", "content": "two"}],
                {"content": "| a | b |"}
            ])
        );
        let back: Vec<DocBlock> = serde_json::from_value(json).unwrap();
        assert_eq!(back, blocks);
    }

    #[test]
    fn test_parsed_doc_text() {
        let doc = Doc::Parsed(vec![
            DocBlock::Tagged(TaggedBlock::new("#", "Title")),
            DocBlock::Empty,
            DocBlock::Tagged(TaggedBlock::new("@param", "x the value")),
        ]);
        assert_eq!(doc.text(), "# Title\n\n@param x the value");
    }

    #[test]
    fn test_raw_doc_is_string() {
        let doc: Doc = serde_json::from_str("\"hello\"").unwrap();
        assert_eq!(doc, Doc::Raw("hello".to_string()));
        assert!(Doc::Raw("  \n".to_string()).is_empty());
    }
}
