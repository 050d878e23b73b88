//! Recognized block tags
//!
//! Which `@word` keywords open a tagged block is data, not grammar: a transform project can
//! extend the list from its configuration (`docLexicon`).

use serde::{Deserialize, Serialize};

const DEFAULT_BLOCK_TAGS: &[&str] = &[
    "defgroup",
    "returns",
    "param",
    "threadsafety",
    "sa",
    "since",
    "post",
    "throws",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocLexicon {
    pub block_tags: Vec<String>,
}

impl Default for DocLexicon {
    fn default() -> Self {
        Self {
            block_tags: DEFAULT_BLOCK_TAGS.iter().map(|tag| tag.to_string()).collect(),
        }
    }
}

impl DocLexicon {
    /// Case-insensitive check of a keyword without its `@`/`\` prefix.
    pub fn is_block_tag(&self, keyword: &str) -> bool {
        self.block_tags.iter().any(|tag| tag.eq_ignore_ascii_case(keyword))
    }

    /// Canonical spelling of a tag: `\Returns` → `@returns`.
    pub fn normalize(&self, tag: &str) -> String {
        format!("@{}", tag.trim_start_matches(['@', '\\']).to_ascii_lowercase())
    }
}
