//! Abstract API Model
//!
//!     The model is the interchange format between every stage of the pipeline. The parser
//!     produces it from header text, the transform engine maps one model onto another, and the
//!     generator and updater render it back to header text. It is serialized as JSON and that
//!     JSON round-trips losslessly, including overload chains and hints.
//!
//! Layout
//!
//!     [Api] holds one [ApiFile] per header. A file holds an ordered [ApiEntries] map, where the
//!     insertion order is the declaration order. Aggregates (struct, union, enum, ns) nest their
//!     own [ApiEntries], to any depth.
//!
//!     Declarations sharing a name are chained through [ApiEntry::overload] instead of being
//!     stored under duplicate keys.

pub mod doc;
pub mod entry;
pub mod hints;

pub use doc::{Doc, DocBlock, TaggedBlock};
pub use entry::{ApiEntries, ApiEntry, EntryKind, Parameter, Since, Variants};
pub use hints::{Hints, MayFail};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Top-level container, keyed by file name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Api {
    #[serde(default)]
    pub files: IndexMap<String, ApiFile>,
}

impl Api {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a file keyed by its own name, replacing any previous file with that name.
    pub fn insert(&mut self, file: ApiFile) {
        self.files.insert(file.name.clone(), file);
    }
}

/// The extracted content of one header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiFile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<Doc>,
    #[serde(default)]
    pub entries: ApiEntries,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub includes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub local_includes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_begin: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_end: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entries_begin: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entries_end: Option<usize>,
}

impl ApiFile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_json_round_trip() {
        let mut file = ApiFile::new("SDL_init.h");
        file.doc = Some(Doc::Raw("# CategoryInit".to_string()));
        let mut init = ApiEntry::function("SDL_Init", "bool", vec![Parameter::new("flags", "SDL_InitFlags")]);
        init.hints.may_fail = Some(MayFail::Check(true));
        init.push_overload(ApiEntry::function("SDL_Init", "bool", vec![]));
        file.entries.insert(init.name.clone(), init);
        file.entries.insert(
            "SDL_INIT_AUDIO".to_string(),
            ApiEntry::new("SDL_INIT_AUDIO", EntryKind::Def { parameters: None, value: "0x10u".to_string() }),
        );
        let mut api = Api::new();
        api.insert(file);

        let json = serde_json::to_string_pretty(&api).unwrap();
        let back: Api = serde_json::from_str(&json).unwrap();
        assert_eq!(back, api);
    }

    #[test]
    fn test_file_line_spans_are_optional() {
        let json = r#"{"name": "a.h", "entries": {}}"#;
        let file: ApiFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.doc_begin, None);
        assert_eq!(file.entries_end, None);
        assert!(!serde_json::to_string(&file).unwrap().contains("docBegin"));
    }
}
