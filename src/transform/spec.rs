//! Transform specification
//!
//! The mapping from the C API onto the wrapper API is data, deserialized from JSON:
//!
//! ```json
//! {
//!   "prefixes": ["SDL_"],
//!   "files": {
//!     "SDL3pp_video.h": {
//!       "source": "SDL_video.h",
//!       "localIncludes": ["SDL3pp_stdinc.h"],
//!       "ignore": ["SDL_WindowID"],
//!       "detectFailure": true,
//!       "wrappers": {
//!         "SDL_Window": { "name": "Window", "self": "get()" }
//!       },
//!       "transform": {
//!         "SDL_GetWindowTitle": { "type": "std::string" }
//!       }
//!     }
//!   }
//! }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::{ApiEntry, Doc, Hints, Parameter};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransformSpec {
    /// Name prefixes stripped when deriving target names. The first match is stripped.
    pub prefixes: Vec<String>,
    /// Target file name → how to build it.
    pub files: IndexMap<String, FileTransform>,
}

impl Default for TransformSpec {
    fn default() -> Self {
        Self {
            prefixes: vec!["SDL_".to_string()],
            files: IndexMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileTransform {
    /// Source file name; defaults to the target file name.
    pub source: Option<String>,
    pub includes: Vec<String>,
    pub local_includes: Vec<String>,
    /// Replaces the source file doc.
    pub doc: Option<Doc>,
    /// Source entries that produce nothing.
    pub ignore: Vec<String>,
    /// Per source entry adjustments, keyed by source name.
    pub transform: IndexMap<String, EntryRule>,
    /// Handle types whose functions become members, keyed by source type name.
    pub wrappers: IndexMap<String, Wrapper>,
    /// Entries appended to the file as written.
    pub entries: Vec<ApiEntry>,
    /// Infer `mayFail` from the documented failure sentinel.
    pub detect_failure: bool,
}

/// Adjustments applied to the default mapping of one source entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntryRule {
    pub name: Option<String>,
    pub kind: Option<TargetKind>,
    #[serde(rename = "type")]
    pub ty: Option<String>,
    pub parameters: Option<Vec<Parameter>>,
    pub hints: Hints,
    #[serde(rename = "static")]
    pub is_static: Option<bool>,
    pub immutable: Option<bool>,
    pub constexpr: Option<bool>,
    /// Target struct receiving the entry as a member.
    pub member_of: Option<String>,
}

/// Shapes a source entry can be mapped to instead of its default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Alias,
    Struct,
    Var,
    Def,
    Function,
}

/// Wrapper struct for an opaque handle type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Wrapper {
    pub name: Option<String>,
    /// Expression producing the handle inside members; `get()` when absent.
    #[serde(rename = "self")]
    pub self_expr: Option<String>,
    /// Cascaded onto every member.
    pub hints: Hints,
    /// Members placed before the converted functions, such as constructors.
    pub entries: Vec<ApiEntry>,
}

pub const DEFAULT_SELF: &str = "get()";
