//! Run configuration
//!
//! A run is configured by one or more JSON files, deep-merged in order with [merge_json], and
//! then by command line flags. Every key is optional:
//!
//! ```json
//! {
//!   "parser": "linebased",
//!   "storeLineNumbers": false,
//!   "parseDocs": false,
//!   "silent": false,
//!   "stopOnWarn": false,
//!   "baseDir": "include/SDL3",
//!   "sources": ["SDL_init.h"],
//!   "outputFile": "source.json",
//!   "sourceApi": "source.json",
//!   "api": "target.json",
//!   "transform": "transform.json",
//!   "generate": { "namespace": "SDL", "width": 80 },
//!   "docLexicon": { "blockTags": ["param", "returns"] }
//! }
//! ```
//!
//! `transform` is either a path to a transform spec or the spec itself, inline.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::diagnostics::Diagnostics;
use crate::docs::DocLexicon;
use crate::error::{Error, Result};
use crate::generate::GenerateConfig;
use crate::parser::{ParseOptions, ParserKind};
use crate::transform::TransformSpec;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub parser: ParserKind,
    pub store_line_numbers: bool,
    pub parse_docs: bool,
    pub silent: bool,
    pub stop_on_warn: bool,
    /// Directory relative input and output files are resolved against.
    pub base_dir: Option<PathBuf>,
    pub sources: Vec<String>,
    /// `-` or missing means stdout.
    pub output_file: Option<String>,
    /// The parsed C API read by `transform`.
    pub source_api: Option<PathBuf>,
    /// The target API read by `generate` and `update`.
    pub api: Option<PathBuf>,
    pub transform: Option<TransformSource>,
    pub generate: GenerateConfig,
    pub doc_lexicon: DocLexicon,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransformSource {
    Path(PathBuf),
    Inline(TransformSpec),
}

impl Config {
    /// Merge the JSON files at `paths`, in order, into one configuration.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut merged = Value::Object(Default::default());
        for path in paths {
            let path = path.as_ref();
            tracing::debug!(path = %path.display(), "loading config");
            merge_json(&mut merged, read_json(path)?);
        }
        Self::from_value(merged)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|err| Error::Config(err.to_string()))
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics::new(self.silent, self.stop_on_warn)
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            track_lines: self.store_line_numbers,
            parse_docs: self.parse_docs,
            lexicon: self.doc_lexicon.clone(),
        }
    }

    /// `path` under the base directory, unless it is absolute.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// The transform spec, read from disk when configured as a path. Defaults when absent.
    pub fn transform_spec(&self) -> Result<TransformSpec> {
        match &self.transform {
            None => Ok(TransformSpec::default()),
            Some(TransformSource::Inline(spec)) => Ok(spec.clone()),
            Some(TransformSource::Path(path)) => {
                serde_json::from_value(read_json(path)?).map_err(|err| Error::Config(format!("{}: {err}", path.display())))
            }
        }
    }
}

/// Deep-merge `overlay` into `base`: objects merge key by key, arrays concatenate, anything
/// else is replaced.
pub fn merge_json(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(base), Value::Array(overlay)) => base.extend(overlay),
        (base, overlay) => *base = overlay,
    }
}

pub fn read_json(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
    serde_json::from_str(&text).map_err(|err| Error::Config(format!("{}: {err}", path.display())))
}
