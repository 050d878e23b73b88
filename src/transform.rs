//! Transform engine
//!
//!     Maps a source API (the C headers as parsed) onto a target API (the wrapper headers). The
//!     mapping is data: a [TransformSpec] names the target files, where each one is sourced
//!     from, and per-entry adjustments on top of the default mappings:
//!
//!         function                      → function delegating to the C function
//!         def                           → def expanding to the C macro
//!         alias, struct, union,
//!         callback, forward             → `using Name = SDL_Name;`
//!         enum                          → alias plus one constexpr var per enumerator
//!
//!     Functions whose first parameter points to a wrapped handle type become members of the
//!     wrapper struct. Every produced entry records the C name it came from, which the generator
//!     uses as the delegation target.
//!
//!     After mapping, struct-level and chain-level hints are pushed down onto members and
//!     overloads (see [hints::combine_hints]).

pub mod engine;
pub mod hints;
pub mod spec;

pub use self::engine::strip_prefix;
pub use self::hints::combine_hints;
pub use self::spec::{EntryRule, FileTransform, TargetKind, TransformSpec, Wrapper};

use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::model::Api;

use self::engine::FileTransformer;

/// Transform `source` into the target API described by `spec`.
///
/// With no files listed, every source file is mapped under its own name with the default
/// mappings.
pub fn transform_api(source: &Api, spec: &TransformSpec, diagnostics: &Diagnostics) -> Result<Api> {
    let mut target = Api::new();
    if spec.files.is_empty() {
        let defaults = FileTransform::default();
        for (name, file) in &source.files {
            tracing::debug!(file = %name, "transforming with default mappings");
            let mapped = FileTransformer::new(name, &defaults, &spec.prefixes, diagnostics).run(Some(file))?;
            target.insert(hints::combine_file_hints(&mapped));
        }
        return Ok(target);
    }

    for (name, rules) in &spec.files {
        let source_name = rules.source.as_deref().unwrap_or(name);
        let file = source.files.get(source_name);
        if file.is_none() {
            diagnostics.warn(format!("{name}: source file `{source_name}` not found"))?;
        }
        tracing::debug!(file = %name, source = %source_name, "transforming");
        let mapped = FileTransformer::new(name, rules, &spec.prefixes, diagnostics).run(file)?;
        target.insert(hints::combine_file_hints(&mapped));
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ApiEntry, ApiFile, Parameter};
    use serde_json::json;

    fn source_api() -> Api {
        let mut file = ApiFile::new("SDL_video.h");
        file.doc = Some("# CategoryVideo".into());
        for entry in [
            ApiEntry::new("SDL_Window", crate::model::EntryKind::Forward { ty: None }),
            ApiEntry::function("SDL_DestroyWindow", "void", vec![Parameter::new("window", "SDL_Window *")]),
        ] {
            file.entries.insert(entry.name.clone(), entry);
        }
        let mut api = Api::new();
        api.insert(file);
        api
    }

    #[test]
    fn test_default_files_keep_source_names() {
        let target = transform_api(&source_api(), &TransformSpec::default(), &Diagnostics::silent()).unwrap();
        let file = &target.files["SDL_video.h"];
        assert_eq!(file.entries.keys().collect::<Vec<_>>(), vec!["Window", "DestroyWindow"]);
    }

    #[test]
    fn test_wrapper_hints_reach_members() {
        let spec: TransformSpec = serde_json::from_value(json!({
            "files": {
                "SDL3pp_video.h": {
                    "source": "SDL_video.h",
                    "localIncludes": ["SDL3pp_stdinc.h"],
                    "wrappers": {"SDL_Window": {"hints": {"mayFail": true}}}
                }
            }
        }))
        .unwrap();
        let target = transform_api(&source_api(), &spec, &Diagnostics::silent()).unwrap();
        let file = &target.files["SDL3pp_video.h"];
        assert_eq!(file.doc.as_ref().map(|doc| doc.text()), Some("# CategoryVideo".to_string()));
        assert_eq!(file.local_includes, vec!["SDL3pp_stdinc.h"]);
        let destroy = &file.entries["Window"].entries().unwrap()["Destroy"];
        assert_eq!(destroy.hints.may_fail, Some(crate::model::MayFail::Check(true)));
        assert_eq!(destroy.hints.self_expr.as_deref(), Some("get()"));
    }

    #[test]
    fn test_missing_source_file_warns() {
        let spec: TransformSpec = serde_json::from_value(json!({
            "files": {"out.h": {"source": "nowhere.h", "entries": [{"name": "X", "kind": "alias", "type": "int"}]}}
        }))
        .unwrap();
        let diagnostics = Diagnostics::silent();
        let target = transform_api(&source_api(), &spec, &diagnostics).unwrap();
        assert_eq!(diagnostics.warning_count(), 1);
        assert_eq!(target.files["out.h"].entries.keys().collect::<Vec<_>>(), vec!["X"]);
    }
}
