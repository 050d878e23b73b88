//! Header generator
//!
//!     Renders a target [ApiFile] back to header text. The output of a file is:
//!
//!         #ifndef NAME_H_                 include guard derived from the file name
//!         #include <system>               sorted, system before local
//!         #include "local"
//!         namespace SDL {
//!         /** file doc ... @{ */          the file is one doc group
//!         entries                         blank line separated, in model order
//!         /// @}
//!         } // namespace SDL
//!         #endif /* NAME_H_ */
//!
//!     Generation is a pure function of the model and the [GenerateConfig]: the same input
//!     renders byte-identical text. The updater uses the entry and file-doc renderers on their
//!     own to patch existing files.

pub mod body;
pub mod config;
pub mod docs;
pub mod writer;

pub use self::config::GenerateConfig;
pub use self::writer::{include_guard, HeaderWriter, Scope};

use crate::model::{ApiEntry, ApiFile, Doc};

/// The complete header text of `file`.
pub fn generate_file(file: &ApiFile, config: &GenerateConfig) -> String {
    tracing::debug!(file = %file.name, entries = file.entries.len(), "generating");
    let mut writer = HeaderWriter::new(config);
    writer.file(file);
    writer.finish()
}

/// One top-level entry with its overload chain.
pub fn generate_entry(entry: &ApiEntry, config: &GenerateConfig) -> String {
    let mut writer = HeaderWriter::new(config);
    writer.entry(entry, "", Scope::File);
    writer.finish()
}

/// The file doc block with its group opener; empty for a missing doc.
pub fn generate_file_doc(doc: Option<&Doc>, config: &GenerateConfig) -> String {
    match doc.map(Doc::text).filter(|text| !text.trim().is_empty()) {
        Some(text) => {
            let mut writer = HeaderWriter::new(config);
            writer.file_doc(&text);
            writer.finish()
        }
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntryKind, Parameter};

    fn init_file() -> ApiFile {
        let mut file = ApiFile::new("SDL3pp_init.h");
        file.doc = Some(Doc::Raw("# CategoryInit".to_string()));
        file.includes = vec!["SDL3/SDL_init.h".to_string()];
        file.local_includes = vec!["SDL3pp_stdinc.h".to_string(), "SDL3pp_error.h".to_string()];
        let mut init = ApiEntry::function("Init", "bool", vec![Parameter::new("flags", "InitFlags")]).with_doc("Init.");
        init.source_name = Some("SDL_Init".to_string());
        file.entries.insert(init.name.clone(), init);
        let mut flags = ApiEntry::alias("InitFlags", "SDL_InitFlags");
        flags.source_name = Some("SDL_InitFlags".to_string());
        file.entries.insert(flags.name.clone(), flags);
        file
    }

    #[test]
    fn test_file_layout() {
        let text = generate_file(&init_file(), &GenerateConfig::default());
        assert_eq!(
            text,
            "\
#ifndef SDL3PP_INIT_H_
#define SDL3PP_INIT_H_

#include <SDL3/SDL_init.h>
#include \"SDL3pp_error.h\"
#include \"SDL3pp_stdinc.h\"

namespace SDL {

/**
 * # CategoryInit
 *
 * @{
 */

/// Init.
inline bool Init(InitFlags flags)
{
  return SDL_Init(flags);
}

using InitFlags = SDL_InitFlags;

/// @}

} // namespace SDL

#endif /* SDL3PP_INIT_H_ */
"
        );
    }

    #[test]
    fn test_generation_is_deterministic() {
        let config = GenerateConfig::default();
        assert_eq!(generate_file(&init_file(), &config), generate_file(&init_file(), &config));
    }

    #[test]
    fn test_overloads_are_blank_line_separated() {
        let mut head = ApiEntry::new(
            "F",
            EntryKind::Function(crate::model::entry::Function {
                ty: Some("void".to_string()),
                proto: true,
                ..Default::default()
            }),
        );
        let mut second = head.clone();
        if let EntryKind::Function(function) = &mut second.kind {
            function.parameters.push(Parameter::new("x", "int"));
        }
        head.push_overload(second);
        assert_eq!(generate_entry(&head, &GenerateConfig::default()), "void F();\n\nvoid F(int x);\n");
    }

    #[test]
    fn test_missing_file_doc_renders_nothing() {
        assert_eq!(generate_file_doc(None, &GenerateConfig::default()), "");
    }
}
