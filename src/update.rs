//! Incremental updater
//!
//!     Brings an existing header in line with a target [ApiFile] while leaving every line that
//!     does not need to change byte-for-byte untouched.
//!
//!     The header is re-parsed with line tracking. Target and existing entries are then walked
//!     together in order (a two-pointer merge, not a diff):
//!
//!         target entry not found ahead of the cursor  → insert before the cursor entry,
//!                                                        or append at the end of the entries
//!         target entry found ahead of the cursor      → delete the existing entries skipped
//!                                                        over, regenerate the entry if it
//!                                                        changed, move past it
//!
//!     Existing entries left after the last match are deleted. The file doc is always replaced.
//!     An entry moved earlier is deleted and re-inserted, never detected as a move.
//!
//!     All replacements are collected first and applied from the bottom of the file up.

pub mod changes;
pub mod replacements;

pub use self::changes::entry_changed;
pub use self::replacements::{apply_replacements, finish_text, Replacement};

use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::generate::{generate_entry, generate_file_doc, GenerateConfig};
use crate::model::{ApiEntry, ApiFile};
use crate::parser::{parse_header, ParseOptions, ParserKind};

/// Return `source` updated to declare `target`.
pub fn update_header(
    source: &str,
    target: &ApiFile,
    parser: ParserKind,
    config: &GenerateConfig,
    diagnostics: &Diagnostics,
) -> Result<String> {
    let existing = parse_header(&target.name, source, parser, &ParseOptions::tracking_lines(), diagnostics)?;
    let mut lines: Vec<String> = source.lines().map(str::to_string).collect();
    let replacements = plan(&existing, target, lines.len(), config, diagnostics)?;
    tracing::debug!(file = %target.name, replacements = replacements.len(), "updating");
    apply_replacements(&mut lines, &replacements)?;
    Ok(finish_text(&lines))
}

/// The replacements turning `existing` (parsed from a file of `line_count` lines) into
/// `target`.
pub fn plan(
    existing: &ApiFile,
    target: &ApiFile,
    line_count: usize,
    config: &GenerateConfig,
    diagnostics: &Diagnostics,
) -> Result<Vec<Replacement>> {
    let mut replacements = Vec::new();
    let entries_end = existing.entries_end.unwrap_or(line_count + 1);

    let doc = generate_file_doc(target.doc.as_ref(), config);
    match (existing.doc_begin, existing.doc_end) {
        (Some(begin), Some(end)) => replacements.push(Replacement::replace(begin, end, doc)),
        _ if !doc.is_empty() => {
            let at = existing.entries_begin.unwrap_or(entries_end);
            replacements.push(Replacement::insert(at, format!("{doc}\n")));
        }
        _ => {}
    }

    let mut current: Vec<&ApiEntry> = Vec::new();
    for entry in existing.entries.values() {
        match (entry.begin, entry.chain_end()) {
            (Some(_), Some(_)) => current.push(entry),
            _ => diagnostics.warn(format!(
                "{}: `{}` has no line span and is left alone",
                existing.name, entry.name
            ))?,
        }
    }
    let begin_of = |entry: &ApiEntry| entry.begin.unwrap_or(entries_end);
    let end_of = |entry: &ApiEntry| entry.chain_end().unwrap_or(entries_end);

    let mut cursor = 0;
    for wanted in target.entries.values() {
        let found = current[cursor..]
            .iter()
            .position(|entry| entry.name == wanted.name)
            .map(|offset| cursor + offset);
        let Some(index) = found else {
            let text = format!("{}\n", generate_entry(wanted, config));
            let at = current.get(cursor).map_or(entries_end, |entry| begin_of(entry));
            replacements.push(Replacement::insert(at, text));
            continue;
        };

        let matched = current[index];
        if index > cursor {
            replacements.push(Replacement::delete(begin_of(current[cursor]), begin_of(matched)));
        }
        if entry_changed(matched, wanted) {
            tracing::debug!(entry = %wanted.name, "regenerating changed entry");
            replacements.push(Replacement::replace(
                begin_of(matched),
                end_of(matched),
                generate_entry(wanted, config),
            ));
        }
        cursor = index + 1;
    }
    if let Some(stale) = current.get(cursor) {
        replacements.push(Replacement::delete(begin_of(stale), entries_end.max(begin_of(stale))));
    }
    Ok(replacements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Parameter;

    const HEADER: &str = "\
#ifndef OUT_H_
#define OUT_H_

namespace SDL {

/**
 * Old doc.
 *
 * @{
 */

/// A.
inline void A()
{
  SDL_A();
}

/// B.
inline void B()
{
  SDL_B();
}

/// @}

} // namespace SDL

#endif /* OUT_H_ */
";

    fn function(name: &str, params: Vec<Parameter>) -> ApiEntry {
        let mut entry = ApiEntry::function(name, "void", params).with_doc(format!("{name}."));
        entry.source_name = Some(format!("SDL_{name}"));
        entry
    }

    fn target(entries: Vec<ApiEntry>) -> ApiFile {
        let mut file = ApiFile::new("out.h");
        file.doc = Some("Old doc.".into());
        for entry in entries {
            file.entries.insert(entry.name.clone(), entry);
        }
        file
    }

    fn update(target: &ApiFile) -> String {
        update_header(
            HEADER,
            target,
            ParserKind::Linebased,
            &GenerateConfig::default(),
            &Diagnostics::silent(),
        )
        .unwrap()
    }

    #[test]
    fn test_unchanged_target_keeps_file() {
        let target = target(vec![function("A", vec![]), function("B", vec![])]);
        assert_eq!(update(&target), HEADER);
    }

    #[test]
    fn test_append_and_delete() {
        let target = target(vec![function("B", vec![]), function("C", vec![])]);
        let updated = update(&target);
        assert!(!updated.contains("SDL_A()"));
        let b = updated.find("inline void B()").unwrap();
        let c = updated.find("inline void C()").unwrap();
        let closer = updated.find("/// @}").unwrap();
        assert!(b < c && c < closer);
        assert!(updated.contains("  SDL_C();\n}\n\n/// @}"));
        assert!(!updated.contains("\n\n\n"));
    }

    #[test]
    fn test_changed_entry_is_regenerated() {
        let target = target(vec![function("A", vec![Parameter::new("x", "int")]), function("B", vec![])]);
        let updated = update(&target);
        assert!(updated.contains("inline void A(int x)\n{\n  SDL_A(x);\n}\n\n/// B."));
    }

    #[test]
    fn test_file_doc_is_replaced() {
        let mut target = target(vec![function("A", vec![]), function("B", vec![])]);
        target.doc = Some("New doc.".into());
        let updated = update(&target);
        assert!(updated.contains("/**\n * New doc.\n *\n * @{\n */\n\n/// A."));
        assert!(!updated.contains("Old doc."));
    }
}
