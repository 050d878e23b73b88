//! Hint propagation
//!
//! A hint bag set on a struct or on the head of an overload chain cascades to every member and
//! overload beneath it. Child keys win, parents only fill gaps, so propagating an already
//! propagated tree changes nothing.

use crate::model::{ApiEntries, ApiEntry, ApiFile, Hints};

/// Return `entries` with `parent` and each entry's own hints pushed down the tree.
pub fn combine_hints(entries: &ApiEntries, parent: &Hints) -> ApiEntries {
    entries
        .iter()
        .map(|(name, entry)| (name.clone(), combine_entry(entry, parent)))
        .collect()
}

fn combine_entry(entry: &ApiEntry, parent: &Hints) -> ApiEntry {
    let hints = entry.hints.over(parent);
    let mut combined = entry.clone();
    if let Some(children) = combined.entries_mut() {
        *children = combine_hints(children, &hints);
    }
    // Overloads inherit from the chain head.
    combined.overload = entry
        .overload
        .as_deref()
        .map(|overload| Box::new(combine_entry(overload, &hints)));
    combined.hints = hints;
    combined
}

pub fn combine_file_hints(file: &ApiFile) -> ApiFile {
    ApiFile {
        entries: combine_hints(&file.entries, &Hints::default()),
        ..file.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entry::Aggregate;
    use crate::model::EntryKind;
    use serde_json::json;

    fn hints(value: serde_json::Value) -> Hints {
        serde_json::from_value(value).unwrap()
    }

    fn tree() -> ApiEntries {
        let mut x = ApiEntry::var("x", "int");
        x.hints = hints(json!({"b": 3}));
        let mut members = ApiEntries::new();
        members.insert("x".to_string(), x);
        let mut s = ApiEntry::new(
            "S",
            EntryKind::Struct(Aggregate {
                entries: members,
                ..Aggregate::default()
            }),
        );
        s.hints = hints(json!({"a": 1, "b": 2}));
        let mut entries = ApiEntries::new();
        entries.insert("S".to_string(), s);
        entries
    }

    #[test]
    fn test_child_keys_win_parent_fills_gaps() {
        let combined = combine_hints(&tree(), &Hints::default());
        let x = &combined["S"].entries().unwrap()["x"];
        assert_eq!(serde_json::to_value(&x.hints).unwrap(), json!({"a": 1, "b": 3}));
    }

    #[test]
    fn test_combine_is_idempotent_and_pure() {
        let original = tree();
        let once = combine_hints(&original, &Hints::default());
        let twice = combine_hints(&once, &Hints::default());
        assert_eq!(once, twice);
        assert_eq!(original, tree());
    }

    #[test]
    fn test_overloads_inherit_chain_head_hints() {
        let mut head = ApiEntry::function("F", "void", vec![]);
        head.hints.self_expr = Some("get()".to_string());
        let mut overload = ApiEntry::function("F", "void", vec![]);
        overload.hints.may_fail = Some(crate::model::MayFail::Check(true));
        head.push_overload(overload);
        let mut entries = ApiEntries::new();
        entries.insert("F".to_string(), head);

        let combined = combine_hints(&entries, &Hints::default());
        let second = combined["F"].variants().nth(1).unwrap();
        assert_eq!(second.hints.self_expr.as_deref(), Some("get()"));
        assert!(second.hints.may_fail.is_some());
    }
}
