//! Entry construction shared by both parser strategies
//!
//! Both strategies end up with classified declarations ([TokenKind]); turning those into
//! [ApiEntry] values, chaining overloads and attaching trailing docs happens here so that the
//! strategies cannot drift apart.

use crate::lexer::{BlockKeyword, TokenKind};
use crate::model::entry::{Aggregate, Function, Var};
use crate::model::{ApiEntries, ApiEntry, Doc, EntryKind};

/// Build the entry of a simple (non-block) declaration.
pub fn entry_from_token(kind: &TokenKind) -> Option<ApiEntry> {
    let entry = match kind {
        TokenKind::Def(def) => ApiEntry::new(
            &def.name,
            EntryKind::Def {
                parameters: def.parameters.clone(),
                value: def.value.clone(),
            },
        ),
        TokenKind::Alias { name, ty } => ApiEntry::alias(name, ty),
        TokenKind::Callback(callback) => ApiEntry::new(
            &callback.name,
            EntryKind::Callback {
                ty: callback.ty.clone(),
                parameters: callback.parameters.clone(),
            },
        ),
        TokenKind::Forward { name, ty } => ApiEntry::new(name, EntryKind::Forward { ty: ty.clone() }),
        TokenKind::Function { header, proto } => ApiEntry::new(
            &header.name,
            EntryKind::Function(Function {
                ty: Some(header.ty.clone()),
                parameters: header.parameters.clone(),
                constexpr: header.constexpr,
                immutable: header.immutable,
                is_static: header.is_static,
                explicit: header.explicit,
                reference: header.reference,
                template: None,
                proto: *proto,
            }),
        ),
        TokenKind::Var(var) => ApiEntry::new(
            &var.name,
            EntryKind::Var(Var {
                ty: var.ty.clone(),
                value: var.value.clone(),
                constexpr: var.constexpr,
                is_static: var.is_static,
            }),
        ),
        _ => return None,
    };
    Some(entry)
}

/// Enumerators are typed by their enclosing enum.
pub fn enumerator_entry(name: &str, value: Option<&String>, enum_name: &str) -> ApiEntry {
    ApiEntry::new(
        name,
        EntryKind::Var(Var {
            ty: enum_name.to_string(),
            value: value.cloned(),
            ..Var::default()
        }),
    )
}

pub fn block_entry(keyword: BlockKeyword, name: &str, base: Option<String>, entries: ApiEntries) -> ApiEntry {
    let kind = match keyword {
        BlockKeyword::Enum => EntryKind::Enum { entries },
        BlockKeyword::Union => EntryKind::Union(Aggregate {
            ty: base,
            entries,
            template: None,
        }),
        BlockKeyword::Struct | BlockKeyword::Class => EntryKind::Struct(Aggregate {
            ty: base,
            entries,
            template: None,
        }),
    };
    ApiEntry::new(name, kind)
}

pub fn set_template(entry: &mut ApiEntry, parameters: String) {
    match &mut entry.kind {
        EntryKind::Function(function) => function.template = Some(parameters),
        EntryKind::Struct(aggregate) | EntryKind::Union(aggregate) => aggregate.template = Some(parameters),
        EntryKind::Alias { template, .. } => *template = Some(parameters),
        _ => {}
    }
}

/// Insert keeping declaration order. A second declaration with the same name joins the
/// overload chain; documentation sticks to the chain head.
pub fn insert_entry(entries: &mut ApiEntries, mut entry: ApiEntry) {
    match entries.get_mut(&entry.name) {
        Some(head) => {
            if !head.has_doc() && entry.has_doc() {
                head.doc = entry.doc.take();
            }
            head.push_overload(entry);
        }
        None => {
            entries.insert(entry.name.clone(), entry);
        }
    }
}

/// The most recent declaration of `name`: the tail of its overload chain.
pub fn last_variant_mut<'a>(entries: &'a mut ApiEntries, name: &str) -> Option<&'a mut ApiEntry> {
    let mut last = entries.get_mut(name)?;
    while last.overload.is_some() {
        last = last.overload.as_deref_mut()?;
    }
    Some(last)
}

/// Attach a same-line trailing doc to the most recent declaration of `name`.
pub fn attach_trailing_doc(entries: &mut ApiEntries, name: &str, text: String, end: Option<usize>) {
    let Some(last) = last_variant_mut(entries, name) else {
        return;
    };
    if !last.has_doc() {
        last.doc = Some(Doc::Raw(text));
    }
    if let (Some(end), Some(current)) = (end, last.end) {
        last.end = Some(current.max(end));
    }
}

/// Drop the trailing `@{` group opener of a file doc.
pub fn strip_group_opener(text: &str) -> String {
    let mut lines: Vec<&str> = text.lines().collect();
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    if lines.last().is_some_and(|line| line.trim() == "@{") {
        lines.pop();
    }
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

pub fn is_group_closer(text: &str) -> bool {
    text.trim() == "@}"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Parameter;

    #[test]
    fn test_overloads_chain_in_order() {
        let mut entries = ApiEntries::new();
        insert_entry(&mut entries, ApiEntry::function("F", "void", vec![]));
        insert_entry(&mut entries, ApiEntry::function("F", "void", vec![Parameter::new("a", "int")]));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries["F"].variants().count(), 2);
    }

    #[test]
    fn test_doc_is_sticky_on_chain_head() {
        let mut entries = ApiEntries::new();
        insert_entry(&mut entries, ApiEntry::function("F", "void", vec![]));
        insert_entry(&mut entries, ApiEntry::function("F", "int", vec![]).with_doc("Documented."));
        assert_eq!(entries["F"].doc, Some(Doc::Raw("Documented.".to_string())));

        insert_entry(&mut entries, ApiEntry::function("G", "void", vec![]).with_doc("First."));
        insert_entry(&mut entries, ApiEntry::function("G", "void", vec![]).with_doc("Second."));
        assert_eq!(entries["G"].doc, Some(Doc::Raw("First.".to_string())));
    }

    #[test]
    fn test_trailing_doc_targets_last_overload() {
        let mut entries = ApiEntries::new();
        insert_entry(&mut entries, ApiEntry::var("x", "int"));
        attach_trailing_doc(&mut entries, "x", "the x".to_string(), None);
        assert_eq!(entries["x"].doc, Some(Doc::Raw("the x".to_string())));
    }

    #[test]
    fn test_strip_group_opener() {
        assert_eq!(strip_group_opener("# CategoryInit\n\nText.\n\n@{"), "# CategoryInit\n\nText.");
        assert_eq!(strip_group_opener("Plain."), "Plain.");
    }
}
