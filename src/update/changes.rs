//! Change detection between an existing entry and its target
//!
//! Only structure counts: kind, types, parameter lists, overload chains and member names.
//! Documentation and hints are not compared, so an entry whose declaration still matches is
//! left as written.

use crate::model::{ApiEntry, EntryKind, Parameter};
use crate::parser::decl::normalize_type;

/// Whether `existing` must be regenerated to match `target`.
pub fn entry_changed(existing: &ApiEntry, target: &ApiEntry) -> bool {
    let existing_variants: Vec<&ApiEntry> = existing.variants().collect();
    let target_variants: Vec<&ApiEntry> = target.variants().collect();
    existing_variants.len() != target_variants.len()
        || existing_variants
            .iter()
            .zip(&target_variants)
            .any(|(existing, target)| variant_changed(existing, target))
}

fn variant_changed(existing: &ApiEntry, target: &ApiEntry) -> bool {
    match (&existing.kind, &target.kind) {
        (EntryKind::Function(existing), EntryKind::Function(target)) => {
            let return_changed = match (&existing.ty, &target.ty) {
                (Some(existing), Some(target)) => !same_type(existing, target),
                (None, Some(_)) => true,
                (_, None) => false,
            };
            return_changed || !same_parameters(&existing.parameters, &target.parameters)
        }
        (EntryKind::Alias { ty: existing, .. }, EntryKind::Alias { ty: target, .. }) => {
            !same_type(existing.trim_start_matches("::"), target.trim_start_matches("::"))
        }
        (EntryKind::Var(existing), EntryKind::Var(target)) => !same_type(&existing.ty, &target.ty),
        (
            EntryKind::Def {
                parameters: existing, ..
            },
            EntryKind::Def { parameters: target, .. },
        ) => existing.as_ref().map(Vec::len) != target.as_ref().map(Vec::len),
        (
            EntryKind::Callback {
                ty: existing_ty,
                parameters: existing,
            },
            EntryKind::Callback {
                ty: target_ty,
                parameters: target,
            },
        ) => !same_type(existing_ty, target_ty) || !same_parameters(existing, target),
        (existing_kind, target_kind) if existing_kind.name() != target_kind.name() => true,
        _ => member_names(existing) != member_names(target),
    }
}

fn same_type(a: &str, b: &str) -> bool {
    normalize_type(a) == normalize_type(b)
}

fn same_parameters(existing: &[Parameter], target: &[Parameter]) -> bool {
    existing.len() == target.len()
        && existing
            .iter()
            .zip(target)
            .all(|(a, b)| a.name == b.name && same_type(&a.ty, &b.ty))
}

fn member_names(entry: &ApiEntry) -> Vec<&str> {
    entry
        .entries()
        .map(|entries| entries.keys().map(String::as_str).collect())
        .unwrap_or_default()
}
