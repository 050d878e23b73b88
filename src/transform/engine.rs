//! Mapping of one source file onto one target file

use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::model::entry::{Aggregate, Function, Var};
use crate::model::{ApiEntries, ApiEntry, ApiFile, EntryKind, Hints, MayFail, Parameter};
use crate::parser::builder::insert_entry;
use crate::parser::decl::normalize_type;

use super::spec::{EntryRule, FileTransform, TargetKind, Wrapper, DEFAULT_SELF};

pub struct FileTransformer<'a> {
    name: &'a str,
    rules: &'a FileTransform,
    prefixes: &'a [String],
    diagnostics: &'a Diagnostics,
    entries: ApiEntries,
}

impl<'a> FileTransformer<'a> {
    pub fn new(name: &'a str, rules: &'a FileTransform, prefixes: &'a [String], diagnostics: &'a Diagnostics) -> Self {
        Self {
            name,
            rules,
            prefixes,
            diagnostics,
            entries: ApiEntries::new(),
        }
    }

    /// Build the target file. A missing source file leaves only the explicit entries.
    pub fn run(mut self, source: Option<&ApiFile>) -> Result<ApiFile> {
        let mut file = ApiFile::new(self.name);
        file.includes = self.rules.includes.clone();
        file.local_includes = self.rules.local_includes.clone();
        file.doc = self.rules.doc.clone();

        if let Some(source) = source {
            if file.doc.is_none() {
                file.doc = source.doc.clone();
            }
            for name in self.rules.transform.keys() {
                if !source.entries.contains_key(name) {
                    self.diagnostics
                        .warn(format!("{}: transform rule for unknown entity `{name}`", self.name))?;
                }
            }
            for entry in source.entries.values() {
                if self.rules.ignore.contains(&entry.name) {
                    continue;
                }
                self.map_entry(entry)?;
            }
        }
        for entry in &self.rules.entries {
            insert_entry(&mut self.entries, entry.clone());
        }
        file.entries = self.entries;
        Ok(file)
    }

    fn map_entry(&mut self, entry: &ApiEntry) -> Result<()> {
        let rules = self.rules;
        let rule = rules.transform.get(&entry.name);
        if let Some(wrapper) = rules.wrappers.get(&entry.name) {
            let doc = entry.doc.clone();
            let since = entry.since.clone();
            let target = self.wrapper_struct(&entry.name, wrapper);
            if !target.has_doc() {
                target.doc = doc;
            }
            target.since = target.since.take().or(since);
            return Ok(());
        }

        match &entry.kind {
            EntryKind::Function(_) => {
                for variant in entry.variants() {
                    self.function(variant, rule)?;
                }
                Ok(())
            }
            EntryKind::Enum { entries } => {
                let alias_name = self.target_name(entry, rule);
                let alias = self.alias(entry, &alias_name, rule);
                self.finish(alias, rule)?;
                if rule.and_then(|rule| rule.kind) == Some(TargetKind::Alias) {
                    return Ok(());
                }
                for enumerator in entries.values() {
                    let mut var = derived(
                        self.strip_prefix(&enumerator.name),
                        enumerator,
                        EntryKind::Var(Var {
                            ty: alias_name.clone(),
                            constexpr: true,
                            ..Var::default()
                        }),
                    );
                    var.since = var.since.take().or_else(|| entry.since.clone());
                    self.place(var, rule)?;
                }
                Ok(())
            }
            EntryKind::Def { parameters, .. } => {
                let name = self.target_name(entry, rule);
                let target = match rule.and_then(|rule| rule.kind) {
                    Some(TargetKind::Var) => derived(
                        name,
                        entry,
                        EntryKind::Var(Var {
                            ty: "auto".to_string(),
                            constexpr: true,
                            ..Var::default()
                        }),
                    ),
                    other => {
                        self.unsupported(entry, other, TargetKind::Def)?;
                        derived(
                            name,
                            entry,
                            EntryKind::Def {
                                parameters: parameters.clone(),
                                value: delegating_value(&entry.name, parameters.as_deref()),
                            },
                        )
                    }
                };
                self.finish(target, rule)
            }
            EntryKind::Alias { .. }
            | EntryKind::Struct(_)
            | EntryKind::Union(_)
            | EntryKind::Callback { .. }
            | EntryKind::Forward { .. } => {
                let name = self.target_name(entry, rule);
                let target = match rule.and_then(|rule| rule.kind) {
                    Some(TargetKind::Struct) => derived(
                        name,
                        entry,
                        EntryKind::Struct(Aggregate {
                            ty: Some(entry.name.clone()),
                            ..Aggregate::default()
                        }),
                    ),
                    other => {
                        self.unsupported(entry, other, TargetKind::Alias)?;
                        self.alias(entry, &name, rule)
                    }
                };
                self.finish(target, rule)
            }
            EntryKind::Var(var) => {
                let name = self.target_name(entry, rule);
                let target = derived(name, entry, EntryKind::Var(var.clone()));
                self.finish(target, rule)
            }
            EntryKind::Ns { .. } => {
                insert_entry(&mut self.entries, entry.clone());
                Ok(())
            }
        }
    }

    fn function(&mut self, variant: &ApiEntry, rule: Option<&EntryRule>) -> Result<()> {
        let Some(source) = variant.as_function() else {
            return Ok(());
        };
        if let Some(other) = rule.and_then(|rule| rule.kind) {
            self.unsupported(variant, Some(other), TargetKind::Function)?;
        }
        let mut function = Function {
            ty: source.ty.clone(),
            parameters: source.parameters.clone(),
            ..Function::default()
        };
        let mut name = self.strip_prefix(&variant.name);
        let mut hints = variant.hints.clone();

        if self.rules.detect_failure {
            if let Some(doc) = &variant.doc {
                detect_failure(&doc.text(), &mut function, &mut hints);
            }
        }

        let mut member_of = rule.and_then(|rule| rule.member_of.clone());
        if member_of.is_none() {
            if let Some((handle, wrapper)) = self.handle_parameter(&function) {
                let fragment = self.strip_prefix(handle);
                let shortened = name.replacen(&fragment, "", 1);
                if !shortened.is_empty() {
                    name = shortened;
                }
                function.immutable = function.parameters[0].ty.starts_with("const ");
                function.parameters.remove(0);
                hints.self_expr = Some(wrapper.self_expr.clone().unwrap_or_else(|| DEFAULT_SELF.to_string()));
                member_of = Some(self.wrapper_struct(handle, wrapper).name.clone());
            }
        }

        let mut target = derived(name, variant, EntryKind::Function(function));
        target.hints = hints;
        if let Some(rule) = rule {
            apply_rule(&mut target, rule);
        }
        self.insert(target, member_of.as_deref())
    }

    /// The wrapper whose handle is the first parameter, passed by pointer.
    fn handle_parameter(&self, function: &Function) -> Option<(&'a str, &'a Wrapper)> {
        let rules: &'a FileTransform = self.rules;
        let first = function.parameters.first()?;
        let ty = normalize_type(&first.ty);
        let base = ty.strip_prefix("const ").unwrap_or(&ty).strip_suffix(" *")?;
        rules
            .wrappers
            .get_key_value(base)
            .map(|(handle, wrapper)| (handle.as_str(), wrapper))
    }

    /// The wrapper struct for `handle`, created on first use.
    fn wrapper_struct(&mut self, handle: &str, wrapper: &Wrapper) -> &mut ApiEntry {
        let name = wrapper.name.clone().unwrap_or_else(|| self.strip_prefix(handle));
        self.entries.entry(name.clone()).or_insert_with(|| {
            let mut members = ApiEntries::new();
            for member in &wrapper.entries {
                insert_entry(&mut members, member.clone());
            }
            let mut entry = ApiEntry::new(
                name,
                EntryKind::Struct(Aggregate {
                    entries: members,
                    ..Aggregate::default()
                }),
            );
            entry.hints = wrapper.hints.clone();
            entry.source_name = Some(handle.to_string());
            entry
        })
    }

    fn alias(&self, entry: &ApiEntry, name: &str, rule: Option<&EntryRule>) -> ApiEntry {
        let ty = rule
            .and_then(|rule| rule.ty.clone())
            .unwrap_or_else(|| entry.name.clone());
        derived(name.to_string(), entry, EntryKind::Alias { ty, template: None })
    }

    fn finish(&mut self, mut target: ApiEntry, rule: Option<&EntryRule>) -> Result<()> {
        if let Some(rule) = rule {
            apply_rule(&mut target, rule);
        }
        let member_of = rule.and_then(|rule| rule.member_of.clone());
        self.insert(target, member_of.as_deref())
    }

    fn place(&mut self, target: ApiEntry, rule: Option<&EntryRule>) -> Result<()> {
        let member_of = rule.and_then(|rule| rule.member_of.clone());
        self.insert(target, member_of.as_deref())
    }

    fn insert(&mut self, target: ApiEntry, member_of: Option<&str>) -> Result<()> {
        if let Some(owner) = member_of {
            match self.entries.get_mut(owner).and_then(ApiEntry::entries_mut) {
                Some(members) => {
                    insert_entry(members, target);
                    return Ok(());
                }
                None => self.diagnostics.warn(format!(
                    "{}: `{}` is not a struct, `{}` stays at file level",
                    self.name, owner, target.name
                ))?,
            }
        }
        insert_entry(&mut self.entries, target);
        Ok(())
    }

    fn unsupported(&self, entry: &ApiEntry, kind: Option<TargetKind>, default: TargetKind) -> Result<()> {
        match kind {
            Some(kind) if kind != default => self.diagnostics.warn(format!(
                "{}: `{}` cannot become {:?}, keeping the default mapping",
                self.name, entry.name, kind
            )),
            _ => Ok(()),
        }
    }

    fn target_name(&self, entry: &ApiEntry, rule: Option<&EntryRule>) -> String {
        rule.and_then(|rule| rule.name.clone())
            .unwrap_or_else(|| self.strip_prefix(&entry.name))
    }

    fn strip_prefix(&self, name: &str) -> String {
        strip_prefix(name, self.prefixes)
    }
}

/// Drop the first matching prefix. A name made only of the prefix is kept as is.
pub fn strip_prefix(name: &str, prefixes: &[String]) -> String {
    prefixes
        .iter()
        .find_map(|prefix| name.strip_prefix(prefix.as_str()).filter(|rest| !rest.is_empty()))
        .unwrap_or(name)
        .to_string()
}

/// A target entry standing in for `source`.
fn derived(name: String, source: &ApiEntry, kind: EntryKind) -> ApiEntry {
    let mut entry = ApiEntry::new(name, kind);
    entry.doc = source.doc.clone();
    entry.since = source.since.clone();
    entry.source_name = Some(source.name.clone());
    entry
}

fn delegating_value(source: &str, parameters: Option<&[Parameter]>) -> String {
    match parameters {
        None => source.to_string(),
        Some(parameters) => {
            let names: Vec<&str> = parameters.iter().map(|p| p.name.as_str()).collect();
            format!("{source}({})", names.join(", "))
        }
    }
}

fn apply_rule(target: &mut ApiEntry, rule: &EntryRule) {
    if let Some(name) = &rule.name {
        target.name = name.clone();
    }
    target.hints = rule.hints.over(&target.hints);
    match &mut target.kind {
        EntryKind::Function(function) => {
            if let Some(ty) = &rule.ty {
                function.ty = Some(ty.clone());
            }
            if let Some(parameters) = &rule.parameters {
                function.parameters = parameters.clone();
            }
            if let Some(is_static) = rule.is_static {
                function.is_static = is_static;
            }
            if let Some(immutable) = rule.immutable {
                function.immutable = immutable;
            }
            if let Some(constexpr) = rule.constexpr {
                function.constexpr = constexpr;
            }
        }
        EntryKind::Var(var) => {
            if let Some(ty) = &rule.ty {
                var.ty = ty.clone();
            }
            if let Some(is_static) = rule.is_static {
                var.is_static = is_static;
            }
            if let Some(constexpr) = rule.constexpr {
                var.constexpr = constexpr;
            }
        }
        EntryKind::Def { parameters, .. } => {
            if rule.parameters.is_some() {
                parameters.clone_from(&rule.parameters);
            }
        }
        EntryKind::Struct(aggregate) => {
            if let Some(ty) = &rule.ty {
                aggregate.ty = Some(ty.clone());
            }
        }
        _ => {}
    }
}

/// Derive `mayFail` from the failure sentinel named in the doc.
fn detect_failure(doc: &str, function: &mut Function, hints: &mut Hints) {
    if hints.may_fail.is_some() {
        return;
    }
    let doc = doc.to_lowercase();
    if doc.contains("false on failure") {
        if function.ty.as_deref() == Some("bool") {
            function.ty = Some("void".to_string());
        }
        hints.may_fail = Some(MayFail::Check(true));
    } else if doc.contains("null on failure") || doc.contains("negative error code on failure") {
        hints.may_fail = Some(MayFail::Check(true));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Since;

    fn rules(json: serde_json::Value) -> FileTransform {
        serde_json::from_value(json).unwrap()
    }

    fn source(entries: Vec<ApiEntry>) -> ApiFile {
        let mut file = ApiFile::new("SDL_video.h");
        for entry in entries {
            insert_entry(&mut file.entries, entry);
        }
        file
    }

    fn run(rules: &FileTransform, source: &ApiFile) -> ApiFile {
        let prefixes = vec!["SDL_".to_string()];
        FileTransformer::new("SDL3pp_video.h", rules, &prefixes, &Diagnostics::silent())
            .run(Some(source))
            .unwrap()
    }

    #[test]
    fn test_default_mappings() {
        let mut flags = ApiEntries::new();
        flags.insert("SDL_FLAG_A".to_string(), ApiEntry::var("SDL_FLAG_A", "SDL_Flags"));
        let file = source(vec![
            ApiEntry::function("SDL_Init", "bool", vec![Parameter::new("flags", "SDL_InitFlags")]),
            ApiEntry::new(
                "SDL_INIT_AUDIO",
                EntryKind::Def {
                    parameters: None,
                    value: "0x10u".to_string(),
                },
            ),
            ApiEntry::alias("SDL_InitFlags", "Uint32"),
            ApiEntry::new("SDL_Flags", EntryKind::Enum { entries: flags }),
        ]);
        let target = run(&FileTransform::default(), &file);

        let names: Vec<&str> = target.entries.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Init", "INIT_AUDIO", "InitFlags", "Flags", "FLAG_A"]);
        assert_eq!(target.entries["Init"].source_name.as_deref(), Some("SDL_Init"));
        assert!(matches!(&target.entries["INIT_AUDIO"].kind, EntryKind::Def { value, .. } if value == "SDL_INIT_AUDIO"));
        assert!(matches!(&target.entries["InitFlags"].kind, EntryKind::Alias { ty, .. } if ty == "SDL_InitFlags"));
        let EntryKind::Var(flag) = &target.entries["FLAG_A"].kind else {
            panic!("expected enumerator var");
        };
        assert_eq!(flag.ty, "Flags");
        assert!(flag.constexpr);
    }

    #[test]
    fn test_wrapper_members() {
        let mut window = ApiEntry::new("SDL_Window", EntryKind::Forward { ty: None }).with_doc("A window.");
        window.since = Some(Since::new(3, 2, 0));
        let file = source(vec![
            window,
            ApiEntry::function(
                "SDL_GetWindowTitle",
                "const char *",
                vec![Parameter::new("window", "const SDL_Window *")],
            ),
            ApiEntry::function(
                "SDL_SetWindowTitle",
                "bool",
                vec![Parameter::new("window", "SDL_Window *"), Parameter::new("title", "const char *")],
            ),
        ]);
        let rules = rules(serde_json::json!({
            "wrappers": {"SDL_Window": {"hints": {"private": true}}}
        }));
        let target = run(&rules, &file);

        assert_eq!(target.entries.keys().collect::<Vec<_>>(), vec!["Window"]);
        let window = &target.entries["Window"];
        assert_eq!(window.doc.as_ref().map(|doc| doc.text()), Some("A window.".to_string()));
        assert!(window.hints.is_private());
        let members = window.entries().unwrap();
        assert_eq!(members.keys().collect::<Vec<_>>(), vec!["GetTitle", "SetTitle"]);
        let get_title = &members["GetTitle"];
        assert_eq!(get_title.hints.self_expr.as_deref(), Some("get()"));
        let function = get_title.as_function().unwrap();
        assert!(function.parameters.is_empty());
        assert!(function.immutable);
        assert_eq!(members["SetTitle"].as_function().unwrap().parameters[0].name, "title");
    }

    #[test]
    fn test_detect_failure_sentinels() {
        let file = source(vec![
            ApiEntry::function("SDL_Init", "bool", vec![]).with_doc("Returns true on success or false on failure."),
            ApiEntry::function("SDL_GetName", "const char *", vec![]).with_doc("Returns the name or NULL on failure."),
            ApiEntry::function("SDL_Count", "int", vec![]).with_doc("Returns a negative error code on failure."),
            ApiEntry::function("SDL_Plain", "int", vec![]).with_doc("Returns a number."),
        ]);
        let target = run(&rules(serde_json::json!({"detectFailure": true})), &file);

        let init = &target.entries["Init"];
        assert_eq!(init.as_function().unwrap().ty.as_deref(), Some("void"));
        assert_eq!(init.hints.may_fail, Some(MayFail::Check(true)));
        assert_eq!(target.entries["GetName"].as_function().unwrap().ty.as_deref(), Some("const char *"));
        assert!(target.entries["GetName"].hints.may_fail.is_some());
        assert!(target.entries["Count"].hints.may_fail.is_some());
        assert!(target.entries["Plain"].hints.may_fail.is_none());
    }

    #[test]
    fn test_rules_override_defaults() {
        let file = source(vec![
            ApiEntry::function("SDL_GetTicks", "Uint64", vec![]),
            ApiEntry::new(
                "SDL_MAX_VALUE",
                EntryKind::Def {
                    parameters: None,
                    value: "10".to_string(),
                },
            ),
        ]);
        let rules = rules(serde_json::json!({
            "transform": {
                "SDL_GetTicks": {"name": "Ticks", "type": "std::chrono::milliseconds", "constexpr": true, "hints": {"wrapSelf": true}},
                "SDL_MAX_VALUE": {"kind": "var"}
            }
        }));
        let target = run(&rules, &file);

        let ticks = &target.entries["Ticks"];
        let function = ticks.as_function().unwrap();
        assert_eq!(function.ty.as_deref(), Some("std::chrono::milliseconds"));
        assert!(function.constexpr);
        assert!(ticks.hints.wraps_self());
        assert!(matches!(&target.entries["MAX_VALUE"].kind, EntryKind::Var(var) if var.ty == "auto" && var.constexpr));
    }

    #[test]
    fn test_unknown_rule_warns_and_is_dropped() {
        let file = source(vec![ApiEntry::function("SDL_Quit", "void", vec![])]);
        let rules = rules(serde_json::json!({"transform": {"SDL_Missing": {"name": "Missing"}}}));
        let diagnostics = Diagnostics::silent();
        let prefixes = vec!["SDL_".to_string()];
        let target = FileTransformer::new("out.h", &rules, &prefixes, &diagnostics)
            .run(Some(&file))
            .unwrap();
        assert_eq!(diagnostics.warning_count(), 1);
        assert_eq!(target.entries.keys().collect::<Vec<_>>(), vec!["Quit"]);
    }

    #[test]
    fn test_overloads_and_function_like_defs() {
        let mut head = ApiEntry::function("SDL_Fill", "void", vec![]);
        head.push_overload(ApiEntry::function("SDL_Fill", "void", vec![Parameter::new("x", "int")]));
        let file = source(vec![
            head,
            ApiEntry::new(
                "SDL_MIN",
                EntryKind::Def {
                    parameters: Some(vec![Parameter::new("a", ""), Parameter::new("b", "")]),
                    value: "((a) < (b) ? (a) : (b))".to_string(),
                },
            ),
        ]);
        let target = run(&FileTransform::default(), &file);
        assert_eq!(target.entries["Fill"].variants().count(), 2);
        assert!(matches!(&target.entries["MIN"].kind, EntryKind::Def { value, .. } if value == "SDL_MIN(a, b)"));
    }

    #[test]
    fn test_strip_prefix() {
        let prefixes = vec!["SDL_".to_string(), "IMG_".to_string()];
        assert_eq!(strip_prefix("SDL_Window", &prefixes), "Window");
        assert_eq!(strip_prefix("IMG_Load", &prefixes), "Load");
        assert_eq!(strip_prefix("SDL_", &prefixes), "SDL_");
        assert_eq!(strip_prefix("Other", &prefixes), "Other");
    }
}
