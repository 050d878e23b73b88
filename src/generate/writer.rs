//! Header text writer
//!
//! Renders model entries the same way every time: declaration order is the map order, and
//! members are indented two spaces per nesting level.

use crate::model::entry::{Aggregate, Function, Var};
use crate::model::{ApiEntries, ApiEntry, ApiFile, EntryKind, Parameter, Since};
use crate::parser::decl::declarator;

use super::body::{function_body, Body};
use super::config::GenerateConfig;
use super::docs::{inline_doc, render_doc, render_file_doc};

const INDENT: &str = "  ";

/// Where an entry is rendered; decides separators, qualifiers and member syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    File,
    Struct,
    Enum,
}

pub struct HeaderWriter<'a> {
    config: &'a GenerateConfig,
    output: String,
}

impl<'a> HeaderWriter<'a> {
    pub fn new(config: &'a GenerateConfig) -> Self {
        Self {
            config,
            output: String::new(),
        }
    }

    pub fn finish(self) -> String {
        self.output
    }

    pub fn file(&mut self, file: &ApiFile) {
        let guard = include_guard(&file.name);
        self.output.push_str(&format!("#ifndef {guard}\n#define {guard}\n\n"));

        let mut system = file.includes.clone();
        system.sort();
        let mut local = file.local_includes.clone();
        local.sort();
        for include in &system {
            self.output.push_str(&format!("#include <{include}>\n"));
        }
        for include in &local {
            self.output.push_str(&format!("#include \"{include}\"\n"));
        }
        if !system.is_empty() || !local.is_empty() {
            self.output.push('\n');
        }

        let config = self.config;
        let namespace = &config.namespace;
        self.output.push_str(&format!("namespace {namespace} {{\n\n"));
        let doc = file.doc.as_ref().map(|doc| doc.text()).filter(|doc| !doc.trim().is_empty());
        if let Some(doc) = &doc {
            self.file_doc(doc);
            self.output.push('\n');
        }
        if !file.entries.is_empty() {
            self.entries(&file.entries, "", Scope::File);
            self.output.push('\n');
        }
        if doc.is_some() {
            self.output.push_str("/// @}\n\n");
        }
        self.output
            .push_str(&format!("}} // namespace {namespace}\n\n#endif /* {guard} */\n"));
    }

    pub fn file_doc(&mut self, doc: &str) {
        self.output.push_str(&render_file_doc(doc, "", self.config.width));
    }

    pub fn entries(&mut self, entries: &ApiEntries, prefix: &str, scope: Scope) {
        for (i, entry) in entries.values().enumerate() {
            if i > 0 && scope != Scope::Enum {
                self.output.push('\n');
            }
            self.entry(entry, prefix, scope);
        }
    }

    /// An entry with its whole overload chain.
    pub fn entry(&mut self, entry: &ApiEntry, prefix: &str, scope: Scope) {
        for (i, variant) in entry.variants().enumerate() {
            if i > 0 {
                self.output.push('\n');
            }
            self.variant(variant, prefix, scope);
        }
    }

    fn variant(&mut self, entry: &ApiEntry, prefix: &str, scope: Scope) {
        if scope == Scope::Struct {
            if let Some(access) = &entry.hints.change_access {
                let outer = &prefix[..prefix.len().saturating_sub(INDENT.len())];
                self.output.push_str(&format!("{outer}{access}:\n"));
            }
        }
        let check = entry.since.as_ref().map(version_check);
        if let Some(check) = &check {
            self.output.push_str(&format!("#if {check}\n"));
        }

        let doc = entry.doc.as_ref().map(|doc| doc.text()).unwrap_or_default();
        match &entry.kind {
            EntryKind::Var(var) => {
                let line = self.var_line(entry, var, prefix, scope);
                match inline_doc(&doc, line.len(), self.config.width) {
                    Some(inline) => self.output.push_str(&format!("{line}{inline}\n")),
                    None => {
                        self.output.push_str(&render_doc(&doc, prefix, self.config.width));
                        self.output.push_str(&line);
                        self.output.push('\n');
                    }
                }
            }
            kind => {
                self.output.push_str(&render_doc(&doc, prefix, self.config.width));
                self.declaration(entry, kind, prefix, scope);
            }
        }

        if let Some(check) = &check {
            self.output.push_str(&format!("#endif // {check}\n"));
        }
    }

    fn declaration(&mut self, entry: &ApiEntry, kind: &EntryKind, prefix: &str, scope: Scope) {
        let name = &entry.name;
        match kind {
            EntryKind::Alias { ty, template } => {
                self.template(template.as_deref(), prefix);
                self.line(prefix, &format!("using {name} = {};", qualify_self(name, ty)));
            }
            EntryKind::Def { parameters, value } => {
                let signature = match parameters {
                    Some(parameters) => format!("{name}({})", parameter_names(parameters)),
                    None => name.clone(),
                };
                let value = if value.is_empty() {
                    delegated_macro(entry, parameters.as_deref())
                } else {
                    value.clone()
                };
                if value.is_empty() {
                    self.line("", &format!("#define {signature}"));
                } else {
                    self.line("", &format!("#define {signature} {value}"));
                }
            }
            EntryKind::Enum { entries } => {
                self.line(prefix, &format!("enum {name}"));
                self.block(entries, prefix, Scope::Enum);
            }
            EntryKind::Struct(aggregate) => {
                let keyword = if entry.hints.is_private() { "class" } else { "struct" };
                self.aggregate(name, keyword, aggregate, prefix);
            }
            EntryKind::Union(aggregate) => self.aggregate(name, "union", aggregate, prefix),
            EntryKind::Function(function) => self.function(entry, function, prefix, scope),
            // Rendered together with its inline doc.
            EntryKind::Var(_) => {}
            EntryKind::Callback { ty, parameters } => {
                self.line(
                    prefix,
                    &format!("using {name} = {ty}(SDLCALL *)({});", parameter_list(parameters)),
                );
            }
            EntryKind::Forward { ty: None } => self.line(prefix, &format!("struct {name};")),
            EntryKind::Forward { ty: Some(ty) } => self.line(prefix, &format!("using {name} = {ty};")),
            EntryKind::Ns { entries } => {
                self.line(prefix, &format!("namespace {name} {{"));
                self.output.push('\n');
                self.entries(entries, prefix, Scope::File);
                self.output.push('\n');
                self.line(prefix, &format!("}} // namespace {name}"));
            }
        }
    }

    fn aggregate(&mut self, name: &str, keyword: &str, aggregate: &Aggregate, prefix: &str) {
        self.template(aggregate.template.as_deref(), prefix);
        match &aggregate.ty {
            Some(base) => self.line(prefix, &format!("{keyword} {name} : {base}")),
            None => self.line(prefix, &format!("{keyword} {name}")),
        }
        self.block(&aggregate.entries, prefix, Scope::Struct);
    }

    fn block(&mut self, entries: &ApiEntries, prefix: &str, scope: Scope) {
        self.line(prefix, "{");
        self.entries(entries, &format!("{prefix}{INDENT}"), scope);
        self.line(prefix, "};");
    }

    fn function(&mut self, entry: &ApiEntry, function: &Function, prefix: &str, scope: Scope) {
        let body = function_body(entry, function, self.config);
        self.template(function.template.as_deref(), prefix);

        let mut signature = String::new();
        if function.is_static || entry.hints.is_static() {
            signature.push_str("static ");
        }
        if function.explicit {
            signature.push_str("explicit ");
        }
        let has_body = !matches!(body, Body::Terminator | Body::Deleted | Body::Defaulted);
        if function.constexpr {
            signature.push_str("constexpr ");
        } else if has_body && scope == Scope::File {
            signature.push_str("inline ");
        }
        let call = format!("{}({})", entry.name, parameter_list(&function.parameters));
        match function.ty.as_deref() {
            None => signature.push_str(&format!("auto {call}")),
            Some("") => signature.push_str(&call),
            Some(ty) => signature.push_str(&declarator(ty, &call)),
        }
        if function.immutable {
            signature.push_str(" const");
        }
        match function.reference {
            1 => signature.push_str(" &"),
            2 => signature.push_str(" &&"),
            _ => {}
        }

        match body {
            Body::Deleted => self.line(prefix, &format!("{signature} = delete;")),
            Body::Defaulted => self.line(prefix, &format!("{signature} = default;")),
            Body::Terminator => self.line(prefix, &format!("{signature};")),
            Body::Empty => self.line(prefix, &format!("{signature} {{}}")),
            Body::Statements(lines) => {
                self.line(prefix, &signature);
                self.line(prefix, "{");
                for line in dedent(&lines) {
                    if line.is_empty() {
                        self.output.push('\n');
                    } else {
                        self.line(&format!("{prefix}{INDENT}"), &line);
                    }
                }
                self.line(prefix, "}");
            }
            Body::Initializers(initializers) => {
                self.line(prefix, &signature);
                self.line(&format!("{prefix}{INDENT}"), &format!(": {}", initializers.join(", ")));
                self.line(prefix, "{");
                self.line(prefix, "}");
            }
        }
    }

    fn var_line(&self, entry: &ApiEntry, var: &Var, prefix: &str, scope: Scope) -> String {
        let value = entry
            .hints
            .value
            .as_ref()
            .or(var.value.as_ref())
            .or(entry.hints.delegate.as_ref())
            .or(entry.source_name.as_ref());
        if scope == Scope::Enum {
            return match value {
                Some(value) => format!("{prefix}{} = {value},", entry.name),
                None => format!("{prefix}{},", entry.name),
            };
        }
        let mut line = prefix.to_string();
        if var.is_static || entry.hints.is_static() {
            line.push_str("static ");
        }
        if var.constexpr {
            line.push_str("constexpr ");
        }
        line.push_str(&declarator(&var.ty, &entry.name));
        if let Some(value) = value {
            line.push_str(&format!(" = {value}"));
        }
        line.push(';');
        line
    }

    fn template(&mut self, template: Option<&str>, prefix: &str) {
        if let Some(template) = template {
            self.line(prefix, &format!("template<{template}>"));
        }
    }

    fn line(&mut self, prefix: &str, text: &str) {
        self.output.push_str(prefix);
        self.output.push_str(text);
        self.output.push('\n');
    }
}

/// `SDL3pp_init.h` → `SDL3PP_INIT_H_`.
pub fn include_guard(file_name: &str) -> String {
    let mut guard: String = file_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    guard.push('_');
    guard
}

pub fn version_check(since: &Since) -> String {
    format!(
        "{}_VERSION_ATLEAST({}, {}, {})",
        since.tag, since.major, since.minor, since.patch
    )
}

fn qualify_self(name: &str, ty: &str) -> String {
    if name == ty {
        format!("::{ty}")
    } else {
        ty.to_string()
    }
}

fn parameter_list(parameters: &[Parameter]) -> String {
    parameters
        .iter()
        .map(|parameter| {
            let declared = declarator(&parameter.ty, &parameter.name);
            match &parameter.default {
                Some(default) => format!("{declared} = {default}"),
                None => declared,
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn parameter_names(parameters: &[Parameter]) -> String {
    parameters
        .iter()
        .map(|parameter| parameter.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Expansion of a macro that only renames another one.
fn delegated_macro(entry: &ApiEntry, parameters: Option<&[Parameter]>) -> String {
    let Some(target) = entry
        .hints
        .delegate
        .as_ref()
        .or(entry.source_name.as_ref())
        .filter(|target| **target != entry.name)
    else {
        return String::new();
    };
    match parameters {
        Some(parameters) => format!("{target}({})", parameter_names(parameters)),
        None => target.clone(),
    }
}

fn dedent(lines: &[String]) -> Vec<String> {
    let indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                line[indent..].trim_end().to_string()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Doc;

    fn render(entry: &ApiEntry, scope: Scope) -> String {
        let config = GenerateConfig::default();
        let mut writer = HeaderWriter::new(&config);
        writer.entry(entry, if scope == Scope::File { "" } else { INDENT }, scope);
        writer.finish()
    }

    #[test]
    fn test_include_guard() {
        assert_eq!(include_guard("SDL3pp_init.h"), "SDL3PP_INIT_H_");
        assert_eq!(include_guard("a-b/c.hpp"), "A_B_C_HPP_");
    }

    #[test]
    fn test_self_alias_is_qualified() {
        assert_eq!(render(&ApiEntry::alias("Point", "Point"), Scope::File), "using Point = ::Point;\n");
        assert_eq!(render(&ApiEntry::alias("Point", "SDL_Point"), Scope::File), "using Point = SDL_Point;\n");
    }

    #[test]
    fn test_renamed_def() {
        let mut def = ApiEntry::new(
            "MIN",
            EntryKind::Def {
                parameters: Some(vec![Parameter::new("a", ""), Parameter::new("b", "")]),
                value: String::new(),
            },
        );
        def.source_name = Some("SDL_MIN".to_string());
        assert_eq!(render(&def, Scope::File), "#define MIN(a, b) SDL_MIN(a, b)\n");
    }

    #[test]
    fn test_var_inline_doc() {
        let mut var = ApiEntry::var("FLAG", "Flags").with_doc("A flag.");
        var.source_name = Some("SDL_FLAG".to_string());
        if let EntryKind::Var(v) = &mut var.kind {
            v.constexpr = true;
        }
        assert_eq!(render(&var, Scope::File), "constexpr Flags FLAG = SDL_FLAG; ///< A flag.\n");
    }

    #[test]
    fn test_member_function_has_no_inline() {
        let mut member = ApiEntry::function("GetTitle", "const char *", vec![]);
        member.source_name = Some("SDL_GetWindowTitle".to_string());
        member.hints.self_expr = Some("get()".to_string());
        if let EntryKind::Function(function) = &mut member.kind {
            function.immutable = true;
        }
        assert_eq!(
            render(&member, Scope::Struct),
            "  const char *GetTitle() const\n  {\n    return SDL_GetWindowTitle(get());\n  }\n"
        );
    }

    #[test]
    fn test_version_gate_wraps_doc_and_declaration() {
        let mut quit = ApiEntry::function("Quit", "void", vec![]).with_doc("Quit.");
        quit.source_name = Some("SDL_Quit".to_string());
        quit.since = Some(Since::new(3, 2, 0));
        assert_eq!(
            render(&quit, Scope::File),
            "#if SDL_VERSION_ATLEAST(3, 2, 0)\n/// Quit.\ninline void Quit()\n{\n  SDL_Quit();\n}\n#endif // SDL_VERSION_ATLEAST(3, 2, 0)\n"
        );
    }

    #[test]
    fn test_dedent_literal_body() {
        let mut entry = ApiEntry::function("F", "int", vec![]);
        entry.hints.body = Some("    int x = 1;\n\n    return x;".to_string());
        entry.doc = Some(Doc::Raw(String::new()));
        assert_eq!(render(&entry, Scope::File), "inline int F()\n{\n  int x = 1;\n\n  return x;\n}\n");
    }
}
