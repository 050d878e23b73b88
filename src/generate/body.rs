//! Function body synthesis
//!
//! The first matching rule decides the body of a function entry:
//!
//! 1. `hints.delete` → `= delete;`
//! 2. `hints.default` → `= default;`
//! 3. `hints.body` on an entry with a body → the literal text
//! 4. `hints.init` on an entry with a body → member initializer list and an empty block
//! 5. delegation to `hints.delegate` or the entry's source name, with `hints.self` first
//!    unless the entry is static or `hints.raw`. Without a target a
//!    prototype ends with `;`, a constructor gets an empty block and anything else a
//!    `static_assert` that fails the build.

use crate::model::entry::Function;
use crate::model::{ApiEntry, MayFail};

use super::config::GenerateConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Deleted,
    Defaulted,
    /// Declaration only.
    Terminator,
    Empty,
    Statements(Vec<String>),
    Initializers(Vec<String>),
}

pub const NOT_IMPLEMENTED: &str = "static_assert(false, \"Not implemented\");";

pub fn function_body(entry: &ApiEntry, function: &Function, config: &GenerateConfig) -> Body {
    let hints = &entry.hints;
    if hints.is_delete() {
        return Body::Deleted;
    }
    if hints.is_default() {
        return Body::Defaulted;
    }
    if !function.proto {
        if let Some(body) = &hints.body {
            return Body::Statements(body.lines().map(str::to_string).collect());
        }
        if let Some(init) = hints.init.as_ref().filter(|init| !init.is_empty()) {
            return Body::Initializers(init.clone());
        }
    }

    let is_constructor = function.ty.as_deref() == Some("") && !is_operator(&entry.name);
    let explicit_delegate = hints.delegate.is_some();
    let Some(target) = hints.delegate.as_ref().or(entry.source_name.as_ref()) else {
        return if function.proto {
            Body::Terminator
        } else if is_constructor {
            Body::Empty
        } else {
            Body::Statements(vec![NOT_IMPLEMENTED.to_string()])
        };
    };
    let target = if *target == entry.name {
        format!("::{target}")
    } else {
        target.clone()
    };

    let mut arguments = Vec::new();
    let takes_self = !(function.is_static || hints.is_static() || hints.is_raw());
    if let Some(self_expr) = hints.self_expr.as_ref().filter(|_| takes_self) {
        arguments.push(self_expr.clone());
    }
    arguments.extend(
        function
            .parameters
            .iter()
            .map(|parameter| config.argument(parameter, explicit_delegate)),
    );
    let mut call = format!("{target}({})", arguments.join(", "));
    if !explicit_delegate {
        match &hints.may_fail {
            Some(MayFail::Check(true)) => call = format!("CheckError({call})"),
            Some(MayFail::Guard(guard)) => call = format!("CheckError({call}, {guard})"),
            _ => {}
        }
    }

    if is_constructor {
        let base = hints
            .super_class
            .as_deref()
            .or(hints.self_expr.as_deref())
            .unwrap_or("T");
        return Body::Initializers(vec![format!("{base}({call})")]);
    }
    match function.ty.as_deref() {
        Some(ty) if hints.wraps_self() && !ty.is_empty() && !explicit_delegate => {
            Body::Statements(vec![format!("return {ty}({call});")])
        }
        Some("void") => Body::Statements(vec![format!("{call};")]),
        _ => Body::Statements(vec![format!("return {call};")]),
    }
}

pub fn is_operator(name: &str) -> bool {
    name.starts_with("operator")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Parameter;
    use rstest::rstest;

    fn entry(hints: serde_json::Value) -> ApiEntry {
        let mut entry = ApiEntry::function("Init", "bool", vec![Parameter::new("flags", "InitFlags")]);
        entry.source_name = Some("SDL_Init".to_string());
        entry.hints = serde_json::from_value(hints).unwrap();
        entry
    }

    fn body(entry: &ApiEntry) -> Body {
        function_body(entry, entry.as_function().unwrap(), &GenerateConfig::default())
    }

    fn statement(text: &str) -> Body {
        Body::Statements(vec![text.to_string()])
    }

    #[test]
    fn test_plain_delegation() {
        assert_eq!(body(&entry(serde_json::json!({}))), statement("return SDL_Init(flags);"));
    }

    #[test]
    fn test_error_checks() {
        assert_eq!(
            body(&entry(serde_json::json!({"mayFail": true}))),
            statement("return CheckError(SDL_Init(flags));")
        );
        assert_eq!(
            body(&entry(serde_json::json!({"mayFail": "flags != 0"}))),
            statement("return CheckError(SDL_Init(flags), flags != 0);")
        );
        assert_eq!(
            body(&entry(serde_json::json!({"mayFail": true, "delegate": "Other"}))),
            statement("return Other(flags);")
        );
    }

    #[test]
    fn test_self_expression_and_static() {
        assert_eq!(
            body(&entry(serde_json::json!({"self": "get()"}))),
            statement("return SDL_Init(get(), flags);")
        );
        assert_eq!(
            body(&entry(serde_json::json!({"self": "get()", "static": true}))),
            statement("return SDL_Init(flags);")
        );
    }

    #[test]
    fn test_self_named_target_is_qualified() {
        let mut entry = entry(serde_json::json!({}));
        entry.source_name = Some("Init".to_string());
        assert_eq!(body(&entry), statement("return ::Init(flags);"));
    }

    #[test]
    fn test_void_and_wrap_self() {
        let mut quit = ApiEntry::function("Quit", "void", vec![]);
        quit.source_name = Some("SDL_Quit".to_string());
        assert_eq!(body(&quit), statement("SDL_Quit();"));
        assert_eq!(
            body(&entry(serde_json::json!({"wrapSelf": true}))),
            statement("return bool(SDL_Init(flags));")
        );
    }

    #[test]
    fn test_constructor_delegation() {
        let mut ctor = ApiEntry::function("Window", "", vec![Parameter::new("title", "const char *")]);
        ctor.hints.delegate = Some("SDL_CreateWindow".to_string());
        ctor.hints.super_class = Some("Resource".to_string());
        assert_eq!(
            body(&ctor),
            Body::Initializers(vec!["Resource(SDL_CreateWindow(title))".to_string()])
        );
    }

    #[test]
    fn test_without_target() {
        let mut proto = ApiEntry::function("F", "int", vec![]);
        if let crate::model::EntryKind::Function(function) = &mut proto.kind {
            function.proto = true;
        }
        assert_eq!(body(&proto), Body::Terminator);
        assert_eq!(body(&ApiEntry::function("Window", "", vec![])), Body::Empty);
        assert_eq!(body(&ApiEntry::function("F", "int", vec![])), statement(NOT_IMPLEMENTED));
    }

    fn statements(lines: &[&str]) -> Body {
        Body::Statements(lines.iter().map(|line| line.to_string()).collect())
    }

    #[rstest]
    #[case::delete_over_default(serde_json::json!({"delete": true, "default": true}), Body::Deleted)]
    #[case::delete_over_body(serde_json::json!({"delete": true, "body": "return 1;"}), Body::Deleted)]
    #[case::delete_over_init(serde_json::json!({"delete": true, "init": ["x(1)"]}), Body::Deleted)]
    #[case::default_over_body(serde_json::json!({"default": true, "body": "return 1;"}), Body::Defaulted)]
    #[case::default_over_init(serde_json::json!({"default": true, "init": ["x(1)"]}), Body::Defaulted)]
    #[case::body_over_init(
        serde_json::json!({"body": "int x = 1;\nreturn x;", "init": ["x(1)"]}),
        statements(&["int x = 1;", "return x;"])
    )]
    #[case::init_over_delegation(
        serde_json::json!({"init": ["x(1)", "y(2)"]}),
        Body::Initializers(vec!["x(1)".to_string(), "y(2)".to_string()])
    )]
    fn test_body_priority(#[case] hints: serde_json::Value, #[case] expected: Body) {
        assert_eq!(body(&entry(hints)), expected);
    }

    #[rstest]
    #[case::body(serde_json::json!({"body": "return 1;"}))]
    #[case::init(serde_json::json!({"init": ["x(1)"]}))]
    fn test_prototype_ignores_body_and_init(#[case] hints: serde_json::Value) {
        let mut proto = entry(hints);
        if let crate::model::EntryKind::Function(function) = &mut proto.kind {
            function.proto = true;
        }
        assert_eq!(body(&proto), statement("return SDL_Init(flags);"));
    }

    #[test]
    fn test_empty_init_falls_through() {
        assert_eq!(body(&entry(serde_json::json!({"init": []}))), statement("return SDL_Init(flags);"));
    }

    #[test]
    fn test_raw_delegate_skips_self() {
        assert_eq!(
            body(&entry(serde_json::json!({"self": "get()", "raw": true}))),
            statement("return SDL_Init(flags);")
        );
    }
}
