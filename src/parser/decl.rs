//! Declaration analysis shared by both parser strategies
//!
//!     Both the line-based tokenizer and the grammar parser isolate the raw text of a
//!     declaration (everything up to the terminating `;` or body brace). Turning that text into
//!     names, types and parameter lists happens here, once, so that both strategies agree on
//!     the exact model they produce.
//!
//! Type normalization
//!
//!     Pointer and reference sigils get exactly one space before them and none after, runs of
//!     sigils are written together, and no space is kept just inside brackets. So `int* x`,
//!     `int *x` and `int  *  x` all become `int *x`. The transformation is idempotent.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::Parameter;

static ANNOTATION_CALLS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\bSDL_[A-Z0-9_]*(?:CAP|ALLOC_SIZE2?|FUNCV?|ACQUIRE|RELEASE|REQUIRES|EXCLUDES|GUARDED_BY|SHARED|GENERIC|CAPABILITY)\s*\([^()]*\)",
    )
    .unwrap()
});

static ANNOTATION_WORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:extern|SDL_DECLSPEC|SDLCALL|SDL_MALLOC|SDL_NODISCARD|SDL_FORCE_INLINE|SDL_INLINE|SDL_PRINTF_FORMAT_STRING|SDL_SCANF_FORMAT_STRING|SDL_WPRINTF_FORMAT_STRING|SDL_DEPRECATED|SDL_NORETURN|SDL_ANALYZER_NORETURN|SDL_NO_THREAD_SAFETY_ANALYSIS)\b",
    )
    .unwrap()
});

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_]\w*$").unwrap());

static FUNCTION_POINTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?s)(?:typedef\s+)?(?P<ret>.+?)\s*\(\s*\*\s*(?P<name>[A-Za-z_]\w*)\s*\)\s*\((?P<params>.*)\)$")
        .unwrap()
});

static USING_FUNCTION_POINTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?s)using\s+(?P<name>[A-Za-z_]\w*)\s*=\s*(?P<ret>.+?)\s*\(\s*\*\s*\)\s*\((?P<params>.*)\)$")
        .unwrap()
});

static DEFINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?s)#\s*define\s+(?P<name>[A-Za-z_]\w*)(?P<params>\([^)]*\))?(?P<value>.*)$").unwrap()
});

static TRAILING_DOC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\s*(?:/\*\*<(?P<block>.*?)\*/|///<(?P<line>.*))\s*$").unwrap());

static PLAIN_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/|//.*$").unwrap());

static OPEN_BRACKET_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([(\[<]) +").unwrap());
static CLOSE_BRACKET_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r" +([)\]>])").unwrap());

const BUILTIN_TYPE_WORDS: &[&str] = &[
    "int", "char", "long", "short", "float", "double", "signed", "unsigned", "bool", "void",
];
const QUALIFIER_WORDS: &[&str] = &["const", "volatile", "struct", "enum", "union", "class", "typename"];
const NOT_FUNCTIONS: &[&str] = &[
    "if", "while", "for", "switch", "return", "sizeof", "decltype", "alignas", "static_assert",
    "SDL_COMPILE_TIME_ASSERT",
];

/// Remove SDL calling convention, export and static analysis annotations.
pub fn strip_annotations(text: &str) -> String {
    let without_calls = ANNOTATION_CALLS.replace_all(text, " ");
    let without_words = ANNOTATION_WORDS.replace_all(&without_calls, " ");
    collapse_whitespace(&without_words)
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn is_identifier(text: &str) -> bool {
    IDENTIFIER.is_match(text)
}

/// Canonical spelling of a type (or `type name`) string.
pub fn normalize_type(text: &str) -> String {
    let collapsed = collapse_whitespace(text);
    let chars: Vec<char> = collapsed.chars().collect();
    let mut out = String::with_capacity(collapsed.len() + 4);
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '*' || c == '&' {
            let mut run = String::new();
            while i < chars.len() && matches!(chars[i], '*' | '&' | ' ') {
                if chars[i] != ' ' {
                    run.push(chars[i]);
                }
                i += 1;
            }
            let kept = out.trim_end().len();
            out.truncate(kept);
            if !matches!(out.chars().last(), None | Some('(' | '<' | '[')) {
                out.push(' ');
            }
            out.push_str(&run);
            continue;
        }
        out.push(c);
        i += 1;
    }
    let out = OPEN_BRACKET_SPACE.replace_all(&out, "$1");
    let out = CLOSE_BRACKET_SPACE.replace_all(&out, "$1");
    out.trim().to_string()
}

/// Split at `separator` occurrences outside brackets and literals.
pub fn split_top_level(text: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut current = String::new();
    for c in text.chars() {
        if let Some(q) = quote {
            current.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' | '>' => depth = (depth - 1).max(0),
            _ if c == separator && depth == 0 => {
                parts.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    parts.push(current);
    parts
}

/// Split a declaration at its top-level initializer `=`.
pub fn split_default(text: &str) -> (String, Option<String>) {
    let chars: Vec<char> = text.chars().collect();
    let mut depth = 0i32;
    for (i, &c) in chars.iter().enumerate() {
        match c {
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' | '>' => depth = (depth - 1).max(0),
            '=' if depth == 0 => {
                let prev = if i > 0 { chars[i - 1] } else { ' ' };
                let next = chars.get(i + 1).copied().unwrap_or(' ');
                if !matches!(prev, '=' | '!' | '<' | '>') && next != '=' {
                    let before: String = chars[..i].iter().collect();
                    let after: String = chars[i + 1..].iter().collect();
                    return (before.trim().to_string(), Some(after.trim().to_string()));
                }
            }
            _ => {}
        }
    }
    (text.trim().to_string(), None)
}

/// Split a trailing array suffix off a declarator: `data[16]` → (`data`, `[16]`).
pub fn split_array_suffix(text: &str) -> (&str, &str) {
    let trimmed = text.trim_end();
    if trimmed.ends_with(']') {
        if let Some(idx) = trimmed.find('[') {
            return (trimmed[..idx].trim_end(), &trimmed[idx..]);
        }
    }
    (trimmed, "")
}

/// Split `type name` text into its normalized type and its name.
///
/// Sigils attached to the name belong to the type, array suffixes move to the type, and a
/// text without a plausible name yields an empty name.
pub fn split_declarator(text: &str) -> (String, String) {
    let decl = normalize_type(text);
    if let Some(caps) = FUNCTION_POINTER.captures(&decl) {
        let ty = normalize_type(&format!("{} (*)({})", &caps["ret"], &caps["params"]));
        return (ty, caps["name"].to_string());
    }
    let (core, array) = split_array_suffix(&decl);
    let Some(space) = core.rfind(' ') else {
        return (decl.clone(), String::new());
    };
    let head = &core[..space];
    let candidate = &core[space + 1..];
    let name = candidate.trim_start_matches(['*', '&']);
    let sigils = &candidate[..candidate.len() - name.len()];
    let unnamed = name.is_empty()
        || !is_identifier(name)
        || BUILTIN_TYPE_WORDS.contains(&name)
        || (sigils.is_empty() && QUALIFIER_WORDS.contains(&head));
    if unnamed {
        return (decl.clone(), String::new());
    }
    let ty = if sigils.is_empty() {
        head.to_string()
    } else {
        format!("{head} {sigils}")
    };
    (format!("{}{}", normalize_type(&ty), array), name.to_string())
}

/// Render a declarator back from a type and a name.
pub fn declarator(ty: &str, name: &str) -> String {
    if name.is_empty() {
        return ty.to_string();
    }
    if let Some(idx) = ty.find("(*)") {
        return format!("{}{}{}", &ty[..idx + 2], name, &ty[idx + 2..]);
    }
    if ty.ends_with(']') {
        if let Some(idx) = ty.find('[') {
            return format!("{} {}{}", ty[..idx].trim_end(), name, &ty[idx..]);
        }
    }
    if ty.ends_with('*') || ty.ends_with('&') {
        format!("{ty}{name}")
    } else {
        format!("{ty} {name}")
    }
}

pub fn parse_parameter(text: &str) -> Parameter {
    let (decl, default) = split_default(text);
    let (ty, name) = split_declarator(&decl);
    Parameter { name, ty, default }
}

/// Parse a raw parameter list (the text between the parentheses).
pub fn parse_parameters(raw: &str) -> Vec<Parameter> {
    let raw = strip_annotations(raw);
    if raw.trim().is_empty() {
        return Vec::new();
    }
    let parameters: Vec<Parameter> = split_top_level(&raw, ',')
        .iter()
        .map(|part| parse_parameter(part))
        .collect();
    if parameters.len() == 1 && parameters[0].ty == "void" && parameters[0].name.is_empty() {
        return Vec::new();
    }
    parameters
}

/// Result of analysing a function declaration header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionHeader {
    pub name: String,
    pub ty: String,
    pub parameters: Vec<Parameter>,
    pub constexpr: bool,
    pub is_static: bool,
    pub explicit: bool,
    pub immutable: bool,
    pub reference: u8,
    pub defaulted: bool,
    pub deleted: bool,
}

/// Analyse `(modifiers) type name(args) suffix` text.
pub fn parse_function_header(text: &str) -> Option<FunctionHeader> {
    let text = strip_annotations(text);
    let (name_start, name, open) = locate_function_name(&text)?;
    let close = matching_paren(&text, open)?;
    let prefix = &text[..name_start];
    if prefix.contains('=') || prefix.contains('(') {
        return None;
    }

    let mut header = FunctionHeader {
        name,
        parameters: parse_parameters(&text[open + 1..close]),
        ..FunctionHeader::default()
    };

    let mut words = prefix.split_whitespace().peekable();
    while let Some(word) = words.peek() {
        match *word {
            "static" => header.is_static = true,
            "constexpr" | "consteval" => header.constexpr = true,
            "explicit" => header.explicit = true,
            "inline" | "virtual" | "friend" => {}
            _ => break,
        }
        words.next();
    }
    header.ty = normalize_type(&words.collect::<Vec<_>>().join(" "));

    parse_function_suffix(&text[close + 1..], &mut header);
    Some(header)
}

fn locate_function_name(text: &str) -> Option<(usize, String, usize)> {
    if let Some(pos) = find_word(text, "operator") {
        let after = &text[pos + "operator".len()..];
        let trimmed = after.trim_start();
        let offset = pos + "operator".len() + (after.len() - trimmed.len());
        let (op, open) = if trimmed.starts_with("()") {
            ("()".to_string(), offset + trimmed[2..].find('(')? + 2)
        } else {
            let paren = trimmed.find('(')?;
            (trimmed[..paren].trim().to_string(), offset + paren)
        };
        let name = if op.starts_with(|c: char| c.is_alphanumeric() || c == '_') {
            format!("operator {}", normalize_type(&op))
        } else {
            format!("operator{op}")
        };
        return Some((pos, name, open));
    }

    let open = first_top_level_paren(text)?;
    if text[open + 1..].trim_start().starts_with('*') {
        return None;
    }
    let before = text[..open].trim_end();
    let start = before
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_alphanumeric() || matches!(c, '_' | ':' | '~'))
        .last()
        .map(|(i, _)| i)?;
    let name = before[start..].to_string();
    let bare = name.trim_start_matches('~');
    if bare.is_empty() || bare.starts_with(|c: char| c.is_ascii_digit()) || NOT_FUNCTIONS.contains(&bare) {
        return None;
    }
    Some((start, name, open))
}

fn find_word(text: &str, word: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(rel) = text[from..].find(word) {
        let pos = from + rel;
        let before_ok = text[..pos]
            .chars()
            .last()
            .map_or(true, |c| !(c.is_alphanumeric() || c == '_'));
        let after_ok = text[pos + word.len()..]
            .chars()
            .next()
            .map_or(true, |c| !(c.is_alphanumeric() || c == '_'));
        if before_ok && after_ok {
            return Some(pos);
        }
        from = pos + word.len();
    }
    None
}

fn first_top_level_paren(text: &str) -> Option<usize> {
    let mut angle = 0i32;
    for (i, c) in text.char_indices() {
        match c {
            '<' => angle += 1,
            '>' => angle = (angle - 1).max(0),
            '(' if angle == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

/// Byte index of the parenthesis closing the one at `open`.
pub fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0i32;
    for (i, c) in text[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_function_suffix(suffix: &str, header: &mut FunctionHeader) {
    let mut rest = suffix.trim();
    while !rest.is_empty() {
        if let Some(tail) = rest.strip_prefix("const") {
            header.immutable = true;
            rest = tail.trim_start();
        } else if let Some(tail) = rest.strip_prefix("&&") {
            header.reference = 2;
            rest = tail.trim_start();
        } else if let Some(tail) = rest.strip_prefix('&') {
            header.reference = 1;
            rest = tail.trim_start();
        } else if let Some(tail) = rest.strip_prefix("noexcept") {
            rest = tail.trim_start();
            if rest.starts_with('(') {
                let close = matching_paren(rest, 0).unwrap_or(rest.len() - 1);
                rest = rest[close + 1..].trim_start();
            }
        } else if let Some(tail) = rest.strip_prefix("override").or_else(|| rest.strip_prefix("final")) {
            rest = tail.trim_start();
        } else if let Some(tail) = rest.strip_prefix('=') {
            let value = tail.trim();
            header.defaulted = value.starts_with("default");
            header.deleted = value.starts_with("delete");
            break;
        } else {
            break;
        }
    }
}

/// Result of analysing a variable or field declaration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VarDecl {
    pub name: String,
    pub ty: String,
    pub value: Option<String>,
    pub constexpr: bool,
    pub is_static: bool,
}

/// Analyse `(modifiers) type name (= value)` text, without the terminating `;`.
pub fn parse_var(text: &str) -> Option<VarDecl> {
    let text = strip_annotations(text);
    let text = text.trim_end_matches(';').trim();
    let (decl, value) = split_default(text);
    let mut var = VarDecl {
        value,
        ..VarDecl::default()
    };
    let mut words = decl.split_whitespace().peekable();
    while let Some(word) = words.peek() {
        match *word {
            "static" => var.is_static = true,
            "constexpr" => var.constexpr = true,
            "inline" | "thread_local" | "mutable" => {}
            _ => break,
        }
        words.next();
    }
    let decl = words.collect::<Vec<_>>().join(" ");
    let (ty, name) = split_declarator(&decl);
    if decl.contains('(') && !ty.contains("(*)") {
        return None;
    }
    if name.is_empty() || ty.is_empty() || !is_identifier(&name) {
        return None;
    }
    var.ty = ty;
    var.name = name;
    Some(var)
}

/// A function pointer typedef or alias.
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackDecl {
    pub name: String,
    pub ty: String,
    pub parameters: Vec<Parameter>,
}

/// Analyse `typedef RET (*NAME)(PARAMS)`, a bare `RET (*NAME)(PARAMS)` field or
/// `using NAME = RET (*)(PARAMS)`.
pub fn parse_callback(text: &str) -> Option<CallbackDecl> {
    let text = strip_annotations(text);
    let text = text.trim_end_matches(';').trim();
    let caps = USING_FUNCTION_POINTER
        .captures(text)
        .or_else(|| FUNCTION_POINTER.captures(text))?;
    Some(CallbackDecl {
        name: caps["name"].to_string(),
        ty: normalize_type(&caps["ret"]),
        parameters: parse_parameters(&caps["params"]),
    })
}

/// A preprocessor macro definition.
#[derive(Debug, Clone, PartialEq)]
pub struct MacroDef {
    pub name: String,
    pub parameters: Option<Vec<Parameter>>,
    pub value: String,
    pub trailing_doc: Option<String>,
}

/// Analyse a `#define` directive. Continuation lines must already be joined.
pub fn parse_define(text: &str) -> Option<MacroDef> {
    let caps = DEFINE.captures(text.trim())?;
    let parameters = caps.name("params").map(|params| {
        let inner = params.as_str().trim_start_matches('(').trim_end_matches(')');
        if inner.trim().is_empty() {
            Vec::new()
        } else {
            inner
                .split(',')
                .map(|name| Parameter::new(name.trim(), ""))
                .collect()
        }
    });
    let mut value = caps["value"].to_string();
    let mut trailing_doc = None;
    if let Some(doc) = TRAILING_DOC.captures(&value) {
        let text = doc.name("block").or_else(|| doc.name("line")).map_or("", |m| m.as_str());
        trailing_doc = Some(collapse_whitespace(text));
        let start = doc.get(0).map_or(value.len(), |m| m.start());
        value.truncate(start);
    }
    let value = PLAIN_COMMENT.replace_all(&value, "");
    Some(MacroDef {
        name: caps["name"].to_string(),
        parameters,
        value: value.trim().to_string(),
        trailing_doc,
    })
}

/// Pull a same-line trailing doc comment (`/**< … */` or `///< …`) off a declaration line.
pub fn split_trailing_doc(text: &str) -> (String, Option<String>) {
    match TRAILING_DOC.captures(text) {
        Some(doc) => {
            let body = doc.name("block").or_else(|| doc.name("line")).map_or("", |m| m.as_str());
            let start = doc.get(0).map_or(text.len(), |m| m.start());
            (text[..start].to_string(), Some(collapse_whitespace(body)))
        }
        None => (text.to_string(), None),
    }
}
