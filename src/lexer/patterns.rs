//! Declaration shapes recognized by the tokenizer
//!
//! The scanner isolates statement text; these helpers decide what a statement is. Everything
//! that needs a real declarator analysis is delegated to [crate::parser::decl].

use once_cell::sync::Lazy;
use regex::Regex;

use super::tokens::{BlockKeyword, TokenKind};
use crate::model::Since;
use crate::parser::decl::{self, normalize_type, split_declarator, strip_annotations};

static BLOCK_OPENER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<typedef>typedef\s+)?(?P<keyword>struct|class|union|enum)(?:\s+class)?(?:\s+(?P<name>[A-Za-z_]\w*))?(?:\s+final)?\s*(?::\s*(?P<base>.+))?$",
    )
    .unwrap()
});

static FORWARD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:struct|class|union|enum)(?:\s+class)?\s+(?P<name>[A-Za-z_]\w*)$").unwrap());

static TYPEDEF_FORWARD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^typedef\s+(?P<keyword>struct|union|enum)\s+(?P<tag>[A-Za-z_]\w*)\s+(?P<name>[A-Za-z_]\w*)$")
        .unwrap()
});

static USING_ALIAS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?s)using\s+(?P<name>[A-Za-z_]\w*)\s*=\s*(?P<ty>.+)$").unwrap());

static NAMESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:inline\s+)?namespace(?:\s+(?P<name>[A-Za-z_][\w:]*))?$").unwrap());

static EXTERN_C: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^extern\s+"C(?:\+\+)?"$"#).unwrap());

static SINCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#\s*if\s+(?P<tag>[A-Z][A-Z0-9]*)_VERSION_ATLEAST\(\s*(?P<major>\d+)\s*,\s*(?P<minor>\d+)\s*,\s*(?P<patch>\d+)\s*\)\s*$")
        .unwrap()
});

static INCLUDE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^#\s*include\s*(?:<(?P<system>[^>]+)>|"(?P<local>[^"]+)")"#).unwrap());

static ACCESS_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:public|private|protected)\s*:").unwrap());

static ENUMERATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?s)(?P<name>[A-Za-z_]\w*)\s*(?:=\s*(?P<value>.+))?$").unwrap());

/// Statement prefixes that are skipped without a warning.
const IGNORABLE_PREFIXES: &[&str] = &[
    "using namespace",
    "static_assert",
    "friend ",
    "SDL_COMPILE_TIME_ASSERT",
    "__attribute__",
];

/// The directive classes the scanner reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    Define,
    Include { path: String, local: bool },
    Since(Since),
    If,
    EndIf,
    ImplMarker,
    Other,
}

pub fn classify_directive(text: &str) -> Directive {
    let compact = text.trim();
    let keyword = compact
        .trim_start_matches('#')
        .trim_start()
        .split(|c: char| !c.is_alphanumeric())
        .next()
        .unwrap_or("");
    match keyword {
        "define" => Directive::Define,
        "include" => match INCLUDE.captures(compact) {
            Some(caps) => match (caps.name("system"), caps.name("local")) {
                (Some(path), _) => Directive::Include {
                    path: path.as_str().to_string(),
                    local: false,
                },
                (_, Some(path)) => Directive::Include {
                    path: path.as_str().to_string(),
                    local: true,
                },
                _ => Directive::Other,
            },
            None => Directive::Other,
        },
        "if" => match SINCE.captures(compact) {
            Some(caps) => Directive::Since(Since {
                tag: caps["tag"].to_string(),
                major: caps["major"].parse().unwrap_or(0),
                minor: caps["minor"].parse().unwrap_or(0),
                patch: caps["patch"].parse().unwrap_or(0),
            }),
            None => Directive::If,
        },
        "ifdef" | "ifndef" => Directive::If,
        "endif" => Directive::EndIf,
        "pragma" if is_impl_marker(compact) => Directive::ImplMarker,
        _ => Directive::Other,
    }
}

/// Tokens produced by a complete (continuation-joined) directive line.
///
/// `conditionals` tracks the open `#if`s, `true` for version gates, so that only the `#endif`
/// of a gate produces `EndSince`. `None` means a `#define` that could not be analysed.
pub fn directive_tokens(text: &str, conditionals: &mut Vec<bool>) -> Option<Vec<TokenKind>> {
    let kinds = match classify_directive(text) {
        Directive::Define => {
            let mut def = decl::parse_define(text)?;
            if def.name.ends_with('_') {
                return Some(Vec::new());
            }
            let trailing = def.trailing_doc.take();
            let mut kinds = vec![TokenKind::Def(def)];
            if let Some(text) = trailing {
                kinds.push(TokenKind::Doc { text, trailing: true });
            }
            kinds
        }
        Directive::Include { path, local } => vec![TokenKind::Include { path, local }],
        Directive::Since(since) => {
            conditionals.push(true);
            vec![TokenKind::Since(since)]
        }
        Directive::If => {
            conditionals.push(false);
            Vec::new()
        }
        Directive::EndIf => match conditionals.pop() {
            Some(true) => vec![TokenKind::EndSince],
            _ => Vec::new(),
        },
        Directive::ImplMarker => vec![TokenKind::ImplMarker],
        Directive::Other => Vec::new(),
    };
    Some(kinds)
}

pub fn is_impl_marker(text: &str) -> bool {
    let mut words = text.trim().trim_start_matches('#').split_whitespace();
    words.next() == Some("pragma") && words.next() == Some("region") && words.next() == Some("impl")
}

pub fn is_forward_sentinel(comment: &str) -> bool {
    comment.trim().eq_ignore_ascii_case("// forward decl")
}

/// Length of a leading `public:`-style label, if any.
pub fn access_label_len(text: &str) -> Option<usize> {
    ACCESS_LABEL.find(text).map(|m| m.end())
}

pub fn is_ignorable(text: &str) -> bool {
    IGNORABLE_PREFIXES.iter().any(|prefix| text.starts_with(prefix))
}

/// What a statement terminated by `{` opens.
#[derive(Debug, Clone, PartialEq)]
pub enum Opener {
    ExternC,
    Namespace(String),
    Block(TokenKind),
    Function(TokenKind),
    Initializer,
    Unknown,
}

pub fn classify_opener(text: &str, in_aggregate: bool) -> Opener {
    if EXTERN_C.is_match(&decl::collapse_whitespace(text)) {
        return Opener::ExternC;
    }
    let text = strip_annotations(text);
    if let Some(caps) = NAMESPACE.captures(&text) {
        return Opener::Namespace(caps.name("name").map_or("", |m| m.as_str()).to_string());
    }
    if let Some(caps) = BLOCK_OPENER.captures(&text) {
        if let Some(keyword) = BlockKeyword::from_keyword(&caps["keyword"]) {
            return Opener::Block(TokenKind::Block {
                keyword,
                name: caps.name("name").map_or("", |m| m.as_str()).to_string(),
                base: caps.name("base").map(|m| normalize_type(m.as_str())),
                typedef: caps.name("typedef").is_some(),
            });
        }
    }
    if decl::split_default(&text).1.is_some() && decl::parse_function_header(&text).is_none() {
        return Opener::Initializer;
    }
    match function(&text, in_aggregate, false) {
        Some(kind) => Opener::Function(kind),
        None => Opener::Unknown,
    }
}

/// Classify a statement terminated by `;`.
pub fn classify_statement(text: &str, in_aggregate: bool, forward_group: bool) -> Option<TokenKind> {
    let text = strip_annotations(text);
    if text.is_empty() {
        return None;
    }
    let kind = declaration(&text, in_aggregate)?;
    if forward_group {
        if let TokenKind::Alias { name, ty } = kind {
            return Some(TokenKind::Forward { name, ty: Some(ty) });
        }
    }
    Some(kind)
}

fn declaration(text: &str, in_aggregate: bool) -> Option<TokenKind> {
    if let Some(rest) = text.strip_prefix("typedef ") {
        if let Some(callback) = decl::parse_callback(text) {
            return Some(TokenKind::Callback(callback));
        }
        if let Some(caps) = TYPEDEF_FORWARD.captures(text) {
            let name = caps["name"].to_string();
            if caps["tag"] == caps["name"] {
                return Some(TokenKind::Forward { name, ty: None });
            }
            return Some(TokenKind::Alias {
                name,
                ty: format!("{} {}", &caps["keyword"], &caps["tag"]),
            });
        }
        let (ty, name) = split_declarator(rest);
        if name.is_empty() || ty.is_empty() {
            return None;
        }
        return Some(TokenKind::Alias { name, ty });
    }
    if text.starts_with("using ") {
        if let Some(callback) = decl::parse_callback(text) {
            return Some(TokenKind::Callback(callback));
        }
        let caps = USING_ALIAS.captures(text)?;
        return Some(TokenKind::Alias {
            name: caps["name"].to_string(),
            ty: normalize_type(&caps["ty"]),
        });
    }
    if let Some(caps) = FORWARD.captures(text) {
        return Some(TokenKind::Forward {
            name: caps["name"].to_string(),
            ty: None,
        });
    }
    if let Some(kind) = function(text, in_aggregate, true) {
        return Some(kind);
    }
    decl::parse_var(text).map(TokenKind::Var)
}

fn function(text: &str, in_aggregate: bool, proto: bool) -> Option<TokenKind> {
    let header = decl::parse_function_header(text)?;
    // Outside aggregates a declaration without return type is a macro invocation.
    if header.ty.is_empty() && !in_aggregate {
        return None;
    }
    let proto = proto && !header.deleted && !header.defaulted;
    Some(TokenKind::Function { header, proto })
}

pub fn parse_enumerator(text: &str) -> Option<TokenKind> {
    let text = decl::collapse_whitespace(text);
    let caps = ENUMERATOR.captures(&text)?;
    Some(TokenKind::Enumerator {
        name: caps["name"].to_string(),
        value: caps.name("value").map(|m| m.as_str().trim().to_string()),
    })
}

/// Declarator name after a closing brace: `} SDL_Point;` → `SDL_Point`.
pub fn closing_name(text: &str) -> Option<String> {
    let name = text
        .trim_start_matches('}')
        .trim()
        .trim_end_matches(';')
        .split(',')
        .next()?
        .trim()
        .to_string();
    decl::is_identifier(&name).then_some(name)
}
