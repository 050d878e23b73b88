//! Token definitions for the header tokenizer
//!
//! A [FileToken] covers one or more physical lines. Spans are 1-based and `end` is exclusive,
//! so a single-line token at line 3 has `begin == 3` and `end == 4`.

use crate::model::Since;
use crate::parser::decl::{CallbackDecl, FunctionHeader, MacroDef, VarDecl};

#[derive(Debug, Clone, PartialEq)]
pub struct FileToken {
    pub begin: usize,
    pub end: usize,
    /// Leading indentation width of the first line.
    pub spaces: usize,
    pub kind: TokenKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKeyword {
    Struct,
    Class,
    Union,
    Enum,
}

impl BlockKeyword {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "struct" => Some(BlockKeyword::Struct),
            "class" => Some(BlockKeyword::Class),
            "union" => Some(BlockKeyword::Union),
            "enum" => Some(BlockKeyword::Enum),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Doc comment body, delimiters stripped. `trailing` marks `/**<` and `///<` comments.
    Doc { text: String, trailing: bool },
    Def(MacroDef),
    Include { path: String, local: bool },
    Alias { name: String, ty: String },
    Callback(CallbackDecl),
    /// Opener of a braced type body. `typedef` marks legacy C `typedef struct X {` blocks.
    Block {
        keyword: BlockKeyword,
        name: String,
        base: Option<String>,
        typedef: bool,
    },
    Forward { name: String, ty: Option<String> },
    Template { parameters: String },
    Namespace { name: String },
    Function { header: FunctionHeader, proto: bool },
    Var(VarDecl),
    Enumerator { name: String, value: Option<String> },
    /// Closing brace of a block, with the declarator after it (`} SDL_Point;`).
    EndStruct { name: Option<String> },
    EndNamespace,
    Since(Since),
    EndSince,
    /// `#pragma region impl`; nothing after it is tokenized.
    ImplMarker,
}

impl TokenKind {
    pub fn is_doc(&self) -> bool {
        matches!(self, TokenKind::Doc { .. })
    }

    /// Tokens that produce an entry of their own.
    pub fn is_declaration(&self) -> bool {
        matches!(
            self,
            TokenKind::Def(_)
                | TokenKind::Alias { .. }
                | TokenKind::Callback(_)
                | TokenKind::Block { .. }
                | TokenKind::Forward { .. }
                | TokenKind::Function { .. }
                | TokenKind::Var(_)
                | TokenKind::Enumerator { .. }
        )
    }

    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Doc { .. } => "doc",
            TokenKind::Def(_) => "def",
            TokenKind::Include { .. } => "include",
            TokenKind::Alias { .. } => "alias",
            TokenKind::Callback(_) => "callback",
            TokenKind::Block { .. } => "block",
            TokenKind::Forward { .. } => "forward",
            TokenKind::Template { .. } => "template",
            TokenKind::Namespace { .. } => "namespace",
            TokenKind::Function { .. } => "function",
            TokenKind::Var(_) => "var",
            TokenKind::Enumerator { .. } => "enumerator",
            TokenKind::EndStruct { .. } => "endStruct",
            TokenKind::EndNamespace => "endNamespace",
            TokenKind::Since(_) => "since",
            TokenKind::EndSince => "endSince",
            TokenKind::ImplMarker => "implMarker",
        }
    }
}
