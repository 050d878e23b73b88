//! Entries of the API model
//!
//! An [ApiEntry] is a tagged variant record: the `kind` key of its JSON form selects the
//! [EntryKind] variant, while documentation, version gate, hints, line tracking and the overload
//! link are shared by every kind.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::doc::Doc;
use super::hints::Hints;

/// Ordered map of entries, keyed by name. Insertion order is declaration order.
pub type ApiEntries = IndexMap<String, ApiEntry>;

/// One named declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEntry {
    pub name: String,
    #[serde(flatten)]
    pub kind: EntryKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<Doc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<Since>,
    /// Name of the entity this entry was derived from, used as the implicit delegation target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
    #[serde(default, skip_serializing_if = "Hints::is_empty")]
    pub hints: Hints,
    /// First line of the entry, including its attached documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub begin: Option<usize>,
    /// First line of the declaration proper.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decl: Option<usize>,
    /// One past the last line of the entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overload: Option<Box<ApiEntry>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EntryKind {
    Alias {
        #[serde(rename = "type")]
        ty: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        template: Option<String>,
    },
    Def {
        /// `None` is an object-like macro, `Some(vec![])` a function-like one without parameters.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parameters: Option<Vec<Parameter>>,
        #[serde(default)]
        value: String,
    },
    Enum {
        #[serde(default)]
        entries: ApiEntries,
    },
    Struct(Aggregate),
    Union(Aggregate),
    Function(Function),
    Var(Var),
    Callback {
        #[serde(rename = "type")]
        ty: String,
        #[serde(default)]
        parameters: Vec<Parameter>,
    },
    Forward {
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        ty: Option<String>,
    },
    Ns {
        #[serde(default)]
        entries: ApiEntries,
    },
}

/// Body of a `struct` or `union` entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    /// Base class list.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    #[serde(default)]
    pub entries: ApiEntries,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Function {
    /// Return type. Absent renders a placeholder; empty means constructor-like.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub constexpr: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub immutable: bool,
    #[serde(rename = "static", default, skip_serializing_if = "is_false")]
    pub is_static: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub explicit: bool,
    /// Ref-qualifier: 0 none, 1 `&`, 2 `&&`.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub reference: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    /// Declared without a body.
    #[serde(default, skip_serializing_if = "is_false")]
    pub proto: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Var {
    #[serde(rename = "type", default)]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub constexpr: bool,
    #[serde(rename = "static", default, skip_serializing_if = "is_false")]
    pub is_static: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            default: None,
        }
    }
}

/// Version gate, rendered as `#if TAG_VERSION_ATLEAST(major, minor, patch)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Since {
    #[serde(default = "default_since_tag")]
    pub tag: String,
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Since {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            tag: default_since_tag(),
            major,
            minor,
            patch,
        }
    }
}

fn default_since_tag() -> String {
    "SDL".to_string()
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_zero(value: &u8) -> bool {
    *value == 0
}

impl EntryKind {
    /// The JSON tag of this kind.
    pub fn name(&self) -> &'static str {
        match self {
            EntryKind::Alias { .. } => "alias",
            EntryKind::Def { .. } => "def",
            EntryKind::Enum { .. } => "enum",
            EntryKind::Struct(_) => "struct",
            EntryKind::Union(_) => "union",
            EntryKind::Function(_) => "function",
            EntryKind::Var(_) => "var",
            EntryKind::Callback { .. } => "callback",
            EntryKind::Forward { .. } => "forward",
            EntryKind::Ns { .. } => "ns",
        }
    }
}

impl ApiEntry {
    pub fn new(name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
            doc: None,
            since: None,
            source_name: None,
            hints: Hints::default(),
            begin: None,
            decl: None,
            end: None,
            overload: None,
        }
    }

    pub fn function(name: impl Into<String>, ty: impl Into<String>, parameters: Vec<Parameter>) -> Self {
        Self::new(
            name,
            EntryKind::Function(Function {
                ty: Some(ty.into()),
                parameters,
                ..Function::default()
            }),
        )
    }

    pub fn var(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self::new(
            name,
            EntryKind::Var(Var {
                ty: ty.into(),
                ..Var::default()
            }),
        )
    }

    pub fn alias(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self::new(
            name,
            EntryKind::Alias {
                ty: ty.into(),
                template: None,
            },
        )
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(Doc::Raw(doc.into()));
        self
    }

    pub fn has_doc(&self) -> bool {
        self.doc.as_ref().is_some_and(|doc| !doc.is_empty())
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind, EntryKind::Function(_))
    }

    pub fn as_function(&self) -> Option<&Function> {
        match &self.kind {
            EntryKind::Function(function) => Some(function),
            _ => None,
        }
    }

    /// Nested entries of aggregates, enums and namespaces.
    pub fn entries(&self) -> Option<&ApiEntries> {
        match &self.kind {
            EntryKind::Enum { entries } | EntryKind::Ns { entries } => Some(entries),
            EntryKind::Struct(aggregate) | EntryKind::Union(aggregate) => Some(&aggregate.entries),
            _ => None,
        }
    }

    pub fn entries_mut(&mut self) -> Option<&mut ApiEntries> {
        match &mut self.kind {
            EntryKind::Enum { entries } | EntryKind::Ns { entries } => Some(entries),
            EntryKind::Struct(aggregate) | EntryKind::Union(aggregate) => Some(&mut aggregate.entries),
            _ => None,
        }
    }

    /// Iterate this entry and every overload chained after it.
    pub fn variants(&self) -> Variants<'_> {
        Variants { next: Some(self) }
    }

    /// Append an overload at the tail of the chain.
    pub fn push_overload(&mut self, entry: ApiEntry) {
        if let Some(next) = self.overload.as_mut() {
            next.push_overload(entry);
        } else {
            self.overload = Some(Box::new(entry));
        }
    }

    /// Last line covered by the entry or any of its overloads.
    pub fn chain_end(&self) -> Option<usize> {
        self.variants().filter_map(|variant| variant.end).max()
    }
}

/// Iterator over an overload chain.
pub struct Variants<'a> {
    next: Option<&'a ApiEntry>,
}

impl<'a> Iterator for Variants<'a> {
    type Item = &'a ApiEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.overload.as_deref();
        Some(current)
    }
}
