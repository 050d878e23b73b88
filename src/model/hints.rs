//! Generation hints
//!
//! A hint bag carries directives for the generator: how to synthesize a body, what to delegate
//! to, whether to check errors. Hints are set by the transform engine (or written by hand in a
//! transform spec) and are never produced by the header parser.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<bool>,
    /// Literal replacement body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Constructor member-initializer list entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init: Option<Vec<String>>,
    /// Name of the underlying entity a wrapper forwards to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegate: Option<String>,
    /// Expression passed as the implicit first argument when delegating.
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_expr: Option<String>,
    /// Base class used by constructor delegation.
    #[serde(rename = "super", default, skip_serializing_if = "Option::is_none")]
    pub super_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub may_fail: Option<MayFail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrap_self: Option<bool>,
    #[serde(rename = "static", default, skip_serializing_if = "Option::is_none")]
    pub is_static: Option<bool>,
    /// Forward straight to the C entity without the self argument.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
    /// Access specifier label emitted before the member.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_access: Option<String>,
    /// Literal initializer for `var` entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// `true` wraps the delegated call in a generic error check, a string guards the check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MayFail {
    Check(bool),
    Guard(String),
}

impl Hints {
    pub fn is_empty(&self) -> bool {
        *self == Hints::default()
    }

    /// Merge `self` over `parent`: every key set on `self` wins, `parent` fills the gaps.
    pub fn over(&self, parent: &Hints) -> Hints {
        let mut extra = parent.extra.clone();
        extra.extend(self.extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        Hints {
            delete: self.delete.or(parent.delete),
            default: self.default.or(parent.default),
            body: self.body.clone().or_else(|| parent.body.clone()),
            init: self.init.clone().or_else(|| parent.init.clone()),
            delegate: self.delegate.clone().or_else(|| parent.delegate.clone()),
            self_expr: self.self_expr.clone().or_else(|| parent.self_expr.clone()),
            super_class: self.super_class.clone().or_else(|| parent.super_class.clone()),
            may_fail: self.may_fail.clone().or_else(|| parent.may_fail.clone()),
            wrap_self: self.wrap_self.or(parent.wrap_self),
            is_static: self.is_static.or(parent.is_static),
            raw: self.raw.or(parent.raw),
            private: self.private.or(parent.private),
            change_access: self.change_access.clone().or_else(|| parent.change_access.clone()),
            value: self.value.clone().or_else(|| parent.value.clone()),
            extra,
        }
    }

    pub fn is_delete(&self) -> bool {
        self.delete == Some(true)
    }

    pub fn is_default(&self) -> bool {
        self.default == Some(true)
    }

    pub fn is_static(&self) -> bool {
        self.is_static == Some(true)
    }

    pub fn is_raw(&self) -> bool {
        self.raw == Some(true)
    }

    pub fn is_private(&self) -> bool {
        self.private == Some(true)
    }

    pub fn wraps_self(&self) -> bool {
        self.wrap_self == Some(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_keys_win() {
        let parent: Hints = serde_json::from_str(r#"{"self": "get()", "mayFail": true}"#).unwrap();
        let child: Hints = serde_json::from_str(r#"{"mayFail": "x != nullptr"}"#).unwrap();
        let merged = child.over(&parent);
        assert_eq!(merged.self_expr.as_deref(), Some("get()"));
        assert_eq!(merged.may_fail, Some(MayFail::Guard("x != nullptr".to_string())));
    }

    #[test]
    fn test_unknown_keys_round_trip() {
        let hints: Hints = serde_json::from_str(r#"{"a": 1, "delegate": "SDL_Foo"}"#).unwrap();
        assert_eq!(hints.extra["a"], serde_json::json!(1));
        let json = serde_json::to_value(&hints).unwrap();
        assert_eq!(json, serde_json::json!({"a": 1, "delegate": "SDL_Foo"}));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let parent: Hints = serde_json::from_str(r#"{"a": 1, "b": 2}"#).unwrap();
        let child: Hints = serde_json::from_str(r#"{"b": 3}"#).unwrap();
        let once = child.over(&parent);
        assert_eq!(once.over(&parent), once);
    }
}
