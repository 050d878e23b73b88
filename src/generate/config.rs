//! Generator settings

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::Parameter;
use crate::parser::decl::normalize_type;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateConfig {
    /// The namespace wrapping every generated entry.
    pub namespace: String,
    /// Argument adaptation when delegating to an entry's source name, keyed by parameter type.
    /// `$` stands for the parameter name.
    pub param_replacements: IndexMap<String, String>,
    /// Argument adaptation when delegating through `hints.delegate`.
    pub delegate_param_replacements: IndexMap<String, String>,
    /// Column budget for doc comments.
    pub width: usize,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            namespace: "SDL".to_string(),
            param_replacements: IndexMap::new(),
            delegate_param_replacements: IndexMap::new(),
            width: 80,
        }
    }
}

impl GenerateConfig {
    /// The call argument passing `parameter` on.
    pub fn argument(&self, parameter: &Parameter, explicit_delegate: bool) -> String {
        let table = if explicit_delegate {
            &self.delegate_param_replacements
        } else {
            &self.param_replacements
        };
        match table.get(&normalize_type(&parameter.ty)) {
            Some(replacement) => replacement.replace('$', &parameter.name),
            None => parameter.name.clone(),
        }
    }
}
