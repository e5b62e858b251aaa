//! Resource identifiers.

use std::fmt;
use serde::{Deserialize, Serialize};

/// Identity key for every addressable definition.
///
/// Only `name` takes part in identity checks; the optional parts are carried
/// through to the tuning XML (`m`, `c` and `s` attributes) untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    pub name: String,

    /// Python-style module path of the tuning class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,

    /// Tuning class name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,

    /// Numeric tuning instance id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<u64>,
}

impl ResourceId {
    /// Creates a bare id with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: None,
            class_name: None,
            instance_id: None,
        }
    }

    /// Checks a name against `[A-Za-z0-9_]+`.
    pub fn is_valid_name(name: &str) -> bool {
        !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    pub fn has_valid_name(&self) -> bool {
        Self::is_valid_name(&self.name)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for ResourceId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}
