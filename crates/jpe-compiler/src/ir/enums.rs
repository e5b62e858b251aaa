//! Enum tuning intermediate representation.

use std::fmt;
use serde::{Deserialize, Serialize};

use super::ResourceId;

/// Value of an enum option: integer or free text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    Int(i64),
    Text(String),
}

impl EnumValue {
    /// Type tag written to the `type` attribute in XML.
    pub fn type_tag(&self) -> &'static str {
        match self {
            EnumValue::Int(_) => "int",
            EnumValue::Text(_) => "text",
        }
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumValue::Int(v) => write!(f, "{}", v),
            EnumValue::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumOption {
    pub name: String,
    pub value: EnumValue,
}

impl EnumOption {
    pub fn new(name: impl Into<String>, value: EnumValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// IR representation of an enum definition.
///
/// Options must be non-empty with unique names and unique values; the
/// validator enforces this, not the constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDefinition {
    pub id: ResourceId,
    pub options: Vec<EnumOption>,
}

impl EnumDefinition {
    pub fn new(id: ResourceId) -> Self {
        Self {
            id,
            options: Vec::new(),
        }
    }
}
