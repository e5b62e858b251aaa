//! Buffs, traits and localized strings.

use serde::{Deserialize, Serialize};

use super::ResourceId;

/// IR representation of a buff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buff {
    pub id: ResourceId,
    pub display_name_key: String,
    pub description_key: String,

    /// Duration in sim minutes; `None` means the buff does not time out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_sim_minutes: Option<u32>,

    /// Traits this buff is associated with, by name.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub traits: Vec<ResourceId>,
}

impl Buff {
    pub fn new(id: ResourceId) -> Self {
        Self {
            id,
            display_name_key: String::new(),
            description_key: String::new(),
            duration_sim_minutes: None,
            traits: Vec::new(),
        }
    }
}

/// IR representation of a trait.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trait {
    pub id: ResourceId,
    pub display_name_key: String,
    pub description_key: String,

    /// Buffs granted by this trait. Weak references into `ProjectIR.buffs`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buffs: Vec<ResourceId>,
}

impl Trait {
    pub fn new(id: ResourceId) -> Self {
        Self {
            id,
            display_name_key: String::new(),
            description_key: String::new(),
            buffs: Vec::new(),
        }
    }
}

/// One string table entry. `key` is unique per locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedString {
    pub key: String,
    pub text: String,
    pub locale: String,
}

impl LocalizedString {
    pub fn new(key: impl Into<String>, text: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            text: text.into(),
            locale: locale.into(),
        }
    }
}
