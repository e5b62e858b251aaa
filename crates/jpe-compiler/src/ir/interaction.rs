//! Interaction intermediate representation.

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

use super::ResourceId;

/// A named actor slot in an interaction (e.g. "initiator", "target").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub role: String,
    pub description: String,
}

/// A precondition gating whether an interaction is offered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Test {
    #[serde(rename = "type")]
    pub kind: String,
    pub parameters: BTreeMap<String, String>,
}

/// An effect applied when an interaction completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootAction {
    #[serde(rename = "type")]
    pub kind: String,
    pub parameters: BTreeMap<String, String>,
}

/// IR representation of an interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub id: ResourceId,

    /// String table key of the display name.
    pub display_name_key: String,

    /// String table key of the description.
    pub description_key: String,

    /// Actor slots, in declaration order. The validator requires at least one.
    pub participants: Vec<Participant>,

    pub tests: Vec<Test>,

    pub loot_actions: Vec<LootAction>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autonomy_disabled: Option<bool>,
}

impl Interaction {
    pub fn new(id: ResourceId) -> Self {
        Self {
            id,
            display_name_key: String::new(),
            description_key: String::new(),
            participants: Vec::new(),
            tests: Vec::new(),
            loot_actions: Vec::new(),
            autonomy_disabled: None,
        }
    }
}
