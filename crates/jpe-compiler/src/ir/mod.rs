//! Language-agnostic intermediate representation.
//!
//! This IR is produced by both front-ends (JPE text and tuning XML) and
//! consumed by the validator and both back-ends. It is plain data: cross
//! references between entities are stored by name and only resolved by the
//! validator, so a half-built project is always representable.

mod artifact;
mod entity;
mod enums;
mod interaction;
mod resource;

pub use artifact::ArtifactKind;
pub use entity::{Buff, LocalizedString, Trait};
pub use enums::{EnumDefinition, EnumOption, EnumValue};
pub use interaction::{Interaction, LootAction, Participant, Test};
pub use resource::ResourceId;

use serde::{Deserialize, Serialize};

/// Locale assigned to strings that do not declare one.
pub const DEFAULT_LOCALE: &str = "en_US";

/// Project-level metadata from the `[Project]` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    /// Human readable project name.
    pub name: String,

    /// Identifier used for artifact names; same pattern as `ResourceId.name`.
    pub project_id: String,

    /// Semantic version string (`major.minor.patch`).
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

impl ProjectMetadata {
    /// Returns true once any metadata field has been set.
    pub fn is_declared(&self) -> bool {
        *self != Self::default()
    }
}

/// The complete project IR: the aggregate root every stage works on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectIR {
    pub metadata: ProjectMetadata,
    pub interactions: Vec<Interaction>,
    pub buffs: Vec<Buff>,
    pub traits: Vec<Trait>,
    pub enums: Vec<EnumDefinition>,
    pub localized_strings: Vec<LocalizedString>,
}

impl ProjectIR {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_interaction(&mut self, interaction: Interaction) {
        self.interactions.push(interaction);
    }

    pub fn add_buff(&mut self, buff: Buff) {
        self.buffs.push(buff);
    }

    pub fn add_trait(&mut self, tr: Trait) {
        self.traits.push(tr);
    }

    pub fn add_enum(&mut self, definition: EnumDefinition) {
        self.enums.push(definition);
    }

    pub fn add_string(&mut self, string: LocalizedString) {
        self.localized_strings.push(string);
    }

    /// Total number of entities across all collections.
    pub fn entity_count(&self) -> usize {
        self.interactions.len()
            + self.buffs.len()
            + self.traits.len()
            + self.enums.len()
            + self.localized_strings.len()
    }

    /// True when no metadata was declared and every collection is empty.
    pub fn is_empty(&self) -> bool {
        !self.metadata.is_declared() && self.entity_count() == 0
    }

    /// Number of entities in the collection backing `kind`.
    pub fn count_of(&self, kind: ArtifactKind) -> usize {
        match kind {
            ArtifactKind::Interaction => self.interactions.len(),
            ArtifactKind::Buff => self.buffs.len(),
            ArtifactKind::Trait => self.traits.len(),
            ArtifactKind::EnumTuning => self.enums.len(),
            ArtifactKind::StringTable => self.localized_strings.len(),
        }
    }

    /// Whether a localized string with `key` exists in any locale.
    pub fn has_string_key(&self, key: &str) -> bool {
        self.localized_strings.iter().any(|s| s.key == key)
    }
}
