//! Artifact kinds: one generated XML document per entity collection.

use std::fmt;
use serde::{Deserialize, Serialize};

/// The kind of a generated XML document.
///
/// Ordering follows declaration order and is used wherever artifacts are
/// iterated, so output order is stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ArtifactKind {
    Interaction,
    Buff,
    Trait,
    EnumTuning,
    StringTable,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 5] = [
        ArtifactKind::Interaction,
        ArtifactKind::Buff,
        ArtifactKind::Trait,
        ArtifactKind::EnumTuning,
        ArtifactKind::StringTable,
    ];

    /// Root element of the document.
    pub fn root_element(&self) -> &'static str {
        match self {
            ArtifactKind::Interaction => "InteractionTuning",
            ArtifactKind::Buff => "BuffTuning",
            ArtifactKind::Trait => "TraitTuning",
            ArtifactKind::EnumTuning => "EnumTuning",
            ArtifactKind::StringTable => "StringTable",
        }
    }

    /// Element used for each entity inside the root.
    pub fn entity_element(&self) -> &'static str {
        match self {
            ArtifactKind::Interaction => "Interaction",
            ArtifactKind::Buff => "Buff",
            ArtifactKind::Trait => "Trait",
            ArtifactKind::EnumTuning => "Enum",
            ArtifactKind::StringTable => "String",
        }
    }

    /// File name stem, as in `<project>_<stem>.xml`.
    pub fn file_stem(&self) -> &'static str {
        match self {
            ArtifactKind::Interaction => "interactions",
            ArtifactKind::Buff => "buffs",
            ArtifactKind::Trait => "traits",
            ArtifactKind::EnumTuning => "enums",
            ArtifactKind::StringTable => "strings",
        }
    }

    /// Parse a kind from its file stem or root element name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.file_stem() == name || kind.root_element() == name)
    }

    /// Guess the kind of an artifact file from its name (`test_mod_buffs.xml`).
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let stem = file_name.strip_suffix(".xml")?;
        Self::ALL.into_iter().find(|kind| {
            stem == kind.file_stem() || stem.ends_with(&format!("_{}", kind.file_stem()))
        })
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}
