//! Per-section field mapping tables.
//!
//! Each section type lists the keys it understands and a typed setter for
//! each. The parser looks keys up here instead of poking fields by name, so
//! unknown keys can be reported rather than silently accepted.

use std::collections::BTreeMap;

use super::values::{parse_bool, parse_text, split_pairs};
use crate::ir::{
    ArtifactKind, Buff, EnumDefinition, EnumOption, EnumValue, Interaction, LocalizedString,
    LootAction, Participant, ProjectMetadata, ResourceId, Test, Trait, DEFAULT_LOCALE,
};

/// How often a key may appear in one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Single,
    Repeated,
}

/// One key of a section: its canonical name, accepted aliases and setter.
pub struct FieldSpec<T> {
    pub key: &'static str,
    pub aliases: &'static [&'static str],
    pub cardinality: Cardinality,
    pub apply: fn(&mut T, &str) -> Result<(), String>,
}

impl<T> FieldSpec<T> {
    pub fn matches(&self, key: &str) -> bool {
        self.key == key || self.aliases.contains(&key)
    }
}

/// A value type that one JPE section entry accumulates into.
pub trait SectionEntry: Sized + 'static {
    /// Section header as written in source.
    const SECTION: &'static str;

    /// Key without which an entry is discarded.
    const REQUIRED_KEY: Option<&'static str>;

    fn blank() -> Self;

    /// Key tables, consulted in order.
    fn tables() -> &'static [&'static [FieldSpec<Self>]];

    /// Looks up a (normalised) key.
    fn field(key: &str) -> Option<&'static FieldSpec<Self>> {
        Self::tables()
            .iter()
            .flat_map(|table| table.iter())
            .find(|field| field.matches(key))
    }

    /// Canonical keys, for "known keys" hints.
    fn known_keys() -> Vec<&'static str> {
        Self::tables()
            .iter()
            .flat_map(|table| table.iter())
            .map(|field| field.key)
            .collect()
    }
}

/// Entity sections that become one XML artifact each.
pub trait EntitySection: SectionEntry {
    const KIND: ArtifactKind;
}

// =============================================================================
// Setters
// =============================================================================

fn parse_u32(value: &str) -> Result<u32, String> {
    value
        .parse::<u32>()
        .map_err(|_| format!("expected a non-negative integer, found `{}`", value))
}

fn parse_u64(value: &str) -> Result<u64, String> {
    value
        .parse::<u64>()
        .map_err(|_| format!("expected a non-negative integer, found `{}`", value))
}

fn parse_participant(value: &str) -> Result<Participant, String> {
    let mut role = None;
    let mut description = String::new();
    for pair in split_pairs(value)? {
        match pair.key.as_str() {
            "role" => role = Some(pair.value),
            "description" => description = pair.value,
            other => return Err(format!("unknown participant field `{}`", other)),
        }
    }
    let role = role.ok_or_else(|| "participant needs a `role`".to_string())?;
    Ok(Participant { role, description })
}

/// Splits `type:x, a:b, ...` into the type and the remaining parameters.
fn parse_typed_params(value: &str, what: &str) -> Result<(String, BTreeMap<String, String>), String> {
    let mut kind = None;
    let mut parameters = BTreeMap::new();
    for pair in split_pairs(value)? {
        if pair.key == "type" {
            kind = Some(pair.value);
        } else {
            parameters.insert(pair.key, pair.value);
        }
    }
    let kind = kind.ok_or_else(|| format!("{} needs a `type`", what))?;
    Ok((kind, parameters))
}

fn parse_option(value: &str) -> Result<EnumOption, String> {
    let mut name = None;
    let mut option_value = None;
    for pair in split_pairs(value)? {
        match pair.key.as_str() {
            "name" => name = Some(pair.value),
            "value" => {
                option_value = Some(match pair.value.parse::<i64>() {
                    Ok(int) if !pair.quoted => EnumValue::Int(int),
                    _ => EnumValue::Text(pair.value),
                })
            }
            other => return Err(format!("unknown option field `{}`", other)),
        }
    }
    let name = name.ok_or_else(|| "option needs a `name`".to_string())?;
    let value = option_value.ok_or_else(|| "option needs a `value`".to_string())?;
    Ok(EnumOption { name, value })
}

/// The `id`, `module`, `class` and `instance_id` keys every entity shares.
macro_rules! resource_fields {
    ($ty:ty) => {
        [
            FieldSpec::<$ty> {
                key: "id",
                aliases: &[],
                cardinality: Cardinality::Single,
                apply: |entry, value| {
                    entry.id.name = parse_text(value)?;
                    Ok(())
                },
            },
            FieldSpec::<$ty> {
                key: "module",
                aliases: &[],
                cardinality: Cardinality::Single,
                apply: |entry, value| {
                    entry.id.module = Some(parse_text(value)?);
                    Ok(())
                },
            },
            FieldSpec::<$ty> {
                key: "class",
                aliases: &["class_name"],
                cardinality: Cardinality::Single,
                apply: |entry, value| {
                    entry.id.class_name = Some(parse_text(value)?);
                    Ok(())
                },
            },
            FieldSpec::<$ty> {
                key: "instance_id",
                aliases: &["instance"],
                cardinality: Cardinality::Single,
                apply: |entry, value| {
                    entry.id.instance_id = Some(parse_u64(value)?);
                    Ok(())
                },
            },
        ]
    };
}

/// The display name and description keys of named entities.
macro_rules! text_key_fields {
    ($ty:ty) => {
        [
            FieldSpec::<$ty> {
                key: "display_name",
                aliases: &["display_name_key"],
                cardinality: Cardinality::Single,
                apply: |entry, value| {
                    entry.display_name_key = parse_text(value)?;
                    Ok(())
                },
            },
            FieldSpec::<$ty> {
                key: "description",
                aliases: &["description_key"],
                cardinality: Cardinality::Single,
                apply: |entry, value| {
                    entry.description_key = parse_text(value)?;
                    Ok(())
                },
            },
        ]
    };
}

// =============================================================================
// [Project]
// =============================================================================

static PROJECT_FIELDS: [FieldSpec<ProjectMetadata>; 7] = [
    FieldSpec {
        key: "name",
        aliases: &[],
        cardinality: Cardinality::Single,
        apply: |meta, value| {
            meta.name = parse_text(value)?;
            Ok(())
        },
    },
    FieldSpec {
        key: "id",
        aliases: &["project_id"],
        cardinality: Cardinality::Single,
        apply: |meta, value| {
            meta.project_id = parse_text(value)?;
            Ok(())
        },
    },
    FieldSpec {
        key: "version",
        aliases: &[],
        cardinality: Cardinality::Single,
        apply: |meta, value| {
            meta.version = parse_text(value)?;
            Ok(())
        },
    },
    FieldSpec {
        key: "author",
        aliases: &[],
        cardinality: Cardinality::Single,
        apply: |meta, value| {
            meta.author = Some(parse_text(value)?);
            Ok(())
        },
    },
    FieldSpec {
        key: "description",
        aliases: &[],
        cardinality: Cardinality::Single,
        apply: |meta, value| {
            meta.description = Some(parse_text(value)?);
            Ok(())
        },
    },
    FieldSpec {
        key: "created",
        aliases: &["created_date"],
        cardinality: Cardinality::Single,
        apply: |meta, value| {
            meta.created_date = Some(parse_text(value)?);
            Ok(())
        },
    },
    FieldSpec {
        key: "modified",
        aliases: &["last_modified"],
        cardinality: Cardinality::Single,
        apply: |meta, value| {
            meta.last_modified = Some(parse_text(value)?);
            Ok(())
        },
    },
];

static PROJECT_TABLES: &[&[FieldSpec<ProjectMetadata>]] = &[&PROJECT_FIELDS];

impl SectionEntry for ProjectMetadata {
    const SECTION: &'static str = "Project";
    const REQUIRED_KEY: Option<&'static str> = None;

    fn blank() -> Self {
        ProjectMetadata::default()
    }

    fn tables() -> &'static [&'static [FieldSpec<Self>]] {
        PROJECT_TABLES
    }
}

// =============================================================================
// [Interactions]
// =============================================================================

static INTERACTION_RESOURCE: [FieldSpec<Interaction>; 4] = resource_fields!(Interaction);
static INTERACTION_TEXT: [FieldSpec<Interaction>; 2] = text_key_fields!(Interaction);
static INTERACTION_OWN: [FieldSpec<Interaction>; 4] = [
    FieldSpec {
        key: "participant",
        aliases: &[],
        cardinality: Cardinality::Repeated,
        apply: |interaction, value| {
            interaction.participants.push(parse_participant(value)?);
            Ok(())
        },
    },
    FieldSpec {
        key: "test",
        aliases: &[],
        cardinality: Cardinality::Repeated,
        apply: |interaction, value| {
            let (kind, parameters) = parse_typed_params(value, "test")?;
            interaction.tests.push(Test { kind, parameters });
            Ok(())
        },
    },
    FieldSpec {
        key: "loot",
        aliases: &["loot_action"],
        cardinality: Cardinality::Repeated,
        apply: |interaction, value| {
            let (kind, parameters) = parse_typed_params(value, "loot")?;
            interaction.loot_actions.push(LootAction { kind, parameters });
            Ok(())
        },
    },
    FieldSpec {
        key: "autonomy_disabled",
        aliases: &[],
        cardinality: Cardinality::Single,
        apply: |interaction, value| {
            interaction.autonomy_disabled = Some(parse_bool(value)?);
            Ok(())
        },
    },
];

// =============================================================================
// [Buffs]
// =============================================================================

static BUFF_RESOURCE: [FieldSpec<Buff>; 4] = resource_fields!(Buff);
static BUFF_TEXT: [FieldSpec<Buff>; 2] = text_key_fields!(Buff);
static BUFF_OWN: [FieldSpec<Buff>; 2] = [
    FieldSpec {
        key: "duration",
        aliases: &["duration_sim_minutes"],
        cardinality: Cardinality::Single,
        apply: |buff, value| {
            buff.duration_sim_minutes = Some(parse_u32(value)?);
            Ok(())
        },
    },
    FieldSpec {
        key: "trait",
        aliases: &[],
        cardinality: Cardinality::Repeated,
        apply: |buff, value| {
            buff.traits.push(ResourceId::new(parse_text(value)?));
            Ok(())
        },
    },
];

// =============================================================================
// [Traits]
// =============================================================================

static TRAIT_RESOURCE: [FieldSpec<Trait>; 4] = resource_fields!(Trait);
static TRAIT_TEXT: [FieldSpec<Trait>; 2] = text_key_fields!(Trait);
static TRAIT_OWN: [FieldSpec<Trait>; 1] = [FieldSpec {
    key: "buff",
    aliases: &[],
    cardinality: Cardinality::Repeated,
    apply: |tr, value| {
        tr.buffs.push(ResourceId::new(parse_text(value)?));
        Ok(())
    },
}];

// =============================================================================
// [Enums]
// =============================================================================

static ENUM_RESOURCE: [FieldSpec<EnumDefinition>; 4] = resource_fields!(EnumDefinition);
static ENUM_OWN: [FieldSpec<EnumDefinition>; 1] = [FieldSpec {
    key: "option",
    aliases: &[],
    cardinality: Cardinality::Repeated,
    apply: |definition, value| {
        definition.options.push(parse_option(value)?);
        Ok(())
    },
}];

// =============================================================================
// [Strings]
// =============================================================================

static STRING_FIELDS: [FieldSpec<LocalizedString>; 3] = [
    FieldSpec {
        key: "key",
        aliases: &[],
        cardinality: Cardinality::Single,
        apply: |string, value| {
            string.key = parse_text(value)?;
            Ok(())
        },
    },
    FieldSpec {
        key: "text",
        aliases: &[],
        cardinality: Cardinality::Single,
        apply: |string, value| {
            string.text = parse_text(value)?;
            Ok(())
        },
    },
    FieldSpec {
        key: "locale",
        aliases: &[],
        cardinality: Cardinality::Single,
        apply: |string, value| {
            string.locale = parse_text(value)?;
            Ok(())
        },
    },
];

static STRING_TABLES: &[&[FieldSpec<LocalizedString>]] = &[&STRING_FIELDS];

impl SectionEntry for LocalizedString {
    const SECTION: &'static str = "Strings";
    const REQUIRED_KEY: Option<&'static str> = Some("key");

    fn blank() -> Self {
        LocalizedString::new("", "", DEFAULT_LOCALE)
    }

    fn tables() -> &'static [&'static [FieldSpec<Self>]] {
        STRING_TABLES
    }
}

impl EntitySection for LocalizedString {
    const KIND: ArtifactKind = ArtifactKind::StringTable;
}

/// Entity sections: the shared resource keys, then the text keys where the
/// entity has them, then its own keys.
macro_rules! entity_section {
    ($ty:ty, $section:literal, $kind:expr, $blank:expr, $tables:ident) => {
        impl SectionEntry for $ty {
            const SECTION: &'static str = $section;
            const REQUIRED_KEY: Option<&'static str> = Some("id");

            fn blank() -> Self {
                $blank
            }

            fn tables() -> &'static [&'static [FieldSpec<Self>]] {
                $tables
            }
        }

        impl EntitySection for $ty {
            const KIND: ArtifactKind = $kind;
        }
    };
}

static INTERACTION_TABLES: &[&[FieldSpec<Interaction>]] =
    &[&INTERACTION_RESOURCE, &INTERACTION_TEXT, &INTERACTION_OWN];
static BUFF_TABLES: &[&[FieldSpec<Buff>]] = &[&BUFF_RESOURCE, &BUFF_TEXT, &BUFF_OWN];
static TRAIT_TABLES: &[&[FieldSpec<Trait>]] = &[&TRAIT_RESOURCE, &TRAIT_TEXT, &TRAIT_OWN];
static ENUM_TABLES: &[&[FieldSpec<EnumDefinition>]] = &[&ENUM_RESOURCE, &ENUM_OWN];

entity_section!(
    Interaction,
    "Interactions",
    ArtifactKind::Interaction,
    Interaction::new(ResourceId::new("")),
    INTERACTION_TABLES
);
entity_section!(Buff, "Buffs", ArtifactKind::Buff, Buff::new(ResourceId::new("")), BUFF_TABLES);
entity_section!(Trait, "Traits", ArtifactKind::Trait, Trait::new(ResourceId::new("")), TRAIT_TABLES);
entity_section!(
    EnumDefinition,
    "Enums",
    ArtifactKind::EnumTuning,
    EnumDefinition::new(ResourceId::new("")),
    ENUM_TABLES
);
