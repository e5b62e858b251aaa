//! IR → tuning XML.
//!
//! One document per non-empty collection:
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <BuffTuning project="test_mod" name="Test Mod" version="1.0.0">
//!   <Buff n="happy_buff" display_name="STR_HAPPY" duration="120">
//!     <TraitRef n="cheerful"/>
//!   </Buff>
//! </BuffTuning>
//! ```

mod writer;

use std::collections::BTreeMap;
use std::io;

use super::GeneratedArtifacts;
use crate::ir::{
    ArtifactKind, Buff, EnumDefinition, Interaction, LocalizedString, ProjectIR, ProjectMetadata,
    ResourceId, Trait,
};
use writer::XmlWriter;

type Attributes<'a> = Vec<(&'a str, String)>;

/// Generates every artifact for `ir`. Empty collections produce no document.
pub fn generate(ir: &ProjectIR) -> io::Result<GeneratedArtifacts> {
    let mut artifacts = BTreeMap::new();
    for kind in ArtifactKind::ALL {
        if ir.count_of(kind) == 0 {
            continue;
        }
        artifacts.insert(kind, generate_document(ir, kind)?);
    }
    tracing::debug!(artifacts = artifacts.len(), "generated tuning XML");
    Ok(artifacts)
}

/// Generates the document for one kind, even if its collection is empty.
pub fn generate_document(ir: &ProjectIR, kind: ArtifactKind) -> io::Result<Vec<u8>> {
    let mut writer = XmlWriter::new()?;
    writer.open(kind.root_element(), &root_attributes(&ir.metadata))?;

    match kind {
        ArtifactKind::Interaction => {
            for interaction in &ir.interactions {
                write_interaction(&mut writer, interaction)?;
            }
        }
        ArtifactKind::Buff => {
            for buff in &ir.buffs {
                write_buff(&mut writer, buff)?;
            }
        }
        ArtifactKind::Trait => {
            for tr in &ir.traits {
                write_trait(&mut writer, tr)?;
            }
        }
        ArtifactKind::EnumTuning => {
            for definition in &ir.enums {
                write_enum(&mut writer, definition)?;
            }
        }
        ArtifactKind::StringTable => {
            for string in &ir.localized_strings {
                write_string(&mut writer, string)?;
            }
        }
    }

    writer.close(kind.root_element())?;
    Ok(writer.finish())
}

/// Project metadata, in the fixed order project, name, version, author,
/// description, created, modified.
fn root_attributes(metadata: &ProjectMetadata) -> Attributes<'static> {
    if !metadata.is_declared() {
        return Vec::new();
    }
    let mut attributes = vec![
        ("project", metadata.project_id.clone()),
        ("name", metadata.name.clone()),
        ("version", metadata.version.clone()),
    ];
    let optional = [
        ("author", &metadata.author),
        ("description", &metadata.description),
        ("created", &metadata.created_date),
        ("modified", &metadata.last_modified),
    ];
    for (key, value) in optional {
        if let Some(value) = value {
            attributes.push((key, value.clone()));
        }
    }
    attributes
}

/// `n`, `m`, `c`, `s` followed by the string table keys that are set.
fn entity_attributes(id: &ResourceId, display_name: &str, description: &str) -> Attributes<'static> {
    let mut attributes = vec![("n", id.name.clone())];
    if let Some(module) = &id.module {
        attributes.push(("m", module.clone()));
    }
    if let Some(class_name) = &id.class_name {
        attributes.push(("c", class_name.clone()));
    }
    if let Some(instance_id) = id.instance_id {
        attributes.push(("s", instance_id.to_string()));
    }
    if !display_name.is_empty() {
        attributes.push(("display_name", display_name.to_string()));
    }
    if !description.is_empty() {
        attributes.push(("description", description.to_string()));
    }
    attributes
}

/// Writes `<name ...>children</name>`, or `<name .../>` when there are none.
fn element_with_children(
    writer: &mut XmlWriter,
    name: &str,
    attributes: &[(&str, String)],
    has_children: bool,
    children: impl FnOnce(&mut XmlWriter) -> io::Result<()>,
) -> io::Result<()> {
    if has_children {
        writer.open(name, attributes)?;
        children(writer)?;
        writer.close(name)
    } else {
        writer.empty(name, attributes)
    }
}

fn write_interaction(writer: &mut XmlWriter, interaction: &Interaction) -> io::Result<()> {
    let mut attributes = entity_attributes(
        &interaction.id,
        &interaction.display_name_key,
        &interaction.description_key,
    );
    if let Some(disabled) = interaction.autonomy_disabled {
        attributes.push(("autonomy_disabled", disabled.to_string()));
    }

    let has_children = !interaction.participants.is_empty()
        || !interaction.tests.is_empty()
        || !interaction.loot_actions.is_empty();
    element_with_children(writer, "Interaction", &attributes, has_children, |writer| {
        for participant in &interaction.participants {
            let mut attributes = vec![("role", participant.role.clone())];
            if !participant.description.is_empty() {
                attributes.push(("description", participant.description.clone()));
            }
            writer.empty("Participant", &attributes)?;
        }
        for test in &interaction.tests {
            write_typed_params(writer, "Test", &test.kind, &test.parameters)?;
        }
        for loot in &interaction.loot_actions {
            write_typed_params(writer, "Loot", &loot.kind, &loot.parameters)?;
        }
        Ok(())
    })
}

fn write_typed_params(
    writer: &mut XmlWriter,
    name: &str,
    kind: &str,
    parameters: &BTreeMap<String, String>,
) -> io::Result<()> {
    let attributes = [("type", kind.to_string())];
    element_with_children(writer, name, &attributes, !parameters.is_empty(), |writer| {
        for (param, value) in parameters {
            writer.empty("Param", &[("name", param.clone()), ("value", value.clone())])?;
        }
        Ok(())
    })
}

fn write_references(writer: &mut XmlWriter, name: &str, references: &[ResourceId]) -> io::Result<()> {
    for reference in references {
        writer.empty(name, &[("n", reference.name.clone())])?;
    }
    Ok(())
}

fn write_buff(writer: &mut XmlWriter, buff: &Buff) -> io::Result<()> {
    let mut attributes = entity_attributes(&buff.id, &buff.display_name_key, &buff.description_key);
    if let Some(duration) = buff.duration_sim_minutes {
        attributes.push(("duration", duration.to_string()));
    }
    element_with_children(writer, "Buff", &attributes, !buff.traits.is_empty(), |writer| {
        write_references(writer, "TraitRef", &buff.traits)
    })
}

fn write_trait(writer: &mut XmlWriter, tr: &Trait) -> io::Result<()> {
    let attributes = entity_attributes(&tr.id, &tr.display_name_key, &tr.description_key);
    element_with_children(writer, "Trait", &attributes, !tr.buffs.is_empty(), |writer| {
        write_references(writer, "BuffRef", &tr.buffs)
    })
}

fn write_enum(writer: &mut XmlWriter, definition: &EnumDefinition) -> io::Result<()> {
    let attributes = entity_attributes(&definition.id, "", "");
    element_with_children(writer, "Enum", &attributes, !definition.options.is_empty(), |writer| {
        for option in &definition.options {
            writer.empty(
                "Option",
                &[
                    ("name", option.name.clone()),
                    ("value", option.value.to_string()),
                    ("type", option.value.type_tag().to_string()),
                ],
            )?;
        }
        Ok(())
    })
}

fn write_string(writer: &mut XmlWriter, string: &LocalizedString) -> io::Result<()> {
    writer.text(
        "String",
        &[("key", string.key.clone()), ("locale", string.locale.clone())],
        &string.text,
    )
}
