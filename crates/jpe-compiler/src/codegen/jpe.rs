//! IR → JPE text.
//!
//! Output re-parses to the same IR: keys are written in the parser's table
//! order, text is quoted wherever the line reader would trim or split it, and
//! structured values are quoted wherever `split_pairs` would.

use std::collections::BTreeMap;

use crate::frontend::jpe::values::{join_pairs, quote, quote_text};
use crate::ir::{
    Buff, EnumDefinition, EnumValue, Interaction, LocalizedString, ProjectIR, ProjectMetadata,
    ResourceId, Trait, DEFAULT_LOCALE,
};

/// Accumulates `key: value` lines for one section.
struct JpeWriter {
    out: String,
}

impl JpeWriter {
    fn section(&mut self, name: &str) {
        self.out.push('[');
        self.out.push_str(name);
        self.out.push_str("]\n");
    }

    fn line(&mut self, key: &str, value: &str) {
        self.out.push_str(key);
        self.out.push(':');
        if !value.is_empty() {
            self.out.push(' ');
            self.out.push_str(value);
        }
        self.out.push('\n');
    }

    fn text(&mut self, key: &str, value: &str) {
        self.line(key, &quote_text(value));
    }

    fn optional(&mut self, key: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.text(key, value);
        }
    }

    /// Skips empty string table keys, which the parser leaves empty anyway.
    fn non_empty(&mut self, key: &str, value: &str) {
        if !value.is_empty() {
            self.text(key, value);
        }
    }

    fn end(&mut self) {
        self.out.push_str("end\n\n");
    }
}

/// Serializes `ir` as JPE. Empty collections and undeclared metadata are
/// left out entirely.
pub fn serialize(ir: &ProjectIR) -> String {
    let mut writer = JpeWriter { out: String::new() };

    if ir.metadata.is_declared() {
        writer.section("Project");
        write_project(&mut writer, &ir.metadata);
    }
    if !ir.interactions.is_empty() {
        writer.section("Interactions");
        ir.interactions.iter().for_each(|e| write_interaction(&mut writer, e));
    }
    if !ir.buffs.is_empty() {
        writer.section("Buffs");
        ir.buffs.iter().for_each(|e| write_buff(&mut writer, e));
    }
    if !ir.traits.is_empty() {
        writer.section("Traits");
        ir.traits.iter().for_each(|e| write_trait(&mut writer, e));
    }
    if !ir.enums.is_empty() {
        writer.section("Enums");
        ir.enums.iter().for_each(|e| write_enum(&mut writer, e));
    }
    if !ir.localized_strings.is_empty() {
        writer.section("Strings");
        ir.localized_strings.iter().for_each(|e| write_string(&mut writer, e));
    }

    let mut out = writer.out;
    // Single trailing newline.
    while out.ends_with("\n\n") {
        out.pop();
    }
    out
}

fn write_project(writer: &mut JpeWriter, metadata: &ProjectMetadata) {
    writer.text("name", &metadata.name);
    writer.text("id", &metadata.project_id);
    writer.text("version", &metadata.version);
    writer.optional("author", metadata.author.as_deref());
    writer.optional("description", metadata.description.as_deref());
    writer.optional("created", metadata.created_date.as_deref());
    writer.optional("modified", metadata.last_modified.as_deref());
    writer.end();
}

fn write_resource(writer: &mut JpeWriter, id: &ResourceId) {
    writer.text("id", &id.name);
    writer.optional("module", id.module.as_deref());
    writer.optional("class", id.class_name.as_deref());
    if let Some(instance_id) = id.instance_id {
        writer.line("instance_id", &instance_id.to_string());
    }
}

fn write_text_keys(writer: &mut JpeWriter, display_name: &str, description: &str) {
    writer.non_empty("display_name", display_name);
    writer.non_empty("description", description);
}

fn typed_params(kind: &str, parameters: &BTreeMap<String, String>) -> String {
    let pairs = std::iter::once(("type", quote(kind, false)))
        .chain(parameters.iter().map(|(key, value)| (key.as_str(), quote(value, false))));
    join_pairs(pairs)
}

fn write_interaction(writer: &mut JpeWriter, interaction: &Interaction) {
    write_resource(writer, &interaction.id);
    write_text_keys(writer, &interaction.display_name_key, &interaction.description_key);
    for participant in &interaction.participants {
        let mut pairs = vec![("role", quote(&participant.role, false))];
        if !participant.description.is_empty() {
            pairs.push(("description", quote(&participant.description, false)));
        }
        writer.line("participant", &join_pairs(pairs));
    }
    for test in &interaction.tests {
        writer.line("test", &typed_params(&test.kind, &test.parameters));
    }
    for loot in &interaction.loot_actions {
        writer.line("loot", &typed_params(&loot.kind, &loot.parameters));
    }
    if let Some(disabled) = interaction.autonomy_disabled {
        writer.line("autonomy_disabled", if disabled { "true" } else { "false" });
    }
    writer.end();
}

fn write_buff(writer: &mut JpeWriter, buff: &Buff) {
    write_resource(writer, &buff.id);
    write_text_keys(writer, &buff.display_name_key, &buff.description_key);
    if let Some(duration) = buff.duration_sim_minutes {
        writer.line("duration", &duration.to_string());
    }
    for reference in &buff.traits {
        writer.text("trait", &reference.name);
    }
    writer.end();
}

fn write_trait(writer: &mut JpeWriter, tr: &Trait) {
    write_resource(writer, &tr.id);
    write_text_keys(writer, &tr.display_name_key, &tr.description_key);
    for reference in &tr.buffs {
        writer.text("buff", &reference.name);
    }
    writer.end();
}

fn write_enum(writer: &mut JpeWriter, definition: &EnumDefinition) {
    write_resource(writer, &definition.id);
    for option in &definition.options {
        let value = match &option.value {
            EnumValue::Int(int) => int.to_string(),
            // Text that reads as a number must stay text.
            EnumValue::Text(text) => quote(text, text.parse::<i64>().is_ok()),
        };
        let pairs = [("name", quote(&option.name, false)), ("value", value)];
        writer.line("option", &join_pairs(pairs));
    }
    writer.end();
}

fn write_string(writer: &mut JpeWriter, string: &LocalizedString) {
    writer.text("key", &string.key);
    writer.text("text", &string.text);
    if string.locale != DEFAULT_LOCALE {
        writer.text("locale", &string.locale);
    }
    writer.end();
}
