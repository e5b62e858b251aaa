//! Element tree → IR mapping.
//!
//! Each document is independent: a broken document empties its own
//! collection and leaves the others alone.

use std::collections::BTreeMap;

use super::reader::{read_document, Element};
use crate::diagnostic::{Diagnostic, DiagnosticCode, Position, Stage};
use crate::frontend::jpe::values::parse_bool;
use crate::frontend::{EntrySpan, ParseOutput};
use crate::ir::{
    ArtifactKind, Buff, EnumDefinition, EnumOption, EnumValue, Interaction, LocalizedString,
    LootAction, Participant, ProjectMetadata, ResourceId, Test, Trait, DEFAULT_LOCALE,
};

/// Generated XML keyed by artifact kind.
pub type XmlDocuments = BTreeMap<ArtifactKind, Vec<u8>>;

const ROOT_ATTRIBUTES: &[&str] = &["project", "name", "version", "author", "description", "created", "modified"];
const RESOURCE_ATTRIBUTES: &[&str] = &["n", "m", "c", "s"];
const TEXT_KEY_ATTRIBUTES: &[&str] = &["display_name", "description"];

/// Parses every document into one IR.
pub fn parse_documents(documents: &XmlDocuments) -> ParseOutput {
    let mut output = ParseOutput::default();
    let mut metadata_seen = false;

    for (&kind, bytes) in documents {
        let root = match read_document(bytes) {
            Ok(root) => root,
            Err(error) => {
                output.diagnostics.push(
                    Diagnostic::new(
                        DiagnosticCode::MalformedXml,
                        Stage::XmlParse,
                        format!("{} document is not well-formed: {}", kind, error.message),
                    )
                    .at(error.position)
                    .in_artifact(kind),
                );
                continue;
            }
        };

        let mut doc = Document {
            kind,
            output: &mut output,
        };
        if root.name != kind.root_element() {
            doc.report(
                DiagnosticCode::UnexpectedRoot,
                root.position,
                format!("expected <{}> as the root of the {} document, found <{}>", kind.root_element(), kind, root.name),
            );
            continue;
        }

        doc.check_attributes(&root, &[ROOT_ATTRIBUTES]);
        if !metadata_seen && root.attr("project").is_some() {
            metadata_seen = true;
            doc.output.ir.metadata = metadata_from(&root);
            doc.output.source_map.project = Some(EntrySpan::new(root.position));
        }

        for child in &root.children {
            if child.name != kind.entity_element() {
                doc.unknown_element(child, &root.name);
                continue;
            }
            doc.read_entity(child);
        }
    }

    tracing::debug!(
        documents = documents.len(),
        entities = output.ir.entity_count(),
        diagnostics = output.diagnostics.len(),
        "parsed tuning XML"
    );
    output
}

fn metadata_from(root: &Element) -> ProjectMetadata {
    let owned = |name: &str| root.attr(name).map(str::to_string);
    ProjectMetadata {
        name: owned("name").unwrap_or_default(),
        project_id: owned("project").unwrap_or_default(),
        version: owned("version").unwrap_or_default(),
        author: owned("author"),
        description: owned("description"),
        created_date: owned("created"),
        last_modified: owned("modified"),
    }
}

/// Mapping context for one document.
struct Document<'a> {
    kind: ArtifactKind,
    output: &'a mut ParseOutput,
}

impl Document<'_> {
    fn report(&mut self, code: DiagnosticCode, position: Position, message: String) {
        self.output.diagnostics.push(
            Diagnostic::new(code, Stage::XmlParse, message)
                .at(position)
                .in_artifact(self.kind),
        );
    }

    fn unknown_element(&mut self, element: &Element, parent: &str) {
        self.report(
            DiagnosticCode::UnknownElement,
            element.position,
            format!("unknown element <{}> inside <{}>; skipped", element.name, parent),
        );
    }

    /// Warns about attributes not listed in any of `allowed`.
    fn check_attributes(&mut self, element: &Element, allowed: &[&[&str]]) {
        for (name, _) in &element.attributes {
            if !allowed.iter().any(|group| group.contains(&name.as_str())) {
                self.report(
                    DiagnosticCode::UnknownAttribute,
                    element.position,
                    format!("unknown attribute `{}` on <{}>; ignored", name, element.name),
                );
            }
        }
    }

    /// Returns a required attribute, reporting it when absent.
    fn required<'e>(&mut self, element: &'e Element, name: &str) -> Option<&'e str> {
        let value = element.attr(name);
        if value.is_none() {
            self.report(
                DiagnosticCode::MissingAttribute,
                element.position,
                format!("<{}> is missing the `{}` attribute; element skipped", element.name, name),
            );
        }
        value
    }

    /// Parses an optional attribute, dropping it with an error when malformed.
    fn optional<T>(
        &mut self,
        element: &Element,
        name: &str,
        parse: impl FnOnce(&str) -> Result<T, String>,
    ) -> Option<T> {
        let raw = element.attr(name)?;
        match parse(raw) {
            Ok(value) => Some(value),
            Err(message) => {
                self.report(
                    DiagnosticCode::InvalidAttribute,
                    element.position,
                    format!("invalid `{}` on <{}>: {}; attribute ignored", name, element.name, message),
                );
                None
            }
        }
    }

    fn resource_id(&mut self, element: &Element) -> Option<ResourceId> {
        let name = self.required(element, "n")?;
        let mut id = ResourceId::new(name);
        id.module = element.attr("m").map(str::to_string);
        id.class_name = element.attr("c").map(str::to_string);
        id.instance_id = self.optional(element, "s", |raw| {
            raw.parse::<u64>()
                .map_err(|_| format!("expected a non-negative integer, found `{}`", raw))
        });
        Some(id)
    }

    fn read_entity(&mut self, element: &Element) {
        let mut span = EntrySpan::new(element.position);
        let added = match self.kind {
            ArtifactKind::Interaction => self
                .interaction(element, &mut span)
                .map(|interaction| self.output.ir.add_interaction(interaction)),
            ArtifactKind::Buff => self
                .buff(element, &mut span)
                .map(|buff| self.output.ir.add_buff(buff)),
            ArtifactKind::Trait => self
                .trait_(element, &mut span)
                .map(|tr| self.output.ir.add_trait(tr)),
            ArtifactKind::EnumTuning => self
                .enum_definition(element, &mut span)
                .map(|definition| self.output.ir.add_enum(definition)),
            ArtifactKind::StringTable => self
                .string(element)
                .map(|string| self.output.ir.add_string(string)),
        };
        if added.is_some() {
            self.output.source_map.push(self.kind, span);
        }
    }

    // =========================================================================
    // Interactions
    // =========================================================================

    fn interaction(&mut self, element: &Element, span: &mut EntrySpan) -> Option<Interaction> {
        self.check_attributes(element, &[RESOURCE_ATTRIBUTES, TEXT_KEY_ATTRIBUTES, &["autonomy_disabled"]]);
        let mut interaction = Interaction::new(self.resource_id(element)?);
        interaction.display_name_key = element.attr("display_name").unwrap_or_default().to_string();
        interaction.description_key = element.attr("description").unwrap_or_default().to_string();
        interaction.autonomy_disabled = self.optional(element, "autonomy_disabled", parse_bool);

        for child in &element.children {
            match child.name.as_str() {
                "Participant" => {
                    self.check_attributes(child, &[&["role", "description"]]);
                    if let Some(role) = self.required(child, "role") {
                        interaction.participants.push(Participant {
                            role: role.to_string(),
                            description: child.attr("description").unwrap_or_default().to_string(),
                        });
                        span.fields.push(("participant".to_string(), child.position));
                    }
                }
                "Test" => {
                    if let Some((kind, parameters)) = self.typed_params(child) {
                        interaction.tests.push(Test { kind, parameters });
                        span.fields.push(("test".to_string(), child.position));
                    }
                }
                "Loot" => {
                    if let Some((kind, parameters)) = self.typed_params(child) {
                        interaction.loot_actions.push(LootAction { kind, parameters });
                        span.fields.push(("loot".to_string(), child.position));
                    }
                }
                _ => self.unknown_element(child, &element.name),
            }
        }
        Some(interaction)
    }

    /// `<Test type="..."><Param name="..." value="..."/></Test>`
    fn typed_params(&mut self, element: &Element) -> Option<(String, BTreeMap<String, String>)> {
        self.check_attributes(element, &[&["type"]]);
        let kind = self.required(element, "type")?.to_string();
        let mut parameters = BTreeMap::new();
        for param in &element.children {
            if param.name != "Param" {
                self.unknown_element(param, &element.name);
                continue;
            }
            self.check_attributes(param, &[&["name", "value"]]);
            let Some(name) = self.required(param, "name") else {
                continue;
            };
            let Some(value) = self.required(param, "value") else {
                continue;
            };
            parameters.insert(name.to_string(), value.to_string());
        }
        Some((kind, parameters))
    }

    // =========================================================================
    // Buffs and traits
    // =========================================================================

    fn buff(&mut self, element: &Element, span: &mut EntrySpan) -> Option<Buff> {
        self.check_attributes(element, &[RESOURCE_ATTRIBUTES, TEXT_KEY_ATTRIBUTES, &["duration"]]);
        let mut buff = Buff::new(self.resource_id(element)?);
        buff.display_name_key = element.attr("display_name").unwrap_or_default().to_string();
        buff.description_key = element.attr("description").unwrap_or_default().to_string();
        buff.duration_sim_minutes = self.optional(element, "duration", |raw| {
            raw.parse::<u32>()
                .map_err(|_| format!("expected a non-negative integer, found `{}`", raw))
        });
        buff.traits = self.references(element, "TraitRef", "trait", span);
        Some(buff)
    }

    fn trait_(&mut self, element: &Element, span: &mut EntrySpan) -> Option<Trait> {
        self.check_attributes(element, &[RESOURCE_ATTRIBUTES, TEXT_KEY_ATTRIBUTES]);
        let mut tr = Trait::new(self.resource_id(element)?);
        tr.display_name_key = element.attr("display_name").unwrap_or_default().to_string();
        tr.description_key = element.attr("description").unwrap_or_default().to_string();
        tr.buffs = self.references(element, "BuffRef", "buff", span);
        Some(tr)
    }

    /// Collects `<TraitRef n="..."/>`-style children.
    fn references(
        &mut self,
        element: &Element,
        child_name: &str,
        field: &str,
        span: &mut EntrySpan,
    ) -> Vec<ResourceId> {
        let mut references = Vec::new();
        for child in &element.children {
            if child.name != child_name {
                self.unknown_element(child, &element.name);
                continue;
            }
            self.check_attributes(child, &[&["n"]]);
            if let Some(name) = self.required(child, "n") {
                references.push(ResourceId::new(name));
                span.fields.push((field.to_string(), child.position));
            }
        }
        references
    }

    // =========================================================================
    // Enums and strings
    // =========================================================================

    fn enum_definition(&mut self, element: &Element, span: &mut EntrySpan) -> Option<EnumDefinition> {
        self.check_attributes(element, &[RESOURCE_ATTRIBUTES]);
        let mut definition = EnumDefinition::new(self.resource_id(element)?);
        for child in &element.children {
            if child.name != "Option" {
                self.unknown_element(child, &element.name);
                continue;
            }
            if let Some(option) = self.enum_option(child) {
                definition.options.push(option);
                span.fields.push(("option".to_string(), child.position));
            }
        }
        Some(definition)
    }

    fn enum_option(&mut self, element: &Element) -> Option<EnumOption> {
        self.check_attributes(element, &[&["name", "value", "type"]]);
        let name = self.required(element, "name")?;
        let raw = self.required(element, "value")?;
        let value = match element.attr("type") {
            Some("int") => match raw.parse::<i64>() {
                Ok(int) => EnumValue::Int(int),
                Err(_) => {
                    self.report(
                        DiagnosticCode::InvalidAttribute,
                        element.position,
                        format!("option `{}` is typed int but has value `{}`; option skipped", name, raw),
                    );
                    return None;
                }
            },
            Some("text") => EnumValue::Text(raw.to_string()),
            None => match raw.parse::<i64>() {
                Ok(int) => EnumValue::Int(int),
                Err(_) => EnumValue::Text(raw.to_string()),
            },
            Some(other) => {
                self.report(
                    DiagnosticCode::InvalidAttribute,
                    element.position,
                    format!("unknown option type `{}` (expected int or text); option skipped", other),
                );
                return None;
            }
        };
        Some(EnumOption::new(name, value))
    }

    fn string(&mut self, element: &Element) -> Option<LocalizedString> {
        self.check_attributes(element, &[&["key", "locale"]]);
        for child in &element.children {
            self.unknown_element(child, &element.name);
        }
        let key = self.required(element, "key")?;
        let locale = element.attr("locale").unwrap_or(DEFAULT_LOCALE);
        Some(LocalizedString::new(key, element.text.as_str(), locale))
    }
}
