//! JPE parser: a line-driven state machine over [`lex`] output.
//!
//! Errors never stop the pass. A bad line is reported and skipped, a bad
//! entry is reported and dropped, and an unknown section is skipped up to the
//! next header, so one run surfaces as many problems as possible.

use super::fields::{Cardinality, EntitySection, SectionEntry};
use super::lexer::{lex, LineKind};
use crate::diagnostic::{Diagnostic, DiagnosticCode, Position, Stage};
use crate::frontend::{EntrySpan, ParseOutput};
use crate::ir::{Buff, EnumDefinition, Interaction, LocalizedString, ProjectIR, ProjectMetadata, Trait};

/// Which block the parser is currently inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    Outside,
    InProjectBlock,
    InInteractionEntry,
    InBuffEntry,
    InTraitEntry,
    InEnumEntry,
    InStringEntry,
}

impl ParserState {
    /// Maps a section header to its state (case-insensitive, singular or plural).
    pub fn from_section(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "project" => Some(ParserState::InProjectBlock),
            "interactions" | "interaction" => Some(ParserState::InInteractionEntry),
            "buffs" | "buff" => Some(ParserState::InBuffEntry),
            "traits" | "trait" => Some(ParserState::InTraitEntry),
            "enums" | "enum" => Some(ParserState::InEnumEntry),
            "strings" | "string" => Some(ParserState::InStringEntry),
            _ => None,
        }
    }
}

const KNOWN_SECTIONS: &str = "[Project], [Interactions], [Buffs], [Traits], [Enums], [Strings]";

/// An entry being filled in, with the keys seen so far.
struct Entry<T> {
    value: T,
    seen: Vec<&'static str>,
    span: EntrySpan,
}

impl<T: SectionEntry> Entry<T> {
    fn open(start: Position) -> Self {
        Self {
            value: T::blank(),
            seen: Vec::new(),
            span: EntrySpan::new(start),
        }
    }
}

/// The open entry, typed by section.
enum Accumulator {
    Project(Entry<ProjectMetadata>),
    Interaction(Entry<Interaction>),
    Buff(Entry<Buff>),
    Trait(Entry<Trait>),
    Enum(Entry<EnumDefinition>),
    String(Entry<LocalizedString>),
}

impl Accumulator {
    fn open(state: ParserState, start: Position) -> Option<Self> {
        Some(match state {
            ParserState::Outside => return None,
            ParserState::InProjectBlock => Accumulator::Project(Entry::open(start)),
            ParserState::InInteractionEntry => Accumulator::Interaction(Entry::open(start)),
            ParserState::InBuffEntry => Accumulator::Buff(Entry::open(start)),
            ParserState::InTraitEntry => Accumulator::Trait(Entry::open(start)),
            ParserState::InEnumEntry => Accumulator::Enum(Entry::open(start)),
            ParserState::InStringEntry => Accumulator::String(Entry::open(start)),
        })
    }

    fn start(&self) -> Position {
        match self {
            Accumulator::Project(e) => e.span.start,
            Accumulator::Interaction(e) => e.span.start,
            Accumulator::Buff(e) => e.span.start,
            Accumulator::Trait(e) => e.span.start,
            Accumulator::Enum(e) => e.span.start,
            Accumulator::String(e) => e.span.start,
        }
    }
}

/// Parses JPE source into IR. Never fails.
pub fn parse(source: &str) -> ParseOutput {
    let mut parser = Parser::new();
    for line in lex(source) {
        match line.kind {
            LineKind::Blank => parser.on_blank(),
            LineKind::Comment => {}
            LineKind::Section(name) => parser.on_section(name, line.position),
            LineKind::End => parser.on_end(line.position),
            LineKind::KeyValue { key, value } => parser.on_key(&key, value, line.position),
            LineKind::Malformed(text) => parser.on_malformed(text, line.position),
        }
    }
    parser.finish()
}

struct Parser {
    state: ParserState,
    /// Inside an unknown section: skip silently until the next header.
    skipping: bool,
    /// A stray line outside any section was already reported for this region.
    reported_outside: bool,
    project_declared: bool,
    /// A blank line followed the last key of the open entry.
    blank_after_entry: bool,
    current: Option<Accumulator>,
    output: ParseOutput,
}

impl Parser {
    fn new() -> Self {
        Self {
            state: ParserState::Outside,
            skipping: false,
            reported_outside: false,
            project_declared: false,
            blank_after_entry: false,
            current: None,
            output: ParseOutput::default(),
        }
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        self.output.diagnostics.push(diagnostic);
    }

    fn on_blank(&mut self) {
        if self.current.is_some() {
            self.blank_after_entry = true;
        }
    }

    fn on_section(&mut self, name: &str, position: Position) {
        self.blank_after_entry = false;
        if let Some(open) = self.current.take() {
            self.report(
                Diagnostic::new(
                    DiagnosticCode::UnterminatedEntry,
                    Stage::Parse,
                    format!("entry starting on line {} was not closed before [{}]; entry skipped", open.start().line, name),
                )
                .at(open.start())
                .with_help("Finish every entry with a line containing only `end`"),
            );
        }

        self.reported_outside = false;
        match ParserState::from_section(name) {
            Some(state) => {
                self.state = state;
                self.skipping = false;
            }
            None => {
                self.report(
                    Diagnostic::new(
                        DiagnosticCode::UnknownSection,
                        Stage::Parse,
                        format!("unknown section [{}]; skipped up to the next section", name),
                    )
                    .at(position)
                    .with_help(format!("Known sections: {}", KNOWN_SECTIONS)),
                );
                self.state = ParserState::Outside;
                self.skipping = true;
            }
        }
    }

    fn on_end(&mut self, position: Position) {
        self.blank_after_entry = false;
        match self.current.take() {
            Some(open) => self.finalize(open),
            None if self.skipping => {}
            None => self.report(
                Diagnostic::new(
                    DiagnosticCode::OrphanEnd,
                    Stage::Parse,
                    "`end` without an open entry",
                )
                .at(position),
            ),
        }
    }

    fn on_outside_line(&mut self, position: Position) {
        if self.skipping || self.reported_outside {
            return;
        }
        self.reported_outside = true;
        self.report(
            Diagnostic::new(
                DiagnosticCode::LineOutsideSection,
                Stage::Parse,
                "content outside of any section",
            )
            .at(position)
            .with_help(format!("Start a section first, e.g. {}", KNOWN_SECTIONS)),
        );
    }

    fn on_malformed(&mut self, text: &str, position: Position) {
        if self.state == ParserState::Outside {
            self.on_outside_line(position);
            return;
        }
        self.report(
            Diagnostic::new(
                DiagnosticCode::MalformedLine,
                Stage::Parse,
                format!("expected `key: value`, found `{}`", text),
            )
            .at(position),
        );
    }

    fn on_key(&mut self, key: &str, value: &str, position: Position) {
        if self.blank_after_entry {
            self.blank_after_entry = false;
            if let Some(open) = self.current.take() {
                self.report(
                    Diagnostic::new(
                        DiagnosticCode::UnterminatedEntry,
                        Stage::Parse,
                        format!(
                            "entry starting on line {} was not closed before the blank line; entry skipped",
                            open.start().line
                        ),
                    )
                    .at(open.start())
                    .with_help("Finish every entry with a line containing only `end`"),
                );
            }
        }

        if self.current.is_none() {
            match Accumulator::open(self.state, position) {
                Some(open) => self.current = Some(open),
                None => {
                    self.on_outside_line(position);
                    return;
                }
            }
        }

        let diagnostics = &mut self.output.diagnostics;
        match self.current.as_mut() {
            Some(Accumulator::Project(e)) => apply_key(e, key, value, position, diagnostics),
            Some(Accumulator::Interaction(e)) => apply_key(e, key, value, position, diagnostics),
            Some(Accumulator::Buff(e)) => apply_key(e, key, value, position, diagnostics),
            Some(Accumulator::Trait(e)) => apply_key(e, key, value, position, diagnostics),
            Some(Accumulator::Enum(e)) => apply_key(e, key, value, position, diagnostics),
            Some(Accumulator::String(e)) => apply_key(e, key, value, position, diagnostics),
            None => {}
        }
    }

    fn finalize(&mut self, open: Accumulator) {
        match open {
            Accumulator::Project(entry) => {
                if self.project_declared {
                    self.report(
                        Diagnostic::new(
                            DiagnosticCode::DuplicateProjectBlock,
                            Stage::Parse,
                            "only one [Project] block is allowed; this one is ignored",
                        )
                        .at(entry.span.start),
                    );
                    return;
                }
                self.project_declared = true;
                self.output.ir.metadata = entry.value;
                self.output.source_map.project = Some(entry.span);
            }
            Accumulator::Interaction(entry) => self.finalize_entity(entry, ProjectIR::add_interaction),
            Accumulator::Buff(entry) => self.finalize_entity(entry, ProjectIR::add_buff),
            Accumulator::Trait(entry) => self.finalize_entity(entry, ProjectIR::add_trait),
            Accumulator::Enum(entry) => self.finalize_entity(entry, ProjectIR::add_enum),
            Accumulator::String(entry) => self.finalize_entity(entry, ProjectIR::add_string),
        }
    }

    fn finalize_entity<T: EntitySection>(&mut self, entry: Entry<T>, add: fn(&mut ProjectIR, T)) {
        if let Some(required) = T::REQUIRED_KEY {
            if !entry.seen.contains(&required) {
                self.report(
                    Diagnostic::new(
                        DiagnosticCode::MissingRequiredKey,
                        Stage::Parse,
                        format!("entry in [{}] has no `{}`; entry skipped", T::SECTION, required),
                    )
                    .at(entry.span.start),
                );
                return;
            }
        }
        add(&mut self.output.ir, entry.value);
        self.output.source_map.push(T::KIND, entry.span);
    }

    fn finish(mut self) -> ParseOutput {
        if let Some(open) = self.current.take() {
            self.report(
                Diagnostic::new(
                    DiagnosticCode::UnterminatedEntry,
                    Stage::Parse,
                    format!("entry starting on line {} was not closed before the end of input; entry skipped", open.start().line),
                )
                .at(open.start())
                .with_help("Finish every entry with a line containing only `end`"),
            );
        }

        tracing::debug!(
            entities = self.output.ir.entity_count(),
            diagnostics = self.output.diagnostics.len(),
            "parsed JPE source"
        );
        self.output
    }
}

/// Applies one `key: value` line through the section's field table.
fn apply_key<T: SectionEntry>(
    entry: &mut Entry<T>,
    key: &str,
    value: &str,
    position: Position,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let Some(field) = T::field(key) else {
        diagnostics.push(
            Diagnostic::new(
                DiagnosticCode::UnknownKey,
                Stage::Parse,
                format!("unknown key `{}` in [{}]; ignored", key, T::SECTION),
            )
            .at(position)
            .with_help(format!("Known keys: {}", T::known_keys().join(", "))),
        );
        return;
    };

    if field.cardinality == Cardinality::Single && entry.seen.contains(&field.key) {
        diagnostics.push(
            Diagnostic::new(
                DiagnosticCode::DuplicateKey,
                Stage::Parse,
                format!("`{}` given more than once; the last value wins", field.key),
            )
            .at(position),
        );
    }

    match (field.apply)(&mut entry.value, value) {
        Ok(()) => {
            if !entry.seen.contains(&field.key) {
                entry.seen.push(field.key);
            }
            entry.span.fields.push((field.key.to_string(), position));
        }
        Err(message) => diagnostics.push(
            Diagnostic::new(
                DiagnosticCode::InvalidValue,
                Stage::Parse,
                format!("invalid `{}`: {}", field.key, message),
            )
            .at(position),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::DiagnosticsExt;
    use crate::ir::{ArtifactKind, EnumValue};
    use indoc::indoc;

    fn codes(output: &ParseOutput) -> Vec<DiagnosticCode> {
        output.diagnostics.iter().map(|d| d.code).collect()
    }

    #[test]
    fn test_empty_document() {
        let output = parse("");
        assert_eq!(output.ir, ProjectIR::default());
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_project_and_buff() {
        let output = parse(indoc! {"
            [Project]
            name: Test Mod
            id: test_mod
            version: 1.0.0
            end

            [Buffs]
            id: happy_buff
            display_name: STR_HAPPY
            description: STR_HAPPY_DESC
            duration: 120
            end
        "});

        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
        assert_eq!(output.ir.metadata.name, "Test Mod");
        assert_eq!(output.ir.metadata.project_id, "test_mod");
        assert_eq!(output.ir.buffs.len(), 1);
        assert_eq!(output.ir.buffs[0].id.name, "happy_buff");
        assert_eq!(output.ir.buffs[0].duration_sim_minutes, Some(120));
        assert_eq!(
            output.source_map.entry_start(ArtifactKind::Buff, 0),
            Some(Position::new(8, 1))
        );
    }

    #[test]
    fn test_several_entries_in_one_section() {
        let output = parse(indoc! {"
            [Traits]
            id: cheerful
            buff: happy_buff
            buff: glow_buff
            end

            id: gloomy
            end
        "});
        assert!(output.diagnostics.is_empty());
        assert_eq!(output.ir.traits.len(), 2);
        assert_eq!(output.ir.traits[0].buffs.len(), 2);
        assert_eq!(
            output.source_map.field_position(ArtifactKind::Trait, 0, "buff", 1),
            Some(Position::new(4, 1))
        );
    }

    #[test]
    fn test_interaction_fields() {
        let output = parse(indoc! {r#"
            [Interactions]
            id: hug
            module: interactions.social
            class: SocialSuperInteraction
            instance_id: 123456
            display_name: STR_HUG
            description: STR_HUG_DESC
            participant: role:initiator, description:"Gives the hug"
            participant: role:target, description:Gets hugged
            test: type:relationship, min:20
            loot: type:buff_add, buff:happy_buff
            autonomy_disabled: yes
            end
        "#});

        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
        let hug = &output.ir.interactions[0];
        assert_eq!(hug.id.module.as_deref(), Some("interactions.social"));
        assert_eq!(hug.id.class_name.as_deref(), Some("SocialSuperInteraction"));
        assert_eq!(hug.id.instance_id, Some(123456));
        assert_eq!(hug.participants.len(), 2);
        assert_eq!(hug.participants[0].description, "Gives the hug");
        assert_eq!(hug.tests[0].kind, "relationship");
        assert_eq!(hug.loot_actions[0].parameters["buff"], "happy_buff");
        assert_eq!(hug.autonomy_disabled, Some(true));
    }

    #[test]
    fn test_enum_and_strings() {
        let output = parse(indoc! {"
            [Enums]
            id: mood_level
            option: name:LOW, value:0
            option: name:HIGH, value:high
            end

            [Strings]
            key: STR_HAPPY
            text: Happy: very
            end
        "});

        assert!(output.diagnostics.is_empty());
        assert_eq!(output.ir.enums[0].options[0].value, EnumValue::Int(0));
        assert_eq!(output.ir.enums[0].options[1].value, EnumValue::Text("high".to_string()));
        assert_eq!(output.ir.localized_strings[0].text, "Happy: very");
        assert_eq!(output.ir.localized_strings[0].locale, "en_US");
    }

    #[test]
    fn test_unknown_key_is_warning() {
        let output = parse("[Buffs]\nid: a\ncolour: blue\nend\n");
        assert_eq!(codes(&output), vec![DiagnosticCode::UnknownKey]);
        assert!(!output.diagnostics.has_errors());
        assert_eq!(output.ir.buffs.len(), 1);
        assert_eq!(output.diagnostics[0].position, Some(Position::new(3, 1)));
    }

    #[test]
    fn test_orphan_end_and_recovery() {
        let output = parse("[Buffs]\nend\nid: a\nend\n");
        assert_eq!(codes(&output), vec![DiagnosticCode::OrphanEnd]);
        assert_eq!(output.ir.buffs.len(), 1);
    }

    #[test]
    fn test_unknown_section_is_skipped() {
        let output = parse(indoc! {"
            [Recipes]
            id: cake
            end
            id: pie
            end

            [Traits]
            id: cheerful
            end
        "});
        assert_eq!(codes(&output), vec![DiagnosticCode::UnknownSection]);
        assert_eq!(output.ir.traits.len(), 1);
    }

    #[test]
    fn test_unterminated_entry_before_header() {
        let output = parse(indoc! {"
            [Buffs]
            id: broken

            [Traits]
            id: a
            end
        "});
        assert_eq!(codes(&output), vec![DiagnosticCode::UnterminatedEntry]);
        assert!(output.ir.buffs.is_empty());
        assert_eq!(output.ir.traits.len(), 1);
        assert_eq!(output.diagnostics[0].position, Some(Position::new(2, 1)));
    }

    #[test]
    fn test_blank_line_separates_entries() {
        let output = parse(indoc! {"
            [Buffs]
            id: a
            duration: 5

            id: b
            end
        "});
        assert_eq!(codes(&output), vec![DiagnosticCode::UnterminatedEntry]);
        assert!(output.diagnostics.has_errors());
        assert_eq!(output.diagnostics[0].position, Some(Position::new(2, 1)));
        assert_eq!(output.ir.buffs.len(), 1);
        assert_eq!(output.ir.buffs[0].id.name, "b");
        assert_eq!(output.source_map.entry_start(ArtifactKind::Buff, 0), Some(Position::new(5, 1)));
    }

    #[test]
    fn test_blank_line_before_end_is_allowed() {
        let output = parse("[Buffs]\nid: a\n\n# still a\nend\n");
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
        assert_eq!(output.ir.buffs.len(), 1);
    }

    #[test]
    fn test_unterminated_entry_at_eof() {
        let output = parse("[Strings]\nkey: STR_A\ntext: A");
        assert_eq!(codes(&output), vec![DiagnosticCode::UnterminatedEntry]);
        assert!(output.ir.localized_strings.is_empty());
    }

    #[test]
    fn test_missing_id_drops_entry() {
        let output = parse("[Buffs]\ndisplay_name: STR_X\nend\n");
        assert_eq!(codes(&output), vec![DiagnosticCode::MissingRequiredKey]);
        assert!(output.ir.buffs.is_empty());
    }

    #[test]
    fn test_invalid_value_keeps_entry() {
        let output = parse("[Buffs]\nid: a\nduration: soon\nend\n");
        assert_eq!(codes(&output), vec![DiagnosticCode::InvalidValue]);
        assert_eq!(output.ir.buffs.len(), 1);
        assert_eq!(output.ir.buffs[0].duration_sim_minutes, None);
    }

    #[test]
    fn test_duplicate_single_key_last_wins() {
        let output = parse("[Buffs]\nid: a\nduration: 1\nduration: 2\nend\n");
        assert_eq!(codes(&output), vec![DiagnosticCode::DuplicateKey]);
        assert_eq!(output.ir.buffs[0].duration_sim_minutes, Some(2));
    }

    #[test]
    fn test_duplicate_project_block() {
        let output = parse("[Project]\nid: first\nend\n[Project]\nid: second\nend\n");
        assert_eq!(codes(&output), vec![DiagnosticCode::DuplicateProjectBlock]);
        assert_eq!(output.ir.metadata.project_id, "first");
    }

    #[test]
    fn test_lines_outside_sections_reported_once() {
        let output = parse("id: a\nname: b\n[Buffs]\nid: c\nend\n");
        assert_eq!(codes(&output), vec![DiagnosticCode::LineOutsideSection]);
        assert_eq!(output.ir.buffs.len(), 1);
    }

    #[test]
    fn test_malformed_line_inside_entry() {
        let output = parse("[Buffs]\nid: a\nthis is not a pair\nend\n");
        assert_eq!(codes(&output), vec![DiagnosticCode::MalformedLine]);
        assert_eq!(output.ir.buffs.len(), 1);
    }

    #[test]
    fn test_comments_and_plain_english_keys() {
        let output = parse(indoc! {"
            # My first mod
            [Buffs]
            // a happy buff
            ID: happy_buff
            Display Name: STR_HAPPY
            end
        "});
        assert!(output.diagnostics.is_empty());
        assert_eq!(output.ir.buffs[0].display_name_key, "STR_HAPPY");
    }
}
