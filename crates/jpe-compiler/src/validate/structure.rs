//! Structural minima for interactions and enums.

use std::collections::HashSet;

use super::Checker;
use crate::diagnostic::DiagnosticCode;
use crate::ir::{ArtifactKind, EnumDefinition};

/// Validates the structure of the project IR.
pub(super) fn check(checker: &mut Checker<'_>) {
    let ir = checker.ir;

    for (index, interaction) in ir.interactions.iter().enumerate() {
        if interaction.participants.is_empty() {
            let diagnostic = checker.entity(
                DiagnosticCode::MissingParticipant,
                ArtifactKind::Interaction,
                checker.entry_start(ArtifactKind::Interaction, index),
                format!("interaction `{}` has no participants", interaction.id.name),
            );
            checker.report(diagnostic.with_help("Add a line like `participant: role:initiator`"));
        }
    }

    for (index, definition) in ir.enums.iter().enumerate() {
        check_enum(checker, index, definition);
    }
}

/// An enum needs options, and each option a unique name and value.
fn check_enum(checker: &mut Checker<'_>, index: usize, definition: &EnumDefinition) {
    let kind = ArtifactKind::EnumTuning;
    if definition.options.is_empty() {
        let diagnostic = checker.entity(
            DiagnosticCode::EmptyEnum,
            kind,
            checker.entry_start(kind, index),
            format!("enum `{}` has no options", definition.id.name),
        );
        checker.report(diagnostic);
        return;
    }

    let mut names = HashSet::new();
    let mut values = HashSet::new();
    for (nth, option) in definition.options.iter().enumerate() {
        let repeated = if names.contains(option.name.as_str()) {
            Some(format!("option name `{}`", option.name))
        } else if values.contains(&option.value) {
            Some(format!("option value `{}`", option.value))
        } else {
            None
        };

        if let Some(what) = repeated {
            let diagnostic = checker.entity(
                DiagnosticCode::DuplicateEnumOption,
                kind,
                checker.field_position(kind, index, "option", nth),
                format!("enum `{}` repeats {}", definition.id.name, what),
            );
            checker.report(diagnostic);
        }
        names.insert(option.name.as_str());
        values.insert(&option.value);
    }
}
