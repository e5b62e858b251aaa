//! Display and description keys must have localized text.

use std::collections::HashSet;

use super::{noun, Checker};
use crate::diagnostic::DiagnosticCode;
use crate::ir::{ArtifactKind, ResourceId};

pub(super) fn check(checker: &mut Checker<'_>) {
    let ir = checker.ir;
    let keys: HashSet<&str> = ir.localized_strings.iter().map(|s| s.key.as_str()).collect();

    let interactions = ir
        .interactions
        .iter()
        .map(|e| (&e.id, e.display_name_key.as_str(), e.description_key.as_str()));
    check_entities(checker, ArtifactKind::Interaction, interactions, &keys);

    let buffs = ir
        .buffs
        .iter()
        .map(|e| (&e.id, e.display_name_key.as_str(), e.description_key.as_str()));
    check_entities(checker, ArtifactKind::Buff, buffs, &keys);

    let traits = ir
        .traits
        .iter()
        .map(|e| (&e.id, e.display_name_key.as_str(), e.description_key.as_str()));
    check_entities(checker, ArtifactKind::Trait, traits, &keys);
}

fn check_entities<'a>(
    checker: &mut Checker<'_>,
    kind: ArtifactKind,
    entities: impl Iterator<Item = (&'a ResourceId, &'a str, &'a str)>,
    keys: &HashSet<&str>,
) {
    for (index, (id, display_name, description)) in entities.enumerate() {
        for (field, key) in [("display_name", display_name), ("description", description)] {
            if key.is_empty() || keys.contains(key) {
                continue;
            }
            let diagnostic = checker.entity(
                DiagnosticCode::MissingLocalization,
                kind,
                checker.field_position(kind, index, field, 0),
                format!("{} `{}` uses string key `{}` with no localized text", noun(kind), id.name, key),
            );
            checker.report(diagnostic.with_help(format!("Add an entry with `key: {}` to [Strings]", key)));
        }
    }
}
