//! Identity checks: unique and well-formed ids.

use std::collections::HashMap;

use super::{noun, Checker};
use crate::diagnostic::DiagnosticCode;
use crate::ir::{ArtifactKind, ResourceId};

pub(super) fn check(checker: &mut Checker<'_>) {
    for kind in ArtifactKind::ALL {
        if kind == ArtifactKind::StringTable {
            check_strings(checker);
            continue;
        }

        let ids = checker.resource_ids(kind);
        let mut first_seen: HashMap<&str, usize> = HashMap::new();
        for (index, id) in ids.into_iter().enumerate() {
            if let Some(&first) = first_seen.get(id.name.as_str()) {
                let mut diagnostic = checker.entity(
                    DiagnosticCode::DuplicateId,
                    kind,
                    checker.field_position(kind, index, "id", 0),
                    format!("duplicate {} id `{}`", noun(kind), id.name),
                );
                if let Some(position) = checker.entry_start(kind, first) {
                    diagnostic = diagnostic.with_help(format!("first defined at {}", position));
                }
                checker.report(diagnostic);
            } else {
                first_seen.insert(id.name.as_str(), index);
            }

            if !id.has_valid_name() {
                let diagnostic = checker.entity(
                    DiagnosticCode::InvalidIdentifier,
                    kind,
                    checker.field_position(kind, index, "id", 0),
                    format!("`{}` is not a valid {} id", id.name, noun(kind)),
                );
                checker.report(diagnostic.with_help("Ids may only contain letters, digits and underscores"));
            }
        }
    }
}

/// A string key may appear once per locale.
fn check_strings(checker: &mut Checker<'_>) {
    let ir = checker.ir;
    let mut seen: HashMap<(&str, &str), usize> = HashMap::new();
    for (index, string) in ir.localized_strings.iter().enumerate() {
        let key = (string.key.as_str(), string.locale.as_str());
        if seen.contains_key(&key) {
            let diagnostic = checker.entity(
                DiagnosticCode::DuplicateId,
                ArtifactKind::StringTable,
                checker.field_position(ArtifactKind::StringTable, index, "key", 0),
                format!("duplicate string `{}` for locale {}", string.key, string.locale),
            );
            checker.report(diagnostic);
        } else {
            seen.insert(key, index);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::diagnostic::DiagnosticCode;
    use crate::ir::{Buff, EnumDefinition, LocalizedString, ProjectIR, ResourceId, DEFAULT_LOCALE};
    use crate::validate::validate;

    #[test]
    fn test_one_error_per_repeat() {
        let mut ir = ProjectIR::new();
        for _ in 0..3 {
            ir.add_buff(Buff::new(ResourceId::new("happy_buff")));
        }
        let diagnostics = validate(&ir);
        let duplicates: Vec<_> = diagnostics
            .iter()
            .filter(|d| d.code == DiagnosticCode::DuplicateId)
            .collect();
        assert_eq!(duplicates.len(), 2);
        assert!(duplicates[0].message.contains("happy_buff"));
    }

    #[test]
    fn test_same_name_in_different_collections_is_fine() {
        let mut ir = ProjectIR::new();
        ir.add_buff(Buff::new(ResourceId::new("mood")));
        let mut definition = EnumDefinition::new(ResourceId::new("mood"));
        definition.options.push(crate::ir::EnumOption::new("A", crate::ir::EnumValue::Int(0)));
        ir.add_enum(definition);
        assert!(validate(&ir).iter().all(|d| d.code != DiagnosticCode::DuplicateId));
    }

    #[test]
    fn test_invalid_identifier() {
        let mut ir = ProjectIR::new();
        ir.add_buff(Buff::new(ResourceId::new("happy-buff")));
        let codes: Vec<_> = validate(&ir).iter().map(|d| d.code).collect();
        assert!(codes.contains(&DiagnosticCode::InvalidIdentifier));
    }

    #[test]
    fn test_string_duplicates_are_per_locale() {
        let mut ir = ProjectIR::new();
        ir.add_string(LocalizedString::new("STR_A", "A", DEFAULT_LOCALE));
        ir.add_string(LocalizedString::new("STR_A", "A", "de_DE"));
        assert!(validate(&ir).iter().all(|d| d.code != DiagnosticCode::DuplicateId));

        ir.add_string(LocalizedString::new("STR_A", "again", DEFAULT_LOCALE));
        let duplicates = validate(&ir)
            .into_iter()
            .filter(|d| d.code == DiagnosticCode::DuplicateId)
            .count();
        assert_eq!(duplicates, 1);
    }
}
