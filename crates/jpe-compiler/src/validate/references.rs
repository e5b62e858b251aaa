//! Cross references between buffs and traits.

use std::collections::HashSet;

use super::{noun, Checker};
use crate::diagnostic::DiagnosticCode;
use crate::ir::{ArtifactKind, ResourceId};

pub(super) fn check(checker: &mut Checker<'_>) {
    let ir = checker.ir;
    let buff_names: HashSet<&str> = ir.buffs.iter().map(|b| b.id.name.as_str()).collect();
    let trait_names: HashSet<&str> = ir.traits.iter().map(|t| t.id.name.as_str()).collect();

    for (index, buff) in ir.buffs.iter().enumerate() {
        check_targets(checker, ArtifactKind::Buff, index, &buff.id, &buff.traits, "trait", &trait_names);
    }
    for (index, tr) in ir.traits.iter().enumerate() {
        check_targets(checker, ArtifactKind::Trait, index, &tr.id, &tr.buffs, "buff", &buff_names);
    }
}

fn check_targets(
    checker: &mut Checker<'_>,
    kind: ArtifactKind,
    index: usize,
    owner: &ResourceId,
    targets: &[ResourceId],
    target_key: &str,
    known: &HashSet<&str>,
) {
    for (nth, target) in targets.iter().enumerate() {
        if known.contains(target.name.as_str()) {
            continue;
        }
        let diagnostic = checker.entity(
            DiagnosticCode::DanglingReference,
            kind,
            checker.field_position(kind, index, target_key, nth),
            format!(
                "{} `{}` references unknown {} `{}`",
                noun(kind),
                owner.name,
                target_key,
                target.name
            ),
        );
        checker.report(diagnostic.with_help(format!("Declare `{}` in the [{}s] section", target.name, capitalize(target_key))));
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use crate::diagnostic::DiagnosticCode;
    use crate::ir::{Buff, ProjectIR, ResourceId, Trait};
    use crate::validate::validate;

    #[test]
    fn test_one_error_per_dangling_reference() {
        let mut ir = ProjectIR::new();
        let mut tr = Trait::new(ResourceId::new("cheerful"));
        tr.buffs.push(ResourceId::new("happy_buff"));
        tr.buffs.push(ResourceId::new("ghost_buff"));
        ir.add_trait(tr);
        ir.add_buff(Buff::new(ResourceId::new("happy_buff")));

        let dangling: Vec<_> = validate(&ir)
            .into_iter()
            .filter(|d| d.code == DiagnosticCode::DanglingReference)
            .collect();
        assert_eq!(dangling.len(), 1);
        assert!(dangling[0].message.contains("ghost_buff"));
        assert_eq!(dangling[0].help.as_deref(), Some("Declare `ghost_buff` in the [Buffs] section"));
    }

    #[test]
    fn test_buff_to_trait_reference() {
        let mut ir = ProjectIR::new();
        let mut buff = Buff::new(ResourceId::new("happy_buff"));
        buff.traits.push(ResourceId::new("cheerful"));
        ir.add_buff(buff);
        assert!(validate(&ir).iter().any(|d| d.code == DiagnosticCode::DanglingReference));

        ir.add_trait(Trait::new(ResourceId::new("cheerful")));
        assert!(validate(&ir).iter().all(|d| d.code != DiagnosticCode::DanglingReference));
    }
}
