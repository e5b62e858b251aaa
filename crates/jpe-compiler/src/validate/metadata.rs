//! Project metadata checks.

use super::Checker;
use crate::diagnostic::{Diagnostic, DiagnosticCode, Stage};
use crate::ir::ResourceId;

pub(super) fn check(checker: &mut Checker<'_>) {
    let ir = checker.ir;
    let metadata = &ir.metadata;

    if !metadata.is_declared() {
        if ir.entity_count() > 0 {
            checker.report(
                Diagnostic::new(
                    DiagnosticCode::MissingProjectBlock,
                    Stage::Validate,
                    "no [Project] block; artifacts will be named `project_*.xml`",
                )
                .with_help("Add a [Project] block with name, id and version"),
            );
        }
        return;
    }

    if !is_semver(&metadata.version) {
        checker.report(
            Diagnostic::new(
                DiagnosticCode::InvalidVersion,
                Stage::Validate,
                format!("project version `{}` is not of the form major.minor.patch", metadata.version),
            )
            .at_opt(checker.source_map.project_field("version"))
            .with_help("Use three numbers, e.g. `version: 1.0.0`"),
        );
    }

    if !ResourceId::is_valid_name(&metadata.project_id) {
        checker.report(
            Diagnostic::new(
                DiagnosticCode::InvalidProjectId,
                Stage::Validate,
                format!("project id `{}` is not a valid identifier", metadata.project_id),
            )
            .at_opt(checker.source_map.project_field("id"))
            .with_help("Ids may only contain letters, digits and underscores"),
        );
    }
}

/// `major.minor.patch`, each an unsigned integer.
pub(crate) fn is_semver(version: &str) -> bool {
    let parts: Vec<&str> = version.split('.').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
}
