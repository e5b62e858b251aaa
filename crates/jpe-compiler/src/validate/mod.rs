//! Validation of project IR.
//!
//! Checks run in a fixed order and never stop early, so one pass reports
//! every problem:
//!
//! 1. identity (duplicate and malformed ids)
//! 2. cross references between buffs and traits
//! 3. string keys without localized text
//! 4. structural minima (participants, enum options)
//! 5. project metadata
//!
//! The validator never mutates the IR.

mod identity;
mod metadata;
mod references;
mod strings;
mod structure;

use crate::diagnostic::{Diagnostic, DiagnosticCode, Position, Stage};
use crate::frontend::SourceMap;
use crate::ir::{ArtifactKind, ProjectIR, ResourceId};

/// Validates `ir` without position information.
pub fn validate(ir: &ProjectIR) -> Vec<Diagnostic> {
    validate_with_source_map(ir, &SourceMap::new())
}

/// Validates `ir`, placing diagnostics on the lines recorded in `source_map`.
pub fn validate_with_source_map(ir: &ProjectIR, source_map: &SourceMap) -> Vec<Diagnostic> {
    let mut checker = Checker {
        ir,
        source_map,
        diagnostics: Vec::new(),
    };

    identity::check(&mut checker);
    references::check(&mut checker);
    strings::check(&mut checker);
    structure::check(&mut checker);
    metadata::check(&mut checker);

    tracing::debug!(
        entities = ir.entity_count(),
        diagnostics = checker.diagnostics.len(),
        "validated project"
    );
    checker.diagnostics
}

/// Shared state for the individual checks.
pub(crate) struct Checker<'a> {
    ir: &'a ProjectIR,
    source_map: &'a SourceMap,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Checker<'a> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Starts a diagnostic about the entity at `index` of `kind`.
    fn entity(
        &self,
        code: DiagnosticCode,
        kind: ArtifactKind,
        position: Option<Position>,
        message: String,
    ) -> Diagnostic {
        Diagnostic::new(code, Stage::Validate, message)
            .at_opt(position)
            .in_artifact(kind)
    }

    fn entry_start(&self, kind: ArtifactKind, index: usize) -> Option<Position> {
        self.source_map.entry_start(kind, index)
    }

    fn field_position(&self, kind: ArtifactKind, index: usize, key: &str, nth: usize) -> Option<Position> {
        self.source_map.field_position(kind, index, key, nth)
    }

    /// Ids of the collection backing `kind`, in order. Strings have none.
    fn resource_ids(&self, kind: ArtifactKind) -> Vec<&'a ResourceId> {
        let ir = self.ir;
        match kind {
            ArtifactKind::Interaction => ir.interactions.iter().map(|e| &e.id).collect(),
            ArtifactKind::Buff => ir.buffs.iter().map(|e| &e.id).collect(),
            ArtifactKind::Trait => ir.traits.iter().map(|e| &e.id).collect(),
            ArtifactKind::EnumTuning => ir.enums.iter().map(|e| &e.id).collect(),
            ArtifactKind::StringTable => Vec::new(),
        }
    }
}

/// Lower-case entity noun used in messages.
fn noun(kind: ArtifactKind) -> &'static str {
    match kind {
        ArtifactKind::Interaction => "interaction",
        ArtifactKind::Buff => "buff",
        ArtifactKind::Trait => "trait",
        ArtifactKind::EnumTuning => "enum",
        ArtifactKind::StringTable => "string",
    }
}
