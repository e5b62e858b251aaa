//! Maps IR entities back to the lines they were read from.

use std::collections::BTreeMap;

use crate::diagnostic::Position;
use crate::ir::ArtifactKind;

/// Where one entry (or the project block) started, and where each of its
/// keys appeared, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySpan {
    pub start: Position,
    pub fields: Vec<(String, Position)>,
}

impl EntrySpan {
    pub fn new(start: Position) -> Self {
        Self {
            start,
            fields: Vec::new(),
        }
    }

    /// Position of the `nth` (0-based) occurrence of `key`.
    pub fn field(&self, key: &str, nth: usize) -> Option<Position> {
        self.fields
            .iter()
            .filter(|(k, _)| k == key)
            .nth(nth)
            .map(|(_, position)| *position)
    }
}

/// Side table of positions, indexed like the IR collections.
///
/// Kept outside the IR so that IR equality never depends on layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMap {
    pub project: Option<EntrySpan>,
    entries: BTreeMap<ArtifactKind, Vec<EntrySpan>>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the span of the next entity appended to `kind`'s collection.
    pub fn push(&mut self, kind: ArtifactKind, span: EntrySpan) {
        self.entries.entry(kind).or_default().push(span);
    }

    pub fn entry(&self, kind: ArtifactKind, index: usize) -> Option<&EntrySpan> {
        self.entries.get(&kind).and_then(|spans| spans.get(index))
    }

    /// Start of the entity at `index`.
    pub fn entry_start(&self, kind: ArtifactKind, index: usize) -> Option<Position> {
        self.entry(kind, index).map(|span| span.start)
    }

    /// Position of a key within an entity, falling back to the entity start.
    pub fn field_position(
        &self,
        kind: ArtifactKind,
        index: usize,
        key: &str,
        nth: usize,
    ) -> Option<Position> {
        let span = self.entry(kind, index)?;
        span.field(key, nth).or(Some(span.start))
    }

    /// Position of a project block key, falling back to the block start.
    pub fn project_field(&self, key: &str) -> Option<Position> {
        let span = self.project.as_ref()?;
        span.field(key, 0).or(Some(span.start))
    }

    pub fn is_empty(&self) -> bool {
        self.project.is_none() && self.entries.values().all(Vec::is_empty)
    }
}
