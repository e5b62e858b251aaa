//! Front-ends that turn source material into IR.
//!
//! There are two:
//! 1. [`jpe`] reads hand-authored JPE text
//! 2. [`xml`] reads previously generated (or hand-edited) tuning XML
//!
//! Both produce the same [`ProjectIR`] and report every problem as a
//! diagnostic instead of failing, so callers always get a partial IR back.

pub mod jpe;
pub mod xml;
mod source_map;

pub use source_map::{EntrySpan, SourceMap};

use crate::diagnostic::Diagnostic;
use crate::ir::ProjectIR;

/// Everything a front-end produces for one input.
#[derive(Debug, Clone, Default)]
pub struct ParseOutput {
    pub ir: ProjectIR,
    pub diagnostics: Vec<Diagnostic>,
    /// Positions of entries and their keys in the original input.
    pub source_map: SourceMap,
}

/// Trait for front-ends.
pub trait Frontend {
    /// The input this front-end reads.
    type Input: ?Sized;

    /// Returns the input language name (e.g., "jpe", "xml").
    fn language(&self) -> &str;

    /// Parses the input. Never fails; problems surface as diagnostics.
    fn parse(&self, input: &Self::Input) -> ParseOutput;
}
