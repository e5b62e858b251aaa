//! Diagnostic types for error reporting.
//!
//! Problems with the *input* (bad JPE lines, malformed XML, validator
//! findings) are [`Diagnostic`] values that flow through the pipeline.
//! Problems with the *environment* (unreadable files, bad config) are
//! [`CompilerError`]s.

mod code;
mod error;
mod span;

pub use code::{DiagnosticCode, ErrorKind};
pub use error::CompilerError;
pub use span::{line_starts, position_at, Position};

use std::fmt;
use serde::Serialize;

use crate::ir::ArtifactKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

/// The pipeline stage that produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    Parse,
    XmlParse,
    Validate,
    Generate,
    Package,
}

/// A structured error, warning or note with an optional source position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub stage: Stage,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    /// Set for diagnostics raised while reading an XML artifact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<ArtifactKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl Diagnostic {
    /// Creates a diagnostic with the code's default severity.
    pub fn new(code: DiagnosticCode, stage: Stage, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: code.default_severity(),
            stage,
            message: message.into(),
            position: None,
            artifact: None,
            help: None,
        }
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// Sets the position if one is known.
    pub fn at_opt(mut self, position: Option<Position>) -> Self {
        self.position = position;
        self
    }

    pub fn in_artifact(mut self, kind: ArtifactKind) -> Self {
        self.artifact = Some(kind);
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }

    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.severity.as_str(), self.code.as_str())?;
        if let Some(kind) = self.artifact {
            write!(f, " {}", kind)?;
        }
        if let Some(position) = self.position {
            write!(f, " {}", position)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Summary queries over a list of diagnostics.
pub trait DiagnosticsExt {
    fn has_errors(&self) -> bool;
    fn error_count(&self) -> usize;
    fn warning_count(&self) -> usize;
}

impl DiagnosticsExt for [Diagnostic] {
    fn has_errors(&self) -> bool {
        self.iter().any(Diagnostic::is_error)
    }

    fn error_count(&self) -> usize {
        self.iter().filter(|d| d.is_error()).count()
    }

    fn warning_count(&self) -> usize {
        self.iter().filter(|d| d.is_warning()).count()
    }
}
