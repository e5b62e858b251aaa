//! Compiler error types.

use std::path::PathBuf;
use miette::Diagnostic;
use thiserror::Error;

/// Errors that stop the compiler before or around the pipeline.
///
/// Malformed input never ends up here; it is reported as diagnostics.
#[derive(Error, Diagnostic, Debug)]
pub enum CompilerError {
    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("Failed to read file '{path}': {message}")]
    #[diagnostic(code(jpe::io::read_error))]
    IoError {
        path: PathBuf,
        message: String,
    },

    #[error("Failed to write file '{path}': {message}")]
    #[diagnostic(code(jpe::io::write_error))]
    WriteError {
        path: PathBuf,
        message: String,
    },

    // =========================================================================
    // Config Errors
    // =========================================================================
    #[error("Invalid build configuration in '{path}': {message}")]
    #[diagnostic(
        code(jpe::config::invalid),
        help("jpe.json accepts: outDir (string), strict (bool), writeManifest (bool)")
    )]
    InvalidConfig {
        path: PathBuf,
        message: String,
    },

    // =========================================================================
    // Input Errors
    // =========================================================================
    #[error("Cannot tell which artifact '{}' holds", path.display())]
    #[diagnostic(
        code(jpe::input::unknown_artifact),
        help("Name tuning files <project>_<kind>.xml where kind is interactions, buffs, traits, enums or strings")
    )]
    UnknownArtifact {
        path: PathBuf,
    },

    #[error("Both '{}' and '{}' hold {kind} tuning", first.display(), second.display())]
    #[diagnostic(
        code(jpe::input::duplicate_artifact),
        help("Pass at most one XML file per artifact kind")
    )]
    DuplicateArtifact {
        kind: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("No tuning XML files found in {}", path.display())]
    #[diagnostic(code(jpe::input::no_artifacts))]
    NoArtifacts {
        path: PathBuf,
    },
}

impl CompilerError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::IoError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a write error.
    pub fn write(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::WriteError {
            path: path.into(),
            message: message.into(),
        }
    }
}
