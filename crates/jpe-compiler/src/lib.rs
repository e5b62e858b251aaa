//! # JPE Compiler
//!
//! This crate translates JPE, a plain-English mod description language, into
//! the tuning XML a simulation game loads, and reads that XML back into JPE.
//! Both directions share one typed IR.
//!
//! ## Architecture
//!
//! ```text
//!   JPE text                    tuning XML
//!      │                             │
//!      ▼                             ▼
//! ┌──────────────┐           ┌──────────────┐
//! │ JPE frontend │           │ XML frontend │
//! │ (lines → IR) │           │ (tree → IR)  │
//! └──────┬───────┘           └──────┬───────┘
//!        └─────────────┬────────────┘
//!                      ▼
//!              ┌──────────────┐
//!              │      IR      │  ProjectIR
//!              └──────┬───────┘
//!                     ▼
//!              ┌──────────────┐
//!              │   Validate   │  identity, references, strings,
//!              │              │  structure, metadata
//!              └──────┬───────┘
//!        ┌────────────┴────────────┐
//!        ▼                         ▼
//! ┌──────────────┐          ┌──────────────┐
//! │ XML codegen  │          │ JPE codegen  │
//! │ (IR → XML)   │          │ (IR → text)  │
//! └──────────────┘          └──────────────┘
//! ```
//!
//! [`build::BuildOrchestrator`] sequences these stages into a build with an
//! id and a report; [`api`] wraps everything in four JSON-friendly calls.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use jpe_compiler::{Compiler, CompilerConfig};
//!
//! let config = CompilerConfig {
//!     input: "mod.jpe".into(),
//!     out_dir: Some("build".into()),
//!     ..Default::default()
//! };
//!
//! let report = Compiler::new(config).compile()?;
//! assert!(report.is_success());
//! ```

pub mod api;
pub mod build;
pub mod codegen;
pub mod config;
pub mod diagnostic;
pub mod frontend;
pub mod ir;
pub mod validate;

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

pub use api::{BuildResult, TranslationResult, ValidationResult};
pub use build::{BuildId, BuildInput, BuildOptions, BuildOrchestrator, BuildReport, BuildState};
pub use config::CompilerConfig;
pub use diagnostic::{CompilerError, Diagnostic, DiagnosticCode, Severity};
pub use frontend::xml::XmlDocuments;
pub use ir::ProjectIR;

/// Filesystem-facing driver over the pipeline.
pub struct Compiler {
    config: CompilerConfig,
}

impl Compiler {
    /// Creates a new compiler with the given configuration.
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Builds the configured input file.
    pub fn compile(&self) -> Result<BuildReport, CompilerError> {
        self.build_file(&self.config.input)
    }

    /// Validates the configured input file.
    pub fn check(&self) -> Result<ValidationResult, CompilerError> {
        let source = read_source(&self.config.input)?;
        Ok(api::validate(&source))
    }

    /// Builds one JPE file with the configured options.
    pub fn build_file(&self, path: &Path) -> Result<BuildReport, CompilerError> {
        let source = read_source(path)?;
        tracing::debug!(path = %path.display(), bytes = source.len(), "read JPE source");
        Ok(BuildOrchestrator::new(self.config.build_options()).run(source))
    }

    /// Reads tuning XML from files or directories and translates it to JPE.
    pub fn decompile(&self, paths: &[PathBuf]) -> Result<TranslationResult, CompilerError> {
        let documents = load_documents(paths)?;
        Ok(api::translate_to_jpe(&documents))
    }
}

/// Reads a JPE source file.
pub fn read_source(path: &Path) -> Result<String, CompilerError> {
    std::fs::read_to_string(path).map_err(|e| CompilerError::io(path, e.to_string()))
}

/// Collects tuning XML documents from files and directories (searched
/// recursively), keyed by the kind each file holds.
pub fn load_documents(paths: &[PathBuf]) -> Result<XmlDocuments, CompilerError> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let before = files.len();
            for entry in WalkDir::new(path)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let file = entry.path();
                if file.is_file() && file.extension().is_some_and(|ext| ext == "xml") {
                    files.push(file.to_path_buf());
                }
            }
            if files.len() == before {
                return Err(CompilerError::NoArtifacts { path: path.clone() });
            }
        } else {
            files.push(path.clone());
        }
    }

    let mut documents = XmlDocuments::new();
    let mut origins: Vec<(ir::ArtifactKind, PathBuf)> = Vec::new();
    for file in files {
        let bytes = std::fs::read(&file).map_err(|e| CompilerError::io(&file, e.to_string()))?;
        let file_name = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let kind = frontend::xml::detect_kind(&file_name, &bytes)
            .ok_or_else(|| CompilerError::UnknownArtifact { path: file.clone() })?;

        if let Some((_, first)) = origins.iter().find(|(seen, _)| *seen == kind) {
            return Err(CompilerError::DuplicateArtifact {
                kind: kind.to_string(),
                first: first.clone(),
                second: file,
            });
        }
        tracing::debug!(path = %file.display(), %kind, "loaded tuning XML");
        origins.push((kind, file));
        documents.insert(kind, bytes);
    }
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ArtifactKind;

    #[test]
    fn test_compile_writes_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("mod.jpe");
        std::fs::write(&input, "[Project]\nid: m\nname: M\nversion: 1.0.0\nend\n[Traits]\nid: t\nend\n").unwrap();

        let compiler = Compiler::new(CompilerConfig {
            input,
            out_dir: Some(dir.path().join("out")),
            ..Default::default()
        });
        let report = compiler.compile().unwrap();
        assert!(report.is_success(), "{:?}", report.diagnostics);
        assert!(dir.path().join("out").join("m_traits.xml").is_file());
    }

    #[test]
    fn test_missing_input_is_io_error() {
        let compiler = Compiler::new(CompilerConfig {
            input: PathBuf::from("/definitely/not/here.jpe"),
            ..Default::default()
        });
        assert!(matches!(compiler.check(), Err(CompilerError::IoError { .. })));
    }

    #[test]
    fn test_load_documents_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("m_buffs.xml"), "<BuffTuning/>").unwrap();
        std::fs::write(dir.path().join("moods.xml"), "<EnumTuning/>").unwrap();
        std::fs::write(dir.path().join("readme.txt"), "ignored").unwrap();

        let documents = load_documents(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(
            documents.keys().copied().collect::<Vec<_>>(),
            vec![ArtifactKind::Buff, ArtifactKind::EnumTuning]
        );
    }

    #[test]
    fn test_load_documents_rejects_unknown_and_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let notes = dir.path().join("notes.xml");
        std::fs::write(&notes, "<Notes/>").unwrap();
        assert!(matches!(load_documents(&[notes]), Err(CompilerError::UnknownArtifact { .. })));

        let a = dir.path().join("a_buffs.xml");
        let b = dir.path().join("b_buffs.xml");
        std::fs::write(&a, "<BuffTuning/>").unwrap();
        std::fs::write(&b, "<BuffTuning/>").unwrap();
        assert!(matches!(load_documents(&[a, b]), Err(CompilerError::DuplicateArtifact { .. })));
    }

    #[test]
    fn test_empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_documents(&[dir.path().to_path_buf()]),
            Err(CompilerError::NoArtifacts { .. })
        ));
    }
}
