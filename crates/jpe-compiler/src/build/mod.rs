//! Build orchestration: parse → validate → generate → package.
//!
//! Each build is a synchronous pipeline owned end to end by one caller.
//! [`BuildOrchestrator`] keeps no state between runs, so independent builds
//! can run on as many threads as the caller likes.

mod id;
mod options;
mod package;
mod state;

pub use id::BuildId;
pub use options::{BuildOptions, CONFIG_FILE_NAME};
pub use package::{
    artifact_id, package, write_artifacts, BuildManifest, ManifestEntry, PackagedArtifact,
    MANIFEST_FILE_NAME,
};
pub use state::BuildState;

use crate::codegen;
use crate::diagnostic::{Diagnostic, DiagnosticCode, DiagnosticsExt, Severity, Stage};
use crate::frontend::jpe::JpeFrontend;
use crate::frontend::{Frontend, SourceMap};
use crate::ir::ProjectIR;
use crate::validate::validate_with_source_map;

/// What a build starts from.
#[derive(Debug, Clone)]
pub enum BuildInput {
    /// JPE source text.
    Source(String),
    /// An already-built IR; the parse stage is a pass-through.
    Project(ProjectIR),
}

impl From<String> for BuildInput {
    fn from(source: String) -> Self {
        BuildInput::Source(source)
    }
}

impl From<&str> for BuildInput {
    fn from(source: &str) -> Self {
        BuildInput::Source(source.to_string())
    }
}

impl From<ProjectIR> for BuildInput {
    fn from(ir: ProjectIR) -> Self {
        BuildInput::Project(ir)
    }
}

/// Outcome of one build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub build_id: BuildId,
    /// Terminal state: `Succeeded` or `Failed`.
    pub state: BuildState,
    /// Every state visited, starting with `Idle`.
    pub transitions: Vec<BuildState>,
    /// Parse, validation and packaging diagnostics, in stage order.
    pub diagnostics: Vec<Diagnostic>,
    /// Empty unless the build succeeded.
    pub artifacts: Vec<PackagedArtifact>,
    /// The IR the build worked on (possibly partial on failure).
    pub project: ProjectIR,
    pub source_map: SourceMap,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.state == BuildState::Succeeded
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_warning())
    }
}

/// Runs builds with a fixed set of options.
#[derive(Debug, Clone, Default)]
pub struct BuildOrchestrator {
    options: BuildOptions,
}

impl BuildOrchestrator {
    pub fn new(options: BuildOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Runs one build to a terminal state.
    pub fn run(&self, input: impl Into<BuildInput>) -> BuildReport {
        let mut run = Run::new();
        let span = tracing::info_span!("build", build_id = %run.build_id);
        let _guard = span.enter();

        run.transition(BuildState::Parsing);
        let (project, source_map) = match input.into() {
            BuildInput::Source(source) => {
                let frontend = JpeFrontend::new();
                let output = frontend.parse(&source);
                tracing::debug!(
                    language = frontend.language(),
                    entities = output.ir.entity_count(),
                    "parsed build input"
                );
                run.diagnostics.extend(output.diagnostics);
                (output.ir, output.source_map)
            }
            BuildInput::Project(ir) => (ir, SourceMap::new()),
        };

        run.transition(BuildState::Validating);
        run.diagnostics.extend(validate_with_source_map(&project, &source_map));
        if self.options.strict {
            for diagnostic in run.diagnostics.iter_mut().filter(|d| d.is_warning()) {
                diagnostic.severity = Severity::Error;
            }
        }
        if run.diagnostics.has_errors() {
            tracing::debug!(errors = run.diagnostics.error_count(), "validation failed");
            return run.finish(BuildState::Failed, project, source_map, Vec::new());
        }

        run.transition(BuildState::Generating);
        let generated = match codegen::generate(&project) {
            Ok(generated) => generated,
            Err(error) => {
                tracing::warn!(%error, "failed to generate artifacts");
                run.diagnostics.push(Diagnostic::new(
                    DiagnosticCode::ArtifactWriteFailed,
                    Stage::Generate,
                    format!("could not generate tuning XML: {}", error),
                ));
                return run.finish(BuildState::Failed, project, source_map, Vec::new());
            }
        };

        run.transition(BuildState::Packaging);
        let mut artifacts = package(&project.metadata, generated);
        if let Some(out_dir) = &self.options.out_dir {
            let manifest = self
                .options
                .write_manifest
                .then(|| BuildManifest::new(run.build_id, &project.metadata, &artifacts));
            if let Err(error) = write_artifacts(out_dir, &mut artifacts, manifest.as_ref()) {
                tracing::warn!(%error, "failed to write artifacts");
                run.diagnostics.push(Diagnostic::new(
                    DiagnosticCode::ArtifactWriteFailed,
                    Stage::Package,
                    error.to_string(),
                ));
                return run.finish(BuildState::Failed, project, source_map, Vec::new());
            }
        }

        run.finish(BuildState::Succeeded, project, source_map, artifacts)
    }
}

/// Book-keeping for one run of the state machine.
struct Run {
    build_id: BuildId,
    state: BuildState,
    transitions: Vec<BuildState>,
    diagnostics: Vec<Diagnostic>,
}

impl Run {
    fn new() -> Self {
        Self {
            build_id: BuildId::new(),
            state: BuildState::Idle,
            transitions: vec![BuildState::Idle],
            diagnostics: Vec::new(),
        }
    }

    fn transition(&mut self, next: BuildState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal build transition {} -> {}",
            self.state,
            next
        );
        tracing::debug!(from = %self.state, to = %next, "build state");
        self.state = next;
        self.transitions.push(next);
    }

    fn finish(
        mut self,
        state: BuildState,
        project: ProjectIR,
        source_map: SourceMap,
        artifacts: Vec<PackagedArtifact>,
    ) -> BuildReport {
        self.transition(state);
        tracing::info!(
            state = %state,
            artifacts = artifacts.len(),
            errors = self.diagnostics.error_count(),
            warnings = self.diagnostics.warning_count(),
            "build finished"
        );
        BuildReport {
            build_id: self.build_id,
            state,
            transitions: self.transitions,
            diagnostics: self.diagnostics,
            artifacts,
            project,
            source_map,
        }
    }
}
