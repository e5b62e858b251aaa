//! The engine's external interface.
//!
//! Four operations, each returning a serializable result with camelCase
//! field names, so callers outside Rust get plain JSON:
//!
//! * [`translate_to_xml`]: JPE text → tuning XML, in memory
//! * [`translate_to_jpe`]: tuning XML → JPE text
//! * [`validate`]: JPE text → diagnostics only
//! * [`build`]: the full orchestrated pipeline with a build id

use serde::Serialize;

use crate::build::{BuildId, BuildInput, BuildOptions, BuildOrchestrator, BuildReport};
use crate::codegen;
use crate::diagnostic::{Diagnostic, DiagnosticCode, DiagnosticsExt, Position, Severity, Stage};
use crate::frontend::jpe;
use crate::frontend::xml::{XmlDocuments, XmlFrontend};
use crate::frontend::Frontend;
use crate::validate::validate_with_source_map;

/// One error as reported by [`validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEntry {
    pub code: DiagnosticCode,
    pub message: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl From<&Diagnostic> for ErrorEntry {
    fn from(diagnostic: &Diagnostic) -> Self {
        Self {
            code: diagnostic.code,
            message: diagnostic.message.clone(),
            severity: diagnostic.severity,
            position: diagnostic.position,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ErrorEntry>,
    pub warnings: Vec<String>,
    /// Help texts of all diagnostics, de-duplicated in order.
    pub suggestions: Vec<String>,
}

impl ValidationResult {
    pub fn from_diagnostics(diagnostics: &[Diagnostic]) -> Self {
        Self {
            is_valid: !diagnostics.has_errors(),
            errors: diagnostics.iter().filter(|d| d.is_error()).map(ErrorEntry::from).collect(),
            warnings: messages(diagnostics, Severity::Warning),
            suggestions: suggestions(diagnostics),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// A produced artifact, as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactSummary {
    pub id: String,
    pub kind: String,
    pub size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// The XML document itself.
    #[serde(skip)]
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildResult {
    pub success: bool,
    pub artifacts: Vec<ArtifactSummary>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_id: Option<BuildId>,
    pub diagnostics: Vec<Diagnostic>,
}

impl From<BuildReport> for BuildResult {
    fn from(report: BuildReport) -> Self {
        let success = report.is_success();
        let artifacts = report
            .artifacts
            .into_iter()
            .map(|artifact| ArtifactSummary {
                kind: artifact.kind.to_string(),
                size: artifact.bytes.len(),
                path: artifact.path.map(|p| p.display().to_string()),
                id: artifact.id,
                content: artifact.bytes,
            })
            .collect();
        Self {
            success,
            artifacts,
            errors: messages(&report.diagnostics, Severity::Error),
            warnings: messages(&report.diagnostics, Severity::Warning),
            build_id: Some(report.build_id),
            diagnostics: report.diagnostics,
        }
    }
}

fn messages(diagnostics: &[Diagnostic], severity: Severity) -> Vec<String> {
    diagnostics
        .iter()
        .filter(|d| d.severity == severity)
        .map(ToString::to_string)
        .collect()
}

fn suggestions(diagnostics: &[Diagnostic]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for help in diagnostics.iter().filter_map(|d| d.help.as_ref()) {
        if !out.contains(help) {
            out.push(help.clone());
        }
    }
    out
}

/// Parses, validates and generates XML in memory. No build id is assigned
/// and nothing is written.
pub fn translate_to_xml(jpe_source: &str) -> BuildResult {
    let output = jpe::parse(jpe_source);
    let mut diagnostics = output.diagnostics;
    diagnostics.extend(validate_with_source_map(&output.ir, &output.source_map));

    let generated = if diagnostics.has_errors() {
        Ok(Default::default())
    } else {
        codegen::generate(&output.ir)
    };
    let artifacts = match generated {
        Ok(generated) => generated
            .into_iter()
            .map(|(kind, bytes)| ArtifactSummary {
                id: crate::build::artifact_id(&output.ir.metadata, kind),
                kind: kind.to_string(),
                size: bytes.len(),
                path: None,
                content: bytes,
            })
            .collect(),
        Err(error) => {
            diagnostics.push(Diagnostic::new(
                DiagnosticCode::ArtifactWriteFailed,
                Stage::Generate,
                format!("could not generate tuning XML: {}", error),
            ));
            Vec::new()
        }
    };

    BuildResult {
        success: !diagnostics.has_errors(),
        artifacts,
        errors: messages(&diagnostics, Severity::Error),
        warnings: messages(&diagnostics, Severity::Warning),
        build_id: None,
        diagnostics,
    }
}

/// Reads tuning XML back into JPE text.
///
/// `content` is present whenever parsing produced anything; `success` is
/// false if reading or validation reported errors.
pub fn translate_to_jpe(documents: &XmlDocuments) -> TranslationResult {
    let frontend = XmlFrontend::new();
    let output = frontend.parse(documents);
    tracing::debug!(
        language = frontend.language(),
        documents = documents.len(),
        entities = output.ir.entity_count(),
        "read tuning documents"
    );
    let mut diagnostics = output.diagnostics;
    diagnostics.extend(validate_with_source_map(&output.ir, &output.source_map));

    let content = (!output.ir.is_empty() || documents.is_empty()).then(|| codegen::serialize(&output.ir));
    TranslationResult {
        success: !diagnostics.has_errors(),
        content,
        errors: messages(&diagnostics, Severity::Error),
        warnings: messages(&diagnostics, Severity::Warning),
    }
}

/// Parses and validates without generating anything.
pub fn validate(jpe_source: &str) -> ValidationResult {
    ValidationResult::from_diagnostics(&diagnose(jpe_source))
}

/// Parse diagnostics followed by validator diagnostics for `jpe_source`.
pub fn diagnose(jpe_source: &str) -> Vec<Diagnostic> {
    let output = jpe::parse(jpe_source);
    let mut diagnostics = output.diagnostics;
    diagnostics.extend(validate_with_source_map(&output.ir, &output.source_map));
    diagnostics
}

/// Runs the full pipeline with a fresh build id.
pub fn build(input: impl Into<BuildInput>, options: &BuildOptions) -> BuildResult {
    BuildOrchestrator::new(options.clone()).run(input).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ArtifactKind;
    use indoc::indoc;

    #[test]
    fn test_validate_reports_positions_and_suggestions() {
        let result = validate(indoc! {"
            [Traits]
            id: cheerful
            buff: ghost_buff
            end
        "});
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, DiagnosticCode::DanglingReference);
        assert_eq!(result.errors[0].position, Some(Position::new(3, 1)));
        assert_eq!(result.warnings.len(), 1);
        assert!(result.suggestions.iter().any(|s| s.contains("ghost_buff")));
    }

    #[test]
    fn test_validation_result_json_shape() {
        let json = serde_json::to_value(validate("[Buffs]\nid: a\nend\n")).unwrap();
        assert_eq!(json["isValid"], true);
        assert!(json["errors"].as_array().unwrap().is_empty());
        assert_eq!(json["warnings"].as_array().unwrap().len(), 1);
        assert!(json.get("suggestions").is_some());
    }

    #[test]
    fn test_translate_to_xml_has_no_build_id() {
        let result = translate_to_xml("[Project]\nid: m\nname: M\nversion: 1.0.0\nend\n[Buffs]\nid: a\nend\n");
        assert!(result.success);
        assert_eq!(result.build_id, None);
        assert_eq!(result.artifacts[0].id, "m_buffs.xml");
        assert!(String::from_utf8_lossy(&result.artifacts[0].content).contains("<Buff n=\"a\"/>"));
    }

    #[test]
    fn test_translate_to_xml_refuses_on_errors() {
        let result = translate_to_xml("[Buffs]\nid: a\nend\n[Buffs]\nid: a\nend\n");
        assert!(!result.success);
        assert!(result.artifacts.is_empty());
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn test_translate_to_jpe() {
        let mut documents = XmlDocuments::new();
        documents.insert(
            ArtifactKind::Trait,
            br#"<TraitTuning project="m" name="M" version="1.0.0"><Trait n="cheerful"/></TraitTuning>"#.to_vec(),
        );
        let result = translate_to_jpe(&documents);
        assert!(result.success, "{:?}", result.errors);
        assert_eq!(
            result.content.as_deref(),
            Some("[Project]\nname: M\nid: m\nversion: 1.0.0\nend\n\n[Traits]\nid: cheerful\nend\n")
        );
    }

    #[test]
    fn test_translate_to_jpe_with_broken_document() {
        let mut documents = XmlDocuments::new();
        documents.insert(ArtifactKind::Buff, b"<BuffTuning>".to_vec());
        let result = translate_to_jpe(&documents);
        assert!(!result.success);
        assert_eq!(result.content, None);
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn test_build_result_carries_build_id() {
        let result = build("", &BuildOptions::default());
        assert!(result.success);
        assert!(result.build_id.is_some());
        let json = serde_json::to_value(&result).unwrap();
        assert!(json["buildId"].is_string());
    }
}
