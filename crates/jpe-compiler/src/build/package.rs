//! Packaging: naming generated documents and writing them out.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::BuildId;
use crate::codegen::GeneratedArtifacts;
use crate::diagnostic::CompilerError;
use crate::ir::{ArtifactKind, ProjectMetadata};

/// Name of the manifest written next to the artifacts.
pub const MANIFEST_FILE_NAME: &str = "build-manifest.json";

/// Artifact prefix used when the project declares no id.
const FALLBACK_PROJECT_ID: &str = "project";

/// One generated document, ready to hand out or write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagedArtifact {
    /// `<project_id>_<stem>.xml`; also the file name on disk.
    pub id: String,
    pub kind: ArtifactKind,
    pub bytes: Vec<u8>,
    /// Where the artifact was written, if it was.
    pub path: Option<PathBuf>,
}

/// Artifact id for `kind` in a project.
pub fn artifact_id(metadata: &ProjectMetadata, kind: ArtifactKind) -> String {
    let project_id = if metadata.project_id.is_empty() {
        FALLBACK_PROJECT_ID
    } else {
        metadata.project_id.as_str()
    };
    format!("{}_{}.xml", project_id, kind.file_stem())
}

/// Names every generated document, in `ArtifactKind` order.
pub fn package(metadata: &ProjectMetadata, generated: GeneratedArtifacts) -> Vec<PackagedArtifact> {
    generated
        .into_iter()
        .map(|(kind, bytes)| PackagedArtifact {
            id: artifact_id(metadata, kind),
            kind,
            bytes,
            path: None,
        })
        .collect()
}

/// Manifest describing one successful build.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildManifest {
    pub build_id: BuildId,
    pub project_id: String,
    pub name: String,
    pub version: String,
    pub compiler_version: String,
    pub built_at: DateTime<Utc>,
    pub artifacts: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub id: String,
    pub kind: String,
    pub size: usize,
}

impl BuildManifest {
    pub fn new(build_id: BuildId, metadata: &ProjectMetadata, artifacts: &[PackagedArtifact]) -> Self {
        Self {
            build_id,
            project_id: metadata.project_id.clone(),
            name: metadata.name.clone(),
            version: metadata.version.clone(),
            compiler_version: env!("CARGO_PKG_VERSION").to_string(),
            built_at: Utc::now(),
            artifacts: artifacts
                .iter()
                .map(|artifact| ManifestEntry {
                    id: artifact.id.clone(),
                    kind: artifact.kind.to_string(),
                    size: artifact.bytes.len(),
                })
                .collect(),
        }
    }
}

/// Writes every artifact (and optionally the manifest) into `out_dir`,
/// recording each artifact's path.
pub fn write_artifacts(
    out_dir: &Path,
    artifacts: &mut [PackagedArtifact],
    manifest: Option<&BuildManifest>,
) -> Result<(), CompilerError> {
    std::fs::create_dir_all(out_dir).map_err(|e| CompilerError::write(out_dir, e.to_string()))?;

    for artifact in artifacts.iter_mut() {
        let path = out_dir.join(&artifact.id);
        std::fs::write(&path, &artifact.bytes).map_err(|e| CompilerError::write(&path, e.to_string()))?;
        artifact.path = Some(path);
    }

    if let Some(manifest) = manifest {
        let path = out_dir.join(MANIFEST_FILE_NAME);
        let json = serde_json::to_string_pretty(manifest)
            .map_err(|e| CompilerError::write(&path, e.to_string()))?;
        std::fs::write(&path, json).map_err(|e| CompilerError::write(&path, e.to_string()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn metadata(project_id: &str) -> ProjectMetadata {
        ProjectMetadata {
            project_id: project_id.to_string(),
            name: "Test Mod".to_string(),
            version: "1.0.0".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_artifact_ids() {
        assert_eq!(artifact_id(&metadata("test_mod"), ArtifactKind::Buff), "test_mod_buffs.xml");
        assert_eq!(
            artifact_id(&ProjectMetadata::default(), ArtifactKind::StringTable),
            "project_strings.xml"
        );
    }

    #[test]
    fn test_write_artifacts_and_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("out");
        let mut generated = BTreeMap::new();
        generated.insert(ArtifactKind::Trait, b"<TraitTuning/>".to_vec());
        generated.insert(ArtifactKind::Buff, b"<BuffTuning/>".to_vec());

        let meta = metadata("test_mod");
        let mut artifacts = package(&meta, generated);
        assert_eq!(artifacts[0].kind, ArtifactKind::Buff);

        let manifest = BuildManifest::new(BuildId::new(), &meta, &artifacts);
        write_artifacts(&out_dir, &mut artifacts, Some(&manifest)).unwrap();

        assert_eq!(std::fs::read(out_dir.join("test_mod_buffs.xml")).unwrap(), b"<BuffTuning/>");
        assert_eq!(artifacts[1].path, Some(out_dir.join("test_mod_traits.xml")));

        let manifest: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out_dir.join(MANIFEST_FILE_NAME)).unwrap()).unwrap();
        assert_eq!(manifest["projectId"], "test_mod");
        assert_eq!(manifest["artifacts"][0]["id"], "test_mod_buffs.xml");
        assert_eq!(manifest["artifacts"][0]["size"], 13);
    }

    #[test]
    fn test_write_into_file_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let mut artifacts = package(&metadata("m"), BTreeMap::from([(ArtifactKind::Buff, Vec::new())]));
        let err = write_artifacts(&blocker, &mut artifacts, None).unwrap_err();
        assert!(matches!(err, CompilerError::WriteError { .. }));
    }
}
