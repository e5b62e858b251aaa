//! Build options, loadable from `jpe.json`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::diagnostic::CompilerError;

/// File name looked up next to the input when no config path is given.
pub const CONFIG_FILE_NAME: &str = "jpe.json";

/// Options for one build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct BuildOptions {
    /// Directory to write artifacts to. Artifacts stay in memory when unset.
    pub out_dir: Option<PathBuf>,

    /// Treat warnings as errors.
    pub strict: bool,

    /// Write `build-manifest.json` next to the artifacts.
    pub write_manifest: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            out_dir: None,
            strict: false,
            write_manifest: true,
        }
    }
}

impl BuildOptions {
    /// Reads options from a JSON file. A relative `outDir` is resolved
    /// against the file's directory.
    pub fn load(path: &Path) -> Result<Self, CompilerError> {
        let text = std::fs::read_to_string(path).map_err(|e| CompilerError::io(path, e.to_string()))?;
        let mut options: BuildOptions =
            serde_json::from_str(&text).map_err(|e| CompilerError::InvalidConfig {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        if let (Some(out_dir), Some(base)) = (&options.out_dir, path.parent()) {
            if out_dir.is_relative() {
                options.out_dir = Some(base.join(out_dir));
            }
        }
        Ok(options)
    }

    /// Loads `jpe.json` from `dir` if present, else the defaults.
    pub fn discover(dir: &Path) -> Result<Self, CompilerError> {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }
}
