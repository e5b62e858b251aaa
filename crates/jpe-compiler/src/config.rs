//! Compiler configuration.

use std::path::PathBuf;

use crate::build::BuildOptions;

/// Configuration for the filesystem-facing [`Compiler`](crate::Compiler).
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// JPE source file to compile.
    pub input: PathBuf,

    /// Output directory; overrides `options.out_dir` when set.
    pub out_dir: Option<PathBuf>,

    /// Options passed to every build.
    pub options: BuildOptions,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("mod.jpe"),
            out_dir: None,
            options: BuildOptions::default(),
        }
    }
}

impl CompilerConfig {
    /// Build options with the output directory override applied.
    pub fn build_options(&self) -> BuildOptions {
        let mut options = self.options.clone();
        if let Some(out_dir) = &self.out_dir {
            options.out_dir = Some(out_dir.clone());
        }
        options
    }
}
