//! Compiler configuration: CLI flags merged over an optional
//! `compy.toml` project file.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Knobs that steer one compilation, independent of where they came
/// from (CLI flag or project file).
#[derive(Debug, Clone, Default)]
pub struct CompilerConfig {
    /// Print the generated assembly to stderr once codegen completes.
    pub debug_pipeline: bool,
    /// Keep the generated `.nasm` file next to the source instead of a
    /// scratch temp directory.
    pub debug_asm: bool,
    /// Keep the assembled `.o` file next to the source instead of a
    /// scratch temp directory.
    pub debug_obj: bool,
    /// Run the produced binary after a successful build.
    pub run_after_compile: bool,
    /// Output path override; defaults to the source prefix + `.out`.
    pub output: Option<PathBuf>,
}

/// The on-disk shape of `compy.toml`. Every field is optional: a
/// project file only needs to mention the defaults it wants to change,
/// and a CLI flag always wins over whatever it sets.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProjectFile {
    pub debug_pipeline: Option<bool>,
    pub debug_asm: Option<bool>,
    pub debug_obj: Option<bool>,
    pub run_after_compile: Option<bool>,
    pub output: Option<PathBuf>,
}

impl ProjectFile {
    /// Loads `compy.toml` from `dir`, if present. A missing file is not
    /// an error; a malformed one is.
    pub fn load(dir: &Path) -> Result<Self, String> {
        let path = dir.join("compy.toml");
        if !path.exists() {
            return Ok(ProjectFile::default());
        }
        let text = std::fs::read_to_string(&path).map_err(|e| format!("{}: {e}", path.display()))?;
        toml::from_str(&text).map_err(|e| format!("{}: {e}", path.display()))
    }

    /// Applies this file's settings as defaults beneath `config`: a
    /// field already set by the CLI is left untouched.
    pub fn apply_defaults(&self, config: &mut CompilerConfig) {
        if let Some(v) = self.debug_pipeline {
            config.debug_pipeline = config.debug_pipeline || v;
        }
        if let Some(v) = self.debug_asm {
            config.debug_asm = config.debug_asm || v;
        }
        if let Some(v) = self.debug_obj {
            config.debug_obj = config.debug_obj || v;
        }
        if let Some(v) = self.run_after_compile {
            config.run_after_compile = config.run_after_compile || v;
        }
        if config.output.is_none() {
            config.output = self.output.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_file_only_fills_unset_fields() {
        let file = ProjectFile { debug_asm: Some(true), ..Default::default() };
        let mut config = CompilerConfig { debug_pipeline: true, ..Default::default() };
        file.apply_defaults(&mut config);
        assert!(config.debug_pipeline);
        assert!(config.debug_asm);
    }

    #[test]
    fn missing_project_file_is_not_an_error() {
        let dir = std::env::temp_dir();
        assert!(ProjectFile::load(&dir).is_ok());
    }
}
