//! Configuration types.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepgenConfig {
    /// Input and output locations, relative to the project directory.
    pub paths: PathsConfig,
    /// Code generation settings.
    pub generation: GenerationConfig,
}

impl StepgenConfig {
    /// Absolute (or project-relative) features directory.
    pub fn features_dir(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.paths.features_dir)
    }

    /// Absolute (or project-relative) generated steps directory.
    pub fn steps_dir(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.paths.steps_dir)
    }
}

/// Directory layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory scanned recursively for feature files.
    pub features_dir: PathBuf,
    /// Directory the step definition files are written to.
    pub steps_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            features_dir: PathBuf::from("tests/features"),
            steps_dir: PathBuf::from("tests/steps"),
        }
    }
}

/// Generated file settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Extension of feature files, without the dot.
    pub feature_extension: String,
    /// Suffix appended to a feature's base name to form the output file name.
    pub output_suffix: String,
    /// Module the step registration functions are imported from.
    pub cucumber_module: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            feature_extension: "feature".to_string(),
            output_suffix: ".steps.ts".to_string(),
            cucumber_module: "@cucumber/cucumber".to_string(),
        }
    }
}
