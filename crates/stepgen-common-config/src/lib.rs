//! Configuration types for stepgen.
//!
//! This crate provides the configuration used by the step generator,
//! read from an optional `.stepgen/config.yaml` in the project directory.

pub mod loader;
pub mod types;

pub use loader::*;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    #[test]
    fn test_default_config_has_sensible_values() {
        let config = StepgenConfig::default();

        assert_eq!(config.paths.features_dir, PathBuf::from("tests/features"));
        assert_eq!(config.paths.steps_dir, PathBuf::from("tests/steps"));
        assert_eq!(config.generation.feature_extension, "feature");
        assert_eq!(config.generation.output_suffix, ".steps.ts");
        assert_eq!(config.generation.cucumber_module, "@cucumber/cucumber");
    }

    #[test]
    fn test_config_serializes_to_yaml() {
        let yaml = serde_yaml::to_string(&StepgenConfig::default()).unwrap();

        assert!(yaml.contains("paths:"));
        assert!(yaml.contains("generation:"));
        assert!(yaml.contains("features_dir: tests/features"));
        assert!(yaml.contains("feature_extension: feature"));
    }

    #[test]
    fn test_directories_resolve_against_project() {
        let config = StepgenConfig::default();
        let project = Path::new("/work/app");

        assert_eq!(
            config.features_dir(project),
            PathBuf::from("/work/app/tests/features")
        );
        assert_eq!(config.steps_dir(project), PathBuf::from("/work/app/tests/steps"));
    }
}
