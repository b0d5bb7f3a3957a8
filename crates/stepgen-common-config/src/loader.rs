//! Configuration file loading and parsing.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::types::StepgenConfig;

/// Directory (under the project root) holding the config file.
pub const CONFIG_DIR: &str = ".stepgen";
/// Config file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.yaml";

static ENV_VAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").expect("valid env var pattern"));

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid YAML at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError { line: Option<usize>, message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },
}

/// Configuration loader.
pub struct ConfigLoader {
    base_path: PathBuf,
    explicit_file: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a loader for the given project directory.
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            base_path: project_dir.as_ref().to_path_buf(),
            explicit_file: None,
        }
    }

    /// Read from `path` instead of `.stepgen/config.yaml`. The file must exist.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_file = Some(path.into());
        self
    }

    /// Path the loader reads from.
    pub fn config_path(&self) -> PathBuf {
        match &self.explicit_file {
            Some(path) => path.clone(),
            None => self.base_path.join(CONFIG_DIR).join(CONFIG_FILE),
        }
    }

    /// Load configuration, falling back to defaults when the implicit file is absent.
    pub fn load(&self) -> Result<StepgenConfig, ConfigError> {
        let config_path = self.config_path();

        if !config_path.exists() {
            if self.explicit_file.is_some() {
                return Err(ConfigError::NotFound { path: config_path });
            }
            return Ok(StepgenConfig::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;
        let expanded = self.expand_env_vars(&contents)?;

        // An empty file deserializes to null rather than an empty mapping
        if expanded.trim().is_empty() {
            return Ok(StepgenConfig::default());
        }

        let config: StepgenConfig =
            serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?;

        self.validate(&config)?;
        Ok(config)
    }

    /// Expand environment variables in the form `${VAR}` or `${VAR:-default}`.
    fn expand_env_vars(&self, content: &str) -> Result<String, ConfigError> {
        let mut result = String::with_capacity(content.len());
        let mut last = 0;

        for cap in ENV_VAR.captures_iter(content) {
            let Some(whole) = cap.get(0) else { continue };
            let var_name = &cap[1];
            let default = cap.get(2).map(|m| m.as_str());

            let value = match std::env::var(var_name) {
                Ok(v) => v,
                Err(_) => match default {
                    Some(d) => d.to_string(),
                    None => {
                        return Err(ConfigError::EnvVarNotFound {
                            var: var_name.to_string(),
                        })
                    }
                },
            };

            result.push_str(&content[last..whole.start()]);
            result.push_str(&value);
            last = whole.end();
        }

        result.push_str(&content[last..]);
        Ok(result)
    }

    /// Validate configuration values.
    fn validate(&self, config: &StepgenConfig) -> Result<(), ConfigError> {
        let generation = &config.generation;

        if generation.feature_extension.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "generation.feature_extension must not be empty".to_string(),
            });
        }

        if generation.feature_extension.starts_with('.') {
            return Err(ConfigError::ValidationError {
                message: "generation.feature_extension must not start with '.'".to_string(),
            });
        }

        if generation.output_suffix.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "generation.output_suffix must not be empty".to_string(),
            });
        }

        if generation.cucumber_module.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "generation.cucumber_module must not be empty".to_string(),
            });
        }

        if config.paths.features_dir.as_os_str().is_empty()
            || config.paths.steps_dir.as_os_str().is_empty()
        {
            return Err(ConfigError::ValidationError {
                message: "paths.features_dir and paths.steps_dir must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Save configuration to `.stepgen/config.yaml` (or the explicit file).
    pub fn save(&self, config: &StepgenConfig) -> Result<(), ConfigError> {
        let config_path = self.config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(config).map_err(|e| ConfigError::ParseError {
            line: None,
            message: e.to_string(),
        })?;

        std::fs::write(config_path, yaml)?;
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(std::env::current_dir().unwrap_or_default())
    }
}
