//! CLI error handling and formatting.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use stepgen_common_config::ConfigError;
use stepgen_spec::{FeatureDirectoryError, GenerateError, RenderError};
use thiserror::Error;

/// CLI error type with rich context
#[derive(Debug, Error)]
pub enum CliError {
    #[error("No .{extension} files found!")]
    NoFeatureFiles { dir: PathBuf, extension: String },

    #[error("{message}")]
    Config {
        message: String,
        #[source]
        source: Option<ConfigError>,
        hint: Option<String>,
    },

    #[error("{message}")]
    Io {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        path: Option<PathBuf>,
    },

    #[error("{message}")]
    Render {
        message: String,
        #[source]
        source: RenderError,
    },

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Get the error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoFeatureFiles { .. } => "E001",
            Self::Config { .. } => "E002",
            Self::Io { .. } => "E003",
            Self::Render { .. } => "E004",
            Self::Other(_) => "E999",
        }
    }

    /// Process exit status for this error
    pub fn status(&self) -> u8 {
        match self {
            Self::Config { .. } => 2,
            Self::Render { .. } => 4,
            Self::NoFeatureFiles { .. } | Self::Io { .. } | Self::Other(_) => 1,
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.status())
    }

    /// Get hint for this error if available
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NoFeatureFiles { dir, .. } => Some(format!(
                "searched {}; set paths.features_dir in .stepgen/config.yaml or pass --project-dir",
                dir.display()
            )),
            Self::Config { hint, .. } => hint.clone(),
            Self::Io { path: Some(path), .. } => Some(format!("path: {}", path.display())),
            _ => None,
        }
    }

    /// Create an IO error
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(Box::new(source)),
            path: None,
        }
    }

    /// Format for display on stderr
    pub fn render(&self) -> String {
        let mut out = format!("error[{}]: {self}", self.code());
        if let Some(hint) = self.hint() {
            out.push_str("\n  hint: ");
            out.push_str(&hint);
        }
        out
    }
}

// Conversion implementations
impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: Some(Box::new(err)),
            path: None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        let hint = match &err {
            ConfigError::NotFound { .. } => Some("check the --config path or STEPGEN_CONFIG".to_string()),
            ConfigError::EnvVarNotFound { var } => {
                Some(format!("set {var} or give it a default with ${{{var}:-value}}"))
            }
            _ => Some("check .stepgen/config.yaml".to_string()),
        };

        Self::Config {
            message: err.to_string(),
            source: Some(err),
            hint,
        }
    }
}

impl From<stepgen_common_fs::FsError> for CliError {
    fn from(err: stepgen_common_fs::FsError) -> Self {
        let path = err.path().to_path_buf();
        Self::Io {
            message: err.to_string(),
            source: Some(Box::new(err)),
            path: Some(path),
        }
    }
}

impl From<GenerateError> for CliError {
    fn from(err: GenerateError) -> Self {
        match err {
            GenerateError::NoFeatureFiles { dir, extension } => {
                Self::NoFeatureFiles { dir, extension }
            }
            GenerateError::Directory(FeatureDirectoryError::Fs(e)) | GenerateError::Fs(e) => e.into(),
            GenerateError::Directory(e @ FeatureDirectoryError::InvalidFileName(_)) => Self::Io {
                message: e.to_string(),
                source: None,
                path: None,
            },
            GenerateError::Render(e) => Self::Render {
                message: format!("failed to render step definitions: {e}"),
                source: e,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_feature_files_exit_code() {
        let err: CliError = GenerateError::NoFeatureFiles {
            dir: PathBuf::from("/app/tests/features"),
            extension: "feature".to_string(),
        }
        .into();

        assert_eq!(err.status(), 1);
        assert_eq!(err.to_string(), "No .feature files found!");
        assert!(err.hint().unwrap().contains("/app/tests/features"));
    }

    #[test]
    fn test_config_errors_exit_2() {
        let err: CliError = ConfigError::ValidationError {
            message: "bad".to_string(),
        }
        .into();

        assert_eq!(err.status(), 2);
        assert_eq!(err.code(), "E002");
        assert!(err.hint().is_some());
    }

    #[test]
    fn test_env_var_hint() {
        let err: CliError = ConfigError::EnvVarNotFound {
            var: "FEATURES".to_string(),
        }
        .into();

        assert_eq!(err.hint().unwrap(), "set FEATURES or give it a default with ${FEATURES:-value}");
    }

    #[test]
    fn test_io_errors_exit_1() {
        let err = CliError::io("boom", io::Error::new(io::ErrorKind::Other, "disk"));
        assert_eq!(err.status(), 1);
        assert_eq!(err.code(), "E003");

        let err: CliError = stepgen_common_fs::FsError::Write {
            path: PathBuf::from("out.ts"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        }
        .into();
        assert_eq!(err.status(), 1);
        assert_eq!(err.hint().unwrap(), "path: out.ts");
    }

    #[test]
    fn test_render_includes_code_and_hint() {
        let err = CliError::NoFeatureFiles {
            dir: PathBuf::from("features"),
            extension: "feature".to_string(),
        };
        let rendered = err.render();

        assert!(rendered.starts_with("error[E001]: No .feature files found!"));
        assert!(rendered.contains("\n  hint: searched features;"));
    }
}
