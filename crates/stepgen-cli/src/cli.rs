//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueHint};
use stepgen_common_config::{ConfigLoader, StepgenConfig};
use tracing::debug;

use crate::commands::generate;
use crate::error::CliError;

/// Stepgen - Cucumber step definition generator
///
/// Scans the project's feature files and writes one TypeScript step
/// definition stub file per feature file.
#[derive(Debug, Parser)]
#[command(
    name = "stepgen",
    author,
    version,
    about,
    long_about = None,
    help_template = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
"
)]
pub struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        help = "Increase verbosity level"
    )]
    pub verbose: u8,

    /// Suppress progress output
    #[arg(
        short,
        long,
        conflicts_with = "verbose",
        help = "Suppress non-error output"
    )]
    pub quiet: bool,

    /// Project root containing the features and steps directories
    #[arg(
        long,
        env = "STEPGEN_PROJECT_DIR",
        value_hint = ValueHint::DirPath,
        help = "Project directory (defaults to the current directory)"
    )]
    pub project_dir: Option<PathBuf>,

    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "STEPGEN_CONFIG",
        value_hint = ValueHint::FilePath,
        help = "Path to configuration file"
    )]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        default_value = "text",
        value_enum,
        help = "Output format (text, json)"
    )]
    pub format: OutputFormat,
}

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Settings shared by everything that writes to the terminal
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub format: OutputFormat,
    pub quiet: bool,
    pub project_dir: PathBuf,
}

impl CommandContext {
    /// Whether progress lines should be printed.
    pub fn show_progress(&self) -> bool {
        !self.quiet && self.format == OutputFormat::Text
    }
}

impl Cli {
    /// Resolve the project directory.
    pub fn project_dir(&self) -> Result<PathBuf, CliError> {
        match &self.project_dir {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir()
                .map_err(|e| CliError::io("cannot determine the current directory", e)),
        }
    }

    /// Load configuration from `--config` or the project's `.stepgen/config.yaml`.
    pub fn load_config(&self, project_dir: &std::path::Path) -> Result<StepgenConfig, CliError> {
        let mut loader = ConfigLoader::new(project_dir);
        if let Some(path) = &self.config {
            loader = loader.with_file(path);
        }

        debug!(path = %loader.config_path().display(), "loading configuration");
        Ok(loader.load()?)
    }

    /// Execute the generation run.
    pub fn execute(self) -> Result<(), CliError> {
        let project_dir = self.project_dir()?;
        let config = self.load_config(&project_dir)?;

        let ctx = CommandContext {
            format: self.format,
            quiet: self.quiet,
            project_dir,
        };

        generate::execute(&ctx, config)
    }
}
