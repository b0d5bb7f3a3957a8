//! Feature-to-step-definition generation run.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use stepgen_common_config::StepgenConfig;
use stepgen_common_fs::{self as fs, path};
use tracing::{debug, info, warn};

use crate::dedup::CompiledStepSet;
use crate::directory::{FeatureDirectory, FeatureDirectoryError, FeatureFile};
use crate::parsing::StepExtractor;
use crate::rendering::{RenderError, StepRenderer};
use crate::step::StepKeyword;

/// Outcome of generating one step definition file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    /// Feature file, relative to the project directory
    pub source: String,
    /// Generated file, relative to the project directory
    pub output: String,
    /// Steps found before deduplication
    pub total_steps: usize,
    pub unique_steps: usize,
    pub given: usize,
    pub when: usize,
    pub then: usize,
    /// Lines that matched no known construct
    pub skipped_lines: usize,
    #[serde(skip)]
    pub keys: Vec<(StepKeyword, String)>,
}

/// Totals across a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub files_processed: usize,
    pub files_generated: usize,
    pub total_steps: usize,
    /// Distinct `(keyword, pattern)` pairs across all files
    pub distinct_patterns: usize,
    pub skipped_lines: usize,
    /// Outputs written more than once in this run, last writer wins
    pub overwritten_outputs: Vec<String>,
    pub files: Vec<FileReport>,
    #[serde(skip)]
    seen: HashSet<(StepKeyword, String)>,
    #[serde(skip)]
    outputs: HashSet<String>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a finished file into the totals.
    pub fn record(&mut self, report: FileReport) {
        self.files_processed += 1;
        self.files_generated += 1;
        self.total_steps += report.total_steps;
        self.skipped_lines += report.skipped_lines;
        self.seen.extend(report.keys.iter().cloned());
        self.distinct_patterns = self.seen.len();

        if !self.outputs.insert(report.output.clone()) {
            warn!(
                output = %report.output,
                source = %report.source,
                "output file already written in this run; overwriting"
            );
            self.overwritten_outputs.push(report.output.clone());
        }

        self.files.push(report);
    }
}

/// Drives discovery, extraction, compilation and emission for a project.
pub struct Generator {
    project_dir: PathBuf,
    config: StepgenConfig,
    extractor: StepExtractor,
    renderer: StepRenderer,
}

impl Generator {
    pub fn new(project_dir: impl Into<PathBuf>, config: StepgenConfig) -> Result<Self, GenerateError> {
        Ok(Self {
            project_dir: project_dir.into(),
            config,
            extractor: StepExtractor::new(),
            renderer: StepRenderer::new()?,
        })
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn config(&self) -> &StepgenConfig {
        &self.config
    }

    pub fn features_dir(&self) -> PathBuf {
        self.config.features_dir(&self.project_dir)
    }

    pub fn steps_dir(&self) -> PathBuf {
        self.config.steps_dir(&self.project_dir)
    }

    /// Path relative to the project directory, forward slashes.
    pub fn relative(&self, path: &Path) -> String {
        path::display_relative(path, &self.project_dir)
    }

    /// Find every feature file. Finding none is an error.
    pub fn discover(&self) -> Result<Vec<PathBuf>, GenerateError> {
        let dir = FeatureDirectory::new(self.features_dir(), &self.config.generation.feature_extension);
        let files = dir.discover()?;

        if files.is_empty() {
            return Err(GenerateError::NoFeatureFiles {
                dir: self.features_dir(),
                extension: self.config.generation.feature_extension.clone(),
            });
        }

        info!(count = files.len(), dir = %self.features_dir().display(), "found feature files");
        Ok(files)
    }

    /// Create the steps directory if it does not exist.
    pub fn prepare_output(&self) -> Result<(), GenerateError> {
        fs::ensure_dir(self.steps_dir())?;
        Ok(())
    }

    /// Output path for a feature file.
    pub fn output_path(&self, feature: &FeatureFile) -> Result<PathBuf, GenerateError> {
        let stem = feature.stem()?;
        Ok(self
            .steps_dir()
            .join(format!("{stem}{}", self.config.generation.output_suffix)))
    }

    /// Generate the step definition file for one feature file.
    pub fn process_file(&self, feature_path: &Path) -> Result<FileReport, GenerateError> {
        let feature = FeatureFile::load(feature_path)?;
        let source = self.relative(&feature.path);

        let extraction = self.extractor.extract(&feature.content);
        let skipped_lines = extraction.skipped_lines;
        let records = extraction.compile();
        let total_steps = records.len();

        let steps: CompiledStepSet = records.into_iter().collect();
        debug!(%source, total = total_steps, unique = steps.len(), "compiled steps");

        let rendered = self.renderer.render_file(
            &steps,
            total_steps,
            &source,
            &self.config.generation.cucumber_module,
        )?;

        let output_path = self.output_path(&feature)?;
        fs::write_string_atomic(&output_path, &rendered)?;

        let output = self.relative(&output_path);
        info!(%source, %output, "generated step definitions");

        Ok(FileReport {
            source,
            output,
            total_steps,
            unique_steps: steps.len(),
            given: steps.count(StepKeyword::Given),
            when: steps.count(StepKeyword::When),
            then: steps.count(StepKeyword::Then),
            skipped_lines,
            keys: steps
                .iter()
                .map(|r| (r.keyword, r.pattern.clone()))
                .collect(),
        })
    }

    /// Process every discovered file in order.
    pub fn run(&self) -> Result<RunSummary, GenerateError> {
        let files = self.discover()?;
        self.prepare_output()?;

        let mut summary = RunSummary::new();
        for file in &files {
            summary.record(self.process_file(file)?);
        }
        Ok(summary)
    }
}

/// Generation errors
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("No .{extension} files found in {}", dir.display())]
    NoFeatureFiles { dir: PathBuf, extension: String },

    #[error(transparent)]
    Directory(#[from] FeatureDirectoryError),

    #[error(transparent)]
    Fs(#[from] fs::FsError),

    #[error(transparent)]
    Render(#[from] RenderError),
}
