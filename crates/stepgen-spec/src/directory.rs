use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use stepgen_common_fs as fs;
use tracing::debug;

/// A directory tree of feature files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureDirectory {
    /// Root searched recursively
    pub root: PathBuf,
    /// File extension without the leading dot
    pub extension: String,
}

/// A loaded feature file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureFile {
    pub path: PathBuf,
    pub content: String,
}

impl FeatureDirectory {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }

    /// All feature files under the root, sorted by file name at each level.
    ///
    /// A missing root yields no files.
    pub fn discover(&self) -> Result<Vec<PathBuf>, FeatureDirectoryError> {
        if !self.exists() {
            debug!(root = %self.root.display(), "feature directory does not exist");
            return Ok(Vec::new());
        }

        let files = fs::find_files_with_extension(&self.root, &self.extension)?;
        debug!(root = %self.root.display(), count = files.len(), "discovered feature files");
        Ok(files)
    }
}

impl FeatureFile {
    /// Read a feature file from disk.
    pub fn load(path: &Path) -> Result<Self, FeatureDirectoryError> {
        let content = fs::read_to_string(path, fs::DEFAULT_MAX_FILE_SIZE)?;
        Ok(Self {
            path: path.to_path_buf(),
            content,
        })
    }

    /// File name without its extension.
    pub fn stem(&self) -> Result<&str, FeatureDirectoryError> {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| FeatureDirectoryError::InvalidFileName(self.path.clone()))
    }
}

/// Feature directory errors
#[derive(Debug, thiserror::Error)]
pub enum FeatureDirectoryError {
    #[error("Invalid feature file name: {0}")]
    InvalidFileName(PathBuf),

    #[error(transparent)]
    Fs(#[from] fs::FsError),
}
