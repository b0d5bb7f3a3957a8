//! File system utilities for stepgen.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

pub mod path;

/// Default upper bound for a single feature file.
pub const DEFAULT_MAX_FILE_SIZE: usize = 16 * 1024 * 1024;

/// File system errors.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("file not found: {}", path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("file too large: {} is {size} bytes (max: {max})", path.display())]
    TooLarge { path: PathBuf, size: u64, max: usize },

    #[error("failed to walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

impl FsError {
    /// Path the failed operation was working on.
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound { path, .. }
            | Self::Read { path, .. }
            | Self::Write { path, .. }
            | Self::TooLarge { path, .. }
            | Self::Walk { path, .. } => path,
        }
    }
}

/// Result alias for file system operations.
pub type Result<T> = std::result::Result<T, FsError>;

fn read_error(path: &Path, e: io::Error) -> FsError {
    match e.kind() {
        io::ErrorKind::NotFound => FsError::NotFound {
            path: path.to_path_buf(),
            source: e,
        },
        _ => FsError::Read {
            path: path.to_path_buf(),
            source: e,
        },
    }
}

fn write_error(path: &Path, e: io::Error) -> FsError {
    FsError::Write {
        path: path.to_path_buf(),
        source: e,
    }
}

/// Read a file to string with size limit.
pub fn read_to_string(path: impl AsRef<Path>, max_size: usize) -> Result<String> {
    let path = path.as_ref();

    let metadata = fs::metadata(path).map_err(|e| read_error(path, e))?;
    if metadata.len() as usize > max_size {
        return Err(FsError::TooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max: max_size,
        });
    }

    let content = fs::read_to_string(path).map_err(|e| read_error(path, e))?;

    // Editors on Windows like to prepend a BOM
    Ok(match content.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => content,
    })
}

/// Write to a file atomically (write to temp, then rename).
pub fn write_atomic(path: impl AsRef<Path>, contents: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let parent = path.parent().unwrap_or(Path::new("."));

    ensure_dir(parent)?;

    let mut temp_path = path.to_path_buf();
    if let Some(name) = path.file_name() {
        temp_path.set_file_name(format!(".{}.tmp", name.to_string_lossy()));
    } else {
        temp_path.push(".tmp");
    }

    let mut file = File::create(&temp_path).map_err(|e| write_error(&temp_path, e))?;
    let written = file
        .write_all(contents)
        .and_then(|()| file.sync_all())
        .map_err(|e| write_error(&temp_path, e));
    drop(file);

    let result = written.and_then(|()| fs::rename(&temp_path, path).map_err(|e| write_error(path, e)));
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

/// Write string to file atomically.
pub fn write_string_atomic(path: impl AsRef<Path>, contents: &str) -> Result<()> {
    write_atomic(path, contents.as_bytes())
}

/// Ensure a directory exists.
pub fn ensure_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if !path.is_dir() {
        fs::create_dir_all(path).map_err(|e| write_error(path, e))?;
    }
    Ok(())
}

/// Recursively collect every file under `dir` whose extension is `extension`.
///
/// Entries are visited in file-name order so the result is stable across
/// platforms. A missing `dir` yields an empty list.
pub fn find_files_with_extension(
    dir: impl AsRef<Path>,
    extension: &str,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| FsError::Walk {
            path: dir.to_path_buf(),
            source: e,
        })?;

        if entry.file_type().is_file()
            && entry.path().extension().map_or(false, |ext| ext == extension)
        {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}
