//! Path manipulation utilities.

use std::path::{Component, Path, PathBuf};

/// Normalize a path by resolving `.` and `..` without hitting the filesystem.
pub fn normalize(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::Prefix(p) => components.push(Component::Prefix(p)),
            Component::RootDir => {
                components.clear();
                components.push(Component::RootDir);
            }
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::ParentDir) | None => components.push(Component::ParentDir),
                // Never climb above a root or prefix
                Some(_) => {}
            },
            Component::Normal(c) => components.push(Component::Normal(c)),
        }
    }

    if components.is_empty() {
        PathBuf::from(".")
    } else {
        components.iter().collect()
    }
}

/// Make a path relative to a base path.
pub fn relative_to(path: impl AsRef<Path>, base: impl AsRef<Path>) -> PathBuf {
    let path = normalize(path);
    let base = normalize(base);

    let mut path_components = path.components().peekable();
    let mut base_components = base.components().peekable();

    while let (Some(p), Some(b)) = (path_components.peek(), base_components.peek()) {
        if p != b {
            break;
        }
        path_components.next();
        base_components.next();
    }

    let mut result = PathBuf::new();
    for _ in base_components {
        result.push("..");
    }
    for component in path_components {
        result.push(component);
    }

    if result.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        result
    }
}

/// Render `path` relative to `base` with forward slashes, for reports and
/// generated headers.
pub fn display_relative(path: impl AsRef<Path>, base: impl AsRef<Path>) -> String {
    relative_to(path, base)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
