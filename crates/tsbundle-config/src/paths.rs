//! Lexical path resolution and clean-target safety.
//!
//! Nothing here touches the filesystem: paths are joined onto the project
//! root and normalized with `path-clean`.

use std::path::{Path, PathBuf};

use path_clean::PathClean;

use crate::error::{ConfigError, Result};

/// Check that `root` is absolute and return its normalized form.
pub fn project_root(root: &Path) -> Result<PathBuf> {
    if !root.is_absolute() {
        return Err(ConfigError::RelativeProjectRoot(root.to_path_buf()));
    }
    Ok(root.clean())
}

/// Resolve `path` against `root`. Absolute inputs are only normalized.
pub fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.clean()
    } else {
        root.join(path).clean()
    }
}

/// `true` when `inner` equals `outer` or lies beneath it.
fn within(inner: &Path, outer: &Path) -> bool {
    inner.starts_with(outer)
}

/// Find the protected path a clean of `output` would destroy, if any.
///
/// The protected set is the project root, the source directory and the
/// directory holding the entry file. Cleaning is unsafe when the output
/// directory overlaps any of them in either direction. Below the project root
/// only the `ignorable` directories (absolute) and their descendants may be
/// cleaned; any other subdirectory reports the root as protected.
pub fn clean_conflict(
    output: &Path,
    root: &Path,
    source_dir: &Path,
    entry: &Path,
    ignorable: &[PathBuf],
) -> Option<PathBuf> {
    if within(root, output) {
        return Some(root.to_path_buf());
    }

    if within(output, source_dir) || within(source_dir, output) {
        return Some(source_dir.to_path_buf());
    }

    if within(entry, output) {
        return Some(entry.to_path_buf());
    }

    if let Some(entry_dir) = entry.parent() {
        if entry_dir != root && within(output, entry_dir) {
            return Some(entry_dir.to_path_buf());
        }
    }

    if within(output, root) && !ignorable.iter().any(|dir| within(output, dir)) {
        return Some(root.to_path_buf());
    }

    None
}
