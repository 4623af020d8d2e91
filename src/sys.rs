//! File-system helpers used by the pipeline targets.
//!
//! Directory discovery and cleanup are small enough to keep on `std::fs`.
//! Every deletion here is best effort with respect to missing paths: removing
//! something that does not exist is not an error.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;

/// Find directories under `root` whose file name is one of `names`.
///
/// Matching directories are not descended into. A missing `root` yields an
/// empty list. Results are sorted.
pub fn find_directories(root: &Path, names: &[&str]) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    if root.is_dir() {
        walk(root, names, &mut found)?;
    }
    found.sort();
    Ok(found)
}

fn walk(dir: &Path, names: &[&str], found: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }

        let path = entry.path();
        let matches = entry
            .file_name()
            .to_str()
            .map(|n| names.contains(&n))
            .unwrap_or(false);

        if matches {
            found.push(path);
        } else {
            walk(&path, names, found)?;
        }
    }
    Ok(())
}

/// Recursively delete a directory if it exists.
pub fn delete_directory(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => {
            debug!("Deleted directory {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Make `path` an existing, empty directory.
pub fn ensure_clean_directory(path: &Path) -> Result<()> {
    if path.is_dir() {
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let entry_path = entry.path();
            if entry.file_type()?.is_dir() {
                fs::remove_dir_all(&entry_path)?;
            } else {
                fs::remove_file(&entry_path)?;
            }
        }
    } else {
        fs::create_dir_all(path)?;
    }
    debug!("Cleaned directory {}", path.display());
    Ok(())
}

/// Delete a file if it exists.
pub fn delete_file(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Files directly inside `dir` with the given extension, sorted.
pub fn files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case(extension))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}
