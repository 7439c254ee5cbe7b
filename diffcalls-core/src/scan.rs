//! Deterministic discovery of diff files with directory pruning.
//!
//! - Early directory pruning via `WalkDir::filter_entry` (O(1) subtree skip)
//! - Entries sorted by file name so every run sees the same order
//! - Unreadable entries are collected, not fatal

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{DiffcallsError, DiffcallsResult, IoResultExt};

/// Directories never descended into.
const EXCLUDED_DIRS: &[&str] = &[".git"];

/// What to pick up from the input directory.
///
/// The default reads every regular file, since `git diff > changes` output
/// rarely carries an extension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Accepted extensions without the dot; empty accepts every regular file.
    pub extensions: Vec<String>,
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Extra directory names to prune.
    pub exclude: Vec<String>,
}

impl ScanOptions {
    fn accepts(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(ext))
            })
    }
}

/// Files found under the input root, plus entries that could not be read.
#[derive(Debug, Default)]
pub struct DiscoveredFiles {
    pub files: Vec<PathBuf>,
    pub errors: Vec<DiffcallsError>,
}

#[inline]
fn is_excluded_dir(entry: &walkdir::DirEntry, excludes: &HashSet<&str>) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| excludes.contains(name))
}

fn walk_error(root: &Path, err: walkdir::Error) -> DiffcallsError {
    let path = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.to_path_buf());
    let message = err.to_string();
    match err.into_io_error() {
        Some(io) => DiffcallsError::io(path, io),
        None => DiffcallsError::io_message(path, message),
    }
}

/// Gathers the diff files directly under `root` (or below it when
/// `options.recursive` is set), sorted by path.
///
/// Fails only when `root` itself is missing or not a directory.
pub fn gather_diff_files(root: &Path, options: &ScanOptions) -> DiffcallsResult<DiscoveredFiles> {
    let metadata = std::fs::metadata(root).with_path(root)?;
    if !metadata.is_dir() {
        return Err(DiffcallsError::invalid_argument(format!(
            "{} is not a directory",
            root.display()
        )));
    }

    let excludes: HashSet<&str> = EXCLUDED_DIRS
        .iter()
        .copied()
        .chain(options.exclude.iter().map(String::as_str))
        .collect();
    let max_depth = if options.recursive { usize::MAX } else { 1 };

    let mut discovered = DiscoveredFiles::default();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_excluded_dir(e, &excludes))
    {
        match entry {
            Ok(e) => {
                let path = e.path();
                if path.is_file() && options.accepts(path) {
                    discovered.files.push(path.to_path_buf());
                }
            }
            Err(e) => discovered.errors.push(walk_error(root, e)),
        }
    }

    discovered.files.sort();
    Ok(discovered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn create_temp_dir(name: &str) -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir()
            .join("diffcalls_scan_test")
            .join(format!("{}_{}_{}", name, std::process::id(), id));
        if dir.exists() {
            fs::remove_dir_all(&dir).ok();
        }
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn names(found: &DiscoveredFiles) -> Vec<String> {
        found
            .files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_extension_filter_sorted() {
        let dir = create_temp_dir("ext");
        fs::write(dir.join("b.diff"), "").unwrap();
        fs::write(dir.join("a.patch"), "").unwrap();
        fs::write(dir.join("notes.txt"), "").unwrap();
        fs::write(dir.join("C.DIFF"), "").unwrap();

        let options = ScanOptions {
            extensions: vec!["diff".to_string(), ".patch".to_string()],
            ..ScanOptions::default()
        };
        let found = gather_diff_files(&dir, &options).unwrap();
        assert_eq!(names(&found), vec!["C.DIFF", "a.patch", "b.diff"]);
        assert!(found.errors.is_empty());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_default_accepts_every_regular_file() {
        let dir = create_temp_dir("all");
        fs::write(dir.join("changes"), "").unwrap();
        fs::write(dir.join("two.txt"), "").unwrap();
        fs::write(dir.join("three.diff"), "").unwrap();

        let found = gather_diff_files(&dir, &ScanOptions::default()).unwrap();
        assert_eq!(names(&found), vec!["changes", "three.diff", "two.txt"]);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_non_recursive_by_default() {
        let dir = create_temp_dir("depth");
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("top.diff"), "").unwrap();
        fs::write(dir.join("nested/deep.diff"), "").unwrap();

        let flat = gather_diff_files(&dir, &ScanOptions::default()).unwrap();
        assert_eq!(names(&flat), vec!["top.diff"]);

        let options = ScanOptions {
            recursive: true,
            ..ScanOptions::default()
        };
        let deep = gather_diff_files(&dir, &options).unwrap();
        assert_eq!(deep.files.len(), 2);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_excluded_dirs_are_pruned() {
        let dir = create_temp_dir("prune");
        fs::create_dir_all(dir.join(".git")).unwrap();
        fs::create_dir_all(dir.join("archive")).unwrap();
        fs::write(dir.join(".git/x.diff"), "").unwrap();
        fs::write(dir.join("archive/old.diff"), "").unwrap();
        fs::write(dir.join("keep.diff"), "").unwrap();

        let options = ScanOptions {
            recursive: true,
            exclude: vec!["archive".to_string()],
            ..ScanOptions::default()
        };
        let found = gather_diff_files(&dir, &options).unwrap();
        assert_eq!(names(&found), vec!["keep.diff"]);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_root_is_error() {
        let dir = create_temp_dir("missing").join("does_not_exist");
        let err = gather_diff_files(&dir, &ScanOptions::default()).unwrap_err();
        assert!(matches!(err, DiffcallsError::Io { .. }));
    }

    #[test]
    fn test_file_root_is_invalid_argument() {
        let dir = create_temp_dir("fileroot");
        let file = dir.join("single.diff");
        fs::write(&file, "").unwrap();

        let err = gather_diff_files(&file, &ScanOptions::default()).unwrap_err();
        assert!(matches!(err, DiffcallsError::InvalidArgument { .. }));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_empty_directory() {
        let dir = create_temp_dir("empty");
        let found = gather_diff_files(&dir, &ScanOptions::default()).unwrap();
        assert!(found.files.is_empty());
        fs::remove_dir_all(&dir).ok();
    }
}
