use crate::error::Result;
use log::debug;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File scanner for traversing a service's source tree.
///
/// The `FileScanner` recursively walks a directory to find all Rust source files that may
/// carry handler annotations. It skips the `target` directory, hidden directories (those
/// starting with `.`), and files whose name marks them as tests (`*_test.rs`, `*_tests.rs`,
/// `tests.rs`).
///
/// Any filesystem error aborts the scan.
///
/// # Example
///
/// ```no_run
/// use openapi_from_annotations::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./my-service"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} Rust files", result.rust_files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
}

/// Result of a directory scan.
pub struct ScanResult {
    /// Paths of all discovered `.rs` files, in file-name order
    pub rust_files: Vec<PathBuf>,
    /// Rust files that were left out because their name marks them as tests
    pub skipped_tests: Vec<PathBuf>,
}

impl FileScanner {
    /// Creates a new `FileScanner` for the specified root directory.
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Scans the directory tree and collects all non-test `.rs` files.
    ///
    /// # Errors
    ///
    /// Returns the first filesystem error encountered (unreadable directory, broken
    /// root path, ...).
    pub fn scan(&self) -> Result<ScanResult> {
        let mut rust_files = Vec::new();
        let mut skipped_tests = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                // Don't filter the root directory itself
                if e.path() == self.root_path {
                    return true;
                }

                let file_name = e.file_name().to_string_lossy();
                let is_hidden = file_name.starts_with('.');
                let is_target = file_name == "target";

                !is_hidden && !is_target
            })
        {
            let entry = entry?;
            let path = entry.path();

            if !entry.file_type().is_file() || path.extension().and_then(|s| s.to_str()) != Some("rs") {
                continue;
            }

            if is_test_file(path) {
                debug!("Skipping test file: {}", path.display());
                skipped_tests.push(path.to_path_buf());
                continue;
            }

            rust_files.push(path.to_path_buf());
        }

        debug!(
            "Scan of {} found {} files ({} test files skipped)",
            self.root_path.display(),
            rust_files.len(),
            skipped_tests.len()
        );

        Ok(ScanResult {
            rust_files,
            skipped_tests,
        })
    }
}

/// Returns true when the file name follows a test-file naming convention.
pub fn is_test_file(path: &Path) -> bool {
    let stem = match path.file_stem().and_then(|s| s.to_str()) {
        Some(stem) => stem,
        None => return false,
    };

    stem == "tests" || stem.ends_with("_test") || stem.ends_with("_tests")
}
