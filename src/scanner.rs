use anyhow::Result;
use log::{debug, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions collected when a pattern names a directory
pub const DEFAULT_EXTENSIONS: [&str; 6] = ["js", "jsx", "ts", "tsx", "mjs", "cjs"];

/// Directory names never descended into
const SKIPPED_DIRECTORIES: [&str; 2] = ["node_modules", "target"];

/// File scanner resolving source patterns to files.
///
/// Each pattern is resolved against the base directory. A pattern naming a
/// directory is walked recursively, collecting files with one of the configured
/// extensions and skipping hidden directories, `node_modules` and `target`.
/// Any other pattern is expanded as a glob.
///
/// # Example
///
/// ```no_run
/// use openapi_from_comments::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("."), vec!["routes/**/*.js".to_string()]);
/// let result = scanner.scan().unwrap();
/// println!("Found {} source files", result.source_files.len());
/// ```
pub struct FileScanner {
    base_dir: PathBuf,
    patterns: Vec<String>,
    extensions: Vec<String>,
}

/// Result of resolving the source patterns.
pub struct ScanResult {
    /// Discovered files, de-duplicated, in discovery order
    pub source_files: Vec<PathBuf>,
    /// Warning messages for patterns or entries that could not be read
    pub warnings: Vec<String>,
}

impl FileScanner {
    /// Creates a scanner for `patterns` relative to `base_dir`.
    pub fn new(base_dir: PathBuf, patterns: Vec<String>) -> Self {
        Self {
            base_dir,
            patterns,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Replaces the extensions collected from directory patterns.
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.trim_start_matches('.').to_string())
            .collect();
        self
    }

    /// Resolves every pattern.
    ///
    /// Unreadable entries and invalid patterns are reported as warnings; the
    /// scan itself only fails on conditions affecting every pattern.
    pub fn scan(&self) -> Result<ScanResult> {
        let mut source_files = Vec::new();
        let mut seen = HashSet::new();
        let mut warnings = Vec::new();

        for pattern in &self.patterns {
            let resolved = self.base_dir.join(pattern);
            debug!("Resolving pattern: {}", resolved.display());

            let found = if resolved.is_dir() {
                self.walk_directory(&resolved, &mut warnings)
            } else {
                expand_glob(&resolved, &mut warnings)
            };

            if found.is_empty() {
                let warning = format!("Pattern matched no files: {}", pattern);
                warn!("{}", warning);
                warnings.push(warning);
            }

            for path in found {
                if seen.insert(path.clone()) {
                    source_files.push(path);
                }
            }
        }

        Ok(ScanResult {
            source_files,
            warnings,
        })
    }

    fn walk_directory(&self, root: &Path, warnings: &mut Vec<String>) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for entry in WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                // Don't filter the root directory itself
                if e.path() == root {
                    return true;
                }
                if !e.file_type().is_dir() {
                    return true;
                }
                let file_name = e.file_name().to_string_lossy();
                !file_name.starts_with('.') && !SKIPPED_DIRECTORIES.contains(&file_name.as_ref())
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && self.has_source_extension(path) {
                        files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        files
    }

    fn has_source_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }
}

fn expand_glob(pattern: &Path, warnings: &mut Vec<String>) -> Vec<PathBuf> {
    let pattern = pattern.to_string_lossy();
    let paths = match glob::glob(&pattern) {
        Ok(paths) => paths,
        Err(e) => {
            let warning = format!("Invalid pattern {}: {}", pattern, e);
            warn!("{}", warning);
            warnings.push(warning);
            return Vec::new();
        }
    };

    let mut files = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => {
                let warning = format!("Failed to access path: {}", e);
                warn!("{}", warning);
                warnings.push(warning);
            }
        }
    }
    files
}
