//! File scanner for discovering order export files.
//!
//! This module walks an input directory and filters entries by extension,
//! exclusion patterns and file size.

use crate::config::ScannerConfig;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Configuration for file scanning.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// File extensions to include (e.g., ["json"])
    pub extensions: Vec<String>,
    /// Names to exclude (e.g., ["archive", "tmp"])
    pub excludes: Vec<String>,
    /// Maximum file size in bytes
    pub max_file_size: u64,
    /// Maximum number of files to return
    pub max_files: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::from(&ScannerConfig::default())
    }
}

impl From<&ScannerConfig> for ScanConfig {
    fn from(config: &ScannerConfig) -> Self {
        Self {
            extensions: config
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            excludes: config.excludes.clone(),
            max_file_size: config.max_file_size,
            max_files: Some(config.max_files),
        }
    }
}

/// Scanned file information.
#[derive(Debug, Clone)]
pub struct ScannedFile {
    /// Path relative to the scanned root
    pub path: String,
    /// Path used to read the file
    pub absolute_path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

/// File scanner for discovering order exports.
pub struct FileScanner {
    config: ScanConfig,
    root: PathBuf,
}

impl FileScanner {
    /// Create a new file scanner.
    pub fn new(root: PathBuf, config: ScanConfig) -> Self {
        Self { config, root }
    }

    /// Scan for all matching files, sorted by relative path.
    ///
    /// A root that is itself a file is returned as the only entry without
    /// any filtering.
    pub fn scan(&self) -> Result<Vec<ScannedFile>> {
        if self.root.is_file() {
            let metadata = fs::metadata(&self.root)
                .with_context(|| format!("Failed to read {}", self.root.display()))?;
            return Ok(vec![ScannedFile {
                path: self.root.display().to_string(),
                absolute_path: self.root.clone(),
                size: metadata.len(),
            }]);
        }

        if !self.root.is_dir() {
            return Err(anyhow::anyhow!(
                "Input not found: {}",
                self.root.display()
            ));
        }

        let mut files = Vec::new();

        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.is_excluded(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Cannot read entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() || !self.matches(entry.path()) {
                continue;
            }

            let size = match entry.metadata() {
                Ok(metadata) if metadata.len() <= self.config.max_file_size => metadata.len(),
                Ok(metadata) => {
                    debug!(
                        "Skipping {} ({} bytes over limit)",
                        entry.path().display(),
                        metadata.len()
                    );
                    continue;
                }
                Err(_) => continue,
            };

            let rel_path = entry
                .path()
                .strip_prefix(&self.root)
                .unwrap_or(entry.path());

            files.push(ScannedFile {
                path: rel_path.to_string_lossy().replace('\\', "/"),
                absolute_path: entry.path().to_path_buf(),
                size,
            });
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));

        if let Some(max) = self.config.max_files {
            files.truncate(max);
        }

        Ok(files)
    }

    /// Check if a path has an accepted extension.
    pub fn matches(&self, path: &Path) -> bool {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        self.config.extensions.iter().any(|allowed| *allowed == ext)
    }

    /// Hidden entries and explicit excludes are skipped.
    fn is_excluded(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();

        if name.starts_with('.') {
            return true;
        }

        self.config.excludes.iter().any(|pattern| name == pattern.as_str())
    }
}
