use crate::error::{FitError, FitExploreError, Result};
use crate::models::ActivityData;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub mod fit;

/// Trait for decoding activity recordings from a file format
pub trait ImportFormat: Send + Sync {
    /// Check if this importer can handle the given file
    fn can_import(&self, file_path: &Path) -> bool;

    /// Decode the file into records and events
    fn import_file(&self, file_path: &Path) -> Result<ActivityData>;

    /// Get the format name for this importer
    fn get_format_name(&self) -> &'static str;
}

/// Outcome of importing one file from a directory
#[derive(Debug)]
pub struct FileImportResult {
    pub file_path: PathBuf,
    pub result: Result<ActivityData>,
}

/// Manager for coordinating import formats
pub struct ImportManager {
    importers: Vec<Box<dyn ImportFormat>>,
}

impl ImportManager {
    /// Create a new import manager with all available importers
    pub fn new() -> Self {
        let importers: Vec<Box<dyn ImportFormat>> = vec![Box::new(fit::FitImporter::new())];
        Self { importers }
    }

    /// Import a single file, auto-detecting the format
    pub fn import_file(&self, file_path: &Path) -> Result<ActivityData> {
        let importer = self
            .importers
            .iter()
            .find(|importer| importer.can_import(file_path))
            .ok_or_else(|| FitError::Corrupted {
                reason: format!("unsupported file type: {}", file_path.display()),
            })?;

        info!(
            file = %file_path.display(),
            format = importer.get_format_name(),
            "Importing activity"
        );
        importer.import_file(file_path)
    }

    /// Import every supported file in a directory, decoding files in parallel.
    ///
    /// Results come back sorted by path; a failing file does not stop the
    /// others.
    pub fn import_directory(&self, dir_path: &Path) -> Result<Vec<FileImportResult>> {
        let files = self.collect_importable_files(dir_path)?;
        if files.is_empty() {
            warn!(dir = %dir_path.display(), "No importable files found");
        }

        let results: Vec<FileImportResult> = files
            .into_par_iter()
            .map(|file_path| {
                let result = self.import_file(&file_path);
                if let Err(e) = &result {
                    warn!(file = %file_path.display(), error = %e, "Failed to import file");
                }
                FileImportResult { file_path, result }
            })
            .collect();

        Ok(results)
    }

    /// Check if any importer accepts the file
    pub fn can_import_file(&self, file_path: &Path) -> bool {
        self.importers.iter().any(|importer| importer.can_import(file_path))
    }

    fn collect_importable_files(&self, dir_path: &Path) -> Result<Vec<PathBuf>> {
        if !dir_path.is_dir() {
            return Err(FitExploreError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("not a directory: {}", dir_path.display()),
            )));
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir_path)? {
            let path = entry?.path();
            if path.is_file() && self.can_import_file(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

impl Default for ImportManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_unsupported_extension_rejected() {
        let manager = ImportManager::new();
        assert!(!manager.can_import_file(Path::new("run.gpx")));
        assert!(manager.can_import_file(Path::new("run.FIT")));

        let err = manager.import_file(Path::new("run.gpx")).unwrap_err();
        assert!(matches!(err, FitExploreError::FitParsing(FitError::Corrupted { .. })));
    }

    #[test]
    fn test_import_directory_collects_failures() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("b.fit"), b"not a fit file").unwrap();
        std::fs::write(dir.path().join("a.fit"), b"").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let results = ImportManager::new().import_directory(dir.path()).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].file_path.ends_with("a.fit"));
        assert!(results.iter().all(|r| r.result.is_err()));
    }

    #[test]
    fn test_import_directory_requires_directory() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("run.fit");
        std::fs::write(&file, b"").unwrap();
        assert!(ImportManager::new().import_directory(&file).is_err());
    }
}
