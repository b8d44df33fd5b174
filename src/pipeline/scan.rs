//! Directory scanning: find the icon sources a batch should process.
//!
//! The scan is shallow (direct children only) and matches on file extension,
//! case-insensitively. A [`SourceSet`] does not cache the listing: every call
//! to [`SourceSet::iter`] re-reads the directory, so the sequence can be
//! restarted and always reflects what is on disk.

use crate::error::IconsetError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// How a source is turned into pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// `.svg` markup, rendered by resvg.
    Vector,
    /// `.png` bitmap, decoded and resampled.
    Raster,
}

impl SourceKind {
    /// Classify a path by extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "svg" => Some(SourceKind::Vector),
            "png" => Some(SourceKind::Raster),
            _ => None,
        }
    }
}

/// One input file, identified by its stem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub path: PathBuf,
    /// File name without extension; names the bundle directory.
    pub stem: String,
    pub kind: SourceKind,
}

impl SourceDocument {
    /// Build a source from a path, or `None` if the extension is unknown or
    /// the file has no usable stem.
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let kind = SourceKind::from_path(&path)?;
        let stem = path.file_stem()?.to_string_lossy().into_owned();
        if stem.is_empty() {
            return None;
        }
        Some(Self { path, stem, kind })
    }

    /// File name for display.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.stem.clone())
    }
}

/// Create the input and output directories if they don't exist.
///
/// Idempotent: existing directories are left untouched.
pub fn ensure_directories(input_dir: &Path, output_dir: &Path) -> Result<(), IconsetError> {
    for dir in [input_dir, output_dir] {
        fs::create_dir_all(dir).map_err(|e| IconsetError::CreateDirFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}

/// The sources found directly inside a directory.
#[derive(Debug, Clone)]
pub struct SourceSet {
    dir: PathBuf,
    kinds: Vec<SourceKind>,
}

impl SourceSet {
    /// Describe the sources of `kinds` inside `dir`. Nothing is read yet.
    pub fn new(dir: impl Into<PathBuf>, kinds: &[SourceKind]) -> Self {
        Self {
            dir: dir.into(),
            kinds: kinds.to_vec(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Enumerate matching sources in filesystem order.
    ///
    /// Entries that can't be inspected are logged and skipped; only failure
    /// to open the directory itself is an error.
    pub fn iter(&self) -> Result<impl Iterator<Item = SourceDocument> + '_, IconsetError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| IconsetError::ReadDirFailed {
            path: self.dir.clone(),
            source: e,
        })?;

        Ok(entries.filter_map(move |entry| {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry in {}: {}", self.dir.display(), e);
                    return None;
                }
            };
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if !is_file {
                return None;
            }
            let doc = SourceDocument::from_path(entry.path())?;
            if !self.kinds.contains(&doc.kind) {
                return None;
            }
            debug!("Found source: {}", doc.path.display());
            Some(doc)
        }))
    }

    /// Collect the current listing.
    pub fn collect(&self) -> Result<Vec<SourceDocument>, IconsetError> {
        Ok(self.iter()?.collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn classify_extensions() {
        assert_eq!(SourceKind::from_path(Path::new("a.svg")), Some(SourceKind::Vector));
        assert_eq!(SourceKind::from_path(Path::new("a.SVG")), Some(SourceKind::Vector));
        assert_eq!(SourceKind::from_path(Path::new("a.png")), Some(SourceKind::Raster));
        assert_eq!(SourceKind::from_path(Path::new("a.jpg")), None);
        assert_eq!(SourceKind::from_path(Path::new("svg")), None);
    }

    #[test]
    fn source_stem() {
        let doc = SourceDocument::from_path("input/brand.logo.svg").unwrap();
        assert_eq!(doc.stem, "brand.logo");
        assert_eq!(doc.file_name(), "brand.logo.svg");
    }

    #[test]
    fn ensure_directories_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("input");
        let output = tmp.path().join("nested/output");
        ensure_directories(&input, &output).unwrap();
        ensure_directories(&input, &output).unwrap();
        assert!(input.is_dir());
        assert!(output.is_dir());
    }

    #[test]
    fn scan_filters_by_kind_and_skips_directories() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.svg"), "<svg/>").unwrap();
        fs::write(tmp.path().join("b.png"), [0u8; 4]).unwrap();
        fs::write(tmp.path().join("notes.txt"), "x").unwrap();
        fs::create_dir(tmp.path().join("dir.svg")).unwrap();

        let vectors = SourceSet::new(tmp.path(), &[SourceKind::Vector]).collect().unwrap();
        assert_eq!(vectors.len(), 1);
        assert_eq!(vectors[0].stem, "a");

        let all = SourceSet::new(tmp.path(), &[SourceKind::Vector, SourceKind::Raster])
            .collect()
            .unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn scan_is_restartable() {
        let tmp = TempDir::new().unwrap();
        let set = SourceSet::new(tmp.path(), &[SourceKind::Vector]);
        assert_eq!(set.iter().unwrap().count(), 0);
        fs::write(tmp.path().join("late.svg"), "<svg/>").unwrap();
        assert_eq!(set.iter().unwrap().count(), 1);
    }

    #[test]
    fn scan_missing_dir_is_error() {
        let tmp = TempDir::new().unwrap();
        let set = SourceSet::new(tmp.path().join("absent"), &[SourceKind::Vector]);
        assert!(matches!(set.iter(), Err(IconsetError::ReadDirFailed { .. })));
    }
}
