//! Result types returned by the converter.
//!
//! Every output file is one [`ArtifactResult`]: either the path it was
//! written to or the [`UnitError`] that made the converter skip it. A
//! document's results are grouped in a [`BundleReport`]; a run is a
//! [`BatchOutput`]. Nothing here is an error by itself; callers decide how
//! strict to be via [`BundleReport::is_complete`] and
//! [`BatchOutput::is_complete`].

use crate::error::UnitError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which table an output file comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// `{stem}-{size}x{size}.png`
    SizedPng,
    /// A named platform icon (touch icon, tile icon, …).
    SpecialIcon,
    /// The multi-frame `favicon.ico`.
    Ico,
    /// The standalone `favicon.png`.
    FaviconPng,
}

/// Outcome of producing one output file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactResult {
    /// File name inside the bundle directory.
    pub file_name: String,
    pub kind: ArtifactKind,
    /// Requested edge(s). One entry except for the ICO, which lists the
    /// frames that made it into the file.
    pub sizes: Vec<u32>,
    /// Where the file was written, when it was.
    pub path: Option<PathBuf>,
    /// Why the file is missing, when it is.
    pub error: Option<UnitError>,
    /// Failures that did not prevent the file from being written (an ICO
    /// frame that failed to render).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<UnitError>,
}

impl ArtifactResult {
    pub fn written(
        file_name: impl Into<String>,
        kind: ArtifactKind,
        sizes: Vec<u32>,
        path: PathBuf,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            kind,
            sizes,
            path: Some(path),
            error: None,
            warnings: Vec::new(),
        }
    }

    pub fn skipped(
        file_name: impl Into<String>,
        kind: ArtifactKind,
        sizes: Vec<u32>,
        error: UnitError,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            kind,
            sizes,
            path: None,
            error: Some(error),
            warnings: Vec::new(),
        }
    }

    pub fn is_written(&self) -> bool {
        self.error.is_none() && self.path.is_some()
    }
}

/// Everything the converter produced (or skipped) for one source document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleReport {
    pub source: PathBuf,
    pub stem: String,
    pub bundle_dir: PathBuf,
    pub artifacts: Vec<ArtifactResult>,
    pub duration_ms: u64,
}

impl BundleReport {
    pub fn written_count(&self) -> usize {
        self.artifacts.iter().filter(|a| a.is_written()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.artifacts.len() - self.written_count()
    }

    /// True when no file was skipped and no ICO frame was dropped.
    pub fn is_complete(&self) -> bool {
        self.artifacts
            .iter()
            .all(|a| a.is_written() && a.warnings.is_empty())
    }

    /// Every unit failure of this bundle, including dropped ICO frames.
    pub fn failures(&self) -> impl Iterator<Item = &UnitError> {
        self.artifacts
            .iter()
            .flat_map(|a| a.error.iter().chain(a.warnings.iter()))
    }

    pub fn artifact(&self, file_name: &str) -> Option<&ArtifactResult> {
        self.artifacts.iter().find(|a| a.file_name == file_name)
    }
}

/// A document whose bundle could not be produced at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedDocument {
    pub source: PathBuf,
    pub error: String,
}

/// Summary counters for a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchStats {
    /// Sources found by the scan.
    pub total_documents: usize,
    /// Bundles with every file written.
    pub complete_documents: usize,
    /// Bundles with at least one skipped file.
    pub incomplete_documents: usize,
    /// Documents that failed as a whole.
    pub failed_documents: usize,
    pub files_written: usize,
    pub files_skipped: usize,
    pub total_duration_ms: u64,
}

/// Result of [`crate::convert::convert_all`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchOutput {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Bundles in scan order.
    pub bundles: Vec<BundleReport>,
    pub failed: Vec<FailedDocument>,
    pub stats: BatchStats,
}

impl BatchOutput {
    /// True when the scan found no sources.
    pub fn is_empty_input(&self) -> bool {
        self.stats.total_documents == 0
    }

    /// True when every document produced a complete bundle.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.bundles.iter().all(BundleReport::is_complete)
    }

    pub(crate) fn compute_stats(&mut self, total_documents: usize, total_duration_ms: u64) {
        let complete = self.bundles.iter().filter(|b| b.is_complete()).count();
        self.stats = BatchStats {
            total_documents,
            complete_documents: complete,
            incomplete_documents: self.bundles.len() - complete,
            failed_documents: self.failed.len(),
            files_written: self.bundles.iter().map(BundleReport::written_count).sum(),
            files_skipped: self.bundles.iter().map(BundleReport::failed_count).sum(),
            total_duration_ms,
        };
    }
}
