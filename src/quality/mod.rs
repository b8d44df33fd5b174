//! Static quality checks for SVG icon sources.
//!
//! Favicons are displayed at 16–48 px, where thin strokes, tiny text, blur
//! and faint layers disappear. The checker parses each SVG in the input
//! directory and runs a [`RuleSet`] of heuristics over it, producing one
//! [`QualityReport`] per file. Nothing is rendered or written.
//!
//! ```text
//! scan (*.svg) ──▶ SvgDocument::parse ──▶ RuleSet::evaluate ──▶ QualityReport
//! ```
//!
//! A file that is not well-formed gets a [`CheckOutcome::Malformed`] record
//! and the batch moves on.

pub mod document;
pub mod report;
pub mod rules;

pub use document::{Element, SvgDocument};
pub use report::{format_report, format_summary, general_tips, output_guide};
pub use rules::{Finding, QualityRule, RuleSet, Severity};

use crate::config::CheckConfig;
use crate::error::IconsetError;
use crate::pipeline::scan::{SourceKind, SourceSet};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What the checker concluded about one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckOutcome {
    /// Well-formed and no rule fired.
    Clean,
    /// Findings in rule evaluation order.
    Issues { findings: Vec<Finding> },
    /// The file could not be read or is not well-formed.
    Malformed { detail: String },
}

/// Per-file result of a quality check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub file: PathBuf,
    pub size_bytes: u64,
    pub outcome: CheckOutcome,
}

impl QualityReport {
    /// File name for display.
    pub fn file_name(&self) -> String {
        self.file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file.display().to_string())
    }

    pub fn findings(&self) -> &[Finding] {
        match &self.outcome {
            CheckOutcome::Issues { findings } => findings,
            _ => &[],
        }
    }

    pub fn is_clean(&self) -> bool {
        matches!(self.outcome, CheckOutcome::Clean)
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self.outcome, CheckOutcome::Malformed { .. })
    }
}

/// Result of checking a whole directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckOutput {
    pub input_dir: PathBuf,
    /// One report per `.svg` file, sorted by file name.
    pub reports: Vec<QualityReport>,
}

impl CheckOutput {
    pub fn is_empty_input(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn clean_count(&self) -> usize {
        self.reports.iter().filter(|r| r.is_clean()).count()
    }

    pub fn malformed_count(&self) -> usize {
        self.reports.iter().filter(|r| r.is_malformed()).count()
    }

    /// Total findings across all files.
    pub fn finding_count(&self) -> usize {
        self.reports.iter().map(|r| r.findings().len()).sum()
    }
}

/// Check one file against the standard rules built from `config.thresholds`.
pub fn check_document(path: &Path, config: &CheckConfig) -> QualityReport {
    check_document_with(path, &RuleSet::standard(&config.thresholds))
}

/// Check one file against an explicit rule set.
///
/// Never fails: read and parse errors become [`CheckOutcome::Malformed`].
pub fn check_document_with(path: &Path, rules: &RuleSet) -> QualityReport {
    let read = fs::read(path).map_err(|source| IconsetError::ReadFailed {
        path: path.to_path_buf(),
        source,
    });
    let bytes = match read {
        Ok(b) => b,
        Err(e) => {
            warn!("{}", e);
            return QualityReport {
                file: path.to_path_buf(),
                size_bytes: 0,
                outcome: CheckOutcome::Malformed {
                    detail: e.to_string(),
                },
            };
        }
    };
    let size_bytes = bytes.len() as u64;

    let outcome = match SvgDocument::from_bytes(bytes) {
        Ok(doc) => {
            let findings = rules.evaluate(&doc);
            debug!("{}: {} finding(s)", path.display(), findings.len());
            if findings.is_empty() {
                CheckOutcome::Clean
            } else {
                CheckOutcome::Issues { findings }
            }
        }
        Err(e) => {
            warn!("{}: {}", path.display(), e);
            let detail = match e {
                IconsetError::MalformedDocument { detail } => detail,
                other => other.to_string(),
            };
            CheckOutcome::Malformed { detail }
        }
    };

    QualityReport {
        file: path.to_path_buf(),
        size_bytes,
        outcome,
    }
}

/// Check every `.svg` file in `config.input_dir`.
///
/// The input directory is created when absent; an empty directory yields an
/// empty [`CheckOutput`]. Only listing the directory can fail.
pub fn check_all(config: &CheckConfig) -> Result<CheckOutput, IconsetError> {
    fs::create_dir_all(&config.input_dir).map_err(|e| IconsetError::CreateDirFailed {
        path: config.input_dir.clone(),
        source: e,
    })?;

    let rules = RuleSet::standard(&config.thresholds);
    let mut sources = SourceSet::new(&config.input_dir, &[SourceKind::Vector]).collect()?;
    sources.sort_by(|a, b| a.path.cmp(&b.path));

    info!(
        "Checking {} SVG file(s) in {}",
        sources.len(),
        config.input_dir.display()
    );

    let reports = sources
        .iter()
        .map(|s| check_document_with(&s.path, &rules))
        .collect();

    Ok(CheckOutput {
        input_dir: config.input_dir.clone(),
        reports,
    })
}
