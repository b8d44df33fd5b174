//! Error types for the edgequake-iconset library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`IconsetError`]: **Fatal for the call that returns it**: the input
//!   directory cannot be created, a document's bundle directory cannot be
//!   made, a markup file is not well-formed. Batch entry points catch the
//!   per-document variants and record them instead of propagating.
//!
//! * [`UnitError`]: **Non-fatal**: one size of one document failed to
//!   render or write. Stored inside [`crate::output::ArtifactResult`] so
//!   callers can inspect partial success rather than losing the whole bundle
//!   to one bad size.

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by the edgequake-iconset library.
///
/// Unit-level failures use [`UnitError`] and are stored in
/// [`crate::output::ArtifactResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum IconsetError {
    // ── Filesystem errors ─────────────────────────────────────────────────
    /// A directory could not be created.
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input directory exists but could not be listed.
    #[error("Failed to read directory '{path}': {source}")]
    ReadDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A source file could not be read.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Document errors ───────────────────────────────────────────────────
    /// Processing of a whole document failed (e.g. its bundle directory
    /// could not be created). The batch records this and continues.
    #[error("Document '{path}' failed: {detail}")]
    DocumentFailed { path: PathBuf, detail: String },

    /// The markup is not well-formed XML.
    #[error("Malformed SVG document: {detail}")]
    MalformedDocument { detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single output file.
///
/// The conversion of the remaining sizes and documents continues.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum UnitError {
    /// The source could not be rasterised at this size.
    #[error("{path}: rendering at {size}px failed: {detail}")]
    RenderFailed {
        path: PathBuf,
        size: u32,
        detail: String,
    },

    /// The image could not be encoded.
    #[error("{name}: encoding failed: {detail}")]
    EncodeFailed { name: String, detail: String },

    /// The encoded file could not be written to disk.
    #[error("{path}: write failed: {detail}")]
    WriteFailed { path: PathBuf, detail: String },

    /// Every ICO size failed to render, so there is nothing to bundle.
    #[error("no frames available for the ICO bundle")]
    NoIcoFrames,
}

impl UnitError {
    /// The requested size when the failure happened during rendering.
    pub fn size(&self) -> Option<u32> {
        match self {
            UnitError::RenderFailed { size, .. } => Some(*size),
            _ => None,
        }
    }
}
