//! # edgequake-iconset
//!
//! Turn SVG (and PNG) artwork into a complete favicon set, and check SVG
//! sources for features that will not survive small sizes.
//!
//! ## Why this crate?
//!
//! A modern site needs a dozen icon files: a multi-resolution `favicon.ico`,
//! a 32 px PNG fallback, Apple and Android home-screen icons, a Windows tile
//! and a ladder of general sizes. Rendering them naively from one SVG gives
//! blurry 16 px icons. This crate supersamples small sizes, downsamples with
//! Lanczos3 and sharpens the result, then writes every file a site needs in
//! one directory per source.
//!
//! ## Pipeline Overview
//!
//! ```text
//! input/*.svg, *.png
//!  │
//!  ├─ 1. Scan         create input/ and output/, list sources
//!  ├─ 2. Render       resvg at a supersampled DPI (CPU-bound, spawn_blocking)
//!  ├─ 3. Polish       exact-size Lanczos3 resample, unsharp mask ≤ 32 px
//!  ├─ 4. Encode       PNGs, favicon.ico (16/32/48), favicon.png
//!  └─ 5. Report       per-artifact results + batch stats
//! ```
//!
//! The quality checker runs separately over the same input directory:
//! [`quality::check_all`] parses each SVG and reports viewBox, path
//! complexity, gradients, filters, text, inline styles, opacity, blur and
//! file size problems.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_iconset::{convert_all, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .input_dir("artwork")
//!         .output_dir("public/icons")
//!         .build()?;
//!     let output = convert_all(&config).await?;
//!     for bundle in &output.bundles {
//!         println!("{}: {} files", bundle.stem, bundle.written_count());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `iconset` binary (clap + indicatif + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-iconset = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod quality;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    CheckConfig, CheckConfigBuilder, ConversionConfig, ConversionConfigBuilder, NamedIcon,
    QualityThresholds,
};
pub use convert::{convert_all, convert_all_sync, convert_all_with, convert_document};
pub use error::{IconsetError, UnitError};
pub use output::{
    ArtifactKind, ArtifactResult, BatchOutput, BatchStats, BundleReport, FailedDocument,
};
pub use pipeline::render::{IconRasterizer, Rasterizer, RenderRequest};
pub use pipeline::scan::{SourceDocument, SourceKind};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use quality::{
    check_all, check_document, format_report, CheckOutcome, CheckOutput, Finding, QualityReport,
    QualityRule, RuleSet,
};
