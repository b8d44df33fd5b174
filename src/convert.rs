//! Batch conversion entry points.
//!
//! A run scans the input directory and produces one icon bundle per source:
//!
//! ```text
//! output/{stem}/
//!   {stem}-{size}x{size}.png   every ConversionConfig::png_sizes entry
//!   apple-touch-icon.png …     every ConversionConfig::special_icons entry
//!   favicon.ico                ConversionConfig::ico_sizes frames
//!   favicon.png                ConversionConfig::favicon_png_size
//! ```
//!
//! Failures are contained at two levels. A size that fails to render or
//! write becomes a skipped [`ArtifactResult`] and the rest of the bundle is
//! still produced. A document that fails as a whole (its bundle directory
//! cannot be created) becomes a [`FailedDocument`] and the batch moves on.
//! Only failing to create or list the top-level directories is returned as
//! `Err`.

use crate::config::ConversionConfig;
use crate::error::{IconsetError, UnitError};
use crate::output::{ArtifactKind, ArtifactResult, BatchOutput, BundleReport, FailedDocument};
use crate::pipeline::render::{IconRasterizer, Rasterizer, RenderRequest};
use crate::pipeline::scan::{self, SourceDocument, SourceKind, SourceSet};
use crate::pipeline::{encode, postprocess};
use futures::stream::{self, StreamExt};
use image::RgbaImage;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Convert every source in `config.input_dir`.
///
/// This is the primary entry point for the library. It uses the production
/// [`IconRasterizer`] with system fonts loaded.
///
/// # Returns
/// `Ok(BatchOutput)` even when some files or documents failed (check
/// [`BatchOutput::is_complete`]), and an empty output when the input
/// directory holds no sources.
///
/// # Errors
/// Only when the input/output directories cannot be created or listed.
pub async fn convert_all(config: &ConversionConfig) -> Result<BatchOutput, IconsetError> {
    let rasterizer = tokio::task::spawn_blocking(IconRasterizer::new)
        .await
        .map_err(|e| IconsetError::Internal(format!("Font loading task panicked: {}", e)))?;
    convert_all_with(config, Arc::new(rasterizer)).await
}

/// Convert every source in `config.input_dir` with a caller-supplied
/// rasterizer.
pub async fn convert_all_with(
    config: &ConversionConfig,
    rasterizer: Arc<dyn Rasterizer>,
) -> Result<BatchOutput, IconsetError> {
    let total_start = Instant::now();

    // ── Step 1: Directories and scan ─────────────────────────────────────
    scan::ensure_directories(&config.input_dir, &config.output_dir)?;

    let kinds: &[SourceKind] = if config.accept_raster_inputs {
        &[SourceKind::Vector, SourceKind::Raster]
    } else {
        &[SourceKind::Vector]
    };
    let sources = SourceSet::new(&config.input_dir, kinds).collect()?;
    let total = sources.len();

    let mut output = BatchOutput {
        input_dir: config.input_dir.clone(),
        output_dir: config.output_dir.clone(),
        ..Default::default()
    };

    if total == 0 {
        info!("No source files found in {}", config.input_dir.display());
        output.compute_stats(0, total_start.elapsed().as_millis() as u64);
        return Ok(output);
    }

    info!(
        "Found {} source file(s) in {}",
        total,
        config.input_dir.display()
    );
    warn_on_shared_stems(&sources);

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    // ── Step 2: Convert documents ────────────────────────────────────────
    let mut results: Vec<(usize, SourceDocument, Result<BundleReport, IconsetError>)> =
        stream::iter(sources.into_iter().enumerate().map(|(idx, source)| {
            let config = config.clone();
            let rasterizer = Arc::clone(&rasterizer);
            async move {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_document_start(&source.stem, idx + 1, total);
                }
                let task_source = source.clone();
                let task_config = config.clone();
                let result = tokio::task::spawn_blocking(move || {
                    convert_document(&task_source, &task_config, rasterizer.as_ref())
                })
                .await
                .unwrap_or_else(|e| {
                    Err(IconsetError::Internal(format!(
                        "Conversion task panicked: {}",
                        e
                    )))
                });
                if let (Err(_), Some(cb)) = (&result, &config.progress_callback) {
                    cb.on_document_complete(&source.stem, 0, 0);
                }
                (idx, source, result)
            }
        }))
        .buffer_unordered(config.concurrency)
        .collect()
        .await;

    // Restore scan order
    results.sort_by_key(|(idx, _, _)| *idx);

    // ── Step 3: Collect ──────────────────────────────────────────────────
    for (_, source, result) in results {
        match result {
            Ok(bundle) => output.bundles.push(bundle),
            Err(e) => {
                error!("Failed to convert {}: {}", source.path.display(), e);
                output.failed.push(FailedDocument {
                    source: source.path,
                    error: e.to_string(),
                });
            }
        }
    }

    output.compute_stats(total, total_start.elapsed().as_millis() as u64);

    info!(
        "Conversion complete: {}/{} bundles complete, {} files written, {} skipped, {}ms",
        output.stats.complete_documents,
        total,
        output.stats.files_written,
        output.stats.files_skipped,
        output.stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total, output.stats.complete_documents);
    }

    Ok(output)
}

/// Synchronous wrapper around [`convert_all`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_all_sync(config: &ConversionConfig) -> Result<BatchOutput, IconsetError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| IconsetError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert_all(config))
}

/// Produce the icon bundle for one source document.
///
/// Blocking: renders, encodes and writes on the calling thread.
///
/// # Errors
/// [`IconsetError::DocumentFailed`] when the bundle directory cannot be
/// created. Per-file failures are recorded in the returned report instead.
pub fn convert_document(
    source: &SourceDocument,
    config: &ConversionConfig,
    rasterizer: &dyn Rasterizer,
) -> Result<BundleReport, IconsetError> {
    let start = Instant::now();
    let bundle_dir = config.output_dir.join(&source.stem);
    info!(
        "Converting {} → {}",
        source.path.display(),
        bundle_dir.display()
    );

    // ── (a) Bundle directory ─────────────────────────────────────────────
    fs::create_dir_all(&bundle_dir).map_err(|e| IconsetError::DocumentFailed {
        path: source.path.clone(),
        detail: format!("cannot create {}: {}", bundle_dir.display(), e),
    })?;

    let mut artifacts = Vec::with_capacity(config.expected_file_count());
    let unit = UnitContext {
        source,
        config,
        rasterizer,
    };

    // ── (b) General sizes ────────────────────────────────────────────────
    for &size in &config.png_sizes {
        let file_name = format!("{}-{}x{}.png", source.stem, size, size);
        artifacts.push(unit.png(&bundle_dir, file_name, ArtifactKind::SizedPng, size));
    }

    // ── (c) Special icons ────────────────────────────────────────────────
    for icon in &config.special_icons {
        artifacts.push(unit.png(
            &bundle_dir,
            icon.file_name.clone(),
            ArtifactKind::SpecialIcon,
            icon.size,
        ));
    }

    // ── (d) favicon.ico ──────────────────────────────────────────────────
    if !config.ico_sizes.is_empty() {
        artifacts.push(unit.ico(&bundle_dir));
    }

    // ── (e) favicon.png ──────────────────────────────────────────────────
    artifacts.push(unit.png(
        &bundle_dir,
        "favicon.png".to_string(),
        ArtifactKind::FaviconPng,
        config.favicon_png_size,
    ));

    let report = BundleReport {
        source: source.path.clone(),
        stem: source.stem.clone(),
        bundle_dir,
        artifacts,
        duration_ms: start.elapsed().as_millis() as u64,
    };

    info!(
        "{}: {} written, {} skipped in {}ms",
        source.stem,
        report.written_count(),
        report.failed_count(),
        report.duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_document_complete(&source.stem, report.written_count(), report.failed_count());
    }

    Ok(report)
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Per-document state shared by the unit helpers.
struct UnitContext<'a> {
    source: &'a SourceDocument,
    config: &'a ConversionConfig,
    rasterizer: &'a dyn Rasterizer,
}

impl UnitContext<'_> {
    /// Render → polish. Failures are logged here, once.
    fn render(&self, size: u32) -> Result<RgbaImage, UnitError> {
        let request = RenderRequest::plan(size, self.config);
        match self.rasterizer.rasterize(self.source, &request) {
            Ok(raw) => {
                let img = postprocess::polish(raw, size, self.config);
                debug_assert_eq!(img.dimensions(), (size, size));
                Ok(img)
            }
            Err(e) => {
                warn!("{}", e);
                Err(e)
            }
        }
    }

    /// Render → polish → write one PNG.
    fn png(
        &self,
        bundle_dir: &Path,
        file_name: String,
        kind: ArtifactKind,
        size: u32,
    ) -> ArtifactResult {
        let path = bundle_dir.join(&file_name);
        let outcome = self
            .render(size)
            .and_then(|img| encode::write_png(&img, &path));
        let result = match outcome {
            Ok(path) => ArtifactResult::written(file_name, kind, vec![size], path),
            Err(e) => {
                if !matches!(e, UnitError::RenderFailed { .. }) {
                    warn!("{}", e);
                }
                ArtifactResult::skipped(file_name, kind, vec![size], e)
            }
        };
        self.notify(&result);
        result
    }

    /// Render every ICO size, keep the successes, write `favicon.ico`.
    fn ico(&self, bundle_dir: &Path) -> ArtifactResult {
        let file_name = "favicon.ico";
        let mut frames = Vec::with_capacity(self.config.ico_sizes.len());
        let mut warnings = Vec::new();
        for &size in &self.config.ico_sizes {
            match self.render(size) {
                Ok(img) => frames.push(img),
                Err(e) => warnings.push(e),
            }
        }
        let mut sizes: Vec<u32> = frames.iter().map(RgbaImage::width).collect();
        sizes.sort_unstable();

        let path = bundle_dir.join(file_name);
        let outcome =
            encode::encode_ico(&frames).and_then(|bytes| encode::write_bytes(&bytes, &path));
        let mut result = match outcome {
            Ok(path) => {
                debug!("Wrote {} with frames {:?}", path.display(), sizes);
                ArtifactResult::written(file_name, ArtifactKind::Ico, sizes, path)
            }
            Err(e) => {
                warn!("{}: skipping {}: {}", self.source.stem, file_name, e);
                ArtifactResult::skipped(file_name, ArtifactKind::Ico, sizes, e)
            }
        };
        result.warnings = warnings;
        self.notify(&result);
        result
    }

    fn notify(&self, result: &ArtifactResult) {
        let Some(ref cb) = self.config.progress_callback else {
            return;
        };
        match &result.error {
            None => cb.on_artifact_complete(&self.source.stem, &result.file_name),
            Some(e) => cb.on_artifact_error(&self.source.stem, &result.file_name, &e.to_string()),
        }
    }
}

/// `logo.svg` and `logo.png` both write to `output/logo/`; the later one wins.
fn warn_on_shared_stems(sources: &[SourceDocument]) {
    let mut seen = HashSet::new();
    for source in sources {
        if !seen.insert(source.stem.as_str()) {
            warn!(
                "Several sources share the stem '{}'; their bundles overwrite each other",
                source.stem
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NamedIcon;
    use image::Rgba;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Paints a solid canvas at the requested supersampled size.
    struct SolidRasterizer {
        fail_sizes: Vec<u32>,
    }

    impl Rasterizer for SolidRasterizer {
        fn rasterize(
            &self,
            source: &SourceDocument,
            request: &RenderRequest,
        ) -> Result<RgbaImage, UnitError> {
            if self.fail_sizes.contains(&request.size) {
                return Err(UnitError::RenderFailed {
                    path: source.path.clone(),
                    size: request.size,
                    detail: "simulated".into(),
                });
            }
            let px = request.canvas_px();
            Ok(RgbaImage::from_pixel(px, px, Rgba([0, 128, 255, 255])))
        }
    }

    fn setup(sizes: Vec<u32>) -> (TempDir, ConversionConfig, SourceDocument) {
        let tmp = TempDir::new().unwrap();
        let config = ConversionConfig::builder()
            .input_dir(tmp.path().join("input"))
            .output_dir(tmp.path().join("output"))
            .png_sizes(sizes)
            .special_icons(vec![NamedIcon::new("apple-touch-icon.png", 180)])
            .build()
            .unwrap();
        let source = SourceDocument::from_path(tmp.path().join("input/logo.svg")).unwrap();
        (tmp, config, source)
    }

    #[test]
    fn document_produces_full_bundle() {
        let (_tmp, config, source) = setup(vec![16, 64]);
        let rasterizer = SolidRasterizer { fail_sizes: vec![] };
        let report = convert_document(&source, &config, &rasterizer).unwrap();

        assert!(report.is_complete());
        assert_eq!(report.artifacts.len(), config.expected_file_count());
        let names: Vec<&str> = report.artifacts.iter().map(|a| a.file_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "logo-16x16.png",
                "logo-64x64.png",
                "apple-touch-icon.png",
                "favicon.ico",
                "favicon.png"
            ]
        );
        for a in &report.artifacts {
            assert!(a.path.as_ref().unwrap().is_file(), "{} missing", a.file_name);
        }
        assert_eq!(report.artifact("favicon.ico").unwrap().sizes, vec![16, 32, 48]);
    }

    #[test]
    fn failed_size_is_skipped_not_fatal() {
        let (_tmp, config, source) = setup(vec![16, 64]);
        let rasterizer = SolidRasterizer {
            fail_sizes: vec![64],
        };
        let report = convert_document(&source, &config, &rasterizer).unwrap();

        let skipped = report.artifact("logo-64x64.png").unwrap();
        assert!(!skipped.is_written());
        assert_eq!(skipped.error.as_ref().and_then(UnitError::size), Some(64));
        assert!(!report.bundle_dir.join("logo-64x64.png").exists());
        assert!(report.bundle_dir.join("logo-16x16.png").is_file());
        assert!(report.bundle_dir.join("favicon.ico").is_file());
        assert!(report.bundle_dir.join("favicon.png").is_file());
        assert!(!report.is_complete());
    }

    #[test]
    fn ico_frame_failure_is_a_warning() {
        let (_tmp, config, source) = setup(vec![64]);
        let rasterizer = SolidRasterizer {
            fail_sizes: vec![48],
        };
        let report = convert_document(&source, &config, &rasterizer).unwrap();
        let ico = report.artifact("favicon.ico").unwrap();
        assert!(ico.is_written());
        assert_eq!(ico.sizes, vec![16, 32]);
        assert_eq!(ico.warnings.len(), 1);
        assert!(!report.is_complete());
    }

    #[test]
    fn all_ico_frames_failing_skips_ico() {
        let (_tmp, config, source) = setup(vec![64]);
        let rasterizer = SolidRasterizer {
            fail_sizes: vec![16, 32, 48],
        };
        let report = convert_document(&source, &config, &rasterizer).unwrap();
        let ico = report.artifact("favicon.ico").unwrap();
        assert_eq!(ico.error, Some(UnitError::NoIcoFrames));
        assert!(!report.bundle_dir.join("favicon.ico").exists());
        // 32px also failed, so favicon.png is missing too; 64px survives.
        assert!(report.bundle_dir.join("logo-64x64.png").is_file());
    }

    #[test]
    fn unwritable_bundle_dir_fails_document() {
        let (tmp, mut config, source) = setup(vec![16]);
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, b"file, not a dir").unwrap();
        config.output_dir = PathBuf::from(&blocker);
        let rasterizer = SolidRasterizer { fail_sizes: vec![] };
        let err = convert_document(&source, &config, &rasterizer).unwrap_err();
        assert!(matches!(err, IconsetError::DocumentFailed { .. }));
    }
}
