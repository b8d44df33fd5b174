//! Rasterisation: render one source at one size into an RGBA buffer.
//!
//! ## Supersampling
//!
//! A 16 px favicon rendered directly at 16 px loses thin strokes to
//! anti-aliasing. Small targets are therefore rendered onto a larger canvas
//! (`size × supersample`, with `supersample = ceil(supersample_target / size)`
//! capped at `max_supersample`) and brought down to the exact size by
//! [`crate::pipeline::postprocess::polish`] with a Lanczos filter. The DPI
//! hint handed to usvg grows with the same factor, bounded below by
//! `dpi_floor`.
//!
//! ## Failure policy
//!
//! Every failure (unreadable file, malformed markup, unsupported construct)
//! comes back as [`UnitError::RenderFailed`] carrying the path and size. The
//! caller logs it and skips that size; nothing here panics or aborts a batch.

use crate::config::ConversionConfig;
use crate::error::UnitError;
use crate::pipeline::scan::{SourceDocument, SourceKind};
use image::{imageops, Rgba, RgbaImage};
use resvg::tiny_skia::{Color, Pixmap, Transform};
use resvg::usvg::{self, fontdb};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// DPI the supersample factor scales from.
const BASE_DPI: f32 = 96.0;

/// What to render: target edge, canvas oversampling, DPI hint and fill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest {
    /// Exact edge of the final image in pixels.
    pub size: u32,
    /// Canvas multiplier; the rasterizer may return `size × supersample`.
    pub supersample: u32,
    /// Resolution hint for absolute units (`mm`, `pt`, …) in the markup.
    pub dpi: f32,
    /// Canvas fill; `None` keeps it fully transparent.
    pub background: Option<Rgba<u8>>,
}

impl RenderRequest {
    /// Plan a render for `size` using the configured supersampling policy.
    pub fn plan(size: u32, config: &ConversionConfig) -> Self {
        let size = size.max(1);
        let supersample = config
            .supersample_target
            .div_ceil(size)
            .clamp(1, config.max_supersample.max(1));
        let dpi = (BASE_DPI * supersample as f32).max(config.dpi_floor as f32);
        Self {
            size,
            supersample,
            dpi,
            background: config.background.map(Rgba),
        }
    }

    /// Edge of the intermediate canvas.
    pub fn canvas_px(&self) -> u32 {
        self.size.saturating_mul(self.supersample)
    }
}

/// Turns a source document into pixels.
///
/// The returned buffer may be larger than `request.size` (supersampled
/// canvas, raster source); callers pass it through
/// [`crate::pipeline::postprocess::polish`] to get the exact size.
pub trait Rasterizer: Send + Sync {
    fn rasterize(
        &self,
        source: &SourceDocument,
        request: &RenderRequest,
    ) -> Result<RgbaImage, UnitError>;
}

/// The production rasterizer: resvg for SVG sources, the `image` decoder for
/// PNG sources.
#[derive(Clone)]
pub struct IconRasterizer {
    fontdb: Arc<fontdb::Database>,
}

impl IconRasterizer {
    /// Create a rasterizer with the system fonts loaded, so `<text>` in
    /// icons renders with real glyphs.
    pub fn new() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        debug!("Loaded {} font faces", db.len());
        Self {
            fontdb: Arc::new(db),
        }
    }

    /// Create a rasterizer without any fonts. Text elements render as
    /// nothing; everything else is unaffected.
    pub fn without_system_fonts() -> Self {
        Self {
            fontdb: Arc::new(fontdb::Database::new()),
        }
    }

    fn render_svg(&self, path: &Path, request: &RenderRequest) -> Result<RgbaImage, String> {
        let data = std::fs::read(path).map_err(|e| format!("read failed: {e}"))?;

        let mut opt = usvg::Options::default();
        opt.dpi = request.dpi;
        opt.resources_dir = path.parent().map(Path::to_path_buf);
        opt.fontdb = Arc::clone(&self.fontdb);

        let tree = usvg::Tree::from_data(&data, &opt).map_err(|e| e.to_string())?;

        let canvas = request.canvas_px();
        let mut pixmap = Pixmap::new(canvas, canvas)
            .ok_or_else(|| format!("cannot allocate a {canvas}x{canvas} canvas"))?;
        if let Some(Rgba([r, g, b, a])) = request.background {
            pixmap.fill(Color::from_rgba8(r, g, b, a));
        }

        // Fit the document into the square canvas, centred, aspect preserved.
        let doc = tree.size();
        let scale = (canvas as f32 / doc.width()).min(canvas as f32 / doc.height());
        let tx = (canvas as f32 - doc.width() * scale) / 2.0;
        let ty = (canvas as f32 - doc.height() * scale) / 2.0;
        let transform = Transform::from_row(scale, 0.0, 0.0, scale, tx, ty);

        resvg::render(&tree, transform, &mut pixmap.as_mut());

        debug!(
            "Rendered {} at {}px on a {}x{} canvas ({} dpi)",
            path.display(),
            request.size,
            canvas,
            canvas,
            request.dpi
        );
        Ok(pixmap_to_rgba(&pixmap))
    }

    fn load_raster(&self, path: &Path, request: &RenderRequest) -> Result<RgbaImage, String> {
        let img = image::open(path).map_err(|e| e.to_string())?.into_rgba8();
        debug!(
            "Decoded {} ({}x{}) for {}px",
            path.display(),
            img.width(),
            img.height(),
            request.size
        );
        Ok(match request.background {
            Some(bg) => {
                let mut canvas = RgbaImage::from_pixel(img.width(), img.height(), bg);
                imageops::overlay(&mut canvas, &img, 0, 0);
                canvas
            }
            None => img,
        })
    }
}

impl Default for IconRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer for IconRasterizer {
    fn rasterize(
        &self,
        source: &SourceDocument,
        request: &RenderRequest,
    ) -> Result<RgbaImage, UnitError> {
        let result = match source.kind {
            SourceKind::Vector => self.render_svg(&source.path, request),
            SourceKind::Raster => self.load_raster(&source.path, request),
        };
        result.map_err(|detail| UnitError::RenderFailed {
            path: source.path.clone(),
            size: request.size,
            detail,
        })
    }
}

/// Copy a premultiplied tiny-skia pixmap into a straight-alpha RGBA image.
fn pixmap_to_rgba(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    img
}
