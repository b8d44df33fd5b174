//! Configuration types for icon conversion and quality checking.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]; the checker is controlled through
//! [`CheckConfig`]. The size tables that decide which files end up in a
//! bundle are plain data ([`ConversionConfig::png_sizes`],
//! [`ConversionConfig::special_icons`], [`ConversionConfig::ico_sizes`]) so
//! tests can run with reduced sets.

use crate::error::IconsetError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

/// General PNG sizes written as `{stem}-{size}x{size}.png`.
pub const DEFAULT_PNG_SIZES: [u32; 9] = [16, 32, 48, 64, 96, 128, 192, 256, 512];

/// Frames embedded in `favicon.ico`.
pub const DEFAULT_ICO_SIZES: [u32; 3] = [16, 32, 48];

/// Size of the standalone `favicon.png`.
pub const DEFAULT_FAVICON_PNG_SIZE: u32 = 32;

/// A platform-specific output with a fixed canonical file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedIcon {
    /// File name inside the bundle, e.g. `apple-touch-icon.png`.
    pub file_name: String,
    /// Square edge in pixels.
    pub size: u32,
}

impl NamedIcon {
    pub fn new(file_name: impl Into<String>, size: u32) -> Self {
        Self {
            file_name: file_name.into(),
            size,
        }
    }
}

/// The touch/tile icons browsers and platforms look for by name.
pub fn default_special_icons() -> Vec<NamedIcon> {
    vec![
        NamedIcon::new("apple-touch-icon.png", 180),
        NamedIcon::new("android-chrome-192x192.png", 192),
        NamedIcon::new("android-chrome-512x512.png", 512),
        NamedIcon::new("mstile-150x150.png", 150),
    ]
}

/// Configuration for converting a directory of icon sources.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_iconset::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .input_dir("assets/icons")
///     .output_dir("public")
///     .png_sizes(vec![16, 32, 192])
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Directory scanned for sources. Created if missing. Default: `input`.
    pub input_dir: PathBuf,

    /// Directory receiving one bundle subdirectory per source. Created if
    /// missing. Default: `output`.
    pub output_dir: PathBuf,

    /// General PNG sizes, written in this order.
    pub png_sizes: Vec<u32>,

    /// Named platform icons, written in this order.
    pub special_icons: Vec<NamedIcon>,

    /// Frames for `favicon.ico`. Sorted ascending when encoded.
    pub ico_sizes: Vec<u32>,

    /// Edge of the standalone `favicon.png`. Default: 32.
    pub favicon_png_size: u32,

    /// Also convert `.png` files found in the input directory. Default: true.
    ///
    /// Raster sources are resampled rather than rendered, so they should be
    /// at least as large as the biggest requested size.
    pub accept_raster_inputs: bool,

    /// Sizes at or below this edge get a mild unsharp mask. Default: 32.
    pub sharpen_threshold: u32,

    /// Small targets are rendered at `ceil(supersample_target / size)` times
    /// their size and downsampled. Default: 128.
    pub supersample_target: u32,

    /// Upper bound for the supersample factor. Default: 8.
    pub max_supersample: u32,

    /// Lower bound for the DPI hint passed to the SVG parser. Default: 72.
    pub dpi_floor: u32,

    /// Background fill. `None` keeps the canvas transparent. Default: `None`.
    pub background: Option<[u8; 4]>,

    /// Documents converted at the same time. Default: 1 (sequential).
    pub concurrency: usize,

    /// Treat any skipped file as a failure of the run. Default: false.
    ///
    /// The library always reports skipped units; this flag only tells the
    /// caller (the CLI) to turn an incomplete bundle into a failing exit.
    pub strict: bool,

    /// Optional per-document / per-file progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            png_sizes: DEFAULT_PNG_SIZES.to_vec(),
            special_icons: default_special_icons(),
            ico_sizes: DEFAULT_ICO_SIZES.to_vec(),
            favicon_png_size: DEFAULT_FAVICON_PNG_SIZE,
            accept_raster_inputs: true,
            sharpen_threshold: 32,
            supersample_target: 128,
            max_supersample: 8,
            dpi_floor: 72,
            background: None,
            concurrency: 1,
            strict: false,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("input_dir", &self.input_dir)
            .field("output_dir", &self.output_dir)
            .field("png_sizes", &self.png_sizes)
            .field("special_icons", &self.special_icons)
            .field("ico_sizes", &self.ico_sizes)
            .field("favicon_png_size", &self.favicon_png_size)
            .field("accept_raster_inputs", &self.accept_raster_inputs)
            .field("sharpen_threshold", &self.sharpen_threshold)
            .field("supersample_target", &self.supersample_target)
            .field("max_supersample", &self.max_supersample)
            .field("dpi_floor", &self.dpi_floor)
            .field("background", &self.background)
            .field("concurrency", &self.concurrency)
            .field("strict", &self.strict)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Number of files a fully successful bundle contains.
    pub fn expected_file_count(&self) -> usize {
        let ico = usize::from(!self.ico_sizes.is_empty());
        // general PNGs + special icons + favicon.ico + favicon.png
        self.png_sizes.len() + self.special_icons.len() + ico + 1
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.input_dir = dir.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn png_sizes(mut self, sizes: Vec<u32>) -> Self {
        self.config.png_sizes = sizes;
        self
    }

    pub fn special_icons(mut self, icons: Vec<NamedIcon>) -> Self {
        self.config.special_icons = icons;
        self
    }

    pub fn ico_sizes(mut self, sizes: Vec<u32>) -> Self {
        self.config.ico_sizes = sizes;
        self
    }

    pub fn favicon_png_size(mut self, size: u32) -> Self {
        self.config.favicon_png_size = size;
        self
    }

    pub fn accept_raster_inputs(mut self, v: bool) -> Self {
        self.config.accept_raster_inputs = v;
        self
    }

    pub fn sharpen_threshold(mut self, size: u32) -> Self {
        self.config.sharpen_threshold = size;
        self
    }

    pub fn supersample_target(mut self, px: u32) -> Self {
        self.config.supersample_target = px;
        self
    }

    pub fn max_supersample(mut self, factor: u32) -> Self {
        self.config.max_supersample = factor;
        self
    }

    pub fn dpi_floor(mut self, dpi: u32) -> Self {
        self.config.dpi_floor = dpi;
        self
    }

    pub fn background(mut self, rgba: Option<[u8; 4]>) -> Self {
        self.config.background = rgba;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n;
        self
    }

    pub fn strict(mut self, v: bool) -> Self {
        self.config.strict = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, IconsetError> {
        let c = &self.config;
        if c.png_sizes.is_empty() && c.special_icons.is_empty() && c.ico_sizes.is_empty() {
            return Err(IconsetError::InvalidConfig(
                "At least one PNG, special or ICO size is required".into(),
            ));
        }
        let all_sizes = c
            .png_sizes
            .iter()
            .chain(c.ico_sizes.iter())
            .chain(c.special_icons.iter().map(|i| &i.size))
            .chain(std::iter::once(&c.favicon_png_size));
        for &size in all_sizes {
            if size == 0 {
                return Err(IconsetError::InvalidConfig("Sizes must be ≥ 1".into()));
            }
        }
        if let Some(&size) = c.ico_sizes.iter().find(|&&s| s > 256) {
            return Err(IconsetError::InvalidConfig(format!(
                "ICO frames are limited to 256px, got {}",
                size
            )));
        }
        let mut names = HashSet::new();
        for icon in &c.special_icons {
            if icon.file_name.trim().is_empty() {
                return Err(IconsetError::InvalidConfig(
                    "Special icon file names must not be empty".into(),
                ));
            }
            if !names.insert(icon.file_name.as_str()) {
                return Err(IconsetError::InvalidConfig(format!(
                    "Duplicate special icon file name '{}'",
                    icon.file_name
                )));
            }
        }
        if c.concurrency == 0 {
            return Err(IconsetError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        if c.max_supersample == 0 {
            return Err(IconsetError::InvalidConfig(
                "Max supersample factor must be ≥ 1".into(),
            ));
        }
        if c.supersample_target == 0 {
            return Err(IconsetError::InvalidConfig(
                "Supersample target must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Quality checker ──────────────────────────────────────────────────────

/// Limits the quality rules compare against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityThresholds {
    /// More `<path>` elements than this is flagged. Default: 20.
    pub max_paths: usize,
    /// Any `d` attribute longer than this is flagged. Default: 1000.
    pub max_path_data_len: usize,
    /// More linear + radial gradients than this is flagged. Default: 5.
    pub max_gradients: usize,
    /// Text with a numeric `font-size` below this is flagged. Default: 12.
    pub min_font_size: f64,
    /// `opacity` values below this are flagged. Default: 0.5.
    pub min_opacity: f64,
    /// Files larger than this many bytes are flagged. Default: 50 000.
    pub max_file_bytes: u64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            max_paths: 20,
            max_path_data_len: 1000,
            max_gradients: 5,
            min_font_size: 12.0,
            min_opacity: 0.5,
            max_file_bytes: 50_000,
        }
    }
}

/// Configuration for a quality-check run.
#[derive(Debug, Clone)]
pub struct CheckConfig {
    /// Directory scanned for `.svg` files. Default: `input`.
    pub input_dir: PathBuf,
    pub thresholds: QualityThresholds,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            thresholds: QualityThresholds::default(),
        }
    }
}

impl CheckConfig {
    pub fn builder() -> CheckConfigBuilder {
        CheckConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`CheckConfig`].
#[derive(Debug)]
pub struct CheckConfigBuilder {
    config: CheckConfig,
}

impl CheckConfigBuilder {
    pub fn input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.input_dir = dir.into();
        self
    }

    pub fn thresholds(mut self, thresholds: QualityThresholds) -> Self {
        self.config.thresholds = thresholds;
        self
    }

    pub fn max_paths(mut self, n: usize) -> Self {
        self.config.thresholds.max_paths = n;
        self
    }

    pub fn max_path_data_len(mut self, n: usize) -> Self {
        self.config.thresholds.max_path_data_len = n;
        self
    }

    pub fn max_gradients(mut self, n: usize) -> Self {
        self.config.thresholds.max_gradients = n;
        self
    }

    pub fn min_font_size(mut self, size: f64) -> Self {
        self.config.thresholds.min_font_size = size;
        self
    }

    pub fn min_opacity(mut self, opacity: f64) -> Self {
        self.config.thresholds.min_opacity = opacity;
        self
    }

    pub fn max_file_bytes(mut self, bytes: u64) -> Self {
        self.config.thresholds.max_file_bytes = bytes;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<CheckConfig, IconsetError> {
        let t = &self.config.thresholds;
        if !(t.min_font_size.is_finite() && t.min_font_size >= 0.0) {
            return Err(IconsetError::InvalidConfig(format!(
                "Minimum font size must be a non-negative number, got {}",
                t.min_font_size
            )));
        }
        if !(0.0..=1.0).contains(&t.min_opacity) {
            return Err(IconsetError::InvalidConfig(format!(
                "Minimum opacity must be 0.0–1.0, got {}",
                t.min_opacity
            )));
        }
        Ok(self.config)
    }
}
