//! Encoding and writing: RGBA buffers → PNG files and a multi-frame ICO.
//!
//! PNGs are written lossless with the encoder's default (middling)
//! compression effort and adaptive filtering. The encoder emits no text or
//! time chunks, so nothing about the authoring tool leaks into the output.
//!
//! Files are written atomically (temp file + rename) so a failed write never
//! leaves a truncated icon behind.

use crate::error::UnitError;
use image::codecs::ico::{IcoEncoder, IcoFrame};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, ImageError, RgbaImage};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Encode an RGBA image as PNG bytes.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, ImageError> {
    let mut buf = Vec::new();
    let encoder =
        PngEncoder::new_with_quality(&mut buf, CompressionType::Default, FilterType::Adaptive);
    encoder.write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgba8)?;
    debug!("Encoded {}x{} PNG → {} bytes", img.width(), img.height(), buf.len());
    Ok(buf)
}

/// Encode and write one PNG.
///
/// Failures are returned as [`UnitError`] so the caller can log them and go
/// on with the next file.
pub fn write_png(img: &RgbaImage, path: &Path) -> Result<PathBuf, UnitError> {
    let bytes = encode_png(img).map_err(|e| UnitError::EncodeFailed {
        name: display_name(path),
        detail: e.to_string(),
    })?;
    write_bytes(&bytes, path)
}

/// Build a multi-resolution ICO from `images`.
///
/// Frames are sorted ascending by edge and stored as PNG-compressed entries,
/// each independently selectable by the consumer. Returns
/// [`UnitError::NoIcoFrames`] for an empty set.
pub fn encode_ico(images: &[RgbaImage]) -> Result<Vec<u8>, UnitError> {
    if images.is_empty() {
        return Err(UnitError::NoIcoFrames);
    }

    let mut sorted: Vec<&RgbaImage> = images.iter().collect();
    sorted.sort_by_key(|img| img.width());

    let frames = sorted
        .iter()
        .map(|img| {
            IcoFrame::as_png(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgba8)
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| UnitError::EncodeFailed {
            name: "favicon.ico".into(),
            detail: e.to_string(),
        })?;

    let mut buf = Vec::new();
    IcoEncoder::new(Cursor::new(&mut buf))
        .encode_images(&frames)
        .map_err(|e| UnitError::EncodeFailed {
            name: "favicon.ico".into(),
            detail: e.to_string(),
        })?;

    debug!("Encoded ICO with {} frames → {} bytes", frames.len(), buf.len());
    Ok(buf)
}

/// Atomic write: write to a sibling temp file, then rename over `path`.
pub fn write_bytes(bytes: &[u8], path: &Path) -> Result<PathBuf, UnitError> {
    let tmp_path = temp_path_for(path);

    let result = fs::write(&tmp_path, bytes).and_then(|_| fs::rename(&tmp_path, path));
    if let Err(e) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(UnitError::WriteFailed {
            path: path.to_path_buf(),
            detail: e.to_string(),
        });
    }
    Ok(path.to_path_buf())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = display_name(path);
    path.with_file_name(format!(".{name}.tmp"))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
