//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG) | `image` crate, format sniffed from content |
//! | Resize | `image::DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (alpha dropped) |
//! | Encode → WebP | `webp::Encoder` (lossy, libwebp) |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{Quality, ResizeParams};
use crate::types::OutputFormat;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::path::Path;

/// Pure Rust backend using the `image` and `webp` crates.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk.
///
/// The format is sniffed from the file header, so `PHOTO.PNG` and a JPEG
/// saved with a `.png` extension both decode.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Encode and write `img`, then check that the file is not empty.
fn save_image(
    img: &DynamicImage,
    path: &Path,
    format: OutputFormat,
    quality: Quality,
) -> Result<(), BackendError> {
    match format {
        OutputFormat::Jpg => save_jpeg(img, path, quality)?,
        OutputFormat::Webp => save_webp(img, path, quality)?,
    }
    if std::fs::metadata(path)?.len() == 0 {
        return Err(BackendError::ProcessingFailed(format!(
            "Encoder produced an empty file: {}",
            path.display()
        )));
    }
    Ok(())
}

/// JPEG has no alpha channel; flatten to RGB8 first.
fn save_jpeg(img: &DynamicImage, path: &Path, quality: Quality) -> Result<(), BackendError> {
    let file = std::fs::File::create(path)?;
    let writer = std::io::BufWriter::new(file);
    let encoder = JpegEncoder::new_with_quality(writer, quality.percent());
    DynamicImage::ImageRgb8(img.to_rgb8())
        .write_with_encoder(encoder)
        .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e)))
}

/// libwebp accepts 8-bit RGB or RGBA only.
fn save_webp(img: &DynamicImage, path: &Path, quality: Quality) -> Result<(), BackendError> {
    let prepared = if img.color().has_alpha() {
        DynamicImage::ImageRgba8(img.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8())
    };
    let encoder = webp::Encoder::from_image(&prepared)
        .map_err(|e| BackendError::ProcessingFailed(format!("WebP encode failed: {}", e)))?;
    let encoded = encoder
        .encode_simple(false, quality.webp_factor())
        .map_err(|e| BackendError::ProcessingFailed(format!("WebP encode failed: {:?}", e)))?;
    std::fs::write(path, &*encoded)?;
    Ok(())
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = ImageReader::open(path)?
            .with_guessed_format()?
            .into_dimensions()
            .map_err(|e| {
                BackendError::ProcessingFailed(format!("Failed to read dimensions: {}", e))
            })?;
        Ok(Dimensions { width, height })
    }

    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        let resized = img.resize_exact(params.width, params.height, FilterType::Lanczos3);
        save_image(
            &resized,
            &params.output,
            params.format,
            params.quality,
        )
    }
}
