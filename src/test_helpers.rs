//! Shared test utilities for the folio-images test suite.
//!
//! Builds asset trees in temp directories: empty placeholder files for
//! discovery tests, and small real JPEG/PNG sources for tests that decode.

use crate::config::PipelineConfig;
use image::{ImageEncoder, ImageFormat, RgbImage, RgbaImage};
use std::path::Path;

fn ensure_parent(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
}

/// Create an empty file, including parent directories.
pub fn touch(path: &Path) {
    ensure_parent(path);
    std::fs::write(path, b"").unwrap();
}

/// Write a synthetic gradient JPEG.
pub fn write_test_jpeg(path: &Path, width: u32, height: u32) {
    ensure_parent(path);
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write a synthetic PNG, with a semi-transparent alpha channel if `alpha`.
///
/// The format is explicit so names like `shot.PNG` work.
pub fn write_test_png(path: &Path, width: u32, height: u32, alpha: bool) {
    ensure_parent(path);
    if alpha {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            image::Rgba([(x % 256) as u8, (y % 256) as u8, 64, 128])
        });
        img.save_with_format(path, ImageFormat::Png).unwrap();
    } else {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, 200, (y % 256) as u8])
        });
        img.save_with_format(path, ImageFormat::Png).unwrap();
    }
}

/// Stock config pointed at `root`.
pub fn config_for(root: &Path) -> PipelineConfig {
    PipelineConfig {
        assets_root: root.to_string_lossy().into_owned(),
        ..PipelineConfig::default()
    }
}
