//! What the backend is asked to do.
//!
//! [`operations`](super::operations) decides which outputs a source needs and
//! turns each one into a [`ResizeParams`]; the [`backend`](super::backend)
//! only ever sees these values.

use crate::types::OutputFormat;
use std::path::PathBuf;

/// Lossy encoding quality, always within 1-100.
///
/// Both encoders take the same scale but different types: the JPEG encoder a
/// `u8`, libwebp an `f32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u8);

impl Quality {
    pub const DEFAULT: Quality = Quality(80);

    /// Clamp any configured value into range.
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    pub fn percent(self) -> u8 {
        self.0
    }

    pub fn webp_factor(self) -> f32 {
        f32::from(self.0)
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// One output file: decode `source`, resize to exactly `width`×`height`,
/// encode as `format` and write `output`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
    pub quality: Quality,
}
