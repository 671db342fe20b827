//! High-level image operations.
//!
//! These functions combine calculations with backend execution. They take
//! configuration, compute parameters, and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::scale_to_width;
use super::params::{Quality, ResizeParams};
use crate::manifest::{PreferredPair, Variant};
use crate::types::OutputFormat;
use std::path::{Path, PathBuf};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok((dims.width, dims.height))
}

/// Widths, default width and quality for variant generation.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantConfig {
    /// Responsive widths, ascending.
    pub widths: Vec<u32>,
    /// Width of the preferred pair.
    pub default_width: u32,
    pub quality: Quality,
}

impl Default for VariantConfig {
    fn default() -> Self {
        Self {
            widths: vec![320, 480, 768, 1024],
            default_width: 800,
            quality: Quality::default(),
        }
    }
}

/// Where outputs go: the directory on disk and its path relative to the
/// assets root, as recorded in the manifest.
#[derive(Debug, Clone, Copy)]
pub struct OutputLocation<'a> {
    pub dir: &'a Path,
    pub relative_dir: &'a str,
}

impl OutputLocation<'_> {
    fn relative_path(&self, file_name: &str) -> String {
        if self.relative_dir.is_empty() {
            file_name.to_string()
        } else {
            format!("{}/{}", self.relative_dir, file_name)
        }
    }
}

/// Output file name for one (slug, width, format).
pub fn output_file_name(slug: &str, width: u32, format: OutputFormat) -> String {
    format!("{}_{}.{}", slug, width, format.extension())
}

/// Why an output is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputRole {
    Responsive,
    Preferred,
}

/// A single output file planned for a source.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedOutput {
    pub role: OutputRole,
    pub width: u32,
    pub format: OutputFormat,
    pub file_name: String,
}

/// Plan every output file for `slug`, independent of image content.
///
/// Responsive outputs come first (width-major, formats in
/// [`OutputFormat::ALL`] order), then the preferred pair. When the default
/// width is also a responsive width the preferred pair reuses those files
/// instead of being planned twice.
pub fn plan_outputs(slug: &str, config: &VariantConfig) -> Vec<PlannedOutput> {
    let mut planned = Vec::with_capacity((config.widths.len() + 1) * OutputFormat::ALL.len());
    for &width in &config.widths {
        for format in OutputFormat::ALL {
            planned.push(PlannedOutput {
                role: OutputRole::Responsive,
                width,
                format,
                file_name: output_file_name(slug, width, format),
            });
        }
    }
    if !config.widths.contains(&config.default_width) {
        for format in OutputFormat::ALL {
            planned.push(PlannedOutput {
                role: OutputRole::Preferred,
                width: config.default_width,
                format,
                file_name: output_file_name(slug, config.default_width, format),
            });
        }
    }
    planned
}

/// Absolute paths of every file [`plan_outputs`] would write.
pub fn planned_paths(output_dir: &Path, slug: &str, config: &VariantConfig) -> Vec<PathBuf> {
    plan_outputs(slug, config)
        .into_iter()
        .map(|p| output_dir.join(p.file_name))
        .collect()
}

/// Turn a plan into backend parameters for a source of known dimensions.
pub fn plan_resizes(
    source: &Path,
    output_dir: &Path,
    slug: &str,
    original_dims: (u32, u32),
    config: &VariantConfig,
) -> Vec<ResizeParams> {
    plan_outputs(slug, config)
        .into_iter()
        .map(|planned| {
            let (width, height) = scale_to_width(original_dims, planned.width);
            ResizeParams {
                source: source.to_path_buf(),
                output: output_dir.join(&planned.file_name),
                width,
                height,
                format: planned.format,
                quality: config.quality,
            }
        })
        .collect()
}

/// Whether a planned output is larger than its encoder accepts.
pub fn exceeds_format_limit(params: &ResizeParams) -> bool {
    let limit = params.format.max_dimension();
    params.width > limit || params.height > limit
}

/// Variants and preferred pair written for one source.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedSet {
    pub variants: Vec<Variant>,
    pub preferred: PreferredPair,
}

/// Create every variant and the preferred pair for one source.
///
/// Nothing is written when any planned output exceeds its format's size
/// limit. Otherwise stops at the first failing operation; the caller decides
/// what to do with outputs already written.
pub fn create_variants(
    backend: &impl ImageBackend,
    source: &Path,
    output: OutputLocation<'_>,
    slug: &str,
    config: &VariantConfig,
) -> Result<GeneratedSet> {
    let dims = get_dimensions(backend, source)?;

    let resizes = plan_resizes(source, output.dir, slug, dims, config);
    if let Some(oversized) = resizes.iter().find(|p| exceeds_format_limit(p)) {
        return Err(BackendError::ProcessingFailed(format!(
            "{} variant would be {}x{}, over the {} px limit",
            oversized.format,
            oversized.width,
            oversized.height,
            oversized.format.max_dimension()
        )));
    }
    for params in &resizes {
        backend.resize(params)?;
    }

    let variants = plan_outputs(slug, config)
        .into_iter()
        .filter(|p| p.role == OutputRole::Responsive)
        .map(|p| Variant {
            width: p.width,
            format: p.format,
            path: output.relative_path(&p.file_name),
        })
        .collect();

    let preferred = PreferredPair {
        webp: output.relative_path(&output_file_name(
            slug,
            config.default_width,
            OutputFormat::Webp,
        )),
        jpg: output.relative_path(&output_file_name(
            slug,
            config.default_width,
            OutputFormat::Jpg,
        )),
    };

    Ok(GeneratedSet {
        variants,
        preferred,
    })
}
