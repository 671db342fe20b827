//! Pipeline configuration.
//!
//! Handles loading, validating, and merging `folio-images.toml`. The file is
//! optional: stock defaults reproduce the site's fixed layout, and a user file
//! overrides only the keys it names.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! assets_root = "src/assets"       # Source images live here (recursively)
//! output_dir = "optimized"         # Subdirectory of assets_root for variants
//! manifest = "image-manifest.json" # Written at the root of assets_root
//!
//! [images]
//! widths = [320, 480, 768, 1024]   # Responsive widths, strictly ascending
//! default_width = 800              # Width of the preferred webp/jpg pair
//! quality = 80                     # WebP and JPEG quality (1-100)
//!
//! [resolver]
//! public_base = "/src/assets"      # URL prefix for paths the asset map misses
//!
//! [publish]
//! dist_dir = "dist/assets"         # Content-hashed copies are written here
//! public_base = "/assets"          # URL prefix of dist_dir once deployed
//! asset_map = "asset-map.json"     # Written inside dist_dir
//!
//! [processing]
//! max_processes = 4                # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{Quality, VariantConfig};
use crate::scan::AssetLayout;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILENAME: &str = "folio-images.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Pipeline configuration loaded from `folio-images.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Directory scanned for source images.
    pub assets_root: String,
    /// Output subdirectory (a single name under `assets_root`).
    pub output_dir: String,
    /// Manifest file name (written at the root of `assets_root`).
    pub manifest: String,
    /// Variant generation settings.
    pub images: ImagesConfig,
    /// Runtime resolution settings.
    pub resolver: ResolverConfig,
    /// Hashed asset publishing settings.
    pub publish: PublishConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            assets_root: "src/assets".to_string(),
            output_dir: "optimized".to_string(),
            manifest: "image-manifest.json".to_string(),
            images: ImagesConfig::default(),
            resolver: ResolverConfig::default(),
            publish: PublishConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.assets_root.trim().is_empty() {
            return Err(ConfigError::Validation(
                "assets_root must not be empty".into(),
            ));
        }
        if !is_single_component(&self.output_dir) {
            return Err(ConfigError::Validation(
                "output_dir must be a single directory name".into(),
            ));
        }
        if !is_single_component(&self.manifest) {
            return Err(ConfigError::Validation(
                "manifest must be a plain file name".into(),
            ));
        }
        if self.manifest == self.output_dir {
            return Err(ConfigError::Validation(
                "manifest and output_dir must differ".into(),
            ));
        }
        let widths = &self.images.widths;
        if widths.is_empty() {
            return Err(ConfigError::Validation(
                "images.widths must not be empty".into(),
            ));
        }
        if widths.contains(&0) || self.images.default_width == 0 {
            return Err(ConfigError::Validation(
                "image widths must be non-zero".into(),
            ));
        }
        if widths.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(ConfigError::Validation(
                "images.widths must be strictly ascending".into(),
            ));
        }
        if !(1..=100).contains(&self.images.quality) {
            return Err(ConfigError::Validation(
                "images.quality must be 1-100".into(),
            ));
        }
        if self.publish.dist_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "publish.dist_dir must not be empty".into(),
            ));
        }
        if !is_single_component(&self.publish.asset_map) {
            return Err(ConfigError::Validation(
                "publish.asset_map must be a plain file name".into(),
            ));
        }
        Ok(())
    }

    pub fn assets_root_path(&self) -> PathBuf {
        PathBuf::from(&self.assets_root)
    }

    pub fn output_path(&self) -> PathBuf {
        self.assets_root_path().join(&self.output_dir)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.assets_root_path().join(&self.manifest)
    }

    /// Layout used by discovery to tell sources from pipeline outputs.
    pub fn layout(&self) -> AssetLayout {
        AssetLayout {
            root: self.assets_root_path(),
            output_dir: self.output_dir.clone(),
            manifest: self.manifest.clone(),
        }
    }

    pub fn dist_path(&self) -> PathBuf {
        PathBuf::from(&self.publish.dist_dir)
    }

    pub fn asset_map_path(&self) -> PathBuf {
        self.dist_path().join(&self.publish.asset_map)
    }

    pub fn variant_config(&self) -> VariantConfig {
        VariantConfig {
            widths: self.images.widths.clone(),
            default_width: self.images.default_width,
            quality: Quality::new(self.images.quality),
        }
    }
}

fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains('\\')
}

/// Responsive image generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Pixel widths for the responsive set, strictly ascending.
    pub widths: Vec<u32>,
    /// Width of the preferred (non-responsive) pair.
    pub default_width: u32,
    /// WebP/JPEG encoding quality (1 = worst, 100 = best).
    pub quality: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            widths: vec![320, 480, 768, 1024],
            default_width: 800,
            quality: 80,
        }
    }
}

/// Runtime resolution settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    /// URL prefix joined with a declared path when the asset map has no
    /// entry for it.
    pub public_base: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            public_base: "/src/assets".to_string(),
        }
    }
}

/// Hashed asset publishing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublishConfig {
    /// Directory receiving the content-hashed copies.
    pub dist_dir: String,
    /// URL prefix under which `dist_dir` is served.
    pub public_base: String,
    /// Asset map file name, written inside `dist_dir`.
    pub asset_map: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            dist_dir: "dist/assets".to_string(),
            public_base: "/assets".to_string(),
            asset_map: "asset-map.json".to_string(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image processing workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`, never below 1
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(PipelineConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and
/// validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<PipelineConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: PipelineConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults when it is absent.
pub fn load_config(path: &Path) -> Result<PipelineConfig, ConfigError> {
    resolve_config(load_raw_config(path)?)
}

/// Returns a fully-commented stock `folio-images.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# folio-images configuration
# ==========================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Directory scanned (recursively) for .jpg, .jpeg and .png sources.
assets_root = "src/assets"

# Variants are written to <assets_root>/<output_dir>/<slug>_<width>.<ext>.
# This directory is never scanned for sources.
output_dir = "optimized"

# Manifest written to <assets_root>/<manifest>, replaced on every run.
manifest = "image-manifest.json"

# ---------------------------------------------------------------------------
# Variant generation
# ---------------------------------------------------------------------------
[images]
# Responsive widths, strictly ascending. Each is generated as webp and jpg.
widths = [320, 480, 768, 1024]

# Width of the preferred webp/jpg pair used outside responsive contexts.
default_width = 800

# Encoding quality for both formats (1 = worst, 100 = best).
quality = 80

# ---------------------------------------------------------------------------
# Runtime resolution
# ---------------------------------------------------------------------------
[resolver]
# URL prefix used when the asset map has no entry for a declared path.
public_base = "/src/assets"

# ---------------------------------------------------------------------------
# Publishing
# ---------------------------------------------------------------------------
[publish]
# Content-hashed copies of every manifest output are written here.
dist_dir = "dist/assets"

# URL prefix under which dist_dir is served once deployed.
public_base = "/assets"

# Declared path -> hashed URL map, written inside dist_dir.
asset_map = "asset-map.json"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel image-processing workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
