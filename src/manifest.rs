//! The image manifest: the single artifact shared by pipeline and resolver.
//!
//! ```json
//! {
//!   "pro1/pro1s1.PNG": {
//!     "source": "pro1/pro1s1.PNG",
//!     "variants": [
//!       { "width": 320, "format": "webp", "path": "optimized/pro1_pro1s1_320.webp" },
//!       { "width": 320, "format": "jpg",  "path": "optimized/pro1_pro1s1_320.jpg" }
//!     ],
//!     "preferred": {
//!       "webp": "optimized/pro1_pro1s1_800.webp",
//!       "jpg": "optimized/pro1_pro1s1_800.jpg"
//!     }
//!   }
//! }
//! ```
//!
//! Paths are relative to the assets root with forward slashes. Keys are kept
//! in a `BTreeMap`, so serializing an unchanged set of entries is
//! byte-identical from run to run.
//!
//! The pipeline builds a fresh [`Manifest`] on every run and replaces the
//! file wholesale. Nothing else writes it.

use crate::types::OutputFormat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error reading manifest {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid manifest JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// One resized + re-encoded output of a source image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub width: u32,
    pub format: OutputFormat,
    pub path: String,
}

/// The non-responsive default-width pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferredPair {
    pub webp: String,
    pub jpg: String,
}

impl PreferredPair {
    pub fn path(&self, format: OutputFormat) -> &str {
        match format {
            OutputFormat::Webp => &self.webp,
            OutputFormat::Jpg => &self.jpg,
        }
    }
}

/// Everything generated for one source image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Normalized source key (same as the map key).
    pub source: String,
    /// Width-major, ascending; within a width, webp before jpg.
    pub variants: Vec<Variant>,
    pub preferred: PreferredPair,
}

impl ManifestEntry {
    /// Variants of one format, in manifest (ascending width) order.
    pub fn variants_of(&self, format: OutputFormat) -> impl Iterator<Item = &Variant> {
        self.variants.iter().filter(move |v| v.format == format)
    }

    /// Every path this entry declares: variants first, then the preferred pair.
    pub fn declared_paths(&self) -> impl Iterator<Item = &str> {
        self.variants
            .iter()
            .map(|v| v.path.as_str())
            .chain([self.preferred.webp.as_str(), self.preferred.jpg.as_str()])
    }
}

/// Source key → entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: BTreeMap<String, ManifestEntry>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) the entry under its own `source` key.
    pub fn insert(&mut self, entry: ManifestEntry) {
        self.entries.insert(entry.source.clone(), entry);
    }

    pub fn get(&self, key: &str) -> Option<&ManifestEntry> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries.values()
    }

    pub fn to_json(&self) -> Result<String, ManifestError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a manifest file written by the pipeline.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Replace the manifest file with this manifest.
    pub fn save(&self, path: &Path) -> Result<(), ManifestError> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|source| ManifestError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_entry(key: &str, slug: &str) -> ManifestEntry {
        let mut variants = Vec::new();
        for width in [320, 480, 768, 1024] {
            for format in OutputFormat::ALL {
                variants.push(Variant {
                    width,
                    format,
                    path: format!("optimized/{slug}_{width}.{}", format.extension()),
                });
            }
        }
        ManifestEntry {
            source: key.to_string(),
            variants,
            preferred: PreferredPair {
                webp: format!("optimized/{slug}_800.webp"),
                jpg: format!("optimized/{slug}_800.jpg"),
            },
        }
    }

    #[test]
    fn parses_documented_shape() {
        let json = r#"{
            "hero.jpg": {
                "source": "hero.jpg",
                "variants": [
                    {"width": 320, "format": "webp", "path": "optimized/hero_320.webp"},
                    {"width": 320, "format": "jpg", "path": "optimized/hero_320.jpg"}
                ],
                "preferred": {"webp": "optimized/hero_800.webp", "jpg": "optimized/hero_800.jpg"}
            }
        }"#;
        let manifest = Manifest::from_json(json).unwrap();
        let entry = manifest.get("hero.jpg").unwrap();
        assert_eq!(entry.variants.len(), 2);
        assert_eq!(entry.variants[1].format, OutputFormat::Jpg);
        assert_eq!(entry.preferred.path(OutputFormat::Webp), "optimized/hero_800.webp");
    }

    #[test]
    fn rejects_unknown_format() {
        let json = r#"{"a.png": {"source": "a.png",
            "variants": [{"width": 320, "format": "avif", "path": "x"}],
            "preferred": {"webp": "w", "jpg": "j"}}}"#;
        assert!(matches!(Manifest::from_json(json), Err(ManifestError::Json(_))));
    }

    #[test]
    fn serializes_keys_sorted_regardless_of_insert_order() {
        let mut a = Manifest::new();
        a.insert(sample_entry("b/x.png", "b_x"));
        a.insert(sample_entry("a/x.png", "a_x"));

        let mut b = Manifest::new();
        b.insert(sample_entry("a/x.png", "a_x"));
        b.insert(sample_entry("b/x.png", "b_x"));

        assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
        assert_eq!(a.keys().collect::<Vec<_>>(), vec!["a/x.png", "b/x.png"]);
    }

    #[test]
    fn variants_of_filters_in_order() {
        let entry = sample_entry("hero.jpg", "hero");
        let widths: Vec<u32> = entry.variants_of(OutputFormat::Webp).map(|v| v.width).collect();
        assert_eq!(widths, vec![320, 480, 768, 1024]);
    }

    #[test]
    fn declared_paths_include_preferred_pair() {
        let entry = sample_entry("hero.jpg", "hero");
        let paths: Vec<&str> = entry.declared_paths().collect();
        assert_eq!(paths.len(), 10);
        assert_eq!(paths[8], "optimized/hero_800.webp");
        assert_eq!(paths[9], "optimized/hero_800.jpg");
    }

    #[test]
    fn save_then_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("image-manifest.json");
        let mut manifest = Manifest::new();
        manifest.insert(sample_entry("pro1/pro1s1.PNG", "pro1_pro1s1"));

        manifest.save(&path).unwrap();
        let loaded = Manifest::load(&path).unwrap();
        assert_eq!(loaded, manifest);
    }

    #[test]
    fn load_missing_file_reports_path() {
        let err = Manifest::load(Path::new("/nonexistent/image-manifest.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/image-manifest.json"));
    }
}
