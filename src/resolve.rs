//! Runtime manifest resolution.
//!
//! The UI asks one question per image: given a source key, what do I render?
//! A [`Resolver`] answers it from a manifest loaded once at startup and an
//! [`AssetIndex`] describing how the hosting build serves files. It never
//! touches the filesystem or network itself.
//!
//! ## Path resolution
//!
//! Every path in the manifest is relative to the assets root. The hosting
//! build may rename files (content hashes, a CDN prefix), so each declared path
//! goes through the index first. When the index does not know a path, the
//! resolver builds `<public_base>/<declared path>` instead. That URL may be
//! broken, but a broken image beats a failed render; the miss is listed in
//! [`ResolvedImage::unresolved`] for the caller to warn about.
//!
//! ## Concurrency
//!
//! A resolver is immutable after construction. It is `Sync` whenever its index
//! is, so independent rendering passes can share one by reference.

use crate::manifest::{Manifest, ManifestEntry, ManifestError};
use crate::types::OutputFormat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// How the hosting build maps declared paths to servable URLs.
pub trait AssetIndex {
    /// The URL for a declared path, or `None` if the build never registered it.
    fn url_for(&self, declared: &str) -> Option<String>;
}

/// An index that knows nothing: every path falls back to `public_base`.
///
/// Matches a dev server that serves the assets directory as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAssetIndex;

impl AssetIndex for NoAssetIndex {
    fn url_for(&self, _declared: &str) -> Option<String> {
        None
    }
}

/// Declared path → public URL, as written by `publish` to `asset-map.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetMap {
    entries: BTreeMap<String, String>,
}

impl AssetMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, declared: impl Into<String>, url: impl Into<String>) {
        self.entries.insert(declared.into(), url.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
                path: path.display().to_string(),
                source,
            })?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ManifestError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| ManifestError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// Load `path` if it exists, otherwise start empty.
    pub fn load_or_empty(path: &Path) -> Result<Self, ManifestError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::new())
        }
    }
}

impl AssetIndex for AssetMap {
    fn url_for(&self, declared: &str) -> Option<String> {
        self.entries.get(declared).cloned()
    }
}

/// Where a resolved URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlOrigin {
    Index,
    Fallback,
}

/// A declared path mapped to a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUrl {
    pub url: String,
    pub origin: UrlOrigin,
}

/// One responsive variant with its final URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVariant {
    pub width: u32,
    pub url: String,
}

/// What to render for a source key.
///
/// Serializes to the consumer shape `{ "webp", "jpg", "srcsetWebp" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedImage {
    /// Preferred WebP URL.
    pub webp: String,
    /// Preferred JPEG URL.
    pub jpg: String,
    /// `"<url> <width>w"` entries for the WebP variants, ascending, joined by `", "`.
    #[serde(rename = "srcsetWebp")]
    pub srcset_webp: String,
    /// WebP variants in ascending width order.
    #[serde(skip)]
    pub webp_variants: Vec<ResolvedVariant>,
    /// Declared paths the index did not know and that fell back to a
    /// constructed URL.
    #[serde(skip)]
    pub unresolved: Vec<String>,
}

/// Read-only view of a manifest that answers lookups.
#[derive(Debug, Clone)]
pub struct Resolver<I = AssetMap> {
    manifest: Manifest,
    index: I,
    public_base: String,
}

impl<I: AssetIndex> Resolver<I> {
    pub fn new(manifest: Manifest, index: I, public_base: impl Into<String>) -> Self {
        Self {
            manifest,
            index,
            public_base: public_base.into(),
        }
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Map one declared path to a URL. Never fails.
    pub fn resolve_path(&self, declared: &str) -> ResolvedUrl {
        match self.index.url_for(declared) {
            Some(url) => ResolvedUrl {
                url,
                origin: UrlOrigin::Index,
            },
            None => ResolvedUrl {
                url: fallback_url(&self.public_base, declared),
                origin: UrlOrigin::Fallback,
            },
        }
    }

    /// Resolve everything needed to render `key`.
    ///
    /// Returns `None` when the manifest has no entry for `key`; callers render
    /// a placeholder.
    pub fn lookup(&self, key: &str) -> Option<ResolvedImage> {
        self.manifest.get(key).map(|entry| self.resolve_entry(entry))
    }

    fn resolve_entry(&self, entry: &ManifestEntry) -> ResolvedImage {
        let mut unresolved = Vec::new();
        let mut resolve = |declared: &str| {
            let resolved = self.resolve_path(declared);
            if resolved.origin == UrlOrigin::Fallback {
                unresolved.push(declared.to_string());
            }
            resolved.url
        };

        let mut webp_variants: Vec<ResolvedVariant> = entry
            .variants_of(OutputFormat::Webp)
            .map(|v| ResolvedVariant {
                width: v.width,
                url: resolve(&v.path),
            })
            .collect();
        // The pipeline writes ascending widths; a hand-edited manifest might not.
        webp_variants.sort_by_key(|v| v.width);

        let webp = resolve(&entry.preferred.webp);
        let jpg = resolve(&entry.preferred.jpg);

        ResolvedImage {
            webp,
            jpg,
            srcset_webp: build_srcset(&webp_variants),
            webp_variants,
            unresolved,
        }
    }
}

/// Join `"<url> <width>w"` entries with `", "`.
pub fn build_srcset(variants: &[ResolvedVariant]) -> String {
    variants
        .iter()
        .map(|v| format!("{} {}w", v.url, v.width))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `<public_base>/<declared>`, tolerating stray slashes on either side.
fn fallback_url(public_base: &str, declared: &str) -> String {
    let base = public_base.trim_end_matches('/');
    let path = declared.trim_start_matches('/');
    if base.is_empty() && !public_base.starts_with('/') {
        path.to_string()
    } else {
        format!("{}/{}", base, path)
    }
}
