//! Source image discovery.
//!
//! First stage of the pipeline. Walks the assets root and returns every source
//! image the pipeline should process, in a deterministic order.
//!
//! ## Directory Structure
//!
//! ```text
//! src/assets/                      # Assets root
//! ├── image-manifest.json          # Written by the pipeline, never a source
//! ├── profile_pic.jpg              # Source → key "profile_pic.jpg"
//! ├── pro1/
//! │   ├── pro1s1.PNG               # Source → key "pro1/pro1s1.PNG"
//! │   └── notes.txt                # Not an image, ignored
//! └── optimized/                   # Output directory, never walked
//!     ├── profile_pic_320.webp
//!     └── ...
//! ```
//!
//! ## Eligibility
//!
//! [`is_eligible`] is a pure predicate over the path relative to the root, so
//! the exclusion rules can be tested without touching the filesystem. The
//! walker additionally prunes the output directory so its contents are never
//! even listed.
//!
//! ## Ordering
//!
//! Entries are sorted by file name at every level, so two runs over an
//! unchanged tree discover the same sources in the same order.

use crate::naming::{key_extension, normalize_key, slug_for_key};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Eligible source extensions, compared case-insensitively.
pub const SOURCE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Assets directory missing: {0}")]
    AssetsRootMissing(PathBuf),
    #[error("Assets root is not a directory: {0}")]
    AssetsRootNotDirectory(PathBuf),
    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
}

/// How the assets root is laid out: where sources live and which names belong
/// to the pipeline itself.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetLayout {
    pub root: PathBuf,
    /// Output subdirectory name, directly under `root`.
    pub output_dir: String,
    /// Manifest file name, directly under `root`.
    pub manifest: String,
}

/// A source image found under the assets root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceImage {
    /// Normalized relative path; the manifest key.
    pub key: String,
    /// Output file name prefix derived from the key.
    pub slug: String,
    /// Absolute (or root-joined) path to read from.
    #[serde(skip)]
    pub path: PathBuf,
}

impl SourceImage {
    pub fn from_key(root: &Path, key: &str) -> Self {
        Self {
            key: key.to_string(),
            slug: slug_for_key(key),
            path: root.join(key),
        }
    }

    /// File name with extension, e.g. `pro1s1.PNG`.
    pub fn file_name(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }
}

/// Whether a normalized relative path names a source image.
///
/// A path qualifies when its extension is in [`SOURCE_EXTENSIONS`]
/// (case-insensitively), it is not the manifest file at the root, and it does
/// not live under the output directory.
pub fn is_eligible(key: &str, layout: &AssetLayout) -> bool {
    if key == layout.manifest {
        return false;
    }
    if key
        .split('/')
        .next()
        .is_some_and(|first| first == layout.output_dir && key.len() > first.len())
    {
        return false;
    }
    key_extension(key).is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext.as_str()))
}

/// Why a path under the root was passed over during discovery.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("could not be read: {0}")]
    Unreadable(String),
    #[error("name is not valid UTF-8")]
    NonUtf8Name,
    #[error("not under the assets root")]
    OutsideRoot,
}

/// A path below the root that may hold a source but was not discovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPath {
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Everything one walk of the assets root found.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Discovery {
    pub sources: Vec<SourceImage>,
    /// Unreadable entries, and image files whose key cannot be derived.
    pub skipped: Vec<SkippedPath>,
}

/// Discover every eligible source under the layout's root.
///
/// Fails only if the root is missing, not a directory, or cannot be listed.
/// Anything below the root that cannot be read is recorded in
/// [`Discovery::skipped`] and the walk carries on.
pub fn discover(layout: &AssetLayout) -> Result<Discovery, ScanError> {
    let root = &layout.root;
    if !root.exists() {
        return Err(ScanError::AssetsRootMissing(root.clone()));
    }
    if !root.is_dir() {
        return Err(ScanError::AssetsRootNotDirectory(root.clone()));
    }

    let output_dir = root.join(&layout.output_dir);
    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !(entry.depth() == 1 && entry.path() == output_dir));

    let mut found = Discovery::default();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) if source.depth() == 0 => {
                return Err(ScanError::Walk {
                    path: root.clone(),
                    source,
                });
            }
            Err(err) => {
                found.skipped.push(SkippedPath {
                    path: err.path().unwrap_or(root.as_path()).to_path_buf(),
                    reason: SkipReason::Unreadable(walk_error_detail(&err)),
                });
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let skip = |reason| SkippedPath {
            path: entry.path().to_path_buf(),
            reason,
        };
        let Ok(relative) = entry.path().strip_prefix(root) else {
            found.skipped.push(skip(SkipReason::OutsideRoot));
            continue;
        };
        let Some(key) = normalize_key(relative) else {
            // Only worth mentioning if it would otherwise have been a source.
            if is_eligible(&relative.to_string_lossy().replace('\\', "/"), layout) {
                found.skipped.push(skip(SkipReason::NonUtf8Name));
            }
            continue;
        };
        if is_eligible(&key, layout) {
            found.sources.push(SourceImage {
                slug: slug_for_key(&key),
                path: entry.path().to_path_buf(),
                key,
            });
        }
    }
    Ok(found)
}

/// The underlying IO error if there is one; walkdir's own message otherwise.
fn walk_error_detail(err: &walkdir::Error) -> String {
    match err.io_error() {
        Some(io) => io.to_string(),
        None => err.to_string(),
    }
}

/// Sources whose slug was already taken by an earlier source.
///
/// Returns `(later, earlier)` key pairs in discovery order.
pub fn find_slug_collisions(sources: &[SourceImage]) -> Vec<(String, String)> {
    let mut seen: std::collections::HashMap<&str, &str> = std::collections::HashMap::new();
    let mut collisions = Vec::new();
    for source in sources {
        match seen.get(source.slug.as_str()) {
            Some(earlier) => collisions.push((source.key.clone(), earlier.to_string())),
            None => {
                seen.insert(&source.slug, &source.key);
            }
        }
    }
    collisions
}
