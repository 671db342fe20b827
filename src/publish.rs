//! Content-hashed asset publishing.
//!
//! Plays the role of the hosting build's static-asset pipeline: every file the
//! manifest declares is copied into a dist directory under a name carrying a
//! prefix of its SHA-256, and an asset map records declared path → public URL.
//! Loading that map into a [`Resolver`](crate::resolve::Resolver) makes lookups
//! return the hashed URLs.
//!
//! ```text
//! dist/assets/
//! ├── asset-map.json
//! ├── pro1_pro1s1_320-3f2a9c1b.webp
//! └── ...
//! ```
//!
//! A declared file missing on disk is not an error here. It is left out of the
//! map and reported, and the resolver falls back for it.

use crate::manifest::{Manifest, ManifestError};
use crate::resolve::AssetMap;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Hex characters of the content hash kept in published file names.
pub const HASH_PREFIX_LEN: usize = 8;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("IO error at {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("Failed to write asset map: {0}")]
    AssetMap(#[from] ManifestError),
}

/// Outcome of a publish run.
#[derive(Debug)]
pub struct PublishReport {
    pub map: AssetMap,
    pub map_path: PathBuf,
    /// Files newly copied into the dist directory.
    pub copied: usize,
    /// Files whose hashed name was already present, so nothing was copied.
    pub reused: usize,
    /// Declared paths with no file behind them.
    pub missing: Vec<String>,
}

/// Where published files go and how they are addressed.
#[derive(Debug, Clone, Copy)]
pub struct PublishTarget<'a> {
    pub dist_dir: &'a Path,
    pub public_base: &'a str,
    pub asset_map: &'a str,
}

/// SHA-256 hash of a file's contents, returned as a hex string.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{:x}", digest))
}

/// `optimized/hero_800.webp` + hash → `hero_800-<hash prefix>.webp`.
pub fn hashed_file_name(declared: &str, hash: &str) -> String {
    let file = declared.rsplit('/').next().unwrap_or(declared);
    let short = &hash[..hash.len().min(HASH_PREFIX_LEN)];
    match file.rfind('.') {
        Some(pos) if pos > 0 => format!("{}-{}{}", &file[..pos], short, &file[pos..]),
        _ => format!("{}-{}", file, short),
    }
}

/// Copy every declared output under `assets_root` into the dist directory and
/// write the asset map next to them.
pub fn publish(
    assets_root: &Path,
    manifest: &Manifest,
    target: PublishTarget<'_>,
) -> Result<PublishReport, PublishError> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source: io::Error| PublishError::Io { path, source }
    };

    fs::create_dir_all(target.dist_dir).map_err(io_err(target.dist_dir))?;

    let declared: BTreeSet<&str> = manifest.entries().flat_map(|e| e.declared_paths()).collect();
    let base = target.public_base.trim_end_matches('/');

    let mut map = AssetMap::new();
    let mut missing = Vec::new();
    let mut copied = 0;
    let mut reused = 0;
    for path in declared {
        let source = assets_root.join(path);
        if !source.is_file() {
            missing.push(path.to_string());
            continue;
        }
        let hash = hash_file(&source).map_err(io_err(&source))?;
        let name = hashed_file_name(path, &hash);
        let dest = target.dist_dir.join(&name);
        // Same name means same content.
        if dest.exists() {
            reused += 1;
        } else {
            fs::copy(&source, &dest).map_err(io_err(&dest))?;
            copied += 1;
        }
        map.insert(path, format!("{}/{}", base, name));
    }

    let map_path = target.dist_dir.join(target.asset_map);
    map.save(&map_path)?;

    Ok(PublishReport {
        map,
        map_path,
        copied,
        reused,
        missing,
    })
}
