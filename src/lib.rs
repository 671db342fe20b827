//! # folio-images
//!
//! Build-time responsive image pipeline and runtime manifest resolver for a
//! portfolio site.
//!
//! # Architecture: Two Halves, One Manifest
//!
//! ```text
//! build time   src/assets/**/*.{jpg,jpeg,png}  →  optimized/ + image-manifest.json
//! run time     image-manifest.json + source key  →  { webp, jpg, srcsetWebp }
//! ```
//!
//! The pipeline scans the assets root, generates a fixed set of WebP and JPEG
//! variants per source, and writes a manifest keyed by the source's relative
//! path. The resolver loads that manifest once and answers lookups for the UI,
//! mapping declared paths to servable URLs through an asset index.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Walks the assets root and lists eligible sources in a stable order |
//! | [`process`] | Runs the batch: variants per source in parallel, then the manifest |
//! | [`imaging`] | Pure-Rust decode, resize and encode behind the [`imaging::ImageBackend`] trait |
//! | [`manifest`] | The manifest data model and its JSON file |
//! | [`resolve`] | Source key → resolved URLs, with asset-index lookup and fallback |
//! | [`image_ref`] | Local-vs-remote project image fields, decided once at load |
//! | [`publish`] | Content-hashed copies of every output plus an asset map |
//! | [`naming`] | Source keys and the slugs output files are named from |
//! | [`config`] | `folio-images.toml` loading, validation and stock defaults |
//! | [`types`] | Output formats shared by every stage |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Keys Are Relative Paths
//!
//! A source is identified by its path under the assets root (`pro1/pro1s1.PNG`),
//! and output files fold the directories into their names (`pro1_pro1s1_320.webp`).
//! Two files with the same name in different directories therefore never
//! overwrite each other's outputs.
//!
//! ## Deterministic Manifest
//!
//! Discovery is sorted and the manifest is a sorted map assembled on one thread
//! after all workers finish. Re-running over an unchanged tree produces a
//! byte-identical manifest.
//!
//! ## Lossy WebP
//!
//! The `image` crate only encodes lossless WebP, so WebP variants go through the
//! `webp` crate at the configured quality. JPEG uses the `image` encoder.

pub mod config;
pub mod image_ref;
pub mod imaging;
pub mod manifest;
pub mod naming;
pub mod output;
pub mod process;
pub mod publish;
pub mod resolve;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
