//! Pipeline orchestration.
//!
//! Drives discovery → per-source variant generation → manifest assembly →
//! manifest persistence as one batch.
//!
//! ## Failure model
//!
//! Only a missing assets root is fatal: it is detected before anything is
//! created or written. An unreadable entry below the root is reported through
//! [`ProcessEvent::PathSkipped`] and the walk continues. Every other failure
//! belongs to one source. That source
//! is reported through a [`ProcessEvent::SourceFailed`], any output files it
//! already wrote are removed, and it is left out of the manifest. The rest of
//! the batch carries on.
//!
//! ## Output Structure
//!
//! ```text
//! src/assets/
//! ├── image-manifest.json          # Replaced on every run
//! ├── pro1/pro1s1.PNG
//! └── optimized/
//!     ├── pro1_pro1s1_320.webp
//!     ├── pro1_pro1s1_320.jpg
//!     ├── ...
//!     ├── pro1_pro1s1_1024.jpg
//!     ├── pro1_pro1s1_800.webp     # Preferred pair
//!     └── pro1_pro1s1_800.jpg
//! ```
//!
//! ## Parallel Processing
//!
//! Sources are processed in parallel using [rayon](https://docs.rs/rayon).
//! Results are collected in discovery order and the manifest is assembled on
//! the calling thread once every worker is done, so it has a single writer and
//! its content does not depend on scheduling.

use crate::config::PipelineConfig;
use crate::imaging::{
    BackendError, GeneratedSet, ImageBackend, OutputLocation, RustBackend, create_variants,
    plan_outputs, planned_paths,
};
use crate::manifest::{Manifest, ManifestEntry, ManifestError};
use crate::scan::{self, ScanError, SkippedPath, SourceImage};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Run-level errors. Any of these aborts the run.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("Failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write manifest: {0}")]
    Manifest(#[from] ManifestError),
}

impl ProcessError {
    /// True for the missing-root configuration error.
    pub fn is_missing_root(&self) -> bool {
        matches!(self, ProcessError::Scan(ScanError::AssetsRootMissing(_)))
    }
}

/// Per-source errors. These never abort the run.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error(transparent)]
    Imaging(#[from] BackendError),
    #[error("Output name '{slug}' is already used by {claimed_by}")]
    SlugCollision { slug: String, claimed_by: String },
}

/// A source that was left out of the manifest.
#[derive(Debug)]
pub struct SourceFailure {
    pub key: String,
    pub error: SourceError,
}

/// Progress events, sent as each stage of the run completes.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessEvent {
    /// Discovery finished.
    Discovered { count: usize },
    /// Something below the root could not be considered as a source.
    PathSkipped { path: PathBuf, reason: String },
    /// All outputs for a source were written.
    SourceProcessed {
        /// 1-based position in discovery order.
        index: usize,
        key: String,
        slug: String,
        outputs: usize,
    },
    /// A source failed and was skipped.
    SourceFailed {
        index: usize,
        key: String,
        error: String,
        /// Partial outputs deleted during rollback.
        removed: usize,
    },
    /// The manifest file was replaced.
    ManifestWritten { path: PathBuf, entries: usize },
}

/// Outcome of a completed run.
#[derive(Debug)]
pub struct ProcessResult {
    pub manifest: Manifest,
    pub manifest_path: PathBuf,
    /// Number of sources discovered.
    pub discovered: usize,
    /// Paths passed over during discovery.
    pub skipped: Vec<SkippedPath>,
    pub failures: Vec<SourceFailure>,
}

/// Run the pipeline with the pure-Rust imaging backend.
pub fn process(
    config: &PipelineConfig,
    events: Option<Sender<ProcessEvent>>,
) -> Result<ProcessResult, ProcessError> {
    process_with_backend(&RustBackend::new(), config, events)
}

/// Run the pipeline using a specific backend (allows testing with mock).
pub fn process_with_backend(
    backend: &impl ImageBackend,
    config: &PipelineConfig,
    events: Option<Sender<ProcessEvent>>,
) -> Result<ProcessResult, ProcessError> {
    let emit = |event: ProcessEvent| {
        if let Some(tx) = &events {
            // Receiver gone means nobody is listening; the run still completes.
            let _ = tx.send(event);
        }
    };

    let scan::Discovery { sources, skipped } = scan::discover(&config.layout())?;
    emit(ProcessEvent::Discovered {
        count: sources.len(),
    });
    for entry in &skipped {
        emit(ProcessEvent::PathSkipped {
            path: entry.path.clone(),
            reason: entry.reason.to_string(),
        });
    }

    let output_dir = config.output_path();
    std::fs::create_dir_all(&output_dir).map_err(|source| ProcessError::OutputDir {
        path: output_dir.clone(),
        source,
    })?;

    let collisions: HashMap<String, String> = scan::find_slug_collisions(&sources)
        .into_iter()
        .collect();
    let location = OutputLocation {
        dir: &output_dir,
        relative_dir: &config.output_dir,
    };
    let variant_config = config.variant_config();

    let results: Vec<Result<GeneratedSet, SourceError>> = sources
        .par_iter()
        .enumerate()
        .map(|(i, source)| {
            let result = match collisions.get(&source.key) {
                Some(claimed_by) => Err(SourceError::SlugCollision {
                    slug: source.slug.clone(),
                    claimed_by: claimed_by.clone(),
                }),
                None => create_variants(
                    backend,
                    &source.path,
                    location,
                    &source.slug,
                    &variant_config,
                )
                .map_err(SourceError::from),
            };
            match &result {
                Ok(_) => emit(ProcessEvent::SourceProcessed {
                    index: i + 1,
                    key: source.key.clone(),
                    slug: source.slug.clone(),
                    outputs: plan_outputs(&source.slug, &variant_config).len(),
                }),
                Err(error) => {
                    // A colliding source never wrote anything; the files at its
                    // paths belong to the source that claimed the slug first.
                    let removed = match error {
                        SourceError::SlugCollision { .. } => 0,
                        SourceError::Imaging(_) => rollback(source, &output_dir, config),
                    };
                    emit(ProcessEvent::SourceFailed {
                        index: i + 1,
                        key: source.key.clone(),
                        error: error.to_string(),
                        removed,
                    });
                }
            }
            result
        })
        .collect();

    let mut manifest = Manifest::new();
    let mut failures = Vec::new();
    for (source, result) in sources.iter().zip(results) {
        match result {
            Ok(set) => manifest.insert(ManifestEntry {
                source: source.key.clone(),
                variants: set.variants,
                preferred: set.preferred,
            }),
            Err(error) => failures.push(SourceFailure {
                key: source.key.clone(),
                error,
            }),
        }
    }

    let manifest_path = config.manifest_path();
    manifest.save(&manifest_path)?;
    emit(ProcessEvent::ManifestWritten {
        path: manifest_path.clone(),
        entries: manifest.len(),
    });

    Ok(ProcessResult {
        manifest,
        manifest_path,
        discovered: sources.len(),
        skipped,
        failures,
    })
}

/// Delete whatever a failed source managed to write. Best-effort: returns the
/// number of files removed.
fn rollback(source: &SourceImage, output_dir: &Path, config: &PipelineConfig) -> usize {
    planned_paths(output_dir, &source.slug, &config.variant_config())
        .into_iter()
        .filter(|path| path.is_file() && std::fs::remove_file(path).is_ok())
        .count()
}
