//! Image processing: decode, resize, encode.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader::into_dimensions` |
//! | **Resize** | Lanczos3 via `image` |
//! | **Encode → JPEG** | `image::codecs::jpeg` |
//! | **Encode → WebP** | `webp` (libwebp, lossy) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::scale_to_width;
pub use operations::{
    GeneratedSet, OutputLocation, OutputRole, PlannedOutput, VariantConfig, create_variants,
    exceeds_format_limit, get_dimensions, output_file_name, plan_outputs, plan_resizes,
    planned_paths,
};
pub use params::{Quality, ResizeParams};
pub use rust_backend::RustBackend;
