//! Image re-encoding in pure Rust.
//!
//! | Step | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (BMP, GIF, JPEG, PNG, WebP) |
//! | **Orientation** | `ImageDecoder::orientation` + `DynamicImage::apply_orientation` |
//! | **Colour** | `DynamicImage::to_rgb8` when the source has alpha or a palette |
//! | **Encode** | per-extension encoder with the configured quality |
//!
//! The module is split into:
//! - **Parameters**: Data structures describing one optimization
//! - **Backend**: [`ImageOptimizer`] trait + [`RustOptimizer`]
//! - **Operations**: [`optimize_image`], the boolean boundary the asset
//!   materializer calls so a codec failure can fall back to a copy

pub mod backend;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageOptimizer};
pub use operations::optimize_image;
pub use params::{OptimizeParams, Quality};
pub use rust_backend::{RustOptimizer, is_raster_extension};
