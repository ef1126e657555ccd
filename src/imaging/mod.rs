//! Image processing in pure Rust, on the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `ImageReader::into_dimensions` |
//! | **Resize** | `resize_exact` with a configurable filter |
//! | **Encode** | PNG, JPEG (quality-controlled), lossless WebP |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension and page math (unit testable)
//! - **Parameters**: Data structures describing a resize pass
//! - **Backend**: [`Rasterizer`] trait + [`ImageRasterizer`]

pub mod backend;
mod calculations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, Rasterizer};
pub use calculations::{MAX_PAGE_SIDE, page_size, progress_percent, resolve_dimensions};
pub use params::{Encoding, Quality, ResizeFilter, ResizeParams};
pub use rust_backend::ImageRasterizer;
