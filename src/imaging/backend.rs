//! Rasterizer trait and shared types.
//!
//! The [`Rasterizer`] trait defines the two operations every backend must
//! support: identify (read native dimensions) and resize (decode, scale to an
//! exact size, encode).
//!
//! The production implementation is
//! [`ImageRasterizer`](super::rust_backend::ImageRasterizer), built on the
//! `image` crate. Tests use the recording mock in [`tests`].

use super::params::ResizeParams;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for raster decode/scale/encode backends.
///
/// Inputs are raw file bytes, outputs are encoded bytes, so the pipeline
/// never sees a decoded pixel buffer and stays backend-agnostic.
pub trait Rasterizer: Sync {
    /// Read the native dimensions of an encoded image.
    fn identify(&self, source: &[u8]) -> Result<Dimensions, BackendError>;

    /// Decode, scale to exactly `width`x`height`, and encode.
    fn resize(&self, params: &ResizeParams<'_>) -> Result<Vec<u8>, BackendError>;
}
