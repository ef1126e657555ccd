//! Parameter types for rasterizer operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the [`convert`](crate::convert) stage (which decides the
//! target dimensions and encoding) and the [`backend`](super::backend)
//! (which does the actual pixel work). Swapping the backend for a mock in
//! tests leaves the conversion logic untouched.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 92). Clamped on construction.
//! - [`ResizeFilter`]: Resampling filter used when scaling.
//! - [`Encoding`]: Target byte encoding for a scaled pixel buffer.
//! - [`ResizeParams`]: everything needed for one decode → scale → encode pass.

use serde::{Deserialize, Serialize};

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(92)
    }
}

/// Resampling filter applied when scaling to the target dimensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

/// Byte encoding produced by a resize pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Png,
    Jpeg,
    WebP,
}

impl Encoding {
    /// Canonical file extension for this encoding.
    pub fn extension(self) -> &'static str {
        match self {
            Encoding::Png => "png",
            Encoding::Jpeg => "jpeg",
            Encoding::WebP => "webp",
        }
    }
}

/// Parameters for one decode → scale → encode pass over in-memory bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeParams<'a> {
    pub source: &'a [u8],
    /// Exact output dimensions. No aspect ratio is preserved.
    pub width: u32,
    pub height: u32,
    pub encoding: Encoding,
    pub quality: Quality,
    pub filter: ResizeFilter,
}
