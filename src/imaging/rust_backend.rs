//! Rasterizer backend on the `image` crate. Pure Rust, statically linked.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `ImageReader::into_dimensions` (header only, no full decode) |
//! | Decode (JPEG, PNG, TIFF, WebP, GIF, BMP) | `ImageReader::decode` with format sniffing |
//! | Scale | `DynamicImage::resize_exact` |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (alpha dropped) |
//! | Encode → WebP | `image::codecs::webp::WebPEncoder` (lossless) |

use super::backend::{BackendError, Dimensions, Rasterizer};
use super::params::{Encoding, Quality, ResizeFilter, ResizeParams};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::io::Cursor;

/// Largest scaled RGBA buffer `resize` will allocate, matching the `image`
/// crate's default decoder `Limits::max_alloc`.
pub const MAX_TARGET_BYTES: u64 = 512 * 1024 * 1024;

/// Backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct ImageRasterizer;

impl ImageRasterizer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

fn reader(source: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, BackendError> {
    ImageReader::new(Cursor::new(source))
        .with_guessed_format()
        .map_err(|e| BackendError::Decode(format!("Failed to sniff format: {}", e)))
}

/// Decode an image from memory, sniffing the format from its magic bytes.
fn load_image(source: &[u8]) -> Result<DynamicImage, BackendError> {
    reader(source)?
        .decode()
        .map_err(|e| BackendError::Decode(format!("Failed to decode: {}", e)))
}

fn filter_type(filter: ResizeFilter) -> FilterType {
    match filter {
        ResizeFilter::Nearest => FilterType::Nearest,
        ResizeFilter::Triangle => FilterType::Triangle,
        ResizeFilter::CatmullRom => FilterType::CatmullRom,
        ResizeFilter::Gaussian => FilterType::Gaussian,
        ResizeFilter::Lanczos3 => FilterType::Lanczos3,
    }
}

/// Encode a pixel buffer into `encoding`.
fn encode_image(
    img: &DynamicImage,
    encoding: Encoding,
    quality: Quality,
) -> Result<Vec<u8>, BackendError> {
    let mut buf = Vec::new();
    let result = match encoding {
        Encoding::Png => img.write_with_encoder(PngEncoder::new(&mut buf)),
        Encoding::Jpeg => {
            // JPEG has no alpha channel; flatten to RGB first.
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            rgb.write_with_encoder(JpegEncoder::new_with_quality(
                &mut buf,
                quality.value() as u8,
            ))
        }
        Encoding::WebP => {
            let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
            rgba.write_with_encoder(WebPEncoder::new_lossless(&mut buf))
        }
    };
    result.map_err(|e| {
        BackendError::Encode(format!("{} encode failed: {}", encoding.extension(), e))
    })?;
    Ok(buf)
}

impl Rasterizer for ImageRasterizer {
    fn identify(&self, source: &[u8]) -> Result<Dimensions, BackendError> {
        let (width, height) = reader(source)?
            .into_dimensions()
            .map_err(|e| BackendError::Decode(format!("Failed to read dimensions: {}", e)))?;
        Ok(Dimensions { width, height })
    }

    fn resize(&self, params: &ResizeParams<'_>) -> Result<Vec<u8>, BackendError> {
        if params.width == 0 || params.height == 0 {
            return Err(BackendError::Encode(format!(
                "Cannot encode an empty {}x{} image",
                params.width, params.height
            )));
        }
        let target_bytes = (params.width as u64 * params.height as u64).saturating_mul(4);
        if target_bytes > MAX_TARGET_BYTES {
            return Err(BackendError::Encode(format!(
                "Target {}x{} needs {} bytes, over the {} byte limit",
                params.width, params.height, target_bytes, MAX_TARGET_BYTES
            )));
        }
        let img = load_image(params.source)?;
        let scaled = if img.width() == params.width && img.height() == params.height {
            img
        } else {
            img.resize_exact(params.width, params.height, filter_type(params.filter))
        };
        encode_image(&scaled, params.encoding, params.quality)
    }
}
