//! Per-image conversion: identify → resolve size → resize → encode.
//!
//! One call handles one [`SourceImage`]. The output format has already been
//! decided as an [`OutputFormat`]; raster targets encode straight to that
//! format, document targets encode a JPEG that later becomes a PDF page.

use crate::batch::SourceImage;
use crate::imaging::{
    BackendError, Dimensions, Quality, Rasterizer, ResizeFilter, ResizeParams, resolve_dimensions,
};
use crate::naming;
use crate::types::{OutputFormat, TargetSize};
use tracing::debug;

/// Options for one run, fixed for every image in it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionOptions {
    pub size: TargetSize,
    pub format: OutputFormat,
    /// Lossy quality, used by JPEG output and by document page images.
    pub quality: Quality,
    pub filter: ResizeFilter,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            size: TargetSize::ORIGINAL,
            format: OutputFormat::default(),
            quality: Quality::default(),
            filter: ResizeFilter::default(),
        }
    }
}

/// A converted image, ready for bundling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedResult {
    pub filename: String,
    pub bytes: Vec<u8>,
    /// Pixel dimensions of `bytes`.
    pub dimensions: Dimensions,
}

/// Convert one source image according to `opts`.
pub fn convert(
    backend: &impl Rasterizer,
    image: &SourceImage,
    opts: &ConversionOptions,
) -> Result<EncodedResult, BackendError> {
    let native = backend.identify(&image.bytes)?;
    let target = resolve_dimensions(native, opts.size);
    let encoding = opts.format.page_encoding();

    debug!(
        name = %image.name,
        native_width = native.width,
        native_height = native.height,
        width = target.width,
        height = target.height,
        encoding = encoding.extension(),
        "Converting image"
    );

    let bytes = backend.resize(&ResizeParams {
        source: &image.bytes,
        width: target.width,
        height: target.height,
        encoding,
        quality: opts.quality,
        filter: opts.filter,
    })?;

    Ok(EncodedResult {
        filename: naming::output_name(&image.name, opts.format.extension()),
        bytes,
        dimensions: target,
    })
}
