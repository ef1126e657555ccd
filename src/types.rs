//! Shared types used across all pipeline stages.
//!
//! The output format is a closed enum: [`OutputFormat::Raster`] or
//! [`OutputFormat::Document`]. It is decided once when options are built and
//! every stage matches on it, so no stage inspects MIME strings.

use crate::imaging::Encoding;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid size '{0}': expected 'original' or WIDTHxHEIGHT (e.g. 800x600)")]
    Size(String),
    #[error("Invalid format '{0}': expected one of png, jpeg, webp, pdf")]
    Format(String),
}

/// One axis of a target size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    /// Keep the source image's native value for this axis.
    Original,
    Pixels(u32),
}

impl Dimension {
    /// Resolve against the native value of this axis.
    pub fn resolve(self, native: u32) -> u32 {
        match self {
            Dimension::Original => native,
            Dimension::Pixels(n) => n,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Original => f.write_str("original"),
            Dimension::Pixels(n) => write!(f, "{}", n),
        }
    }
}

/// Target size of a run. Each axis resolves independently.
///
/// Parses from `original`, `800x600`, and mixed forms such as `800xoriginal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TargetSize {
    pub width: Dimension,
    pub height: Dimension,
}

impl TargetSize {
    pub const ORIGINAL: TargetSize = TargetSize {
        width: Dimension::Original,
        height: Dimension::Original,
    };

    pub fn pixels(width: u32, height: u32) -> Self {
        Self {
            width: Dimension::Pixels(width),
            height: Dimension::Pixels(height),
        }
    }
}

impl Default for TargetSize {
    fn default() -> Self {
        Self::ORIGINAL
    }
}

fn parse_dimension(part: &str, whole: &str) -> Result<Dimension, ParseError> {
    if part.eq_ignore_ascii_case("original") {
        return Ok(Dimension::Original);
    }
    match part.parse::<u32>() {
        Ok(n) if n > 0 => Ok(Dimension::Pixels(n)),
        _ => Err(ParseError::Size(whole.to_string())),
    }
}

impl FromStr for TargetSize {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("original") {
            return Ok(Self::ORIGINAL);
        }
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| ParseError::Size(s.to_string()))?;
        Ok(Self {
            width: parse_dimension(w.trim(), s)?,
            height: parse_dimension(h.trim(), s)?,
        })
    }
}

impl fmt::Display for TargetSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::ORIGINAL {
            f.write_str("original")
        } else {
            write!(f, "{}x{}", self.width, self.height)
        }
    }
}

impl TryFrom<String> for TargetSize {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TargetSize> for String {
    fn from(value: TargetSize) -> Self {
        value.to_string()
    }
}

/// Raster output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    Png,
    Jpeg,
    WebP,
}

impl RasterFormat {
    pub fn encoding(self) -> Encoding {
        match self {
            RasterFormat::Png => Encoding::Png,
            RasterFormat::Jpeg => Encoding::Jpeg,
            RasterFormat::WebP => Encoding::WebP,
        }
    }
}

/// What a run produces: a raster image per source, or PDF pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OutputFormat {
    Raster(RasterFormat),
    Document,
}

impl OutputFormat {
    pub const PNG: OutputFormat = OutputFormat::Raster(RasterFormat::Png);
    pub const JPEG: OutputFormat = OutputFormat::Raster(RasterFormat::Jpeg);
    pub const WEBP: OutputFormat = OutputFormat::Raster(RasterFormat::WebP);

    /// Canonical file extension for per-image output names.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Raster(raster) => raster.encoding().extension(),
            OutputFormat::Document => "pdf",
        }
    }

    /// Encoding used for the per-image bytes. Documents embed JPEG pages.
    pub fn page_encoding(self) -> Encoding {
        match self {
            OutputFormat::Raster(raster) => raster.encoding(),
            OutputFormat::Document => Encoding::Jpeg,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Raster(RasterFormat::Png) => "image/png",
            OutputFormat::Raster(RasterFormat::Jpeg) => "image/jpeg",
            OutputFormat::Raster(RasterFormat::WebP) => "image/webp",
            OutputFormat::Document => "application/pdf",
        }
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::PNG
    }
}

impl FromStr for OutputFormat {
    type Err = ParseError;

    /// Accepts short names (`png`, `jpg`, `pdf`) and MIME types (`image/png`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let name = lower
            .strip_prefix("image/")
            .or_else(|| lower.strip_prefix("application/"))
            .unwrap_or(&lower);
        match name {
            "png" => Ok(Self::PNG),
            "jpeg" | "jpg" => Ok(Self::JPEG),
            "webp" => Ok(Self::WEBP),
            "pdf" => Ok(Self::Document),
            _ => Err(ParseError::Format(s.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl TryFrom<String> for OutputFormat {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OutputFormat> for String {
    fn from(value: OutputFormat) -> Self {
        value.to_string()
    }
}
