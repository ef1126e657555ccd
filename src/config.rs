//! Tool configuration.
//!
//! Handles loading, validating, and merging `batch-resize.toml`. Stock
//! defaults are the base layer; a user file overrides any subset of keys,
//! and command-line flags override both.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [output]
//! size = "original"         # "original", "WxH", or mixed like "800xoriginal"
//! format = "png"            # png, jpeg, webp, pdf (or a MIME type)
//! directory = "."           # Where finished artifacts are written
//!
//! [encoding]
//! jpeg_quality = 92         # JPEG and PDF page quality (1-100)
//! filter = "lanczos3"       # nearest, triangle, catmull-rom, gaussian, lanczos3
//!
//! [document]
//! page_width = 595.28       # PDF page width in points (A4)
//!
//! [processing]
//! max_threads = 4           # File reading workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::convert::ConversionOptions;
use crate::imaging::{Quality, ResizeFilter};
use crate::process::DEFAULT_PAGE_WIDTH;
use crate::types::{OutputFormat, TargetSize};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "batch-resize.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Tool configuration loaded from `batch-resize.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    pub output: OutputConfig,
    pub encoding: EncodingConfig,
    pub document: DocumentConfig,
    pub processing: ProcessingConfig,
}

impl ResizeConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.encoding.jpeg_quality) {
            return Err(ConfigError::Validation(
                "encoding.jpeg_quality must be 1-100".into(),
            ));
        }
        if !self.document.page_width.is_finite() || self.document.page_width <= 0.0 {
            return Err(ConfigError::Validation(
                "document.page_width must be a positive number".into(),
            ));
        }
        if self.processing.max_threads == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_threads must be at least 1".into(),
            ));
        }
        if self.output.directory.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output.directory must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Options for a run, before any command-line overrides.
    pub fn conversion_options(&self) -> ConversionOptions {
        ConversionOptions {
            size: self.output.size,
            format: self.output.format,
            quality: Quality::new(self.encoding.jpeg_quality),
            filter: self.encoding.filter,
        }
    }
}

/// What a run produces and where it goes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub size: TargetSize,
    pub format: OutputFormat,
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            size: TargetSize::ORIGINAL,
            format: OutputFormat::default(),
            directory: ".".to_string(),
        }
    }
}

/// Encoder settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncodingConfig {
    /// Quality for JPEG output and PDF page images (1-100).
    pub jpeg_quality: u32,
    pub filter: ResizeFilter,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: Quality::default().value(),
            filter: ResizeFilter::default(),
        }
    }
}

/// PDF layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocumentConfig {
    /// Page width in points; each page's height follows its image.
    pub page_width: f32,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            page_width: DEFAULT_PAGE_WIDTH,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel file-reading workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_threads: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_threads.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer that user overrides are merged on top of.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ResizeConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ResizeConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ResizeConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the file at `path`, falling back to stock defaults
/// when it does not exist.
pub fn load_config(path: &Path) -> Result<ResizeConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock config file with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# batch-resize configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Command-line flags (--size, --format, --quality, --output) override
# the values in this file. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Target size: "original" keeps native dimensions, "800x600" resizes to
# exactly 800x600 pixels. Each axis may be "original" on its own,
# e.g. "800xoriginal".
size = "original"

# Output format: png, jpeg, webp, or pdf. MIME types such as "image/png"
# and "application/pdf" are accepted too.
format = "png"

# Directory finished artifacts are written to.
directory = "."

# ---------------------------------------------------------------------------
# Encoding
# ---------------------------------------------------------------------------
[encoding]
# JPEG quality (1 = worst, 100 = best). Also used for PDF page images.
jpeg_quality = 92

# Resampling filter: nearest, triangle, catmull-rom, gaussian, lanczos3.
filter = "lanczos3"

# ---------------------------------------------------------------------------
# PDF documents
# ---------------------------------------------------------------------------
[document]
# Page width in points. Page height follows each image's aspect ratio.
page_width = 595.28

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel file-reading workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_threads = 4
"##
}
