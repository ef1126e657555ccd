//! # Batch Resize
//!
//! Resize and convert a batch of images into a single downloadable file.
//! One image produces one resized image; several produce a zip archive, or a
//! multi-page PDF when the target format is `pdf`.
//!
//! # Architecture: Ingest → Run → Publish
//!
//! ```text
//! 1. Ingest   files      →  BatchState        (images appended in order)
//! 2. Run      new images →  OutputArtifact    (convert each, then bundle)
//! 3. Publish  artifact   →  DownloadHandle    (delivered exactly once)
//! ```
//!
//! A batch grows across runs. Each run only converts the images added since
//! the previous successful run; the batch's high-water mark advances when the
//! whole run, bundling included, succeeds. A failed or cancelled run leaves
//! the batch exactly as it was.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`batch`] | Ordered image list plus the processed high-water mark |
//! | [`ingest`] | Path expansion, file reading, MIME filtering into the batch |
//! | [`convert`] | Per-image identify → resize → encode against a [`imaging::Rasterizer`] |
//! | [`bundle`] | One artifact per run: single file, zip archive, or PDF |
//! | [`publish`] | One-shot [`publish::DownloadHandle`] |
//! | [`process`] | Run scheduling, progress events, cancellation, [`process::Session`] |
//! | [`imaging`] | Rasterizer trait, `image` crate backend, size arithmetic |
//! | [`types`] | `TargetSize` and `OutputFormat` parsing |
//! | [`naming`] | Output filename derivation and collision handling |
//! | [`config`] | `batch-resize.toml` loading, merging, validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Exact Resizing
//!
//! A `WxH` target is honoured exactly, even when it changes the aspect ratio.
//! `original` keeps the native size, per axis, so `800xoriginal` stretches
//! width only.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, resampling and encoding use the `image` crate. Archives are
//! written with `zip` and documents with `lopdf`. No system libraries needed.

pub mod batch;
pub mod bundle;
pub mod config;
pub mod convert;
pub mod imaging;
pub mod ingest;
pub mod naming;
pub mod output;
pub mod process;
pub mod publish;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
