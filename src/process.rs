//! Run scheduling: convert the new slice of the batch into one artifact.
//!
//! ## Incremental Runs
//!
//! A run only converts images ingested since the last *successful* run:
//!
//! ```text
//! ingest a, b, c      images = [a b c]      processed = 0
//! run                 converts a b c  →  resized_images.zip, processed = 3
//! run                 NoNewImages            processed = 3
//! ingest d            images = [a b c d]
//! run                 converts d      →  resized_d.png, processed = 4
//! ```
//!
//! The high-water mark moves only after the artifact is built. A decode or
//! encode failure, a bundling failure, or a cancellation aborts the run with
//! nothing committed, so retrying converts the same slice again.
//!
//! ## Ordering
//!
//! Images convert one at a time, in batch order, and land in the bundle in
//! that order. Progress events go to an optional channel, the same way the
//! CLI's printer thread consumes them.

use crate::batch::BatchState;
use crate::bundle::{self, BundleError, OutputArtifact};
use crate::convert::{self, ConversionOptions};
use crate::imaging::{BackendError, ImageRasterizer, Rasterizer, progress_percent};
use crate::ingest::{self, IngestReport, SourceFile};
use crate::publish::{self, DownloadHandle};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{info, warn};

/// Default document page width in points (A4 width).
pub const DEFAULT_PAGE_WIDTH: f32 = 595.28;

#[derive(Error, Debug)]
pub enum RunError {
    #[error("No images to process. Add some images first.")]
    EmptyBatch,
    #[error("No new images since the last run. Add more images first.")]
    NoNewImages,
    #[error("Run cancelled after {converted} of {total} images")]
    Cancelled { converted: usize, total: usize },
    #[error("Failed to convert {name}: {source}")]
    Conversion {
        name: String,
        #[source]
        source: BackendError,
    },
    #[error("Failed to bundle output: {0}")]
    Bundle(#[from] BundleError),
}

impl RunError {
    /// Notices about the batch itself, as opposed to failures during a run.
    pub fn is_notice(&self) -> bool {
        matches!(self, RunError::EmptyBatch | RunError::NoNewImages)
    }
}

/// Progress of a run, in the order events are sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    Started {
        total: usize,
        size: String,
        format: String,
    },
    /// Sent before an image converts. `percent` counts finished images.
    ImageStarted {
        index: usize,
        total: usize,
        name: String,
        percent: u8,
    },
    ImageConverted {
        index: usize,
        name: String,
        output: String,
        width: u32,
        height: u32,
        bytes: usize,
    },
    Completed {
        filename: String,
        images: usize,
        bytes: usize,
        percent: u8,
    },
}

/// Cooperative cancellation, checked before each image.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

fn emit(events: Option<&Sender<RunEvent>>, event: RunEvent) {
    if let Some(tx) = events {
        // A dropped receiver only means nobody is watching.
        let _ = tx.send(event);
    }
}

/// Convert the batch's new images into one artifact and commit on success.
pub fn run_conversion(
    backend: &impl Rasterizer,
    batch: &mut BatchState,
    opts: &ConversionOptions,
    page_width: f32,
    events: Option<&Sender<RunEvent>>,
    cancel: Option<&CancelToken>,
) -> Result<OutputArtifact, RunError> {
    if batch.is_empty() {
        return Err(RunError::EmptyBatch);
    }
    let new_images = batch.new_images();
    if new_images.is_empty() {
        return Err(RunError::NoNewImages);
    }

    let total = new_images.len();
    info!(total, size = %opts.size, format = %opts.format, "Starting run");
    emit(
        events,
        RunEvent::Started {
            total,
            size: opts.size.to_string(),
            format: opts.format.to_string(),
        },
    );

    let mut results = Vec::with_capacity(total);
    for (i, image) in new_images.iter().enumerate() {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            warn!(converted = i, total, "Run cancelled");
            return Err(RunError::Cancelled {
                converted: i,
                total,
            });
        }
        emit(
            events,
            RunEvent::ImageStarted {
                index: i + 1,
                total,
                name: image.name.clone(),
                percent: progress_percent(i, total),
            },
        );

        let result =
            convert::convert(backend, image, opts).map_err(|source| RunError::Conversion {
                name: image.name.clone(),
                source,
            })?;

        emit(
            events,
            RunEvent::ImageConverted {
                index: i + 1,
                name: image.name.clone(),
                output: result.filename.clone(),
                width: result.dimensions.width,
                height: result.dimensions.height,
                bytes: result.bytes.len(),
            },
        );
        results.push(result);
    }

    let artifact = bundle::bundle(results, opts.format, page_width)?;
    batch.commit();

    info!(filename = %artifact.filename, bytes = artifact.bytes.len(), "Run complete");
    emit(
        events,
        RunEvent::Completed {
            filename: artifact.filename.clone(),
            images: total,
            bytes: artifact.bytes.len(),
            percent: 100,
        },
    );
    Ok(artifact)
}

/// Counts describing a session's batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStatus {
    pub total: usize,
    pub processed: usize,
    pub pending: usize,
    /// Whether an undelivered artifact is waiting.
    pub has_output: bool,
}

/// Owns the batch and the latest undelivered output for one user session.
///
/// All mutation goes through `&mut self`, so ingest and runs never overlap.
pub struct Session<B: Rasterizer = ImageRasterizer> {
    backend: B,
    batch: BatchState,
    page_width: f32,
    output: Option<DownloadHandle>,
}

impl Session<ImageRasterizer> {
    pub fn new(page_width: f32) -> Self {
        Self::with_backend(ImageRasterizer::new(), page_width)
    }
}

impl<B: Rasterizer> Session<B> {
    pub fn with_backend(backend: B, page_width: f32) -> Self {
        Self {
            backend,
            batch: BatchState::new(),
            page_width,
            output: None,
        }
    }

    pub fn batch(&self) -> &BatchState {
        &self.batch
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Add files to the batch. Any undelivered output from an earlier run
    /// is discarded, since the batch it described has changed.
    pub fn ingest(&mut self, files: Vec<SourceFile>) -> IngestReport {
        if let Some(stale) = self.output.take().filter(|h| !h.is_released()) {
            warn!(filename = stale.filename(), "Discarding undelivered output");
        }
        ingest::ingest(&mut self.batch, files)
    }

    /// Run the pipeline over new images and keep the result for delivery.
    pub fn run(
        &mut self,
        opts: &ConversionOptions,
        events: Option<&Sender<RunEvent>>,
        cancel: Option<&CancelToken>,
    ) -> Result<&mut DownloadHandle, RunError> {
        let artifact = run_conversion(
            &self.backend,
            &mut self.batch,
            opts,
            self.page_width,
            events,
            cancel,
        )?;
        Ok(self.output.insert(publish::publish(artifact)))
    }

    /// The latest run's output, if it has not been discarded.
    pub fn output_mut(&mut self) -> Option<&mut DownloadHandle> {
        self.output.as_mut()
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            total: self.batch.len(),
            processed: self.batch.processed_count(),
            pending: self.batch.new_images().len(),
            has_output: self.output.as_ref().is_some_and(|h| !h.is_released()),
        }
    }
}
