//! Ingest: turn selected files into [`SourceImage`]s appended to the batch.
//!
//! ## Input
//!
//! Callers hand over [`SourceFile`]s: a name, an optional declared MIME
//! type, and the file bytes. [`read_paths`] builds them from command-line
//! paths:
//!
//! ```text
//! photos/                  read_paths(["photos", "cover.png"])
//! ├── 001.jpg          →   001.jpg   image/jpeg
//! ├── 002.png          →   002.png   image/png
//! ├── notes.txt        →   notes.txt (skipped: not an image)
//! └── .DS_Store            (hidden, never listed)
//! cover.png            →   cover.png image/png
//! ```
//!
//! Directories expand recursively in file-name order. Bytes are read in
//! parallel with rayon, but the returned list keeps input order.
//!
//! ## Filtering
//!
//! Only `image/*` MIME types are accepted. A declared type wins; otherwise
//! the type comes from the file extension. Everything else is skipped
//! without error and reported in [`IngestReport::skipped`].
//!
//! ## Completion
//!
//! [`ingest`] returns only after every accepted file is in the batch, so a
//! run started afterwards always sees the whole selection.

use crate::batch::{BatchState, SourceImage};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// A selected file, before MIME filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    /// MIME type declared by whoever produced the file, if any.
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    /// A file whose MIME type will be sniffed from its name.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: None,
            bytes,
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    /// Effective MIME type: declared, else derived from the extension.
    pub fn effective_mime(&self) -> Option<String> {
        self.mime
            .clone()
            .or_else(|| mime_from_name(&self.name).map(str::to_string))
    }
}

/// Outcome of one ingest call, in input order.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub accepted: Vec<String>,
    pub skipped: Vec<String>,
}

/// MIME type for a file name, derived from its extension.
pub fn mime_from_name(name: &str) -> Option<&'static str> {
    let ext = Path::new(name).extension()?;
    image::ImageFormat::from_extension(ext).map(|format| format.to_mime_type())
}

pub fn is_image_mime(mime: &str) -> bool {
    mime.to_ascii_lowercase().starts_with("image/")
}

/// Append every image among `files` to `batch`, skipping the rest.
pub fn ingest(batch: &mut BatchState, files: Vec<SourceFile>) -> IngestReport {
    let mut report = IngestReport::default();

    for file in files {
        let mime = match file.effective_mime() {
            Some(mime) if is_image_mime(&mime) => mime,
            other => {
                debug!(name = %file.name, mime = ?other, "Skipping non-image file");
                report.skipped.push(file.name);
                continue;
            }
        };
        debug!(name = %file.name, %mime, bytes = file.bytes.len(), "Ingested image");
        report.accepted.push(file.name.clone());
        batch.push(SourceImage {
            name: file.name,
            mime,
            bytes: file.bytes,
        });
    }

    report
}

/// Expand directories into their files, recursively, in file-name order.
///
/// Hidden entries (leading `.`) inside directories are ignored. Paths given
/// explicitly are kept even if hidden.
pub fn collect_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, IngestError> {
    let mut paths = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            paths.push(input.clone());
            continue;
        }
        let walker = WalkDir::new(input)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));
        for entry in walker {
            let entry = entry.map_err(|source| IngestError::Walk {
                path: input.clone(),
                source,
            })?;
            if entry.file_type().is_file() {
                paths.push(entry.into_path());
            }
        }
    }
    Ok(paths)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

/// Read files from disk as [`SourceFile`]s, in input order.
///
/// Files whose extension maps to no image type are returned with empty bytes
/// rather than read; [`ingest`] skips them by MIME type anyway.
pub fn read_paths(inputs: &[PathBuf]) -> Result<Vec<SourceFile>, IngestError> {
    let paths = collect_paths(inputs)?;
    paths.par_iter().map(|path| read_source(path)).collect()
}

/// Report what [`read_paths`] followed by [`ingest`] would accept, without
/// reading any file contents.
pub fn check_paths(inputs: &[PathBuf]) -> Result<IngestReport, IngestError> {
    let files = collect_paths(inputs)?
        .iter()
        .map(|path| SourceFile::new(display_name(path), Vec::new()))
        .collect();
    Ok(ingest(&mut BatchState::new(), files))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

fn read_source(path: &Path) -> Result<SourceFile, IngestError> {
    let name = display_name(path);

    let mime = mime_from_name(&name);
    let bytes = match mime {
        Some(m) if is_image_mime(m) => std::fs::read(path).map_err(|source| IngestError::Io {
            path: path.to_path_buf(),
            source,
        })?,
        _ => Vec::new(),
    };

    Ok(SourceFile {
        name,
        mime: mime.map(str::to_string),
        bytes,
    })
}
