//! Publishing: hand the run's artifact to the user exactly once.
//!
//! A [`DownloadHandle`] owns the artifact bytes until the first successful
//! [`deliver`](DownloadHandle::deliver), which writes them out and releases
//! them. Later deliveries fail with [`PublishError::Released`]. A handle
//! that is never delivered is simply dropped with its bytes.

use crate::bundle::OutputArtifact;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Artifact was already delivered")]
    Released,
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One-shot access to a run's output.
#[derive(Debug)]
pub struct DownloadHandle {
    filename: String,
    len: usize,
    artifact: Option<OutputArtifact>,
}

/// Wrap an artifact for a single delivery.
pub fn publish(artifact: OutputArtifact) -> DownloadHandle {
    DownloadHandle {
        filename: artifact.filename.clone(),
        len: artifact.bytes.len(),
        artifact: Some(artifact),
    }
}

impl DownloadHandle {
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Size of the artifact in bytes (kept after release, for reporting).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_released(&self) -> bool {
        self.artifact.is_none()
    }

    /// Write the artifact to `dir/<filename>` and release it.
    ///
    /// On a write failure the artifact is kept so delivery can be retried.
    pub fn deliver(&mut self, dir: &Path) -> Result<PathBuf, PublishError> {
        let artifact = self.artifact.as_ref().ok_or(PublishError::Released)?;
        let path = dir.join(&artifact.filename);

        fs::create_dir_all(dir)
            .and_then(|_| fs::write(&path, &artifact.bytes))
            .map_err(|source| PublishError::Io {
                path: path.clone(),
                source,
            })?;

        self.artifact = None;
        info!(path = %path.display(), bytes = self.len, "Delivered artifact");
        Ok(path)
    }

    /// Take the artifact out of the handle, releasing it without writing.
    pub fn take(&mut self) -> Result<OutputArtifact, PublishError> {
        self.artifact.take().ok_or(PublishError::Released)
    }
}
