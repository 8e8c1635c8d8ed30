//! Error types for the segmentation engine and its collaborators.
//!
//! Invalid configuration is rejected before any processing starts. Degenerate
//! inputs (empty timeline, empty beat list, onset curve shorter than one
//! window) are *not* errors: detectors return the whole-timeline split set
//! instead. Collaborator failures carry enough context (track number, stage)
//! to log and abort the batch.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SplitError {
    /// Rejected before any processing; no partial output is produced.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to decode '{path}': {reason}")]
    Decode { path: PathBuf, reason: String },

    /// Encoding a single segment failed. Previously exported segments are
    /// left in place; the metadata files are withheld.
    #[error("Failed to export track {track} to '{path}': {reason}")]
    Export {
        track: usize,
        path: PathBuf,
        reason: String,
    },

    /// The tempo estimation collaborator failed for one analysis window.
    #[error("Tempo estimation failed for window {window_index}: {reason}")]
    TempoEstimation { window_index: usize, reason: String },

    /// The caller's cancellation flag was set between segment exports.
    #[error("Export cancelled after {exported} of {total} segments")]
    Cancelled { exported: usize, total: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Metadata serialization error: {0}")]
    Metadata(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SplitError>;

impl SplitError {
    pub fn decode(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        SplitError::Decode {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn export(track: usize, path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        SplitError::Export {
            track,
            path: path.into(),
            reason: reason.into(),
        }
    }
}
