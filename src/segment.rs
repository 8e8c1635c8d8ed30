//! Segment ranges and the metadata records written alongside exported tracks.

use serde::{Deserialize, Serialize};

use crate::split_points::SplitPointSet;

/// A half-open `[start_ms, end_ms)` range of the timeline.
///
/// Non-owning: holds offsets only, the audio stays in the caller's
/// `AudioTimeline`. The segment list for a timeline always partitions
/// `[0, duration_ms)` with no gaps or overlaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// 0-based position in the segment list
    pub index: usize,
    pub start_ms: u64,
    pub end_ms: u64,
}

impl Segment {
    /// 1-based track number used for filenames and metadata
    pub fn track(&self) -> usize {
        self.index + 1
    }

    pub fn duration_ms(&self) -> u64 {
        self.end_ms - self.start_ms
    }
}

/// Convert an ordered split-point set into concrete segment ranges.
///
/// A set of k points always yields exactly k-1 contiguous, ordered segments.
pub fn materialize(split_points: &SplitPointSet) -> Vec<Segment> {
    split_points.segments()
}

/// Optional artist/title supplied by an external naming collaborator
/// (e.g. a hand-maintained tracklist for the mix).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackTitle {
    pub artist: String,
    pub title: String,
}

/// Metadata record for one exported segment. Created once per segment,
/// immutable after creation, persisted as a batch by the exporter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentMetadata {
    /// 1-based track number
    pub track: usize,
    pub filename: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    pub start_sec: u64,
    pub end_sec: u64,
    pub duration_sec: u64,
}

impl SegmentMetadata {
    /// Build the metadata record for a segment.
    ///
    /// Times are whole seconds, floored from the millisecond offsets. The
    /// duration is floored from the millisecond difference, so it can differ
    /// from `end_sec - start_sec` by one.
    pub fn new(segment: &Segment, filename: String, title: Option<&TrackTitle>) -> Self {
        Self {
            track: segment.track(),
            filename,
            artist: title.map(|t| t.artist.clone()),
            title: title.map(|t| t.title.clone()),
            start_sec: segment.start_ms / 1000,
            end_sec: segment.end_ms / 1000,
            duration_sec: segment.duration_ms() / 1000,
        }
    }

    /// One human-readable line for the text log
    pub fn log_line(&self) -> String {
        match (&self.artist, &self.title) {
            (Some(artist), Some(title)) => format!(
                "{:02}. {} - {} ({}s -> {}s)",
                self.track, artist, title, self.start_sec, self.end_sec
            ),
            _ => format!(
                "Track {:02}: {}s -> {}s ({}s)",
                self.track, self.start_sec, self.end_sec, self.duration_sec
            ),
        }
    }
}
