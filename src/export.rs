//! Segment export: slice the timeline, hand each slice to the encoding
//! collaborator, and persist the metadata batch.
//!
//! The metadata files are written only after every segment has been encoded,
//! so `split_timestamps.json` always reflects either a completed run or
//! nothing. Cancellation is honoured between (never during) segment writes;
//! already-exported files are left in place.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use crate::error::{Result, SplitError};
use crate::segment::{self, SegmentMetadata, TrackTitle};
use crate::split_points::SplitPointSet;
use crate::timeline::{AudioSlice, AudioTimeline};

/// Encodes one audio slice to a file. Implemented by the audio I/O
/// collaborator (e.g. [`crate::wav::WavEncoder`]); failures surface as
/// errors, never as silently dropped segments.
pub trait SliceEncoder {
    fn encode(&self, slice: &AudioSlice, path: &Path) -> std::result::Result<(), String>;

    /// File extension (without dot) of the encoded format
    fn extension(&self) -> &str;
}

/// Filenames of the two metadata outputs, written next to the segments
pub const METADATA_JSON: &str = "split_timestamps.json";
pub const METADATA_LOG: &str = "split_timestamps.txt";

/// Writes segment files plus a metadata batch into one output directory.
pub struct SegmentExporter<'a, E: SliceEncoder> {
    encoder: &'a E,
    output_dir: PathBuf,
}

impl<'a, E: SliceEncoder> SegmentExporter<'a, E> {
    pub fn new(encoder: &'a E, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            encoder,
            output_dir: output_dir.into(),
        }
    }

    /// Export every segment of the split set, then persist the metadata.
    ///
    /// `titles` supplies optional artist/title pairs per track (from an
    /// external tracklist); segments without one get a `track_NN` filename.
    /// The `cancel` flag is checked before each segment write.
    pub fn export_all(
        &self,
        timeline: &AudioTimeline,
        split_points: &SplitPointSet,
        titles: &[TrackTitle],
        cancel: &AtomicBool,
    ) -> Result<Vec<SegmentMetadata>> {
        fs::create_dir_all(&self.output_dir)?;

        let segments = segment::materialize(split_points);
        let total = segments.len();
        let mut metadata = Vec::with_capacity(total);

        for seg in &segments {
            if cancel.load(Ordering::Relaxed) {
                return Err(SplitError::Cancelled {
                    exported: seg.index,
                    total,
                });
            }

            let title = titles.get(seg.index);
            let filename = self.filename_for(seg.track(), title);
            let path = self.output_dir.join(&filename);

            let slice = timeline.slice(seg.start_ms, seg.end_ms);
            self.encoder
                .encode(&slice, &path)
                .map_err(|reason| SplitError::export(seg.track(), &path, reason))?;

            info!(
                track = seg.track(),
                start_ms = seg.start_ms,
                end_ms = seg.end_ms,
                file = %path.display(),
                "exported segment"
            );

            metadata.push(SegmentMetadata::new(seg, filename, title));
        }

        self.write_metadata(&metadata)?;
        Ok(metadata)
    }

    /// Persist the metadata batch as JSON and as a line-oriented log.
    /// Both derive solely from the completed segment list.
    pub fn write_metadata(&self, metadata: &[SegmentMetadata]) -> Result<()> {
        let json_path = self.output_dir.join(METADATA_JSON);
        let json = serde_json::to_string_pretty(metadata)?;
        fs::write(&json_path, json)?;

        let log_path = self.output_dir.join(METADATA_LOG);
        let mut log = String::new();
        for m in metadata {
            log.push_str(&m.log_line());
            log.push('\n');
        }
        fs::write(&log_path, log)?;

        debug!(
            segments = metadata.len(),
            json = %json_path.display(),
            "metadata batch written"
        );
        Ok(())
    }

    fn filename_for(&self, track: usize, title: Option<&TrackTitle>) -> String {
        let ext = self.encoder.extension();
        match title {
            Some(t) => {
                // Slashes in a tracklist name would escape the output directory
                let name = format!("{} - {}", t.artist.trim(), t.title.trim()).replace('/', "_");
                format!("{}.{}", name, ext)
            }
            None => format!("track_{:02}.{}", track, ext),
        }
    }
}
