pub mod beat;
pub mod config;
pub mod decibel;
pub mod decode;
pub mod detectors;
pub mod error;
pub mod export;
pub mod loudness;
pub mod segment;
pub mod split_points;
pub mod timeline;
pub mod wav;

pub use config::{BeatGapConfig, Defaults, SilenceConfig, TempoChangeConfig, DEFAULT_HOP_LENGTH};
pub use error::{Result, SplitError};
pub use export::{SegmentExporter, SliceEncoder};
pub use loudness::{LoudnessCurve, LoudnessSample};
pub use segment::{Segment, SegmentMetadata, TrackTitle};
pub use split_points::{clean, SplitPointSet};
pub use timeline::{AudioSlice, AudioTimeline, SampleFormat};
pub use wav::WavEncoder;
