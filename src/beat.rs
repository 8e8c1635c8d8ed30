//! Collaborator seams for beat tracking and onset analysis.
//!
//! The segmentation engine never analyzes beats or onsets itself; it consumes
//! the output of an external beat-tracking library through these traits. The
//! frame/time conversion helper is the one piece small enough to live here.

/// Estimates a single dominant tempo (BPM) for an onset-strength sub-curve.
///
/// Used by the tempo-change detector once per analysis window. Errors are
/// plain strings; the detector wraps them with window context.
pub trait TempoEstimator {
    fn estimate_tempo(
        &self,
        onset_env: &[f32],
        sample_rate: u32,
        hop_length: usize,
    ) -> Result<f64, String>;
}

/// Full beat tracking over a decoded signal: overall tempo estimate plus the
/// frame index of every detected beat.
pub trait BeatTracker {
    fn beat_track(&self, samples: &[f32], sample_rate: u32) -> Result<(f64, Vec<usize>), String>;
}

/// Produces a uniformly sampled onset-strength curve from a decoded signal.
pub trait OnsetDetector {
    fn onset_strength(
        &self,
        samples: &[f32],
        sample_rate: u32,
        hop_length: usize,
    ) -> Result<Vec<f32>, String>;
}

/// Convert frame indices to timestamps in seconds.
pub fn frames_to_time(frames: &[usize], sample_rate: u32, hop_length: usize) -> Vec<f64> {
    frames
        .iter()
        .map(|&f| frame_to_time(f, sample_rate, hop_length))
        .collect()
}

/// Timestamp in seconds of a single frame index.
pub fn frame_to_time(frame: usize, sample_rate: u32, hop_length: usize) -> f64 {
    (frame * hop_length) as f64 / sample_rate as f64
}
