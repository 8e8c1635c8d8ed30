//! Silence-run detection: split where the loudness curve stays below a fixed
//! threshold for long enough.

use tracing::debug;

use crate::config::SilenceConfig;
use crate::detectors::RunScanner;
use crate::error::Result;
use crate::loudness::{self, LoudnessCurve};
use crate::split_points::{self, SplitPointSet};
use crate::timeline::AudioTimeline;

/// Scan a loudness curve for contiguous runs below `threshold_db` lasting at
/// least `min_pause_ms` and return the raw candidate offsets.
///
/// The raw list may contain close-together points (a very long pause emits
/// one candidate every `min_pause_ms`); spacing is the cleaner's concern.
/// Deterministic: same curve and parameters, same output.
pub fn detect_raw(curve: &LoudnessCurve, threshold_db: f64, min_pause_ms: u64) -> Vec<u64> {
    let scanner = RunScanner {
        threshold: threshold_db,
        min_run_ms: min_pause_ms,
    };
    scanner.scan(
        curve.samples().iter().map(|s| (s.offset_ms, s.db)),
        curve.window_ms(),
    )
}

/// Full silence-based segmentation of a timeline: profile the loudness,
/// detect silence runs, then clean the candidates.
pub fn split_on_silence(timeline: &AudioTimeline, config: &SilenceConfig) -> Result<SplitPointSet> {
    config.validate()?;

    let duration_ms = timeline.duration_ms();
    if duration_ms == 0 {
        return Ok(SplitPointSet::whole(0));
    }

    let curve = loudness::profile(timeline, config.window_ms)?;
    let raw = detect_raw(&curve, config.threshold_db, config.min_pause_ms);
    debug!(
        candidates = raw.len(),
        windows = curve.len(),
        "silence scan complete"
    );

    Ok(split_points::clean(&raw, duration_ms, config.min_segment_ms))
}
