//! Tempo-change detection: split where the dominant tempo shifts between
//! adjacent analysis windows.
//!
//! The onset-strength curve is windowed, each window gets a BPM estimate from
//! the external tempo collaborator, the estimates are median-filtered to
//! suppress single-window outliers, and splits are emitted at large tempo
//! deltas subject to a minimum segment duration.

use tracing::debug;

use crate::beat::{frame_to_time, TempoEstimator};
use crate::config::TempoChangeConfig;
use crate::error::{Result, SplitError};
use crate::split_points::{SpacingGate, SplitPointSet};

/// Windows shorter than this many hops are discarded rather than producing
/// an unreliable tempo estimate.
const MIN_VIABLE_HOPS: usize = 10;

/// Detect tempo-change split points over an onset-strength curve.
///
/// The timeline duration is derived from the curve itself
/// (`len * hop_length / sample_rate`). Curves shorter than one analysis
/// window degrade to the whole-timeline set.
pub fn detect(
    onset_env: &[f32],
    sample_rate: u32,
    hop_length: usize,
    config: &TempoChangeConfig,
    estimator: &dyn TempoEstimator,
) -> Result<SplitPointSet> {
    config.validate()?;
    if sample_rate == 0 {
        return Err(SplitError::InvalidConfig(
            "sample rate must be positive".to_string(),
        ));
    }
    if hop_length == 0 {
        return Err(SplitError::InvalidConfig(
            "hop length must be positive".to_string(),
        ));
    }

    let duration_sec = frame_to_time(onset_env.len(), sample_rate, hop_length);
    let duration_ms = (duration_sec * 1000.0) as u64;

    let window_hops = (config.window_seconds * sample_rate as f64 / hop_length as f64) as usize;
    if window_hops == 0 {
        return Err(SplitError::InvalidConfig(format!(
            "analysis window of {}s is shorter than one hop",
            config.window_seconds
        )));
    }

    // Per-window tempo estimates
    let mut tempos = Vec::new();
    let mut times = Vec::new();
    let mut window_index = 0usize;
    let mut i = 0usize;
    while i + window_hops < onset_env.len() {
        let segment = &onset_env[i..i + window_hops];
        if segment.len() >= MIN_VIABLE_HOPS {
            let bpm = estimator
                .estimate_tempo(segment, sample_rate, hop_length)
                .map_err(|reason| SplitError::TempoEstimation {
                    window_index,
                    reason,
                })?;
            tempos.push(bpm);
            times.push(frame_to_time(i, sample_rate, hop_length));
        }
        window_index += 1;
        i += window_hops;
    }

    if tempos.len() < 2 {
        debug!(windows = tempos.len(), "too few tempo windows, no structure");
        return Ok(SplitPointSet::whole(duration_ms));
    }

    let smoothed = median_filter3(&tempos);

    // Emission with inline spacing against the last emitted point
    let min_segment_ms = (config.min_segment_seconds * 1000.0) as u64;
    let mut gate = SpacingGate::more_than(min_segment_ms);
    let mut points = vec![0u64];

    for i in 1..smoothed.len() {
        let delta = (smoothed[i] - smoothed[i - 1]).abs();
        if delta >= config.tempo_delta_threshold {
            let candidate_ms = (times[i] * 1000.0) as u64;
            if candidate_ms < duration_ms && gate.admit(candidate_ms) {
                points.push(candidate_ms);
            }
        }
    }

    if duration_ms > *points.last().unwrap() {
        points.push(duration_ms);
    }

    debug!(
        windows = tempos.len(),
        splits = points.len().saturating_sub(2),
        "tempo scan complete"
    );

    Ok(SplitPointSet::from_millis(points))
}

/// Median filter with window size 3; edge values are replicated so the
/// endpoints pass through unchanged.
///
/// This is the only smoothing stage in the engine. Per-window tempo
/// estimates are noisy at short window lengths, and a single-window outlier
/// would otherwise fabricate two spurious tempo deltas.
pub fn median_filter3(values: &[f64]) -> Vec<f64> {
    if values.len() < 3 {
        return values.to_vec();
    }

    let mut out = Vec::with_capacity(values.len());
    out.push(values[0]);
    for w in values.windows(3) {
        out.push(median_of3(w[0], w[1], w[2]));
    }
    out.push(values[values.len() - 1]);
    out
}

fn median_of3(a: f64, b: f64, c: f64) -> f64 {
    a.max(b).min(a.min(b).max(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Plays back a pre-seeded tempo per analysis window.
    struct ScriptedEstimator {
        tempos: Vec<f64>,
        next: std::cell::Cell<usize>,
    }

    impl ScriptedEstimator {
        fn new(tempos: &[f64]) -> Self {
            Self {
                tempos: tempos.to_vec(),
                next: std::cell::Cell::new(0),
            }
        }
    }

    impl TempoEstimator for ScriptedEstimator {
        fn estimate_tempo(
            &self,
            _env: &[f32],
            _sr: u32,
            _hop: usize,
        ) -> std::result::Result<f64, String> {
            let i = self.next.get();
            self.next.set(i + 1);
            self.tempos
                .get(i)
                .copied()
                .ok_or_else(|| "ran out of scripted tempos".to_string())
        }
    }

    struct FailingEstimator;

    impl TempoEstimator for FailingEstimator {
        fn estimate_tempo(
            &self,
            _env: &[f32],
            _sr: u32,
            _hop: usize,
        ) -> std::result::Result<f64, String> {
            Err("backend unavailable".to_string())
        }
    }

    // sr=100, hop=10, window_seconds=1.0 -> 10 hops per window, 0.1s per hop.
    // An env of n*10 + 1 hops produces n windows at 0s, 1s, 2s, ...
    fn env_for_windows(n: usize) -> Vec<f32> {
        vec![0.0; n * 10 + 1]
    }

    fn config(delta: f64, min_segment_sec: f64) -> TempoChangeConfig {
        TempoChangeConfig {
            window_seconds: 1.0,
            tempo_delta_threshold: delta,
            min_segment_seconds: min_segment_sec,
        }
    }

    #[test]
    fn test_median_filter3_suppresses_isolated_outlier() {
        let smoothed = median_filter3(&[120.0, 120.0, 180.0, 120.0, 120.0]);
        assert_eq!(smoothed, vec![120.0; 5]);
    }

    #[test]
    fn test_median_filter3_preserves_sustained_change() {
        let smoothed = median_filter3(&[120.0, 120.0, 90.0, 90.0, 90.0]);
        assert_eq!(smoothed, vec![120.0, 120.0, 90.0, 90.0, 90.0]);
    }

    #[test]
    fn test_median_filter3_short_input_passthrough() {
        assert_eq!(median_filter3(&[100.0, 200.0]), vec![100.0, 200.0]);
        assert_eq!(median_filter3(&[]), Vec::<f64>::new());
    }

    #[test]
    fn test_outlier_produces_no_split() {
        // One isolated single-window outlier is fully suppressed
        let est = ScriptedEstimator::new(&[120.0, 120.0, 180.0, 120.0, 120.0, 120.0]);
        let env = env_for_windows(6);
        let set = detect(&env, 100, 10, &config(10.0, 1.0), &est).unwrap();
        // duration = 6.1s
        assert_eq!(set.points(), &[0, 6100]);
    }

    #[test]
    fn test_sustained_tempo_change_splits() {
        let est = ScriptedEstimator::new(&[120.0, 120.0, 120.0, 90.0, 90.0, 90.0]);
        let env = env_for_windows(6);
        let set = detect(&env, 100, 10, &config(10.0, 1.0), &est).unwrap();
        assert_eq!(set.points(), &[0, 3000, 6100]);
    }

    #[test]
    fn test_min_segment_suppresses_close_splits() {
        // Two tempo steps 1s apart; the second is within min_segment_seconds
        // of the first emitted split and must be dropped
        let est = ScriptedEstimator::new(&[120.0, 120.0, 90.0, 90.0, 60.0, 60.0, 60.0]);
        let env = env_for_windows(7);
        let set = detect(&env, 100, 10, &config(10.0, 3.0), &est).unwrap();
        // The 2s step is only 2s past the start and is dropped; the 4s step
        // passes the 3s minimum.
        assert_eq!(set.points(), &[0, 4000, 7100]);
    }

    #[test]
    fn test_spacing_references_last_emitted_point() {
        // Tempo steps at 2s, 4s and 6s with a 3s minimum. The 2s step is too
        // close to the start; the 4s step is emitted; the 6s step is only 2s
        // past the *emitted* 4s split and is suppressed, even though it lies
        // 6s past the start.
        let est = ScriptedEstimator::new(&[
            120.0, 120.0, 90.0, 90.0, 60.0, 60.0, 30.0, 30.0, 30.0,
        ]);
        let env = env_for_windows(9);
        let set = detect(&env, 100, 10, &config(10.0, 3.0), &est).unwrap();
        assert_eq!(set.points(), &[0, 4000, 9100]);
    }

    #[test]
    fn test_curve_shorter_than_window_degenerates() {
        let est = ScriptedEstimator::new(&[]);
        // 5 hops < one 10-hop window: duration 0.5s
        let set = detect(&vec![0.0; 5], 100, 10, &config(10.0, 1.0), &est).unwrap();
        assert_eq!(set.points(), &[0, 500]);
    }

    #[test]
    fn test_estimator_failure_carries_window_context() {
        let env = env_for_windows(4);
        let err = detect(&env, 100, 10, &config(10.0, 1.0), &FailingEstimator).unwrap_err();
        match err {
            SplitError::TempoEstimation {
                window_index,
                reason,
            } => {
                assert_eq!(window_index, 0);
                assert!(reason.contains("backend unavailable"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let est = ScriptedEstimator::new(&[]);
        let env = env_for_windows(4);
        assert!(detect(&env, 0, 10, &config(10.0, 1.0), &est).is_err());
        assert!(detect(&env, 100, 0, &config(10.0, 1.0), &est).is_err());

        let bad = TempoChangeConfig {
            window_seconds: 0.0,
            ..config(10.0, 1.0)
        };
        assert!(detect(&env, 100, 10, &bad, &est).is_err());
    }
}
