//! Loudness profiling: reduces a decoded timeline to a uniform dBFS curve.
//!
//! The curve is what the silence detector scans. One sample per window, in
//! ascending time order, always finite (digital silence is substituted with
//! the -90 dB floor).

use crate::decibel;
use crate::error::{Result, SplitError};
use crate::timeline::AudioTimeline;

/// One windowed loudness measurement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoudnessSample {
    /// Start of the window, milliseconds into the timeline
    pub offset_ms: u64,
    /// dBFS loudness of the window, never NaN or infinite
    pub db: f64,
}

/// A uniform time series of windowed loudness values.
///
/// Offsets are strictly increasing with step size `window_ms`; the final
/// window may cover less audio but still occupies a full step on the grid.
#[derive(Debug, Clone)]
pub struct LoudnessCurve {
    window_ms: u64,
    samples: Vec<LoudnessSample>,
}

impl LoudnessCurve {
    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    pub fn samples(&self) -> &[LoudnessSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Build a curve directly from dB values on a uniform grid.
    /// Non-finite values are clamped to the silence floor.
    pub fn from_db_values(window_ms: u64, values: &[f64]) -> Self {
        let samples = values
            .iter()
            .enumerate()
            .map(|(i, &db)| LoudnessSample {
                offset_ms: i as u64 * window_ms,
                db: if db.is_finite() {
                    db
                } else {
                    decibel::SILENCE_FLOOR_DB
                },
            })
            .collect();
        Self { window_ms, samples }
    }
}

/// Compute the loudness curve of a timeline with non-overlapping windows of
/// `window_ms`.
///
/// The final window may be shorter than `window_ms`. An empty timeline
/// produces an empty curve rather than an error, so downstream detection
/// degrades to a single whole-timeline segment.
pub fn profile(timeline: &AudioTimeline, window_ms: u64) -> Result<LoudnessCurve> {
    if window_ms == 0 {
        return Err(SplitError::InvalidConfig(
            "loudness window must be positive".to_string(),
        ));
    }

    let duration_ms = timeline.duration_ms();
    if duration_ms == 0 {
        return Ok(LoudnessCurve {
            window_ms,
            samples: Vec::new(),
        });
    }

    if window_ms > duration_ms {
        return Err(SplitError::InvalidConfig(format!(
            "loudness window ({} ms) exceeds timeline duration ({} ms)",
            window_ms, duration_ms
        )));
    }

    let mut samples = Vec::with_capacity((duration_ms / window_ms + 1) as usize);
    let mut offset = 0u64;
    while offset < duration_ms {
        let slice = timeline.slice(offset, offset + window_ms);
        samples.push(LoudnessSample {
            offset_ms: offset,
            db: decibel::slice_dbfs(&slice),
        });
        offset += window_ms;
    }

    Ok(LoudnessCurve { window_ms, samples })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decibel::SILENCE_FLOOR_DB;
    use crate::timeline::SampleFormat;

    fn timeline_ms(ms: u64) -> AudioTimeline {
        // 1 kHz sample rate: 1 sample per millisecond
        AudioTimeline::new(vec![vec![0i32; ms as usize]], 1000, SampleFormat::S16)
    }

    #[test]
    fn test_window_count_and_offsets() {
        let t = timeline_ms(1000);
        let curve = profile(&t, 100).unwrap();
        assert_eq!(curve.len(), 10);
        for (i, s) in curve.samples().iter().enumerate() {
            assert_eq!(s.offset_ms, i as u64 * 100);
        }
    }

    #[test]
    fn test_final_short_window() {
        // 1050ms with 100ms windows: 10 full + 1 short = 11 samples
        let t = timeline_ms(1050);
        let curve = profile(&t, 100).unwrap();
        assert_eq!(curve.len(), 11);
        assert_eq!(curve.samples().last().unwrap().offset_ms, 1000);
    }

    #[test]
    fn test_silence_floor_substituted() {
        let t = timeline_ms(500);
        let curve = profile(&t, 100).unwrap();
        for s in curve.samples() {
            assert_eq!(s.db, SILENCE_FLOOR_DB);
            assert!(s.db.is_finite());
        }
    }

    #[test]
    fn test_loud_and_quiet_windows() {
        // First 500ms at half scale, rest silent
        let mut samples = vec![16384i32; 500];
        samples.extend(vec![0i32; 500]);
        let t = AudioTimeline::new(vec![samples], 1000, SampleFormat::S16);

        let curve = profile(&t, 100).unwrap();
        assert_eq!(curve.len(), 10);
        assert!((curve.samples()[0].db - (-6.02)).abs() < 0.1);
        assert_eq!(curve.samples()[9].db, SILENCE_FLOOR_DB);
    }

    #[test]
    fn test_invalid_window() {
        let t = timeline_ms(1000);
        assert!(matches!(
            profile(&t, 0),
            Err(crate::error::SplitError::InvalidConfig(_))
        ));
        assert!(matches!(
            profile(&t, 2000),
            Err(crate::error::SplitError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_empty_timeline_gives_empty_curve() {
        let t = timeline_ms(0);
        let curve = profile(&t, 100).unwrap();
        assert!(curve.is_empty());
    }

    #[test]
    fn test_from_db_values_clamps_non_finite() {
        let curve = LoudnessCurve::from_db_values(100, &[-10.0, f64::NEG_INFINITY, f64::NAN]);
        assert_eq!(curve.samples()[0].db, -10.0);
        assert_eq!(curve.samples()[1].db, SILENCE_FLOOR_DB);
        assert_eq!(curve.samples()[2].db, SILENCE_FLOOR_DB);
        assert_eq!(curve.samples()[2].offset_ms, 200);
    }
}
