//! Beat-gap splitting: split where consecutive beats are far enough apart.
//!
//! Beat timestamps come from an external beat tracker (see
//! [`crate::beat::BeatTracker`]); this detector only looks at the gaps.

use crate::config::BeatGapConfig;
use crate::error::Result;
use crate::split_points::SplitPointSet;

/// Emit a split point at every beat whose distance from the previous beat is
/// at least `min_gap_sec`, plus the timeline boundaries.
///
/// `beat_times_sec` must be strictly increasing (the beat tracker's output
/// contract). With `min_gap_sec = 0` every beat-to-beat transition becomes a
/// split point; callers choosing that accept over-segmentation. Times are
/// truncated, not rounded, when converted to milliseconds. An empty beat
/// list yields the whole-timeline set.
pub fn detect(
    beat_times_sec: &[f64],
    duration_sec: f64,
    config: &BeatGapConfig,
) -> Result<SplitPointSet> {
    config.validate()?;

    let duration_ms = (duration_sec * 1000.0) as u64;
    if duration_ms == 0 || beat_times_sec.is_empty() {
        return Ok(SplitPointSet::whole(duration_ms));
    }

    let mut points = vec![0u64];
    for pair in beat_times_sec.windows(2) {
        if pair[1] - pair[0] >= config.min_gap_sec {
            let ms = (pair[1] * 1000.0) as u64;
            // Guard against sub-millisecond beats collapsing after truncation
            if ms > *points.last().unwrap() && ms < duration_ms {
                points.push(ms);
            }
        }
    }

    if duration_ms > *points.last().unwrap() {
        points.push(duration_ms);
    }

    Ok(SplitPointSet::from_millis(points))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(min_gap_sec: f64) -> BeatGapConfig {
        BeatGapConfig { min_gap_sec }
    }

    #[test]
    fn test_reference_scenario() {
        // Beats [0.5, 1.0, 3.5, 4.0]s, duration 5.0s, min gap 2.0s:
        // only the 1.0 -> 3.5 gap qualifies.
        let set = detect(&[0.5, 1.0, 3.5, 4.0], 5.0, &config(2.0)).unwrap();
        assert_eq!(set.points(), &[0, 3500, 5000]);
    }

    #[test]
    fn test_zero_min_gap_splits_at_every_beat_transition() {
        let set = detect(&[1.0, 2.0, 3.0], 5.0, &config(0.0)).unwrap();
        // Every later beat of a consecutive pair becomes a split point
        assert_eq!(set.points(), &[0, 2000, 3000, 5000]);
    }

    #[test]
    fn test_empty_beat_list_degenerates_to_whole_timeline() {
        let set = detect(&[], 5.0, &config(2.0)).unwrap();
        assert_eq!(set.points(), &[0, 5000]);
    }

    #[test]
    fn test_no_gap_large_enough() {
        let set = detect(&[1.0, 1.4, 1.8, 2.2], 5.0, &config(2.0)).unwrap();
        assert_eq!(set.points(), &[0, 5000]);
    }

    #[test]
    fn test_truncation_not_rounding() {
        // 2.9996s truncates to 2999ms
        let set = detect(&[0.5, 2.9996], 5.0, &config(2.0)).unwrap();
        assert_eq!(set.points(), &[0, 2999, 5000]);
    }

    #[test]
    fn test_beat_at_timeline_end_not_duplicated() {
        let set = detect(&[1.0, 5.0], 5.0, &config(2.0)).unwrap();
        assert_eq!(set.points(), &[0, 5000]);
    }

    #[test]
    fn test_negative_min_gap_rejected() {
        assert!(detect(&[1.0, 2.0], 5.0, &config(-1.0)).is_err());
    }

    #[test]
    fn test_zero_duration() {
        let set = detect(&[0.1, 0.2], 0.0, &config(0.0)).unwrap();
        assert_eq!(set.points(), &[0]);
    }
}
