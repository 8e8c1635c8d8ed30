//! Split point post-processing shared by the detection strategies.
//!
//! Every detector ends up here one way or another: silence and beat-derived
//! candidates go through [`clean`], while the tempo-change detector applies
//! the same minimum-spacing policy at emission time through a [`SpacingGate`].

use crate::segment::Segment;

/// Minimum-spacing policy over an ascending stream of candidate points.
///
/// Tracks the last admitted point (starting from an implicit point at 0) and
/// admits a candidate only when it is far enough past it. The two detection
/// families differ only in the comparison: the post-hoc cleaner keeps points
/// *at least* `min_gap_ms` apart, the tempo detector requires *strictly more*
/// than `min_gap_ms`.
#[derive(Debug, Clone, Copy)]
pub struct SpacingGate {
    min_gap_ms: u64,
    inclusive: bool,
    last_ms: u64,
}

impl SpacingGate {
    /// Gate admitting candidates `>= min_gap_ms` past the last admitted point
    pub fn at_least(min_gap_ms: u64) -> Self {
        Self {
            min_gap_ms,
            inclusive: true,
            last_ms: 0,
        }
    }

    /// Gate admitting candidates strictly `> min_gap_ms` past the last
    /// admitted point
    pub fn more_than(min_gap_ms: u64) -> Self {
        Self {
            min_gap_ms,
            inclusive: false,
            last_ms: 0,
        }
    }

    /// Admit or reject a candidate, updating the gate on admission.
    pub fn admit(&mut self, candidate_ms: u64) -> bool {
        let gap = candidate_ms.saturating_sub(self.last_ms);
        let ok = if self.inclusive {
            candidate_ms > self.last_ms && gap >= self.min_gap_ms
        } else {
            gap > self.min_gap_ms
        };
        if ok {
            self.last_ms = candidate_ms;
        }
        ok
    }

    pub fn last_ms(&self) -> u64 {
        self.last_ms
    }
}

/// An ordered, strictly increasing set of split points in milliseconds,
/// anchored at 0 and at the timeline duration.
///
/// A zero-duration timeline collapses to the single point `[0]`, which
/// materializes into zero segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPointSet {
    points: Vec<u64>,
}

impl SplitPointSet {
    /// The degenerate "no internal structure detected" set: one segment
    /// spanning the whole timeline.
    pub fn whole(duration_ms: u64) -> Self {
        if duration_ms == 0 {
            Self { points: vec![0] }
        } else {
            Self {
                points: vec![0, duration_ms],
            }
        }
    }

    /// Build from points already satisfying the set invariants.
    pub(crate) fn from_millis(points: Vec<u64>) -> Self {
        debug_assert!(points.first() == Some(&0));
        debug_assert!(points.windows(2).all(|w| w[0] < w[1]));
        Self { points }
    }

    pub fn points(&self) -> &[u64] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn duration_ms(&self) -> u64 {
        *self.points.last().unwrap_or(&0)
    }

    /// Convert the k split points into the k-1 contiguous segments they
    /// bound. Segment `i` spans `[points[i], points[i+1])`.
    pub fn segments(&self) -> Vec<Segment> {
        self.points
            .windows(2)
            .enumerate()
            .map(|(index, w)| Segment {
                index,
                start_ms: w[0],
                end_ms: w[1],
            })
            .collect()
    }
}

/// Deduplicate raw candidates and enforce a minimum spacing between kept
/// points, anchoring the timeline start and end.
///
/// Raw points are expected in ascending order (every producer emits them that
/// way). A point is kept only if it lies at least `min_segment_ms` after the
/// last kept point; the final boundary is appended unconditionally even when
/// it falls closer than `min_segment_ms` to the last kept point.
pub fn clean(raw_points: &[u64], duration_ms: u64, min_segment_ms: u64) -> SplitPointSet {
    let mut points = vec![0u64];
    let mut gate = SpacingGate::at_least(min_segment_ms);

    for &p in raw_points {
        // Interior points only; the anchors are added unconditionally
        if p == 0 || p >= duration_ms {
            continue;
        }
        if gate.admit(p) {
            points.push(p);
        }
    }

    if duration_ms > *points.last().unwrap() {
        points.push(duration_ms);
    }

    SplitPointSet::from_millis(points)
}
