//! Split point detection strategies.
//!
//! Three alternative ways to find track boundaries in a continuous mix:
//! - Silence runs in the loudness curve (fixed threshold)
//! - Gaps between externally detected beats
//! - Tempo changes across adjacent analysis windows
//!
//! Each strategy is a pure function of its inputs; the shared
//! "running counter + threshold crossing" scan lives here as [`RunScanner`].

pub mod beat_gap;
pub mod silence;
pub mod tempo_change;

/// Parameterized scan for unbroken below-threshold runs in a uniformly
/// sampled metric.
///
/// Accumulates a running duration counter while samples stay below the
/// threshold; when the counter reaches `min_run_ms` the current sample's
/// offset is emitted and the counter resets. Any at-or-above-threshold
/// sample also resets the counter, so qualifying runs must be unbroken.
#[derive(Debug, Clone, Copy)]
pub struct RunScanner {
    pub threshold: f64,
    pub min_run_ms: u64,
}

impl RunScanner {
    /// Scan `(offset_ms, value)` samples spaced `step_ms` apart.
    ///
    /// Output offsets are ascending; a long run emits a point every time the
    /// counter refills, deduplication is the cleaner's job.
    pub fn scan<I>(&self, samples: I, step_ms: u64) -> Vec<u64>
    where
        I: IntoIterator<Item = (u64, f64)>,
    {
        let mut emitted = Vec::new();
        let mut run_ms = 0u64;

        for (offset_ms, value) in samples {
            if value < self.threshold {
                run_ms += step_ms;
                if run_ms >= self.min_run_ms {
                    emitted.push(offset_ms);
                    run_ms = 0;
                }
            } else {
                run_ms = 0;
            }
        }

        emitted
    }
}
