//! Decoded audio timeline: the read-only view the segmentation engine works on.

/// Sample format of the decoded audio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    S16,
    S32,
}

impl SampleFormat {
    /// Full-scale reference value for dBFS conversion
    pub fn reference(&self) -> f64 {
        match self {
            SampleFormat::S16 => 32768.0,
            SampleFormat::S32 => 2147483648.0,
        }
    }

    pub fn bytes_per_sample(&self) -> usize {
        match self {
            SampleFormat::S16 => 2,
            SampleFormat::S32 => 4,
        }
    }
}

/// A fully decoded audio signal with a known duration.
///
/// Samples are stored channel-major (outer vec = channels, inner vec =
/// samples), all channels the same length. The engine only ever reads
/// ranges of it; slicing borrows, it never copies.
#[derive(Debug)]
pub struct AudioTimeline {
    channels: Vec<Vec<i32>>,
    sample_rate: u32,
    format: SampleFormat,
}

/// A borrowed `[start_ms, end_ms)` view into an [`AudioTimeline`].
#[derive(Debug)]
pub struct AudioSlice<'a> {
    pub channels: Vec<&'a [i32]>,
    pub sample_rate: u32,
    pub format: SampleFormat,
}

impl AudioTimeline {
    /// Create a timeline from channel-major samples.
    ///
    /// All channels must have the same length; shorter channels are truncated
    /// to the shortest so the timeline stays rectangular.
    pub fn new(mut channels: Vec<Vec<i32>>, sample_rate: u32, format: SampleFormat) -> Self {
        if let Some(min_len) = channels.iter().map(|c| c.len()).min() {
            for ch in &mut channels {
                ch.truncate(min_len);
            }
        }
        Self {
            channels,
            sample_rate,
            format,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn format(&self) -> SampleFormat {
        self.format
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Number of samples per channel
    pub fn num_samples(&self) -> usize {
        self.channels.first().map(|c| c.len()).unwrap_or(0)
    }

    pub fn channels(&self) -> &[Vec<i32>] {
        &self.channels
    }

    /// Total duration in whole milliseconds (truncated)
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        (self.num_samples() as u64 * 1000) / self.sample_rate as u64
    }

    /// Borrow the `[start_ms, end_ms)` range. Ranges are clamped to the
    /// timeline end, so a final window that runs past the end is simply
    /// shorter.
    pub fn slice(&self, start_ms: u64, end_ms: u64) -> AudioSlice<'_> {
        let total = self.num_samples();
        let start = self.ms_to_sample(start_ms).min(total);
        let end = self.ms_to_sample(end_ms).min(total).max(start);

        AudioSlice {
            channels: self.channels.iter().map(|c| &c[start..end]).collect(),
            sample_rate: self.sample_rate,
            format: self.format,
        }
    }

    fn ms_to_sample(&self, ms: u64) -> usize {
        ((ms as u128 * self.sample_rate as u128) / 1000) as usize
    }
}

impl AudioSlice<'_> {
    pub fn num_samples(&self) -> usize {
        self.channels.first().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.num_samples() == 0
    }
}
