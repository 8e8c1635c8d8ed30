//! dBFS conversion primitives shared by the loudness profiler.

use crate::timeline::AudioSlice;

/// Conventional floor substituted for digital silence so downstream
/// comparisons never see -inf or NaN.
pub const SILENCE_FLOOR_DB: f64 = -90.0;

/// Calculate RMS of normalized (full scale = 1.0) mono-mixed samples.
///
/// Channels are averaged into a mono signal before squaring, matching how
/// perceived loudness of a stereo pause behaves.
pub fn mono_rms(channels: &[&[i32]], reference: f64) -> f64 {
    let num_channels = channels.len();
    let num_samples = channels.first().map(|c| c.len()).unwrap_or(0);

    if num_channels == 0 || num_samples == 0 {
        return 0.0;
    }

    let mut sum_squares = 0.0_f64;
    for i in 0..num_samples {
        let mut sample_sum = 0.0_f64;
        for channel in channels {
            sample_sum += channel[i] as f64 / reference;
        }
        let mono = sample_sum / num_channels as f64;
        sum_squares += mono * mono;
    }

    (sum_squares / num_samples as f64).sqrt()
}

/// Convert a normalized RMS value to dBFS, with the silence floor substituted
/// for zero-energy input.
pub fn rms_to_dbfs(rms: f64) -> f64 {
    if rms > 0.0 {
        (20.0 * rms.log10()).max(SILENCE_FLOOR_DB)
    } else {
        SILENCE_FLOOR_DB
    }
}

/// Loudness of an audio slice in dBFS.
///
/// Empty slices count as digital silence.
pub fn slice_dbfs(slice: &AudioSlice) -> f64 {
    let rms = mono_rms(&slice.channels, slice.format.reference());
    rms_to_dbfs(rms)
}
