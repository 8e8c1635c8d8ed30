//! Audio decoding using symphonia.
//!
//! Decodes MP3/FLAC/WAV into the channel-major `AudioTimeline` the
//! segmentation engine reads. Samples are converted to full-scale i32, so
//! downstream dBFS math always uses the S32 reference.

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

use crate::error::{Result, SplitError};
use crate::timeline::{AudioTimeline, SampleFormat};

/// Decode an audio file into an [`AudioTimeline`].
pub fn load(path: &Path) -> Result<AudioTimeline> {
    let file = File::open(path).map_err(|e| SplitError::decode(path, e.to_string()))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| SplitError::decode(path, format!("Failed to probe format: {}", e)))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| SplitError::decode(path, "No audio tracks found"))?;
    let track_id = track.id;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| SplitError::decode(path, format!("Unsupported codec: {}", e)))?;

    let mut sample_rate = 0u32;
    let mut num_channels = 0usize;
    let mut channels: Vec<Vec<i32>> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<i32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(SplitError::decode(path, format!("Demux error: {}", e))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                if sample_buf.is_none() {
                    let spec = *decoded.spec();
                    sample_rate = spec.rate;
                    num_channels = spec.channels.count();
                    channels = vec![Vec::new(); num_channels];
                    sample_buf = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
                }
                if let Some(buf) = sample_buf.as_mut() {
                    buf.copy_interleaved_ref(decoded);
                    for frame in buf.samples().chunks_exact(num_channels) {
                        for (ch, &sample) in frame.iter().enumerate() {
                            channels[ch].push(sample);
                        }
                    }
                }
            }
            // A corrupt packet is recoverable; skip it and keep decoding
            Err(SymphoniaError::DecodeError(e)) => {
                warn!(error = %e, "skipping undecodable packet");
            }
            Err(e) => return Err(SplitError::decode(path, format!("Decode error: {}", e))),
        }
    }

    if sample_rate == 0 {
        return Err(SplitError::decode(path, "Stream contained no audio frames"));
    }

    let timeline = AudioTimeline::new(channels, sample_rate, SampleFormat::S32);
    debug!(
        sample_rate,
        channels = num_channels,
        duration_ms = timeline.duration_ms(),
        file = %path.display(),
        "decoded timeline"
    );

    Ok(timeline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::SliceEncoder;
    use crate::wav::WavEncoder;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_file() {
        let err = load(Path::new("/nonexistent/mix.mp3")).unwrap_err();
        assert!(matches!(err, SplitError::Decode { .. }));
    }

    #[test]
    fn test_load_wav_via_symphonia() {
        // Encode a slice with our own WAV writer, then decode it through
        // the symphonia path.
        let dir = tempdir().unwrap();
        let path = dir.path().join("probe.wav");

        let samples: Vec<i32> = (0..4410).map(|i| ((i % 200) - 100) * 50).collect();
        let t = AudioTimeline::new(vec![samples], 44100, SampleFormat::S16);
        WavEncoder.encode(&t.slice(0, 100), &path).unwrap();

        let back = load(&path).unwrap();
        assert_eq!(back.sample_rate(), 44100);
        assert_eq!(back.num_channels(), 1);
        assert_eq!(back.num_samples(), 4410);
        // Symphonia widens 16-bit samples to full-scale i32
        assert_eq!(back.format(), SampleFormat::S32);
    }
}
