//! WAV file I/O: header parsing, whole-file reading, and the slice encoder
//! used by the segment exporter.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::{Result, SplitError};
use crate::export::SliceEncoder;
use crate::timeline::{AudioSlice, AudioTimeline, SampleFormat};

/// WAV file header information
#[derive(Debug)]
pub struct WavHeader {
    pub sample_rate: u32,
    pub num_channels: u16,
    pub bits_per_sample: u16,
    pub data_size: u32,
}

/// Read and parse a WAV header, leaving the reader positioned at the start
/// of the data chunk.
pub fn read_wav_header(file: &mut BufReader<File>) -> std::result::Result<WavHeader, String> {
    let mut buf = [0u8; 44];
    file.read_exact(&mut buf)
        .map_err(|e| format!("Failed to read WAV header: {}", e))?;

    if &buf[0..4] != b"RIFF" || &buf[8..12] != b"WAVE" || &buf[12..16] != b"fmt " {
        return Err("Not a valid WAV file".to_string());
    }

    let num_channels = u16::from_le_bytes([buf[22], buf[23]]);
    let sample_rate = u32::from_le_bytes([buf[24], buf[25], buf[26], buf[27]]);
    let bits_per_sample = u16::from_le_bytes([buf[34], buf[35]]);

    file.seek(SeekFrom::Start(36))
        .map_err(|e| format!("Seek error: {}", e))?;

    loop {
        let mut chunk_header = [0u8; 8];
        if file.read_exact(&mut chunk_header).is_err() {
            return Err("Could not find data chunk".to_string());
        }

        let chunk_size = u32::from_le_bytes([
            chunk_header[4],
            chunk_header[5],
            chunk_header[6],
            chunk_header[7],
        ]);

        if &chunk_header[0..4] == b"data" {
            return Ok(WavHeader {
                sample_rate,
                num_channels,
                bits_per_sample,
                data_size: chunk_size,
            });
        }

        file.seek(SeekFrom::Current(chunk_size as i64))
            .map_err(|e| format!("Seek error: {}", e))?;
    }
}

/// Read an entire WAV file into an [`AudioTimeline`].
pub fn read_wav(path: &Path) -> Result<AudioTimeline> {
    let file = File::open(path).map_err(|e| SplitError::decode(path, e.to_string()))?;
    let mut reader = BufReader::new(file);
    let header =
        read_wav_header(&mut reader).map_err(|reason| SplitError::decode(path, reason))?;

    let format = match header.bits_per_sample {
        16 => SampleFormat::S16,
        32 => SampleFormat::S32,
        other => {
            return Err(SplitError::decode(
                path,
                format!("Unsupported bit depth: {}", other),
            ))
        }
    };

    let num_channels = header.num_channels.max(1) as usize;
    let bytes_per_sample = format.bytes_per_sample();
    let frame_bytes = num_channels * bytes_per_sample;

    let mut data = Vec::with_capacity(header.data_size as usize);
    reader
        .by_ref()
        .take(header.data_size as u64)
        .read_to_end(&mut data)
        .map_err(|e| SplitError::decode(path, e.to_string()))?;

    let num_frames = data.len() / frame_bytes;
    let mut channels: Vec<Vec<i32>> = vec![Vec::with_capacity(num_frames); num_channels];

    for frame in 0..num_frames {
        for ch in 0..num_channels {
            let off = (frame * num_channels + ch) * bytes_per_sample;
            let sample = match format {
                SampleFormat::S16 => i16::from_le_bytes([data[off], data[off + 1]]) as i32,
                SampleFormat::S32 => {
                    i32::from_le_bytes([data[off], data[off + 1], data[off + 2], data[off + 3]])
                }
            };
            channels[ch].push(sample);
        }
    }

    Ok(AudioTimeline::new(channels, header.sample_rate, format))
}

/// Encodes audio slices as canonical PCM WAV files.
pub struct WavEncoder;

impl SliceEncoder for WavEncoder {
    fn encode(&self, slice: &AudioSlice, path: &Path) -> std::result::Result<(), String> {
        let file = File::create(path).map_err(|e| e.to_string())?;
        let mut writer = BufWriter::new(file);

        let num_channels = slice.channels.len().max(1) as u16;
        let bits_per_sample = (slice.format.bytes_per_sample() * 8) as u16;
        let byte_rate =
            slice.sample_rate * num_channels as u32 * slice.format.bytes_per_sample() as u32;
        let block_align = num_channels * slice.format.bytes_per_sample() as u16;
        let data_size =
            (slice.num_samples() * slice.channels.len() * slice.format.bytes_per_sample()) as u32;

        writer.write_all(b"RIFF").map_err(|e| e.to_string())?;
        writer
            .write_all(&(36 + data_size).to_le_bytes())
            .map_err(|e| e.to_string())?;
        writer.write_all(b"WAVE").map_err(|e| e.to_string())?;

        writer.write_all(b"fmt ").map_err(|e| e.to_string())?;
        writer
            .write_all(&16u32.to_le_bytes())
            .map_err(|e| e.to_string())?;
        writer
            .write_all(&1u16.to_le_bytes()) // PCM
            .map_err(|e| e.to_string())?;
        writer
            .write_all(&num_channels.to_le_bytes())
            .map_err(|e| e.to_string())?;
        writer
            .write_all(&slice.sample_rate.to_le_bytes())
            .map_err(|e| e.to_string())?;
        writer
            .write_all(&byte_rate.to_le_bytes())
            .map_err(|e| e.to_string())?;
        writer
            .write_all(&block_align.to_le_bytes())
            .map_err(|e| e.to_string())?;
        writer
            .write_all(&bits_per_sample.to_le_bytes())
            .map_err(|e| e.to_string())?;

        writer.write_all(b"data").map_err(|e| e.to_string())?;
        writer
            .write_all(&data_size.to_le_bytes())
            .map_err(|e| e.to_string())?;

        for i in 0..slice.num_samples() {
            for channel in &slice.channels {
                match slice.format {
                    SampleFormat::S16 => {
                        let s = channel[i].clamp(i16::MIN as i32, i16::MAX as i32) as i16;
                        writer.write_all(&s.to_le_bytes()).map_err(|e| e.to_string())?;
                    }
                    SampleFormat::S32 => {
                        writer
                            .write_all(&channel[i].to_le_bytes())
                            .map_err(|e| e.to_string())?;
                    }
                }
            }
        }

        writer.flush().map_err(|e| e.to_string())
    }

    fn extension(&self) -> &str {
        "wav"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sawtooth_timeline(frames: usize, rate: u32) -> AudioTimeline {
        let left: Vec<i32> = (0..frames).map(|i| ((i % 100) as i32 - 50) * 100).collect();
        let right: Vec<i32> = (0..frames).map(|i| ((i % 80) as i32 - 40) * 100).collect();
        AudioTimeline::new(vec![left, right], rate, SampleFormat::S16)
    }

    #[test]
    fn test_encode_then_read_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("slice.wav");

        let t = sawtooth_timeline(4410, 44100);
        let slice = t.slice(0, 100);
        WavEncoder.encode(&slice, &path).unwrap();

        let back = read_wav(&path).unwrap();
        assert_eq!(back.sample_rate(), 44100);
        assert_eq!(back.num_channels(), 2);
        assert_eq!(back.format(), SampleFormat::S16);
        assert_eq!(back.num_samples(), slice.num_samples());
        assert_eq!(back.channels()[0], slice.channels[0]);
        assert_eq!(back.channels()[1], slice.channels[1]);
    }

    #[test]
    fn test_header_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("header.wav");

        let t = sawtooth_timeline(1000, 22050);
        WavEncoder.encode(&t.slice(0, 10), &path).unwrap();

        let mut reader = BufReader::new(File::open(&path).unwrap());
        let header = read_wav_header(&mut reader).unwrap();
        assert_eq!(header.sample_rate, 22050);
        assert_eq!(header.num_channels, 2);
        assert_eq!(header.bits_per_sample, 16);
        // 10ms at 22050Hz = 220 frames of 4 bytes
        assert_eq!(header.data_size, 220 * 4);
    }

    #[test]
    fn test_read_rejects_non_wav() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("not_audio.wav");
        std::fs::write(&path, b"this is definitely not a RIFF container at all....").unwrap();
        assert!(read_wav(&path).is_err());
    }

    #[test]
    fn test_s32_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deep.wav");

        let samples: Vec<i32> = vec![0, 1 << 20, -(1 << 25), i32::MAX, i32::MIN + 1];
        let t = AudioTimeline::new(vec![samples.clone()], 1000, SampleFormat::S32);
        WavEncoder.encode(&t.slice(0, 5), &path).unwrap();

        let back = read_wav(&path).unwrap();
        assert_eq!(back.format(), SampleFormat::S32);
        assert_eq!(back.channels()[0], samples);
    }
}
