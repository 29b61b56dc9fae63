//! Audio metadata extraction.
//!
//! Decodes with symphonia for accurate duration/sample-rate/channel data,
//! falling back to ffprobe when the container cannot be parsed (some MP3
//! encodings, exotic containers). Extraction is advisory and never fails.

use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::probe::{estimate_bitrate, AudioProbe, Prober};

#[derive(Clone)]
pub struct AudioAnalyzer {
    prober: Prober,
}

impl AudioAnalyzer {
    pub fn new(prober: Prober) -> Self {
        Self { prober }
    }

    /// Extract duration, sample rate, channel count, and bitrate from an
    /// audio payload. Fields that cannot be determined stay unset.
    pub async fn extract(&self, data: &[u8]) -> AudioProbe {
        let mut probe = match decode_with_symphonia(data) {
            // Some containers parse but report no frame count (e.g. CBR-less
            // MP3); the external inspector still recovers a duration there.
            Ok(probe) if probe.duration_seconds.is_some() => probe,
            Ok(_) => self.prober.probe_audio(data).await,
            Err(e) => {
                tracing::debug!(error = %e, "Audio decoder failed, falling back to ffprobe");
                self.prober.probe_audio(data).await
            }
        };

        if probe.bitrate.is_none() {
            if let Some(duration) = probe.duration_seconds {
                probe.bitrate = estimate_bitrate(data.len(), duration);
            }
        }

        probe
    }
}

fn decode_with_symphonia(data: &[u8]) -> Result<AudioProbe, symphonia::core::errors::Error> {
    let cursor = std::io::Cursor::new(data.to_vec());
    let stream = MediaSourceStream::new(Box::new(cursor), Default::default());

    let probed = symphonia::default::get_probe().format(
        &Hint::new(),
        stream,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;

    let track = probed
        .format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(symphonia::core::errors::Error::Unsupported(
            "no decodable audio track",
        ))?;

    let params = &track.codec_params;
    let sample_rate = params.sample_rate;
    let channels = params.channels.map(|c| c.count() as i32);
    let duration_seconds = match (params.n_frames, sample_rate) {
        (Some(frames), Some(rate)) if rate > 0 => Some(frames as f64 / rate as f64),
        _ => None,
    };

    Ok(AudioProbe {
        duration_seconds,
        bitrate: None,
        sample_rate: sample_rate.map(|r| r as i32),
        channels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal mono 16-bit PCM WAV: `sample_count` samples at `sample_rate`.
    fn wav_bytes(sample_rate: u32, sample_count: u32) -> Vec<u8> {
        let data_len = sample_count * 2;
        let mut out = Vec::new();
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(36 + data_len).to_le_bytes());
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes()); // PCM
        out.extend_from_slice(&1u16.to_le_bytes()); // mono
        out.extend_from_slice(&sample_rate.to_le_bytes());
        out.extend_from_slice(&(sample_rate * 2).to_le_bytes()); // byte rate
        out.extend_from_slice(&2u16.to_le_bytes()); // block align
        out.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
        out.extend_from_slice(b"data");
        out.extend_from_slice(&data_len.to_le_bytes());
        out.extend(std::iter::repeat(0u8).take(data_len as usize));
        out
    }

    #[test]
    fn test_decode_wav() {
        let data = wav_bytes(8000, 8000);
        let probe = decode_with_symphonia(&data).unwrap();
        assert_eq!(probe.sample_rate, Some(8000));
        assert_eq!(probe.channels, Some(1));
        let duration = probe.duration_seconds.unwrap();
        assert!((duration - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let data = vec![0u8; 64];
        assert!(decode_with_symphonia(&data).is_err());
    }
}
