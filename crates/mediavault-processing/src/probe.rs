//! Media probing via ffprobe.
//!
//! Probing is advisory: extraction errors never propagate, they yield
//! results with unset fields. The byte buffer is written to a scoped
//! temporary file which is removed when the probe returns.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Best-effort video probe result; every field may be unset.
#[derive(Debug, Clone, Default)]
pub struct VideoProbe {
    pub duration_seconds: Option<f64>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub frame_rate: Option<f64>,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    pub bitrate: Option<i64>,
}

/// Best-effort audio probe result.
#[derive(Debug, Clone, Default)]
pub struct AudioProbe {
    pub duration_seconds: Option<f64>,
    pub bitrate: Option<i64>,
    pub sample_rate: Option<i32>,
    pub channels: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FfprobeOutput {
    pub format: Option<FfprobeFormat>,
    pub streams: Option<Vec<FfprobeStream>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FfprobeFormat {
    pub duration: Option<String>,
    pub bit_rate: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FfprobeStream {
    pub codec_type: Option<String>,
    pub codec_name: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub avg_frame_rate: Option<String>,
    pub sample_rate: Option<String>,
    pub channels: Option<i32>,
}

impl FfprobeOutput {
    fn stream_of(&self, codec_type: &str) -> Option<&FfprobeStream> {
        self.streams
            .as_deref()
            .unwrap_or_default()
            .iter()
            .find(|s| s.codec_type.as_deref() == Some(codec_type))
    }
}

/// Parse an ffprobe rational frame rate ("numerator/denominator").
/// A zero denominator yields `None`, not a division error.
pub fn parse_frame_rate(raw: &str) -> Option<f64> {
    let (num, den) = raw.split_once('/')?;
    let num: f64 = num.trim().parse().ok()?;
    let den: f64 = den.trim().parse().ok()?;
    if den > 0.0 {
        Some(num / den)
    } else {
        None
    }
}

/// Estimate total bitrate from payload size when the container does not
/// report one: `(byte_length * 8) / duration_seconds`.
pub fn estimate_bitrate(byte_length: usize, duration_seconds: f64) -> Option<i64> {
    if duration_seconds > 0.0 {
        Some(((byte_length as f64) * 8.0 / duration_seconds) as i64)
    } else {
        None
    }
}

/// ffprobe wrapper with a per-invocation timeout.
#[derive(Clone)]
pub struct Prober {
    ffprobe_path: String,
    timeout: Duration,
}

impl Prober {
    pub fn new(ffprobe_path: String, timeout: Duration) -> Self {
        Self {
            ffprobe_path,
            timeout,
        }
    }

    /// Run ffprobe against an existing file and parse its JSON output.
    pub(crate) async fn probe_file(&self, path: &Path) -> Result<FfprobeOutput> {
        let start = std::time::Instant::now();

        let run = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .output();

        let output = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| anyhow!("ffprobe timed out after {:?}", self.timeout))?
            .context("Failed to execute ffprobe")?;

        if !output.status.success() {
            return Err(anyhow!(
                "ffprobe failed: {}",
                String::from_utf8_lossy(&output.stderr)
            ));
        }

        let parsed: FfprobeOutput =
            serde_json::from_slice(&output.stdout).context("Failed to parse ffprobe output")?;

        tracing::debug!(
            duration_ms = start.elapsed().as_millis() as u64,
            "ffprobe completed"
        );

        Ok(parsed)
    }

    async fn probe_bytes(&self, data: &[u8]) -> Result<FfprobeOutput> {
        let temp_file = tempfile::NamedTempFile::new()?;
        tokio::fs::write(temp_file.path(), data).await?;
        self.probe_file(temp_file.path()).await
    }

    /// Extract container and stream metadata from a video payload.
    /// Never fails; unextractable fields stay unset.
    pub async fn probe_video(&self, data: &[u8]) -> VideoProbe {
        let parsed = match self.probe_bytes(data).await {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(error = %e, "Video probe failed");
                return VideoProbe::default();
            }
        };

        let mut probe = VideoProbe::default();

        if let Some(format) = &parsed.format {
            probe.duration_seconds = format.duration.as_deref().and_then(|d| d.parse().ok());
            probe.bitrate = format.bit_rate.as_deref().and_then(|b| b.parse().ok());
        }

        if let Some(video) = parsed.stream_of("video") {
            probe.width = video.width.map(|w| w as i32);
            probe.height = video.height.map(|h| h as i32);
            probe.video_codec = video.codec_name.clone();
            probe.frame_rate = video.avg_frame_rate.as_deref().and_then(parse_frame_rate);
        }

        if let Some(audio) = parsed.stream_of("audio") {
            probe.audio_codec = audio.codec_name.clone();
        }

        if probe.bitrate.is_none() {
            if let Some(duration) = probe.duration_seconds {
                probe.bitrate = estimate_bitrate(data.len(), duration);
            }
        }

        probe
    }

    /// Extract audio metadata through ffprobe. Used as the fallback when
    /// the dedicated audio decoder cannot parse the container.
    pub async fn probe_audio(&self, data: &[u8]) -> AudioProbe {
        let parsed = match self.probe_bytes(data).await {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(error = %e, "Audio probe failed");
                return AudioProbe::default();
            }
        };

        let mut probe = AudioProbe::default();

        if let Some(format) = &parsed.format {
            probe.duration_seconds = format.duration.as_deref().and_then(|d| d.parse().ok());
            probe.bitrate = format.bit_rate.as_deref().and_then(|b| b.parse().ok());
        }

        if let Some(audio) = parsed.stream_of("audio") {
            probe.sample_rate = audio.sample_rate.as_deref().and_then(|s| s.parse().ok());
            probe.channels = audio.channels;
        }

        if probe.bitrate.is_none() {
            if let Some(duration) = probe.duration_seconds {
                probe.bitrate = estimate_bitrate(data.len(), duration);
            }
        }

        probe
    }

    /// Whether the file at `path` contains at least one audio stream.
    /// Errs on the side of `false` when probing fails.
    pub async fn has_audio_stream(&self, path: &Path) -> bool {
        match self.probe_file(path).await {
            Ok(parsed) => parsed.stream_of("audio").is_some(),
            Err(e) => {
                tracing::warn!(error = %e, "Audio stream detection failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_rate_ntsc() {
        let rate = parse_frame_rate("30000/1001").unwrap();
        assert!((rate - 29.97).abs() < 0.01);
    }

    #[test]
    fn test_parse_frame_rate_zero_denominator() {
        assert_eq!(parse_frame_rate("0/0"), None);
    }

    #[test]
    fn test_parse_frame_rate_malformed() {
        assert_eq!(parse_frame_rate("30"), None);
        assert_eq!(parse_frame_rate("a/b"), None);
        assert_eq!(parse_frame_rate(""), None);
    }

    #[test]
    fn test_estimate_bitrate_exact() {
        assert_eq!(estimate_bitrate(1_250_000, 10.0), Some(1_000_000));
    }

    #[test]
    fn test_estimate_bitrate_zero_duration() {
        assert_eq!(estimate_bitrate(1_250_000, 0.0), None);
    }

    #[test]
    fn test_ffprobe_output_parsing() {
        let raw = r#"{
            "streams": [
                {
                    "codec_type": "video",
                    "codec_name": "h264",
                    "width": 640,
                    "height": 480,
                    "avg_frame_rate": "30000/1001"
                },
                {
                    "codec_type": "audio",
                    "codec_name": "aac",
                    "sample_rate": "48000",
                    "channels": 2
                }
            ],
            "format": {
                "duration": "2.002000",
                "bit_rate": "1500000"
            }
        }"#;

        let parsed: FfprobeOutput = serde_json::from_str(raw).unwrap();
        let video = parsed.stream_of("video").unwrap();
        assert_eq!(video.codec_name.as_deref(), Some("h264"));
        assert_eq!(video.width, Some(640));
        let audio = parsed.stream_of("audio").unwrap();
        assert_eq!(audio.channels, Some(2));
        assert_eq!(
            parsed.format.as_ref().unwrap().duration.as_deref(),
            Some("2.002000")
        );
    }

    #[test]
    fn test_ffprobe_output_without_audio_stream() {
        let raw = r#"{
            "streams": [
                {"codec_type": "video", "codec_name": "h264", "width": 640, "height": 480}
            ],
            "format": {"duration": "2.0"}
        }"#;

        let parsed: FfprobeOutput = serde_json::from_str(raw).unwrap();
        assert!(parsed.stream_of("audio").is_none());
        assert!(parsed.stream_of("video").is_some());
    }
}
