//! Video thumbnailing and rendition transcoding via ffmpeg.
//!
//! Transcodes are CPU-bound: concurrent invocations are bounded by a
//! semaphore sized from configuration. Each invocation works in its own
//! temp directory and is subject to the tool timeout; any failure yields
//! an absent artifact, never an error.

use anyhow::{anyhow, Context, Result};
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::Semaphore;

use crate::probe::Prober;

/// Target heights for the standard rendition ladder.
pub const RENDITION_HEIGHTS: [u32; 3] = [1080, 720, 480];

/// Height-dependent default video bitrate.
pub fn default_bitrate(target_height: u32) -> &'static str {
    match target_height {
        480 => "1M",
        720 => "2.5M",
        1080 => "5M",
        _ => "2M",
    }
}

/// Build the ffmpeg argument list for one rendition. Split out of the
/// invocation so stream mapping stays testable without running ffmpeg.
fn rendition_args(
    input: &Path,
    output: &Path,
    target_height: u32,
    bitrate: &str,
    has_audio: bool,
) -> Vec<String> {
    let mut args = vec![
        "-i".to_string(),
        input.to_string_lossy().into_owned(),
        "-vf".to_string(),
        format!("scale=-2:{}", target_height),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-b:v".to_string(),
        bitrate.to_string(),
        "-preset".to_string(),
        "medium".to_string(),
        // Moves the moov atom up front so playback can start mid-download.
        "-movflags".to_string(),
        "faststart".to_string(),
    ];

    if has_audio {
        args.extend_from_slice(&[
            "-c:a".to_string(),
            "aac".to_string(),
            "-b:a".to_string(),
            "128k".to_string(),
        ]);
    } else {
        args.push("-an".to_string());
    }

    args.extend_from_slice(&[
        "-loglevel".to_string(),
        "error".to_string(),
        "-y".to_string(),
        output.to_string_lossy().into_owned(),
    ]);
    args
}

pub struct VideoTranscoder {
    ffmpeg_path: String,
    prober: Prober,
    timeout: Duration,
    transcode_permits: Arc<Semaphore>,
}

impl VideoTranscoder {
    pub fn new(
        ffmpeg_path: String,
        prober: Prober,
        timeout: Duration,
        max_concurrent: usize,
    ) -> Self {
        Self {
            ffmpeg_path,
            prober,
            timeout,
            transcode_permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    async fn run_ffmpeg(&self, args: &[String]) -> Result<()> {
        let run = Command::new(&self.ffmpeg_path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output();

        let output = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| anyhow!("ffmpeg timed out after {:?}", self.timeout))?
            .context("Failed to execute ffmpeg")?;

        if !output.status.success() {
            return Err(anyhow!(
                "ffmpeg failed: {}",
                String::from_utf8_lossy(&output.stderr)
            ));
        }
        Ok(())
    }

    /// Extract one frame at `timestamp_seconds`, scaled to width 320.
    /// Returns JPEG bytes, or `None` on any tool failure.
    pub async fn generate_thumbnail(&self, data: &[u8], timestamp_seconds: f64) -> Option<Vec<u8>> {
        let result = self.try_generate_thumbnail(data, timestamp_seconds).await;
        match result {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::warn!(error = %e, "Video thumbnail generation failed");
                None
            }
        }
    }

    async fn try_generate_thumbnail(&self, data: &[u8], timestamp_seconds: f64) -> Result<Vec<u8>> {
        let temp_dir = tempfile::tempdir().context("Failed to create temp directory")?;
        let input = temp_dir.path().join("input.mp4");
        let output = temp_dir.path().join("thumb.jpg");
        tokio::fs::write(&input, data).await?;

        let args = vec![
            "-ss".to_string(),
            format!("{}", timestamp_seconds),
            "-i".to_string(),
            input.to_string_lossy().into_owned(),
            "-vframes".to_string(),
            "1".to_string(),
            "-vf".to_string(),
            "scale=320:-1".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-y".to_string(),
            output.to_string_lossy().into_owned(),
        ];

        self.run_ffmpeg(&args).await?;
        let bytes = tokio::fs::read(&output)
            .await
            .context("Failed to read generated thumbnail")?;
        Ok(bytes)
    }

    /// Transcode a reduced-resolution H.264 copy at `target_height`,
    /// carrying AAC audio only when the source has an audio stream.
    /// Each resolution is independent; `None` on any failure.
    pub async fn generate_rendition(
        &self,
        data: &[u8],
        target_height: u32,
        bitrate_override: Option<&str>,
    ) -> Option<Vec<u8>> {
        let _permit = match self.transcode_permits.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => return None,
        };

        let result = self
            .try_generate_rendition(data, target_height, bitrate_override)
            .await;
        match result {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    target_height = target_height,
                    "Rendition transcoding failed"
                );
                None
            }
        }
    }

    async fn try_generate_rendition(
        &self,
        data: &[u8],
        target_height: u32,
        bitrate_override: Option<&str>,
    ) -> Result<Vec<u8>> {
        let temp_dir = tempfile::tempdir().context("Failed to create temp directory")?;
        let input = temp_dir.path().join("input.mp4");
        let output = temp_dir.path().join(format!("out_{}p.mp4", target_height));
        tokio::fs::write(&input, data).await?;

        let has_audio = self.prober.has_audio_stream(&input).await;
        let bitrate = bitrate_override.unwrap_or_else(|| default_bitrate(target_height));
        let args = rendition_args(&input, &output, target_height, bitrate, has_audio);

        let start = std::time::Instant::now();
        self.run_ffmpeg(&args).await?;

        let bytes = tokio::fs::read(&output)
            .await
            .context("Failed to read transcoded rendition")?;

        tracing::info!(
            target_height = target_height,
            has_audio = has_audio,
            size_bytes = bytes.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Rendition generated"
        );
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_bitrates() {
        assert_eq!(default_bitrate(480), "1M");
        assert_eq!(default_bitrate(720), "2.5M");
        assert_eq!(default_bitrate(1080), "5M");
        assert_eq!(default_bitrate(360), "2M");
    }

    fn args_for(has_audio: bool) -> Vec<String> {
        rendition_args(
            &PathBuf::from("/tmp/in.mp4"),
            &PathBuf::from("/tmp/out.mp4"),
            720,
            "2.5M",
            has_audio,
        )
    }

    #[test]
    fn test_rendition_args_with_audio() {
        let args = args_for(true);
        assert!(args.contains(&"scale=-2:720".to_string()));
        assert!(args.contains(&"libx264".to_string()));
        assert!(args.contains(&"aac".to_string()));
        assert!(args.contains(&"128k".to_string()));
        assert!(!args.contains(&"-an".to_string()));
    }

    #[test]
    fn test_rendition_args_without_audio() {
        let args = args_for(false);
        assert!(args.contains(&"-an".to_string()));
        assert!(!args.contains(&"aac".to_string()));
    }

    #[test]
    fn test_rendition_args_faststart() {
        let args = args_for(true);
        let pos = args.iter().position(|a| a == "-movflags").unwrap();
        assert_eq!(args[pos + 1], "faststart");
    }
}
