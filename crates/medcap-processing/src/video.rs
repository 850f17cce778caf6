//! Video probing and evenly spaced keyframe sampling.
//!
//! Decoding shells out to ffmpeg/ffprobe subprocesses, so no codec state
//! lives in this process. Sampling is best-effort: a frame that fails to
//! decode is skipped and counted, never fatal.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tokio::process::Command;

use crate::frames::Frame;

/// Stream fields from `ffprobe -show_streams -of json`. Some containers omit
/// duration or frame counts, so every field is optional.
#[derive(Debug, Clone, Deserialize)]
struct RawProbeStreamOutput {
    codec_type: String,
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    duration: Option<String>,
    nb_frames: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawProbeOutput {
    streams: Vec<RawProbeStreamOutput>,
}

/// Metadata of a video's primary video stream.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoProbe {
    pub total_frames: u64,
    pub width: u32,
    pub height: u32,
    pub duration_secs: f64,
}

/// Parse an ffprobe rate string like `"30000/1001"` or `"25/1"`.
fn parse_frame_rate(rate: &str) -> Option<f64> {
    match rate.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.parse().ok()?;
            let den: f64 = den.parse().ok()?;
            if den == 0.0 {
                None
            } else {
                Some(num / den)
            }
        }
        None => rate.parse().ok(),
    }
}

impl VideoProbe {
    fn from_stream(stream: &RawProbeStreamOutput) -> Self {
        let duration_secs: f64 = stream
            .duration
            .as_deref()
            .and_then(|d| d.parse().ok())
            .unwrap_or(0.0);

        // Prefer the container's frame count; fall back to duration x fps
        // when the stream omits nb_frames.
        let total_frames = stream
            .nb_frames
            .as_deref()
            .and_then(|n| n.parse::<u64>().ok())
            .unwrap_or_else(|| {
                let fps = stream
                    .avg_frame_rate
                    .as_deref()
                    .and_then(parse_frame_rate)
                    .unwrap_or(0.0);
                (duration_secs * fps).round() as u64
            });

        VideoProbe {
            total_frames,
            width: stream.width.unwrap_or(0),
            height: stream.height.unwrap_or(0),
            duration_secs,
        }
    }
}

/// Compute `n` evenly spaced frame indices across `[0, total_frames - 1]`
/// inclusive, by linear interpolation rounded to nearest. Indices may repeat
/// when `total_frames < n`; an unreadable (zero-frame) video yields none.
pub fn sample_indices(total_frames: u64, n: usize) -> Vec<u64> {
    if total_frames == 0 || n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![0];
    }

    let last = (total_frames - 1) as f64;
    (0..n)
        .map(|i| (i as f64 * last / (n - 1) as f64).round() as u64)
        .collect()
}

/// Frames sampled from a video, with the request/decode tally.
///
/// `frames.len() == decoded <= requested`; the difference is frames that
/// failed to decode and were skipped. Callers decide whether to surface the
/// discrepancy.
#[derive(Debug)]
pub struct SampledFrames {
    pub frames: Vec<Frame>,
    pub requested: usize,
    pub decoded: usize,
}

/// Samples evenly spaced keyframes from one video file via ffmpeg.
pub struct VideoSampler {
    video_path: PathBuf,
    ffmpeg_path: String,
    ffprobe_path: String,
}

impl VideoSampler {
    pub fn new(
        video_path: impl AsRef<Path>,
        ffmpeg_path: impl Into<String>,
        ffprobe_path: impl Into<String>,
    ) -> Self {
        Self {
            video_path: video_path.as_ref().to_path_buf(),
            ffmpeg_path: ffmpeg_path.into(),
            ffprobe_path: ffprobe_path.into(),
        }
    }

    /// Probe the video's primary stream for frame count and dimensions.
    ///
    /// Returns `Ok(None)` for a file ffprobe cannot read or that has no
    /// video stream; such uploads sample to an empty result rather than
    /// failing the request. Errors mean ffprobe itself could not run.
    pub async fn probe(&self) -> Result<Option<VideoProbe>> {
        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "error",
                "-show_streams",
                "-of",
                "json",
            ])
            .arg(&self.video_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .context("Failed to execute ffprobe")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(
                video = %self.video_path.display(),
                stderr = %stderr.trim(),
                "ffprobe could not read video"
            );
            return Ok(None);
        }

        let raw: RawProbeOutput =
            serde_json::from_slice(&output.stdout).context("Failed to parse ffprobe output")?;

        match raw.streams.iter().find(|s| s.codec_type == "video") {
            Some(stream) => Ok(Some(VideoProbe::from_stream(stream))),
            None => {
                tracing::warn!(
                    video = %self.video_path.display(),
                    "No video stream found"
                );
                Ok(None)
            }
        }
    }

    /// Decode the single frame at `index` into RGB pixels.
    ///
    /// Seeking is idempotent: decoding the same index twice yields the same
    /// pixel content. The frame arrives as PNG on stdout, so channel order is
    /// RGB by the time the image crate hands it back.
    pub async fn decode_frame(&self, index: u64) -> Result<Frame> {
        let output = Command::new(&self.ffmpeg_path)
            .arg("-v")
            .arg("error")
            .arg("-i")
            .arg(&self.video_path)
            .args([
                "-vf",
                &format!("select=eq(n\\,{})", index),
                "-vsync",
                "vfr",
                "-frames:v",
                "1",
                "-f",
                "image2pipe",
                "-c:v",
                "png",
                "pipe:1",
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .context("Failed to execute ffmpeg")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("ffmpeg failed at frame {}: {}", index, stderr));
        }

        if output.stdout.is_empty() {
            return Err(anyhow!("No frame decoded at index {}", index));
        }

        let image = image::load_from_memory(&output.stdout)
            .with_context(|| format!("Failed to decode frame {}", index))?
            .to_rgb8();

        Ok(Frame { index, image })
    }

    /// Sample `n` evenly spaced frames, skipping any that fail to decode.
    ///
    /// Returned frames preserve sampling order (ascending source position).
    /// An unreadable video yields an empty sample with both counters at 0.
    #[tracing::instrument(skip(self), fields(video = %self.video_path.display()))]
    pub async fn sample(&self, n: usize) -> Result<SampledFrames> {
        let total_frames = self.probe().await?.map_or(0, |probe| probe.total_frames);
        let indices = sample_indices(total_frames, n);
        let requested = indices.len();

        tracing::debug!(total_frames, requested, "Sampling keyframes");

        let mut frames = Vec::with_capacity(requested);
        for index in indices {
            match self.decode_frame(index).await {
                Ok(frame) => frames.push(frame),
                Err(e) => {
                    tracing::warn!(index, error = %e, "Skipping undecodable frame");
                }
            }
        }

        let decoded = frames.len();
        if decoded < requested {
            tracing::warn!(requested, decoded, "Sampled fewer frames than requested");
        }

        Ok(SampledFrames {
            frames,
            requested,
            decoded,
        })
    }
}
