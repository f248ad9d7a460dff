//! Video backends: probing, segment extraction, and concatenation.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};

use zoomies_common::config::RenderDefaults;
use zoomies_common::error::{ZoomiesError, ZoomiesResult};
use zoomies_common::timebase::{format_timestamp, parse_frame_rate};
use zoomies_processing_core::intervals::TimeInterval;

/// Properties of a source video.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoInfo {
    pub duration_secs: f64,
    /// Frame rate of the first video stream, if it reports a usable one.
    pub fps: Option<f64>,
    pub width: u32,
    pub height: u32,
    pub codec: String,
}

/// Trait for video backends (FFmpeg, test doubles, etc.).
pub trait VideoBackend: Send {
    /// Check if this backend is available on the system.
    fn is_available(&self) -> bool;

    /// Backend name.
    fn name(&self) -> &str;

    /// Read duration, frame rate, and dimensions of `path`.
    fn probe(&self, path: &Path) -> ZoomiesResult<VideoInfo>;

    /// Write the footage of `interval` from `source` into `dest`.
    fn extract_segment(
        &self,
        source: &Path,
        interval: &TimeInterval,
        dest: &Path,
    ) -> ZoomiesResult<()>;

    /// Join `segments` in the given order into `output` with hard cuts.
    fn concat_segments(&self, segments: &[PathBuf], output: &Path) -> ZoomiesResult<()>;
}

/// Backend driving the `ffmpeg` and `ffprobe` executables.
#[derive(Debug, Clone)]
pub struct FfmpegBackend {
    video_codec: String,
    crf: u8,
    preset: String,
    keep_audio: bool,
}

impl Default for FfmpegBackend {
    fn default() -> Self {
        Self::new(&RenderDefaults::default())
    }
}

impl FfmpegBackend {
    pub fn new(render: &RenderDefaults) -> Self {
        Self {
            video_codec: render.video_codec.clone(),
            crf: render.crf,
            preset: render.preset.clone(),
            keep_audio: render.keep_audio,
        }
    }

    /// Whether `ffprobe` is on the PATH as well.
    pub fn probe_available(&self) -> bool {
        command_exists("ffprobe")
    }

    /// Input seek with an output duration. Input-side `-to` needs ffmpeg 5.0.
    fn extract_args(&self, source: &Path, interval: &TimeInterval, dest: &Path) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(),
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-ss".to_string(),
            format_timestamp(interval.start_secs),
            "-i".to_string(),
            source.display().to_string(),
            "-t".to_string(),
            format!("{:.3}", interval.duration_secs()),
            "-c:v".to_string(),
            self.video_codec.clone(),
            "-crf".to_string(),
            self.crf.to_string(),
            "-preset".to_string(),
            self.preset.clone(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
        ];
        if self.keep_audio {
            args.extend(["-c:a".to_string(), "aac".to_string()]);
        } else {
            args.push("-an".to_string());
        }
        args.extend([
            "-movflags".to_string(),
            "+faststart".to_string(),
            dest.display().to_string(),
        ]);
        args
    }
}

impl VideoBackend for FfmpegBackend {
    fn is_available(&self) -> bool {
        command_exists("ffmpeg")
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }

    fn probe(&self, path: &Path) -> ZoomiesResult<VideoInfo> {
        if !path.exists() {
            return Err(ZoomiesError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let output = Command::new("ffprobe")
            .args([
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-show_entries",
                "stream=codec_name,width,height,r_frame_rate,avg_frame_rate:format=duration",
                "-of",
                "json",
            ])
            .arg(path)
            .output()
            .map_err(|e| ZoomiesError::render(format!("Failed to start ffprobe: {e}")))?;

        if !output.status.success() {
            return Err(ZoomiesError::render(format!(
                "ffprobe failed on {} (status {}): {}",
                path.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let info = parse_probe_output(&String::from_utf8_lossy(&output.stdout))?;
        tracing::debug!(
            path = %path.display(),
            duration_secs = info.duration_secs,
            fps = ?info.fps,
            width = info.width,
            height = info.height,
            codec = %info.codec,
            "Probed video"
        );
        Ok(info)
    }

    fn extract_segment(
        &self,
        source: &Path,
        interval: &TimeInterval,
        dest: &Path,
    ) -> ZoomiesResult<()> {
        let args = self.extract_args(source, interval, dest);
        run_ffmpeg(&args)
            .map_err(|e| ZoomiesError::extraction(interval.start_secs, interval.end_secs, e))
    }

    fn concat_segments(&self, segments: &[PathBuf], output: &Path) -> ZoomiesResult<()> {
        let Some(first) = segments.first() else {
            return Err(ZoomiesError::render("No segments to concatenate"));
        };

        let list_path = first.with_file_name("concat.txt");
        std::fs::write(&list_path, concat_list(segments))?;

        let args = vec![
            "-y".to_string(),
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-f".to_string(),
            "concat".to_string(),
            "-safe".to_string(),
            "0".to_string(),
            "-i".to_string(),
            list_path.display().to_string(),
            "-c".to_string(),
            "copy".to_string(),
            output.display().to_string(),
        ];
        run_ffmpeg(&args).map_err(ZoomiesError::render)
    }
}

/// Run ffmpeg to completion, returning its stderr on failure.
fn run_ffmpeg(args: &[String]) -> Result<(), String> {
    tracing::debug!(args = ?args, "Running ffmpeg");
    let output = Command::new("ffmpeg")
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| format!("Failed to start ffmpeg: {e}"))?;

    if output.status.success() {
        Ok(())
    } else {
        Err(format!(
            "ffmpeg failed (status {}): {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ))
    }
}

/// Concat demuxer list with one `file '<path>'` line per segment.
fn concat_list(segments: &[PathBuf]) -> String {
    segments
        .iter()
        .map(|path| {
            let escaped = path.display().to_string().replace('\'', "'\\''");
            format!("file '{escaped}'\n")
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Parse `ffprobe -of json` output into [`VideoInfo`].
fn parse_probe_output(raw: &str) -> ZoomiesResult<VideoInfo> {
    let probe: ProbeOutput = serde_json::from_str(raw)?;
    let stream = probe
        .streams
        .into_iter()
        .next()
        .ok_or_else(|| ZoomiesError::render("ffprobe reported no video stream"))?;

    let duration_secs = probe
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| ZoomiesError::render("ffprobe reported no usable duration"))?;

    // avg_frame_rate is 0/0 for some containers; fall back to r_frame_rate.
    let fps = stream
        .avg_frame_rate
        .as_deref()
        .and_then(parse_frame_rate)
        .or_else(|| stream.r_frame_rate.as_deref().and_then(parse_frame_rate));

    Ok(VideoInfo {
        duration_secs,
        fps,
        width: stream.width.unwrap_or(0),
        height: stream.height.unwrap_or(0),
        codec: stream.codec_name.unwrap_or_else(|| "unknown".to_string()),
    })
}

fn command_exists(binary: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}
