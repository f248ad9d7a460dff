//! End-to-end highlight pipeline and its run report.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use zoomies_common::config::DetectionConfig;
use zoomies_common::error::{PipelineStage, ZoomiesError, ZoomiesResult};
use zoomies_pose_model::reader::LandmarkReader;
use zoomies_pose_model::track::{PoseError, PoseTrack};
use zoomies_processing_core::activity::{ActivityThreshold, FlaggedFrame};
use zoomies_processing_core::highlights::{HighlightAnalysis, HighlightDetector};
use zoomies_processing_core::intervals::TimeInterval;

use crate::assemble::{AssemblyOutcome, ClipAssembler, SegmentResult};
use crate::backend::VideoBackend;

/// Frame rates closer than this are treated as equal.
const FPS_TOLERANCE: f64 = 0.01;

/// Where the frame rate of a run came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FpsSource {
    Override,
    PoseData,
    Video,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// A highlight reel was written.
    Produced { output: PathBuf },
    /// No frame crossed the activity threshold.
    NoActivity,
    /// Frames were flagged but no interval could be extracted.
    NoSegments,
}

/// Everything a run decided, for display and diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub fps: f64,
    pub fps_source: FpsSource,
    pub video_duration_secs: f64,
    pub frames: usize,
    pub landmarks: Vec<String>,
    pub threshold: ActivityThreshold,
    pub flagged: Vec<FlaggedFrame>,
    pub intervals: Vec<TimeInterval>,
    pub segments: Vec<SegmentResult>,
    pub generated_at: DateTime<Utc>,
}

/// Write `report` as pretty-printed JSON, creating parent directories.
fn write_report<T: Serialize>(report: &T, path: &Path) -> ZoomiesResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let content = serde_json::to_string_pretty(report)?;
    std::fs::write(path, content)?;
    tracing::debug!(path = %path.display(), "Report written");
    Ok(())
}

/// Detection results for a pose track, without any video work.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub pose: PathBuf,
    pub fps: f64,
    pub fps_source: FpsSource,
    pub frames: usize,
    pub landmarks: Vec<String>,
    pub threshold: ActivityThreshold,
    pub flagged: Vec<FlaggedFrame>,
    pub intervals: Vec<TimeInterval>,
    pub generated_at: DateTime<Utc>,
}

impl AnalysisReport {
    pub fn new(
        pose: &Path,
        frames: usize,
        fps_source: FpsSource,
        analysis: &HighlightAnalysis,
    ) -> Self {
        Self {
            pose: pose.to_path_buf(),
            fps: analysis.fps,
            fps_source,
            frames,
            landmarks: analysis.landmarks.clone(),
            threshold: analysis.activity.threshold,
            flagged: analysis.activity.flagged.clone(),
            intervals: analysis.intervals.clone(),
            generated_at: Utc::now(),
        }
    }

    pub fn write_json(&self, path: &Path) -> ZoomiesResult<()> {
        write_report(self, path)
    }
}

impl RunReport {
    /// Write the report as pretty-printed JSON, creating parent directories.
    pub fn write_json(&self, path: &Path) -> ZoomiesResult<()> {
        write_report(self, path)
    }

    pub fn output(&self) -> Option<&Path> {
        match &self.outcome {
            RunOutcome::Produced { output } => Some(output),
            _ => None,
        }
    }
}

/// Load a pose track, mapping failures into [`ZoomiesError`].
///
/// Files ending in `.csv` are read as DeepLabCut exports, anything else as
/// a JSONL track.
pub fn load_pose_track(path: &Path) -> ZoomiesResult<PoseTrack> {
    if !path.exists() {
        return Err(ZoomiesError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    let loaded = if is_csv {
        PoseTrack::load_dlc_csv(path)
    } else {
        PoseTrack::load(path)
    };
    let track = loaded.map_err(|e| match e {
        PoseError::IoError { source, .. } => ZoomiesError::Io(source),
        other => ZoomiesError::pose_data(format!("{}: {other}", path.display())),
    })?;
    tracing::debug!(
        path = %path.display(),
        frames = track.len(),
        landmarks = track.header().landmarks.len(),
        "Pose track loaded"
    );
    Ok(track)
}

/// Pose data plus source video in, highlight reel out.
pub struct HighlightPipeline {
    detector: HighlightDetector,
    backend: Box<dyn VideoBackend>,
    fps_override: Option<f64>,
}

impl HighlightPipeline {
    pub fn new(config: DetectionConfig, backend: Box<dyn VideoBackend>) -> Self {
        Self {
            detector: HighlightDetector::new(config),
            backend,
            fps_override: None,
        }
    }

    /// Use `fps` instead of any frame rate found in the inputs.
    pub fn with_fps(mut self, fps: Option<f64>) -> Self {
        self.fps_override = fps;
        self
    }

    /// Run the detection stages only.
    pub fn analyze<R>(&self, reader: &R, fps: f64) -> ZoomiesResult<HighlightAnalysis>
    where
        R: LandmarkReader + ?Sized,
    {
        self.detector.analyze(reader, fps)
    }

    /// Override first, then the probed video, then the pose data.
    pub fn resolve_fps<R>(
        &self,
        reader: &R,
        video_fps: Option<f64>,
    ) -> ZoomiesResult<(f64, FpsSource)>
    where
        R: LandmarkReader + ?Sized,
    {
        let video_fps = video_fps.filter(|fps| fps.is_finite() && *fps > 0.0);
        let pose_fps = reader.frame_rate();

        if let (Some(video), Some(pose)) = (video_fps, pose_fps) {
            if (video - pose).abs() > FPS_TOLERANCE {
                tracing::warn!(
                    video_fps = video,
                    pose_fps = pose,
                    "Pose data frame rate disagrees with the video"
                );
            }
        }

        self.fps_override
            .map(|fps| (fps, FpsSource::Override))
            .or_else(|| video_fps.map(|fps| (fps, FpsSource::Video)))
            .or_else(|| pose_fps.map(|fps| (fps, FpsSource::PoseData)))
            .ok_or_else(|| {
                ZoomiesError::invalid_input(
                    PipelineStage::SpeedSeries,
                    "no frame rate available from override, video, or pose data",
                )
            })
    }

    /// Detect highlights in `reader` and cut them from `video` into `output`.
    pub fn run<R>(&self, reader: &R, video: &Path, output: &Path) -> ZoomiesResult<RunReport>
    where
        R: LandmarkReader + ?Sized,
    {
        if !self.backend.is_available() {
            return Err(ZoomiesError::unsupported(format!(
                "Video backend '{}' is not available",
                self.backend.name()
            )));
        }

        let info = self.backend.probe(video)?;
        let (fps, fps_source) = self.resolve_fps(reader, info.fps)?;
        tracing::info!(
            fps,
            fps_source = ?fps_source,
            video = %video.display(),
            video_duration_secs = info.duration_secs,
            "Starting highlight run"
        );

        let analysis = self.detector.analyze(reader, fps)?;

        let (outcome, segments) = if analysis.activity.flagged.is_empty() {
            tracing::info!("No activity above threshold; no output produced");
            (RunOutcome::NoActivity, Vec::new())
        } else {
            let assembly = ClipAssembler::new(self.backend.as_ref()).assemble_with_duration(
                video,
                info.duration_secs,
                &analysis.intervals,
                output,
            )?;
            let outcome = match assembly.outcome {
                AssemblyOutcome::Produced(path) => RunOutcome::Produced { output: path },
                AssemblyOutcome::Empty => RunOutcome::NoSegments,
            };
            (outcome, assembly.segments)
        };

        Ok(RunReport {
            outcome,
            fps,
            fps_source,
            video_duration_secs: info.duration_secs,
            frames: reader.frame_count(),
            landmarks: analysis.landmarks,
            threshold: analysis.activity.threshold,
            flagged: analysis.activity.flagged,
            intervals: analysis.intervals,
            segments,
            generated_at: Utc::now(),
        })
    }
}
