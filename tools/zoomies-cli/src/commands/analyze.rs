//! Detect high-activity moments in a pose track.

use std::path::PathBuf;

use zoomies_common::config::DetectionConfig;
use zoomies_common::timebase::format_timestamp;
use zoomies_pose_model::reader::LandmarkReader;
use zoomies_processing_core::HighlightDetector;
use zoomies_render_engine::{load_pose_track, AnalysisReport, FpsSource};

pub fn run(
    pose: PathBuf,
    detection: DetectionConfig,
    fps: Option<f64>,
    report: Option<PathBuf>,
) -> anyhow::Result<()> {
    println!("Analyzing pose track: {}", pose.display());

    detection.validate()?;
    let track = load_pose_track(&pose)?;
    println!("  Loaded {} frames", track.len());

    let (fps, fps_source) = fps
        .map(|fps| (fps, FpsSource::Override))
        .or_else(|| track.frame_rate().map(|fps| (fps, FpsSource::PoseData)))
        .ok_or_else(|| {
            anyhow::anyhow!("No frame rate known: pass --fps or set fps in the pose track header")
        })?;
    tracing::debug!(fps, fps_source = ?fps_source, "Frame rate resolved");

    let analysis = HighlightDetector::new(detection).analyze(&track, fps)?;
    let threshold = &analysis.activity.threshold;

    println!("  Landmarks: {}", analysis.landmarks.join(", "));
    println!(
        "  Threshold: {:.2} (mean {:.2} + {} x std {:.2})",
        threshold.threshold, threshold.mean, threshold.std_multiplier, threshold.std_dev
    );
    println!("  Flagged frames: {}", analysis.activity.flagged.len());
    for flagged in &analysis.activity.flagged {
        println!("    frame {:>6}  {}", flagged.frame, flagged.reason);
    }

    println!("  Intervals: {}", analysis.intervals.len());
    for interval in analysis.intervals_by_start() {
        println!(
            "    {} -> {}  ({:.2}s)",
            format_timestamp(interval.start_secs),
            format_timestamp(interval.end_secs),
            interval.duration_secs()
        );
    }

    if let Some(path) = report {
        AnalysisReport::new(&pose, track.len(), fps_source, &analysis).write_json(&path)?;
        println!("  Report saved to: {}", path.display());
    }

    if analysis.has_activity() {
        println!(
            "\nAnalysis complete: {:.2}s of highlights.",
            analysis.highlight_secs()
        );
    } else {
        println!("\nAnalysis complete: no activity above threshold.");
    }

    Ok(())
}
