//! Cut detected highlights out of a video.

use std::path::{Path, PathBuf};

use zoomies_common::config::{DetectionConfig, RenderDefaults};
use zoomies_common::timebase::format_timestamp;
use zoomies_render_engine::{
    load_pose_track, FfmpegBackend, HighlightPipeline, RunOutcome, SegmentResult, VideoBackend,
};

pub async fn run(
    video: PathBuf,
    pose: PathBuf,
    output: Option<PathBuf>,
    detection: DetectionConfig,
    fps: Option<f64>,
    render: RenderDefaults,
    report: Option<PathBuf>,
) -> anyhow::Result<()> {
    detection.validate()?;

    let requested = output.unwrap_or_else(|| default_output_name(&video));
    let output_path = render.resolve_output(&requested);
    println!("Clipping: {}", video.display());
    println!("  Pose track: {}", pose.display());
    println!("  Output: {}", output_path.display());

    let backend = FfmpegBackend::new(&render);
    if !backend.is_available() {
        return Err(anyhow::anyhow!(
            "ffmpeg not found in PATH; run `zoomies check` for details"
        ));
    }

    let run_report = tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
        let track = load_pose_track(&pose)?;
        let pipeline = HighlightPipeline::new(detection, Box::new(backend)).with_fps(fps);
        Ok(pipeline.run(&track, &video, &output_path)?)
    })
    .await
    .map_err(|e| anyhow::anyhow!("Clip task failed: {e}"))??;

    println!(
        "  Frame rate: {} ({:?})",
        run_report.fps, run_report.fps_source
    );
    println!("  Flagged frames: {}", run_report.flagged.len());
    for segment in &run_report.segments {
        let interval = segment.interval();
        let span = format!(
            "{} -> {}",
            format_timestamp(interval.start_secs),
            format_timestamp(interval.end_secs)
        );
        match segment {
            SegmentResult::Extracted { .. } => println!("    [OK]   {span}"),
            SegmentResult::Skipped { reason, .. } => println!("    [SKIP] {span}  {reason}"),
        }
    }

    if let Some(path) = report {
        run_report.write_json(&path)?;
        println!("  Report saved to: {}", path.display());
    }

    match &run_report.outcome {
        RunOutcome::Produced { output } => {
            println!("\nHighlight reel written: {}", output.display());
        }
        RunOutcome::NoActivity => {
            println!("\nNo activity above threshold; no output produced.");
        }
        RunOutcome::NoSegments => {
            println!("\nNo segments could be extracted; no output produced.");
        }
    }

    Ok(())
}

fn default_output_name(video: &Path) -> PathBuf {
    let stem = video
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video".to_string());
    PathBuf::from(format!("{stem}_highlights.mp4"))
}
