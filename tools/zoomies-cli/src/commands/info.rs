//! Show pose track information.

use std::path::PathBuf;

use zoomies_common::timebase::FrameClock;
use zoomies_pose_model::LandmarkReader;
use zoomies_render_engine::load_pose_track;

pub fn run(pose: PathBuf) -> anyhow::Result<()> {
    let track = load_pose_track(&pose)?;
    let header = track.header();

    println!("Pose track: {}", pose.display());
    println!("  Schema: {}", header.schema_version);
    if !header.scorer.is_empty() {
        println!("  Scorer: {}", header.scorer);
    }
    println!("  Individual: {}", header.individual);
    if let Some(source) = &header.source_video {
        println!("  Source video: {source}");
    }
    println!();

    println!("Frames:");
    println!("  Count: {}", track.len());
    if let (Some(first), Some(last)) = (track.frames().first(), track.frames().last()) {
        println!("  Range: {} .. {}", first.index, last.index);
    }
    match track.frame_rate().and_then(FrameClock::new) {
        Some(clock) => println!(
            "  Frame rate: {} fps ({:.2}s)",
            clock.fps(),
            clock.duration_of(track.len() as u64)
        ),
        None => println!("  Frame rate: unknown (pass --fps or probe the video)"),
    }
    println!();

    println!("Landmarks:");
    for coverage in track.coverage() {
        println!(
            "  {:<20} {:>6} detected  {:>5.1}% missing",
            coverage.landmark,
            coverage.detected,
            coverage.missing_ratio() * 100.0
        );
    }

    Ok(())
}
