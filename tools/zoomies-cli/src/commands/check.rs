//! Check system capabilities.

use zoomies_common::config::{config_file_path, AppConfig};
use zoomies_render_engine::{FfmpegBackend, VideoBackend};

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("Zoomies System Check");
    println!("{}", "=".repeat(50));

    let backend = FfmpegBackend::new(&config.render);
    let ffmpeg_ok = backend.is_available();
    let ffprobe_ok = backend.probe_available();

    if ffmpeg_ok {
        println!("[OK] ffmpeg found");
    } else {
        println!("[MISSING] ffmpeg (needed to cut and join segments)");
    }
    if ffprobe_ok {
        println!("[OK] ffprobe found");
    } else {
        println!("[MISSING] ffprobe (needed to read video duration and frame rate)");
    }

    let path = config_file_path();
    if path.exists() {
        println!("[OK] Config: {}", path.display());
    } else {
        println!("[INFO] Config: defaults ({} not found)", path.display());
    }
    println!(
        "     Encoder: {} crf {} preset {}, audio {}",
        config.render.video_codec,
        config.render.crf,
        config.render.preset,
        if config.render.keep_audio { "kept" } else { "dropped" }
    );

    println!();
    if ffmpeg_ok && ffprobe_ok {
        println!("All required tools are available. Zoomies is ready.");
    } else {
        println!("Install ffmpeg (which ships ffprobe) to cut highlight reels.");
    }

    Ok(())
}
