//! Zoomies CLI — Command-line interface for highlight detection and clipping.
//!
//! Usage:
//!   zoomies analyze <POSE>          Detect high-activity moments in a pose track
//!   zoomies clip <VIDEO> <POSE>     Cut the detected moments into a highlight reel
//!   zoomies info <POSE>             Show pose track information
//!   zoomies check                   Check for ffmpeg/ffprobe
//!   zoomies init-config             Write the default configuration file

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use zoomies_common::config::{AppConfig, DetectionConfig, MergePolicy, WarmupPolicy};

mod commands;

#[derive(Parser)]
#[command(
    name = "zoomies",
    about = "Find the zoomies: cut high-activity moments out of animal videos",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Detection parameters; each one overrides the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct DetectionArgs {
    /// Frame rate of the pose data (default: pose track header, then video)
    #[arg(long)]
    fps: Option<f64>,

    /// Moving-average window in samples
    #[arg(long)]
    window: Option<usize>,

    /// Threshold multiplier k in mean + k * std
    #[arg(long)]
    std_multiplier: Option<f64>,

    /// Padding around each flagged frame (seconds)
    #[arg(long)]
    buffer: Option<f64>,

    /// Landmark to track; repeat for several (default: all)
    #[arg(long = "bodypart")]
    bodyparts: Vec<String>,

    /// Smooth to zero until the window fills
    #[arg(long)]
    zero_fill: bool,

    /// Merge intervals transitively (sort and sweep)
    #[arg(long)]
    transitive_merge: bool,
}

impl DetectionArgs {
    fn apply(&self, mut config: DetectionConfig) -> DetectionConfig {
        if let Some(window) = self.window {
            config.window_size = window;
        }
        if let Some(k) = self.std_multiplier {
            config.std_multiplier = k;
        }
        if let Some(buffer) = self.buffer {
            config.buffer_duration_secs = buffer;
        }
        if !self.bodyparts.is_empty() {
            config.bodyparts = Some(self.bodyparts.clone());
        }
        if self.zero_fill {
            config.warmup = WarmupPolicy::ZeroFill;
        }
        if self.transitive_merge {
            config.merge_policy = MergePolicy::Transitive;
        }
        config
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Detect high-activity moments without touching video
    Analyze {
        /// Path to the pose track (JSONL or DeepLabCut CSV)
        pose: PathBuf,

        #[command(flatten)]
        detection: DetectionArgs,

        /// Write a JSON report of the analysis
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Detect high-activity moments and cut them into one video
    Clip {
        /// Source video
        video: PathBuf,

        /// Path to the pose track (JSONL or DeepLabCut CSV)
        pose: PathBuf,

        /// Output file (bare names go into the configured output directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        detection: DetectionArgs,

        /// Drop the audio track
        #[arg(long)]
        no_audio: bool,

        /// Write a JSON report of the run
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Show pose track information
    Info {
        /// Path to the pose track (JSONL or DeepLabCut CSV)
        pose: PathBuf,
    },

    /// Check that the video tools are installed
    Check,

    /// Write the default configuration file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load();

    // Initialize logging
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    if cli.json_logs {
        config.logging.json = true;
    }
    zoomies_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Analyze {
            pose,
            detection,
            report,
        } => commands::analyze::run(
            pose,
            detection.apply(config.detection.clone()),
            detection.fps,
            report,
        ),
        Commands::Clip {
            video,
            pose,
            output,
            detection,
            no_audio,
            report,
        } => {
            if no_audio {
                config.render.keep_audio = false;
            }
            commands::clip::run(
                video,
                pose,
                output,
                detection.apply(config.detection.clone()),
                detection.fps,
                config.render,
                report,
            )
            .await
        }
        Commands::Info { pose } => commands::info::run(pose),
        Commands::Check => commands::check::run(&config),
        Commands::InitConfig { force } => commands::init_config::run(force),
    }
}
