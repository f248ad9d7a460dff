//! Zoomies Render Engine
//!
//! Turns detected highlight intervals into a single video, and wires the
//! whole pipeline together.
//!
//! # Pipeline Architecture
//!
//! ```text
//! pose.jsonl ──► SpeedSeries ──► Activity ──► Intervals ──┐
//!                                                         ├── extract (per interval)
//! source.mp4 ─────────────────────────────────────────────┘         │
//!                                                                   ▼
//!                                                        concat (stream copy)
//!                                                                   │
//!                                                                   ▼
//!                                                               output.mp4
//! ```

pub mod assemble;
pub mod backend;
pub mod pipeline;

pub use assemble::{Assembly, AssemblyOutcome, ClipAssembler, SegmentResult};
pub use backend::{FfmpegBackend, VideoBackend, VideoInfo};
pub use pipeline::{
    load_pose_track, AnalysisReport, FpsSource, HighlightPipeline, RunOutcome, RunReport,
};
