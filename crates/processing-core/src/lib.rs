//! Zoomies Processing Core — highlight detection
//!
//! Turns pose-tracking data into the time windows worth keeping:
//! - **Speed series:** landmark-averaged displacement per second
//! - **Activity detection:** moving-average smoothing and an adaptive
//!   `mean + k * std` threshold
//! - **Interval merging:** padded windows around flagged frames, merged
//!
//! This crate is pure computation — no I/O, no video dependencies.
//! All inputs are data; all outputs are data.

pub mod activity;
pub mod highlights;
pub mod intervals;
pub mod speed;

pub use activity::{ActivityDetector, ActivityReport, ActivityThreshold, FlaggedFrame};
pub use highlights::{HighlightAnalysis, HighlightDetector};
pub use intervals::{IntervalMerger, TimeInterval};
pub use speed::{SpeedSample, SpeedSeriesBuilder};
