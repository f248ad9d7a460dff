//! Zoomies Pose Model
//!
//! Defines the data contracts for pose-tracking input:
//! - **Frames:** per-frame landmark positions for one tracked subject
//! - **Tracks:** a header plus the ordered frame sequence, stored as JSONL
//! - **DeepLabCut import:** CSV exports converted into tracks
//! - **Readers:** the [`LandmarkReader`] capability analysis code consumes
//!
//! Coordinates are in source-video pixel space. A missing detection is
//! `None`, never a sentinel value.

pub mod dlc;
pub mod frame;
pub mod point;
pub mod reader;
pub mod track;

pub use frame::*;
pub use point::*;
pub use reader::*;
pub use track::*;
