//! Typed access to landmark positions.
//!
//! Analysis code reads pose data only through [`LandmarkReader`], so any
//! source format can feed the pipeline by implementing this trait.

use crate::frame::KeypointFrame;
use crate::point::Point2D;
use crate::track::PoseTrack;

/// Read-only access to a sequence of keypoint frames.
///
/// `position` arguments are sequence positions in `0..frame_count()`,
/// not video frame indices.
pub trait LandmarkReader {
    /// Number of frames in the sequence.
    fn frame_count(&self) -> usize;

    /// The landmark names available in every frame.
    fn landmark_names(&self) -> Vec<String>;

    /// Video frame index of the frame at `position`.
    fn frame_index(&self, position: usize) -> Option<u64>;

    /// Position of `landmark` in the frame at `position`, or `None` if it
    /// was not detected.
    fn landmark_at(&self, position: usize, landmark: &str) -> Option<Point2D>;

    /// Whether `landmark` is part of the landmark set.
    fn has_landmark(&self, landmark: &str) -> bool {
        self.landmark_names().iter().any(|name| name == landmark)
    }

    /// Frame rate recorded alongside the data, if the source carries one.
    fn frame_rate(&self) -> Option<f64> {
        None
    }
}

impl LandmarkReader for [KeypointFrame] {
    fn frame_count(&self) -> usize {
        self.len()
    }

    fn landmark_names(&self) -> Vec<String> {
        self.first()
            .map(|frame| frame.landmarks.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn frame_index(&self, position: usize) -> Option<u64> {
        self.get(position).map(|frame| frame.index)
    }

    fn landmark_at(&self, position: usize, landmark: &str) -> Option<Point2D> {
        self.get(position)?.position(landmark)
    }

    fn has_landmark(&self, landmark: &str) -> bool {
        self.first()
            .map(|frame| frame.landmarks.contains_key(landmark))
            .unwrap_or(false)
    }
}

impl LandmarkReader for PoseTrack {
    fn frame_count(&self) -> usize {
        self.len()
    }

    fn landmark_names(&self) -> Vec<String> {
        self.header().landmarks.clone()
    }

    fn frame_index(&self, position: usize) -> Option<u64> {
        self.frames().frame_index(position)
    }

    fn landmark_at(&self, position: usize, landmark: &str) -> Option<Point2D> {
        self.frames().landmark_at(position, landmark)
    }

    fn has_landmark(&self, landmark: &str) -> bool {
        self.header().landmarks.iter().any(|name| name == landmark)
    }

    fn frame_rate(&self) -> Option<f64> {
        self.header().fps.filter(|fps| fps.is_finite() && *fps > 0.0)
    }
}
