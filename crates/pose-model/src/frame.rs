//! Per-frame landmark positions for one tracked subject.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::point::Point2D;

/// Landmark positions of the tracked subject at one video frame.
///
/// A landmark maps to `None` when the pose model produced no detection for
/// it in this frame. Serialized as one JSONL line:
/// `{"frame":12,"landmarks":{"nose":{"x":10.0,"y":4.5},"tail_base":null}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeypointFrame {
    /// Video frame index.
    #[serde(rename = "frame")]
    pub index: u64,

    /// Landmark name to position, or `None` if missing.
    pub landmarks: BTreeMap<String, Option<Point2D>>,
}

impl KeypointFrame {
    /// Create a frame with no landmarks.
    pub fn new(index: u64) -> Self {
        Self {
            index,
            landmarks: BTreeMap::new(),
        }
    }

    /// Builder-style helper to set a landmark position.
    pub fn with(mut self, landmark: impl Into<String>, position: Option<(f64, f64)>) -> Self {
        self.landmarks
            .insert(landmark.into(), position.map(|(x, y)| Point2D::new(x, y)));
        self
    }

    /// Position of a landmark if it was detected with finite coordinates.
    pub fn position(&self, landmark: &str) -> Option<Point2D> {
        self.landmarks
            .get(landmark)
            .copied()
            .flatten()
            .filter(Point2D::is_finite)
    }

    /// Names of all landmarks carried by this frame, in sorted order.
    pub fn landmark_names(&self) -> impl Iterator<Item = &str> {
        self.landmarks.keys().map(String::as_str)
    }

    /// Number of landmarks with a usable position.
    pub fn detected_count(&self) -> usize {
        self.landmarks
            .keys()
            .filter(|name| self.position(name).is_some())
            .count()
    }
}
