//! Pose tracks: a header plus one [`KeypointFrame`] per video frame.
//!
//! The on-disk format is JSONL. Blank lines and lines starting with `#`
//! are ignored. The first data line is the [`PoseTrackHeader`]; every
//! following line is a frame.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::frame::KeypointFrame;

/// Current pose-track schema version.
pub const POSE_TRACK_SCHEMA_VERSION: &str = "1.0";

/// Metadata describing a pose track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseTrackHeader {
    /// Schema version for forward compatibility.
    pub schema_version: String,

    /// Name of the pose model that produced the track.
    #[serde(default)]
    pub scorer: String,

    /// Identifier of the tracked subject. Only one subject per track.
    #[serde(default = "default_individual")]
    pub individual: String,

    /// Landmark names carried by every frame.
    pub landmarks: Vec<String>,

    /// Frame rate of the source video, when the exporter knew it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,

    /// Source video the track was computed from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_video: Option<String>,
}

fn default_individual() -> String {
    "animal0".to_string()
}

impl PoseTrackHeader {
    pub fn new<I, S>(landmarks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            schema_version: POSE_TRACK_SCHEMA_VERSION.to_string(),
            scorer: String::new(),
            individual: default_individual(),
            landmarks: landmarks.into_iter().map(Into::into).collect(),
            fps: None,
            source_video: None,
        }
    }
}

/// A validated pose track for a single subject.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseTrack {
    header: PoseTrackHeader,
    frames: Vec<KeypointFrame>,
}

/// Per-landmark detection coverage.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkCoverage {
    pub landmark: String,
    pub detected: usize,
    pub missing: usize,
}

impl LandmarkCoverage {
    /// Fraction of frames in which the landmark is missing.
    pub fn missing_ratio(&self) -> f64 {
        let total = self.detected + self.missing;
        if total == 0 {
            0.0
        } else {
            self.missing as f64 / total as f64
        }
    }
}

impl PoseTrack {
    /// Build a track, checking frame ordering and the landmark set.
    pub fn new(header: PoseTrackHeader, frames: Vec<KeypointFrame>) -> Result<Self, PoseError> {
        let expected: BTreeSet<&str> = header.landmarks.iter().map(String::as_str).collect();
        if expected.len() != header.landmarks.len() {
            return Err(PoseError::ValidationError {
                message: "header lists a landmark more than once".to_string(),
            });
        }

        let mut previous: Option<u64> = None;
        for frame in &frames {
            if let Some(prev) = previous {
                if frame.index <= prev {
                    return Err(PoseError::ValidationError {
                        message: format!(
                            "frame indices must strictly increase (frame {} follows {})",
                            frame.index, prev
                        ),
                    });
                }
            }
            previous = Some(frame.index);

            let actual: BTreeSet<&str> = frame.landmark_names().collect();
            if actual != expected {
                let absent: Vec<&str> = expected.difference(&actual).copied().collect();
                let extra: Vec<&str> = actual.difference(&expected).copied().collect();
                return Err(PoseError::ValidationError {
                    message: format!(
                        "frame {} landmark set differs from header (absent: {:?}, unexpected: {:?})",
                        frame.index, absent, extra
                    ),
                });
            }
        }

        Ok(Self { header, frames })
    }

    /// Parse a track from JSONL content.
    pub fn parse(jsonl: &str) -> Result<Self, PoseError> {
        let mut header: Option<PoseTrackHeader> = None;
        let mut frames: Vec<KeypointFrame> = Vec::new();

        for (idx, line) in jsonl.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let line_no = idx + 1;
            if header.is_none() {
                header = Some(
                    serde_json::from_str(trimmed)
                        .map_err(|source| PoseError::ParseError { line: line_no, source })?,
                );
            } else {
                frames.push(
                    serde_json::from_str(trimmed)
                        .map_err(|source| PoseError::ParseError { line: line_no, source })?,
                );
            }
        }

        let header = header.ok_or_else(|| PoseError::ValidationError {
            message: "pose track has no header line".to_string(),
        })?;
        Self::new(header, frames)
    }

    /// Load a track from a JSONL file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PoseError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| PoseError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Serialize the track to JSONL.
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        let mut output = String::new();
        output.push_str(&serde_json::to_string(&self.header)?);
        output.push('\n');
        for frame in &self.frames {
            output.push_str(&serde_json::to_string(frame)?);
            output.push('\n');
        }
        Ok(output)
    }

    /// Write the track to a JSONL file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PoseError> {
        let path = path.as_ref();
        let content = self
            .to_jsonl()
            .map_err(|source| PoseError::SerializeError { source })?;
        std::fs::write(path, content).map_err(|source| PoseError::IoError {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn header(&self) -> &PoseTrackHeader {
        &self.header
    }

    pub fn frames(&self) -> &[KeypointFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Detection coverage for every landmark, in header order.
    pub fn coverage(&self) -> Vec<LandmarkCoverage> {
        self.header
            .landmarks
            .iter()
            .map(|landmark| {
                let detected = self
                    .frames
                    .iter()
                    .filter(|f| f.position(landmark).is_some())
                    .count();
                LandmarkCoverage {
                    landmark: landmark.clone(),
                    detected,
                    missing: self.frames.len() - detected,
                }
            })
            .collect()
    }
}

/// Errors that can occur when reading or writing pose tracks.
#[derive(Debug, thiserror::Error)]
pub enum PoseError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error on line {line}: {source}")]
    ParseError {
        line: usize,
        source: serde_json::Error,
    },

    #[error("CSV error on line {line}: {source}")]
    CsvError { line: usize, source: csv::Error },

    #[error("Serialization error: {source}")]
    SerializeError { source: serde_json::Error },

    #[error("Invalid pose track: {message}")]
    ValidationError { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_jsonl() -> &'static str {
        concat!(
            "# exported by dlc-export\n",
            "{\"schema_version\":\"1.0\",\"scorer\":\"superanimal_quadruped\",\"landmarks\":[\"nose\",\"tail_base\"],\"fps\":25.0}\n",
            "\n",
            "{\"frame\":0,\"landmarks\":{\"nose\":{\"x\":1.0,\"y\":1.0},\"tail_base\":null}}\n",
            "{\"frame\":1,\"landmarks\":{\"nose\":{\"x\":2.0,\"y\":1.0},\"tail_base\":{\"x\":0.0,\"y\":0.0}}}\n",
        )
    }

    #[test]
    fn test_parse_sample() {
        let track = PoseTrack::parse(sample_jsonl()).unwrap();
        assert_eq!(track.len(), 2);
        assert_eq!(track.header().individual, "animal0");
        assert_eq!(track.header().fps, Some(25.0));
        assert_eq!(track.frames()[1].index, 1);
    }

    #[test]
    fn test_jsonl_roundtrip() {
        let track = PoseTrack::parse(sample_jsonl()).unwrap();
        let jsonl = track.to_jsonl().unwrap();
        let reparsed = PoseTrack::parse(&jsonl).unwrap();
        assert_eq!(track, reparsed);
    }

    #[test]
    fn test_missing_header_is_rejected() {
        let err = PoseTrack::parse("# only a comment\n\n").unwrap_err();
        assert!(matches!(err, PoseError::ValidationError { .. }));
    }

    #[test]
    fn test_parse_error_reports_line() {
        let content = concat!(
            "{\"schema_version\":\"1.0\",\"landmarks\":[\"nose\"]}\n",
            "{\"frame\":0,\"landmarks\":{\"nose\":null}}\n",
            "{not json}\n",
        );
        match PoseTrack::parse(content).unwrap_err() {
            PoseError::ParseError { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_increasing_frames_rejected() {
        let header = PoseTrackHeader::new(["nose"]);
        let frames = vec![
            KeypointFrame::new(4).with("nose", None),
            KeypointFrame::new(4).with("nose", None),
        ];
        let err = PoseTrack::new(header, frames).unwrap_err();
        assert!(err.to_string().contains("strictly increase"));
    }

    #[test]
    fn test_landmark_set_must_match_header() {
        let header = PoseTrackHeader::new(["nose", "tail_base"]);
        let frames = vec![KeypointFrame::new(0).with("nose", Some((1.0, 1.0)))];
        let err = PoseTrack::new(header, frames).unwrap_err();
        assert!(err.to_string().contains("tail_base"));
    }

    #[test]
    fn test_duplicate_header_landmarks_rejected() {
        let header = PoseTrackHeader::new(["nose", "nose"]);
        assert!(PoseTrack::new(header, vec![]).is_err());
    }

    #[test]
    fn test_coverage() {
        let track = PoseTrack::parse(sample_jsonl()).unwrap();
        let coverage = track.coverage();
        assert_eq!(coverage.len(), 2);
        assert_eq!(coverage[0].landmark, "nose");
        assert_eq!(coverage[0].missing, 0);
        assert_eq!(coverage[1].landmark, "tail_base");
        assert_eq!(coverage[1].missing, 1);
        assert!((coverage[1].missing_ratio() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("track.jsonl");
        let track = PoseTrack::parse(sample_jsonl()).unwrap();
        track.save(&path).unwrap();
        assert_eq!(PoseTrack::load(&path).unwrap(), track);
    }

    #[test]
    fn test_load_missing_file() {
        let err = PoseTrack::load("/definitely/not/here.jsonl").unwrap_err();
        assert!(matches!(err, PoseError::IoError { .. }));
    }
}
