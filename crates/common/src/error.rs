//! Error types shared across Zoomies crates.

use std::fmt;
use std::path::PathBuf;

/// Stage of the highlight pipeline an error originated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    SpeedSeries,
    ActivityDetection,
    IntervalMerge,
    ClipAssembly,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SpeedSeries => "speed series",
            Self::ActivityDetection => "activity detection",
            Self::IntervalMerge => "interval merge",
            Self::ClipAssembly => "clip assembly",
        };
        f.write_str(name)
    }
}

/// Top-level error type for Zoomies operations.
#[derive(Debug, thiserror::Error)]
pub enum ZoomiesError {
    /// Malformed or insufficient input to a stage. Fatal to the run.
    #[error("Invalid input to {stage}: {message}")]
    InvalidInput {
        stage: PipelineStage,
        message: String,
    },

    /// The source video could not yield footage for one interval.
    #[error("Extraction of {start_secs:.3}s..{end_secs:.3}s failed: {message}")]
    Extraction {
        start_secs: f64,
        end_secs: f64,
        message: String,
    },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Pose data error: {message}")]
    PoseData { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using ZoomiesError.
pub type ZoomiesResult<T> = Result<T, ZoomiesError>;

impl ZoomiesError {
    pub fn invalid_input(stage: PipelineStage, msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            stage,
            message: msg.into(),
        }
    }

    pub fn extraction(start_secs: f64, end_secs: f64, msg: impl Into<String>) -> Self {
        Self::Extraction {
            start_secs,
            end_secs,
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn pose_data(msg: impl Into<String>) -> Self {
        Self::PoseData {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }

    /// The pipeline stage this error belongs to, when it has one.
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            Self::InvalidInput { stage, .. } => Some(*stage),
            Self::Extraction { .. } | Self::Render { .. } => Some(PipelineStage::ClipAssembly),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_names_stage() {
        let err = ZoomiesError::invalid_input(PipelineStage::SpeedSeries, "need at least 2 frames");
        assert_eq!(
            err.to_string(),
            "Invalid input to speed series: need at least 2 frames"
        );
        assert_eq!(err.stage(), Some(PipelineStage::SpeedSeries));
    }

    #[test]
    fn test_extraction_message_carries_bounds() {
        let err = ZoomiesError::extraction(1.5, 2.25, "past end of video");
        assert_eq!(
            err.to_string(),
            "Extraction of 1.500s..2.250s failed: past end of video"
        );
        assert_eq!(err.stage(), Some(PipelineStage::ClipAssembly));
    }

    #[test]
    fn test_io_error_has_no_stage() {
        let err: ZoomiesError = std::io::Error::other("disk full").into();
        assert!(err.stage().is_none());
    }
}
