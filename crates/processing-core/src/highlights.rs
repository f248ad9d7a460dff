//! Highlight detection: speed series → activity flags → merged intervals.

use zoomies_common::config::DetectionConfig;
use zoomies_common::error::ZoomiesResult;
use zoomies_pose_model::reader::LandmarkReader;

use crate::activity::{ActivityDetector, ActivityReport};
use crate::intervals::{sorted_by_start, IntervalMerger, TimeInterval};
use crate::speed::{SpeedSample, SpeedSeriesBuilder};

/// Everything the detection stages produced for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightAnalysis {
    pub fps: f64,
    /// Landmarks that fed the speed series.
    pub landmarks: Vec<String>,
    pub speeds: Vec<SpeedSample>,
    pub activity: ActivityReport,
    /// Merged intervals in the order the merger produced them.
    pub intervals: Vec<TimeInterval>,
}

impl HighlightAnalysis {
    /// Intervals in ascending start order, as clips are cut.
    pub fn intervals_by_start(&self) -> Vec<TimeInterval> {
        sorted_by_start(&self.intervals)
    }

    pub fn has_activity(&self) -> bool {
        !self.activity.flagged.is_empty()
    }

    /// Total footage covered by the intervals, in seconds.
    pub fn highlight_secs(&self) -> f64 {
        self.intervals.iter().map(TimeInterval::duration_secs).sum()
    }
}

/// Runs the detection stages of the pipeline with one configuration.
#[derive(Debug, Clone)]
pub struct HighlightDetector {
    config: DetectionConfig,
}

impl HighlightDetector {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(DetectionConfig::default())
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Analyze a pose sequence recorded at `fps`.
    pub fn analyze<R>(&self, reader: &R, fps: f64) -> ZoomiesResult<HighlightAnalysis>
    where
        R: LandmarkReader + ?Sized,
    {
        let builder = match &self.config.bodyparts {
            Some(parts) => SpeedSeriesBuilder::new(parts.iter().cloned(), fps)?,
            None => SpeedSeriesBuilder::for_all_landmarks(reader, fps)?,
        };
        let detector = ActivityDetector::from_config(&self.config)?;
        let merger = IntervalMerger::from_config(fps, &self.config)?;

        let speeds = builder.build(reader)?;
        let activity = detector.detect(&speeds);
        let intervals = merger.merge(&activity.flagged);

        tracing::info!(
            frames = reader.frame_count(),
            landmarks = builder.landmarks().len(),
            flagged = activity.flagged.len(),
            intervals = intervals.len(),
            threshold = activity.threshold.threshold,
            "Highlight analysis complete"
        );

        Ok(HighlightAnalysis {
            fps,
            landmarks: builder.landmarks().to_vec(),
            speeds,
            activity,
            intervals,
        })
    }
}
