//! Speed series: landmark-averaged displacement per second between
//! consecutive frames.

use serde::Serialize;

use zoomies_common::error::{PipelineStage, ZoomiesError, ZoomiesResult};
use zoomies_common::timebase::FrameClock;
use zoomies_pose_model::reader::LandmarkReader;

/// Motion between frame `frame - 1` and `frame`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpeedSample {
    /// Index of the second frame of the pair.
    pub frame: u64,
    /// Average landmark displacement in pixels per second.
    /// 0.0 when no landmark is present in both frames.
    pub speed: f64,
}

/// Builds a [`SpeedSample`] series from keypoint frames.
#[derive(Debug, Clone)]
pub struct SpeedSeriesBuilder {
    landmarks: Vec<String>,
    clock: FrameClock,
}

impl SpeedSeriesBuilder {
    /// Track the given landmarks at `fps` frames per second.
    pub fn new<I, S>(landmarks: I, fps: f64) -> ZoomiesResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let clock = FrameClock::new(fps).ok_or_else(|| {
            ZoomiesError::invalid_input(
                PipelineStage::SpeedSeries,
                format!("frame rate must be positive, got {fps}"),
            )
        })?;

        let landmarks: Vec<String> = landmarks.into_iter().map(Into::into).collect();
        if landmarks.is_empty() {
            return Err(ZoomiesError::invalid_input(
                PipelineStage::SpeedSeries,
                "no landmarks selected",
            ));
        }

        Ok(Self { landmarks, clock })
    }

    /// Track every landmark the reader provides.
    pub fn for_all_landmarks<R>(reader: &R, fps: f64) -> ZoomiesResult<Self>
    where
        R: LandmarkReader + ?Sized,
    {
        Self::new(reader.landmark_names(), fps)
    }

    pub fn landmarks(&self) -> &[String] {
        &self.landmarks
    }

    pub fn fps(&self) -> f64 {
        self.clock.fps()
    }

    /// Compute one sample per consecutive frame pair.
    ///
    /// For `N` frames this returns `N - 1` samples.
    pub fn build<R>(&self, reader: &R) -> ZoomiesResult<Vec<SpeedSample>>
    where
        R: LandmarkReader + ?Sized,
    {
        let frame_count = reader.frame_count();
        if frame_count < 2 {
            return Err(ZoomiesError::invalid_input(
                PipelineStage::SpeedSeries,
                format!("need at least 2 frames, got {frame_count}"),
            ));
        }

        if let Some(unknown) = self.landmarks.iter().find(|l| !reader.has_landmark(l)) {
            return Err(ZoomiesError::invalid_input(
                PipelineStage::SpeedSeries,
                format!("landmark '{unknown}' is not present in the pose data"),
            ));
        }

        let mut samples = Vec::with_capacity(frame_count - 1);
        let mut empty_pairs = 0usize;

        for pos in 1..frame_count {
            let frame = reader.frame_index(pos).ok_or_else(|| {
                ZoomiesError::invalid_input(
                    PipelineStage::SpeedSeries,
                    format!("reader has no frame at position {pos}"),
                )
            })?;

            let mut total_displacement = 0.0;
            let mut valid_parts = 0usize;
            for landmark in &self.landmarks {
                let before = reader.landmark_at(pos - 1, landmark);
                let after = reader.landmark_at(pos, landmark);
                if let (Some(a), Some(b)) = (before, after) {
                    total_displacement += a.distance_to(&b);
                    valid_parts += 1;
                }
            }

            let speed = if valid_parts > 0 {
                total_displacement / valid_parts as f64 * self.clock.fps()
            } else {
                empty_pairs += 1;
                0.0
            };

            samples.push(SpeedSample { frame, speed });
        }

        tracing::debug!(
            samples = samples.len(),
            landmarks = self.landmarks.len(),
            empty_pairs,
            "Built speed series"
        );

        Ok(samples)
    }
}
