//! Adaptive activity detection.
//!
//! # Algorithm
//!
//! 1. **Smooth** the speed series with a trailing moving average of `W`
//!    samples. Positions before the first full window follow the
//!    configured [`WarmupPolicy`].
//! 2. **Threshold** at `mean + k * std` of the smoothed series
//!    (population standard deviation).
//! 3. **Flag** every sample whose smoothed speed is strictly above the
//!    threshold.

use serde::Serialize;

use zoomies_common::config::{DetectionConfig, WarmupPolicy};
use zoomies_common::error::{PipelineStage, ZoomiesError, ZoomiesResult};

use crate::speed::SpeedSample;

/// A frame whose smoothed speed exceeded the activity threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlaggedFrame {
    pub frame: u64,
    /// Smoothed speed at this frame.
    pub smoothed_speed: f64,
    /// Human-readable reason, e.g. `"Speed: 412.07"`.
    pub reason: String,
}

/// Statistics behind the adaptive threshold of one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActivityThreshold {
    pub mean: f64,
    pub std_dev: f64,
    pub std_multiplier: f64,
    pub threshold: f64,
}

/// Output of [`ActivityDetector::detect`].
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityReport {
    /// Smoothed speed, one value per input sample.
    pub smoothed: Vec<f64>,
    pub threshold: ActivityThreshold,
    /// Flagged frames in increasing frame order.
    pub flagged: Vec<FlaggedFrame>,
}

/// Flags frames of unusually high motion.
#[derive(Debug, Clone)]
pub struct ActivityDetector {
    window_size: usize,
    std_multiplier: f64,
    warmup: WarmupPolicy,
}

impl ActivityDetector {
    pub fn new(
        window_size: usize,
        std_multiplier: f64,
        warmup: WarmupPolicy,
    ) -> ZoomiesResult<Self> {
        if window_size == 0 {
            return Err(ZoomiesError::invalid_input(
                PipelineStage::ActivityDetection,
                "window size must be at least 1",
            ));
        }
        if !std_multiplier.is_finite() || std_multiplier < 0.0 {
            return Err(ZoomiesError::invalid_input(
                PipelineStage::ActivityDetection,
                format!("std multiplier must be non-negative, got {std_multiplier}"),
            ));
        }
        Ok(Self {
            window_size,
            std_multiplier,
            warmup,
        })
    }

    pub fn from_config(config: &DetectionConfig) -> ZoomiesResult<Self> {
        Self::new(config.window_size, config.std_multiplier, config.warmup)
    }

    /// Smooth the series, compute the threshold, and flag frames above it.
    pub fn detect(&self, samples: &[SpeedSample]) -> ActivityReport {
        let speeds: Vec<f64> = samples.iter().map(|s| s.speed).collect();
        let smoothed = moving_average(&speeds, self.window_size, self.warmup);
        let (mean, std_dev) = mean_and_std(&smoothed);
        let threshold = mean + self.std_multiplier * std_dev;

        let flagged: Vec<FlaggedFrame> = samples
            .iter()
            .zip(&smoothed)
            .filter(|&(_, &value)| value > threshold)
            .map(|(sample, &value)| FlaggedFrame {
                frame: sample.frame,
                smoothed_speed: value,
                reason: format!("Speed: {value:.2}"),
            })
            .collect();

        tracing::debug!(
            samples = samples.len(),
            mean,
            std_dev,
            threshold,
            flagged = flagged.len(),
            "Activity threshold computed"
        );

        ActivityReport {
            smoothed,
            threshold: ActivityThreshold {
                mean,
                std_dev,
                std_multiplier: self.std_multiplier,
                threshold,
            },
            flagged,
        }
    }
}

/// Trailing moving average over `window` samples.
///
/// Positions with fewer than `window` samples available are 0.0 under
/// [`WarmupPolicy::ZeroFill`] and the mean of the samples so far under
/// [`WarmupPolicy::PartialWindow`].
pub fn moving_average(values: &[f64], window: usize, warmup: WarmupPolicy) -> Vec<f64> {
    if window == 0 {
        return values.to_vec();
    }

    (0..values.len())
        .map(|i| {
            let available = i + 1;
            if available < window {
                match warmup {
                    WarmupPolicy::ZeroFill => 0.0,
                    WarmupPolicy::PartialWindow => {
                        values[..available].iter().sum::<f64>() / available as f64
                    }
                }
            } else {
                values[available - window..available].iter().sum::<f64>() / window as f64
            }
        })
        .collect()
}

/// Mean and population standard deviation.
///
/// An empty slice yields `(0.0, 0.0)`. A slice of identical values yields
/// that value and exactly 0.0, so a flat series never flags itself through
/// rounding error.
pub fn mean_and_std(values: &[f64]) -> (f64, f64) {
    let Some(&first) = values.first() else {
        return (0.0, 0.0);
    };
    if values.iter().all(|&v| v == first) {
        return (first, 0.0);
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}
