//! Padded time intervals around flagged frames, and their merging.
//!
//! Each flagged frame `f` covers the transition into it:
//! `[max(0, (f - 1) / fps - B), f / fps + B]` for padding `B`.

use serde::Serialize;

use zoomies_common::config::{DetectionConfig, MergePolicy};
use zoomies_common::error::{PipelineStage, ZoomiesError, ZoomiesResult};
use zoomies_common::timebase::FrameClock;

use crate::activity::FlaggedFrame;

/// A closed time range in seconds, `start_secs <= end_secs`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeInterval {
    pub start_secs: f64,
    pub end_secs: f64,
}

impl TimeInterval {
    pub fn new(start_secs: f64, end_secs: f64) -> Self {
        Self {
            start_secs,
            end_secs,
        }
    }

    pub fn duration_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }

    /// Closed-interval overlap; touching intervals overlap.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start_secs <= other.end_secs && self.end_secs >= other.start_secs
    }

    /// Smallest interval covering both.
    pub fn union(&self, other: &TimeInterval) -> TimeInterval {
        TimeInterval {
            start_secs: self.start_secs.min(other.start_secs),
            end_secs: self.end_secs.max(other.end_secs),
        }
    }

    pub fn contains(&self, other: &TimeInterval) -> bool {
        self.start_secs <= other.start_secs && self.end_secs >= other.end_secs
    }
}

/// Converts flagged frames into merged time intervals.
#[derive(Debug, Clone)]
pub struct IntervalMerger {
    clock: FrameClock,
    buffer_secs: f64,
    policy: MergePolicy,
}

impl IntervalMerger {
    pub fn new(fps: f64, buffer_secs: f64, policy: MergePolicy) -> ZoomiesResult<Self> {
        let clock = FrameClock::new(fps).ok_or_else(|| {
            ZoomiesError::invalid_input(
                PipelineStage::IntervalMerge,
                format!("frame rate must be positive, got {fps}"),
            )
        })?;
        if !buffer_secs.is_finite() || buffer_secs < 0.0 {
            return Err(ZoomiesError::invalid_input(
                PipelineStage::IntervalMerge,
                format!("buffer duration must be non-negative, got {buffer_secs}"),
            ));
        }
        Ok(Self {
            clock,
            buffer_secs,
            policy,
        })
    }

    pub fn from_config(fps: f64, config: &DetectionConfig) -> ZoomiesResult<Self> {
        Self::new(fps, config.buffer_duration_secs, config.merge_policy)
    }

    /// Padded interval for a single flagged frame.
    ///
    /// Starts at the previous frame so the motion leading into `frame` is
    /// included. The start never goes below 0.
    pub fn padded_interval(&self, frame: u64) -> TimeInterval {
        let previous_secs = (frame as f64 - 1.0) / self.clock.fps();
        TimeInterval {
            start_secs: (previous_secs - self.buffer_secs).max(0.0),
            end_secs: self.clock.secs_at(frame) + self.buffer_secs,
        }
    }

    /// Merge the padded intervals of `flagged`, processed in the given order.
    pub fn merge(&self, flagged: &[FlaggedFrame]) -> Vec<TimeInterval> {
        let padded: Vec<TimeInterval> = flagged
            .iter()
            .map(|f| self.padded_interval(f.frame))
            .collect();

        let merged = match self.policy {
            MergePolicy::FirstMatch => merge_first_match(&padded),
            MergePolicy::Transitive => merge_transitive(&padded),
        };

        tracing::debug!(
            flagged = flagged.len(),
            intervals = merged.len(),
            policy = ?self.policy,
            "Merged flagged frames into intervals"
        );

        merged
    }
}

/// Merge each interval into the first existing interval it overlaps.
///
/// A union that comes to bridge a later interval does not absorb it in the
/// same pass, so the result can hold two overlapping intervals when the
/// input is not in time order. Output is in production order.
pub fn merge_first_match(intervals: &[TimeInterval]) -> Vec<TimeInterval> {
    let mut merged: Vec<TimeInterval> = Vec::new();
    for interval in intervals {
        match merged.iter_mut().find(|existing| interval.overlaps(existing)) {
            Some(existing) => *existing = existing.union(interval),
            None => merged.push(*interval),
        }
    }
    merged
}

/// Sort by start and sweep, merging every chain of overlaps.
pub fn merge_transitive(intervals: &[TimeInterval]) -> Vec<TimeInterval> {
    let mut merged: Vec<TimeInterval> = Vec::with_capacity(intervals.len());
    for interval in sorted_by_start(intervals) {
        match merged.last_mut() {
            Some(last) if interval.start_secs <= last.end_secs => {
                last.end_secs = last.end_secs.max(interval.end_secs);
            }
            _ => merged.push(interval),
        }
    }
    merged
}

/// Intervals in ascending start order (ties by end).
pub fn sorted_by_start(intervals: &[TimeInterval]) -> Vec<TimeInterval> {
    let mut sorted = intervals.to_vec();
    sorted.sort_by(|a, b| {
        a.start_secs
            .total_cmp(&b.start_secs)
            .then(a.end_secs.total_cmp(&b.end_secs))
    });
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flagged(frames: &[u64]) -> Vec<FlaggedFrame> {
        frames
            .iter()
            .map(|&frame| FlaggedFrame {
                frame,
                smoothed_speed: 1.0,
                reason: "Speed: 1.00".to_string(),
            })
            .collect()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_padded_interval_covers_transition() {
        let merger = IntervalMerger::new(25.0, 0.2, MergePolicy::FirstMatch).unwrap();
        let interval = merger.padded_interval(50);
        assert!(approx(interval.start_secs, 49.0 / 25.0 - 0.2));
        assert!(approx(interval.end_secs, 50.0 / 25.0 + 0.2));
    }

    #[test]
    fn test_first_frame_clamps_to_zero() {
        let merger = IntervalMerger::new(25.0, 0.2, MergePolicy::FirstMatch).unwrap();
        let interval = merger.padded_interval(1);
        assert_eq!(interval.start_secs, 0.0);
        assert!(approx(interval.end_secs, 0.24));

        let zero = merger.padded_interval(0);
        assert_eq!(zero.start_secs, 0.0);
        assert!(approx(zero.end_secs, 0.2));
    }

    #[test]
    fn test_zero_buffer_keeps_single_frame_window() {
        let merger = IntervalMerger::new(10.0, 0.0, MergePolicy::FirstMatch).unwrap();
        let interval = merger.padded_interval(5);
        assert!(approx(interval.start_secs, 0.4));
        assert!(approx(interval.end_secs, 0.5));
    }

    #[test]
    fn test_nearby_spikes_merge() {
        let merger = IntervalMerger::new(25.0, 0.2, MergePolicy::FirstMatch).unwrap();
        let merged = merger.merge(&flagged(&[50, 52]));
        assert_eq!(merged.len(), 1);
        assert!(approx(merged[0].start_secs, 49.0 / 25.0 - 0.2));
        assert!(approx(merged[0].end_secs, 52.0 / 25.0 + 0.2));
    }

    #[test]
    fn test_distant_spikes_stay_apart() {
        let merger = IntervalMerger::new(25.0, 0.2, MergePolicy::FirstMatch).unwrap();
        let merged = merger.merge(&flagged(&[50, 200]));
        assert_eq!(merged.len(), 2);
        assert!(merged[0].end_secs < merged[1].start_secs);
    }

    #[test]
    fn test_touching_intervals_merge() {
        let a = TimeInterval::new(0.0, 1.0);
        let b = TimeInterval::new(1.0, 2.0);
        assert_eq!(merge_first_match(&[a, b]), vec![TimeInterval::new(0.0, 2.0)]);
        assert_eq!(merge_transitive(&[a, b]), vec![TimeInterval::new(0.0, 2.0)]);
    }

    #[test]
    fn test_first_match_does_not_retry_bridges() {
        let a = TimeInterval::new(0.0, 1.0);
        let b = TimeInterval::new(2.0, 3.0);
        let bridge = TimeInterval::new(0.5, 2.5);

        let first_match = merge_first_match(&[a, b, bridge]);
        assert_eq!(
            first_match,
            vec![TimeInterval::new(0.0, 2.5), TimeInterval::new(2.0, 3.0)]
        );

        let transitive = merge_transitive(&[a, b, bridge]);
        assert_eq!(transitive, vec![TimeInterval::new(0.0, 3.0)]);
    }

    #[test]
    fn test_first_match_keeps_production_order() {
        let late = TimeInterval::new(5.0, 6.0);
        let early = TimeInterval::new(1.0, 2.0);
        let merged = merge_first_match(&[late, early]);
        assert_eq!(merged, vec![late, early]);
        assert_eq!(sorted_by_start(&merged), vec![early, late]);
    }

    #[test]
    fn test_empty_input() {
        let merger = IntervalMerger::new(25.0, 0.2, MergePolicy::Transitive).unwrap();
        assert!(merger.merge(&[]).is_empty());
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        assert!(IntervalMerger::new(0.0, 0.2, MergePolicy::FirstMatch).is_err());
        assert!(IntervalMerger::new(25.0, -0.1, MergePolicy::FirstMatch).is_err());
        let err = IntervalMerger::new(25.0, f64::INFINITY, MergePolicy::FirstMatch).unwrap_err();
        assert_eq!(err.stage(), Some(PipelineStage::IntervalMerge));
    }

    #[test]
    fn test_interval_helpers() {
        let a = TimeInterval::new(1.0, 3.0);
        let b = TimeInterval::new(2.0, 2.5);
        assert!(a.contains(&b));
        assert!(!b.contains(&a));
        assert!(a.overlaps(&b));
        assert!(approx(a.duration_secs(), 2.0));
    }
}
