use std::path::PathBuf;

use proptest::prelude::*;

use zoomies_common::config::{DetectionConfig, MergePolicy, WarmupPolicy};
use zoomies_pose_model::frame::KeypointFrame;
use zoomies_pose_model::track::{PoseTrack, PoseTrackHeader};
use zoomies_processing_core::activity::FlaggedFrame;
use zoomies_processing_core::highlights::HighlightDetector;
use zoomies_processing_core::intervals::{
    merge_first_match, merge_transitive, IntervalMerger, TimeInterval,
};

fn load_fixture_track() -> PoseTrack {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("sample-pose.jsonl");
    PoseTrack::load(path).expect("fixture track should load")
}

/// A nose that stays put except for one jump of `jump_px` into each frame
/// in `spikes`.
fn spike_track(frame_count: u64, spikes: &[u64], jump_px: f64) -> PoseTrack {
    let mut x = 100.0;
    let frames = (0..frame_count)
        .map(|i| {
            if spikes.contains(&i) {
                x += jump_px;
            }
            KeypointFrame::new(i).with("nose", Some((x, 50.0)))
        })
        .collect();
    PoseTrack::new(PoseTrackHeader::new(["nose"]), frames).expect("valid track")
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn still_subject_produces_nothing() {
    let track = spike_track(10, &[], 0.0);
    let analysis = HighlightDetector::with_defaults()
        .analyze(&track, 25.0)
        .unwrap();

    assert_eq!(analysis.speeds.len(), 9);
    assert!(analysis.speeds.iter().all(|s| s.speed == 0.0));
    assert!(analysis.activity.flagged.is_empty());
    assert!(analysis.intervals.is_empty());
}

#[test]
fn single_spike_yields_one_interval_around_it() {
    let track = spike_track(121, &[50], 20.0);
    let config = DetectionConfig {
        window_size: 5,
        std_multiplier: 0.5,
        buffer_duration_secs: 0.2,
        ..Default::default()
    };
    let analysis = HighlightDetector::new(config).analyze(&track, 25.0).unwrap();

    // The trailing window carries the spike for W samples.
    assert!(!analysis.activity.flagged.is_empty());
    assert!(analysis
        .activity
        .flagged
        .iter()
        .all(|f| (50..=54).contains(&f.frame)));
    assert_eq!(analysis.activity.flagged[0].frame, 50);

    assert_eq!(analysis.intervals.len(), 1);
    let interval = analysis.intervals[0];
    assert!(approx(interval.start_secs, 49.0 / 25.0 - 0.2));
    assert!(interval.contains(&TimeInterval::new(50.0 / 25.0 - 0.2, 50.0 / 25.0 + 0.2)));
    assert!(interval.end_secs <= 54.0 / 25.0 + 0.2 + 1e-9);
}

#[test]
fn close_spikes_merge_into_one_interval() {
    let track = spike_track(121, &[50, 52], 20.0);
    let config = DetectionConfig {
        window_size: 1,
        std_multiplier: 0.5,
        buffer_duration_secs: 0.2,
        ..Default::default()
    };
    let analysis = HighlightDetector::new(config).analyze(&track, 25.0).unwrap();

    let frames: Vec<u64> = analysis.activity.flagged.iter().map(|f| f.frame).collect();
    assert_eq!(frames, vec![50, 52]);
    assert_eq!(analysis.intervals.len(), 1);
    assert!(approx(analysis.intervals[0].start_secs, 49.0 / 25.0 - 0.2));
    assert!(approx(analysis.intervals[0].end_secs, 52.0 / 25.0 + 0.2));
}

#[test]
fn fixture_track_flags_the_dash() {
    let track = load_fixture_track();
    assert_eq!(track.len(), 60);
    assert_eq!(track.header().fps, Some(25.0));

    let analysis = HighlightDetector::with_defaults()
        .analyze(&track, 25.0)
        .unwrap();

    let frames: Vec<u64> = analysis.activity.flagged.iter().map(|f| f.frame).collect();
    assert_eq!(frames, vec![33, 34, 35, 36]);
    assert_eq!(analysis.intervals.len(), 1);
    assert!(approx(analysis.intervals[0].start_secs, 1.08));
    assert!(approx(analysis.intervals[0].end_secs, 1.64));
}

#[test]
fn fixture_analysis_is_deterministic() {
    let track = load_fixture_track();
    let config = DetectionConfig {
        warmup: WarmupPolicy::ZeroFill,
        merge_policy: MergePolicy::Transitive,
        std_multiplier: 1.0,
        ..Default::default()
    };
    let detector = HighlightDetector::new(config);
    let first = detector.analyze(&track, 25.0).unwrap();
    let second = detector.analyze(&track, 25.0).unwrap();
    assert_eq!(first, second);

    let flagged_json = serde_json::to_string(&first.activity.flagged).unwrap();
    assert_eq!(
        flagged_json,
        serde_json::to_string(&second.activity.flagged).unwrap()
    );
}

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

proptest! {
    #[test]
    fn prop_ascending_flags_merge_the_same_either_way(
        frames in prop::collection::btree_set(0u64..400, 0..40),
        buffer in 0.0f64..0.5,
    ) {
        let frames: Vec<u64> = frames.into_iter().collect();
        let first = IntervalMerger::new(25.0, buffer, MergePolicy::FirstMatch).unwrap();
        let transitive = IntervalMerger::new(25.0, buffer, MergePolicy::Transitive).unwrap();
        let input = flagged(&frames);
        prop_assert_eq!(first.merge(&input), transitive.merge(&input));
    }

    #[test]
    fn prop_every_padded_interval_is_covered(
        frames in prop::collection::vec(0u64..400, 0..40),
        buffer in 0.0f64..0.5,
    ) {
        let merger = IntervalMerger::new(30.0, buffer, MergePolicy::FirstMatch).unwrap();
        let padded: Vec<TimeInterval> =
            frames.iter().map(|&f| merger.padded_interval(f)).collect();

        for merged in [merge_first_match(&padded), merge_transitive(&padded)] {
            prop_assert!(merged.len() <= padded.len());
            for interval in &merged {
                prop_assert!(interval.start_secs >= 0.0);
                prop_assert!(interval.duration_secs() >= 0.0);
            }
            for p in &padded {
                prop_assert!(merged.iter().any(|m| m.contains(p)));
            }
        }
    }

    #[test]
    fn prop_transitive_output_is_disjoint(
        frames in prop::collection::vec(0u64..400, 0..40),
        buffer in 0.0f64..0.5,
    ) {
        let merger = IntervalMerger::new(25.0, buffer, MergePolicy::Transitive).unwrap();
        let merged = merger.merge(&flagged(&frames));
        for pair in merged.windows(2) {
            prop_assert!(pair[0].end_secs < pair[1].start_secs);
        }
    }
}
