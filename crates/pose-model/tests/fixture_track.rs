use std::path::PathBuf;

use zoomies_pose_model::{LandmarkReader, PoseTrack};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("sample-pose.jsonl")
}

#[test]
fn fixture_track_loads_with_header_metadata() {
    let track = PoseTrack::load(fixture_path()).expect("fixture track should load");

    assert_eq!(track.len(), 60);
    assert_eq!(track.header().individual, "dog0");
    assert_eq!(track.header().source_video.as_deref(), Some("sample.mp4"));
    assert_eq!(track.frame_rate(), Some(25.0));
    assert_eq!(track.landmark_names(), vec!["left_ear", "nose", "tail_base"]);
    assert_eq!(track.frame_index(59), Some(59));
}

#[test]
fn fixture_coverage_counts_dropped_detections() {
    let track = PoseTrack::load(fixture_path()).expect("fixture track should load");
    let missing: Vec<(String, usize)> = track
        .coverage()
        .into_iter()
        .map(|c| (c.landmark, c.missing))
        .collect();

    assert_eq!(
        missing,
        vec![
            ("left_ear".to_string(), 1),
            ("nose".to_string(), 0),
            ("tail_base".to_string(), 3),
        ]
    );
    assert_eq!(track.landmark_at(12, "tail_base"), None);
    assert!(track.landmark_at(12, "nose").is_some());
}

#[test]
fn fixture_survives_save_and_reload() {
    let track = PoseTrack::load(fixture_path()).expect("fixture track should load");
    let dir = tempfile::tempdir().unwrap();
    let copy = dir.path().join("copy.jsonl");

    track.save(&copy).unwrap();
    assert_eq!(PoseTrack::load(&copy).unwrap(), track);
}
