//! Integration tests for the mapping pipeline.
//!
//! These tests exercise wall-mapper end-to-end: `MappingSession` with the
//! JSON store on a temporary directory, and `CaptureCycle` driven by the
//! scripted frame source and recorded detector.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use uuid::Uuid;
use wall_core::{DetectedMarker, Detection, Device, Point, ScreenProgress, Slot, Transform};
use wall_mapper::application::capture_cycle::{CaptureCycle, CaptureSettings};
use wall_mapper::application::mapping_session::MappingSession;
use wall_mapper::application::narrate_status::StatusMessage;
use wall_mapper::application::reconcile_assignment::AssignmentOutcome;
use wall_mapper::infrastructure::capture::scripted::ScriptedFrameSource;
use wall_mapper::infrastructure::detector::recorded::RecordedDetector;
use wall_mapper::infrastructure::storage::mapping_store::{load_mapping, JsonMappingStore};

// ── Helpers ───────────────────────────────────────────────────────────────────

const NO_DELAY: CaptureSettings = CaptureSettings {
    initial_delay: Duration::ZERO,
    interval: Duration::ZERO,
    resume_delay: Duration::ZERO,
};

fn scratch_file() -> (PathBuf, PathBuf) {
    let dir = std::env::temp_dir().join(format!("wall_it_{}", Uuid::new_v4()));
    let file = dir.join("mapping.json");
    (dir, file)
}

fn assigned(serials: &[&str]) -> Vec<Device> {
    serials
        .iter()
        .map(|s| Device {
            serial: s.to_string(),
            assigned: true,
        })
        .collect()
}

fn marker(id: u32, coefficient: f64) -> DetectedMarker {
    DetectedMarker {
        id,
        corners: [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ],
        transform: Transform::Matrix([coefficient; 9]),
    }
}

fn open_session(path: &Path) -> MappingSession {
    let config = load_mapping(path).expect("load mapping");
    MappingSession::new(config, Box::new(JsonMappingStore::new(path)))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn test_mapping_survives_restart_through_json_store() {
    // Arrange
    let (dir, path) = scratch_file();
    let mut session = open_session(&path);
    session.observe_assignment(&assigned(&["B", "A"]));
    session.acknowledge_save();

    // Act
    let result = session.merge(&Detection {
        width: 1000,
        height: 800,
        markers: vec![marker(1, 1.0), marker(130, 2.0)],
    });
    let reopened = open_session(&path);

    // Assert
    assert_eq!(result.added_count, 2);
    let screens = &reopened.config().screens;
    assert_eq!(screens.serials().collect::<Vec<_>>(), vec!["A", "B"]);
    assert!(screens.get("A").unwrap().transform(Slot::Primary).is_set());
    assert!(screens.get("B").unwrap().transform(Slot::Secondary).is_set());
    assert_eq!(reopened.config().snapshot().width, 1000);

    // Cleanup
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_reassignment_discards_previous_mapping() {
    let (dir, path) = scratch_file();
    let mut session = open_session(&path);
    session.observe_assignment(&assigned(&["A", "B"]));
    session.merge(&Detection {
        width: 640,
        height: 480,
        markers: vec![marker(1, 1.0), marker(2, 1.0)],
    });

    let outcome = session.observe_assignment(&assigned(&["A", "C"]));

    assert_eq!(outcome, AssignmentOutcome::Changed);
    assert_eq!(session.status(), &StatusMessage::AssignmentChanged);
    let reopened = open_session(&path);
    assert_eq!(reopened.config().screens.serials().collect::<Vec<_>>(), vec!["A", "C"]);
    assert_eq!(reopened.config().screens.count_configured(), 0);
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_new_resolution_keeps_only_the_latest_picture() {
    let (dir, path) = scratch_file();
    let mut session = open_session(&path);
    session.observe_assignment(&assigned(&["A", "B"]));
    session.acknowledge_save();
    session.merge(&Detection {
        width: 1000,
        height: 800,
        markers: vec![marker(1, 1.0), marker(2, 1.0), marker(129, 1.0)],
    });

    let second = session.merge(&Detection {
        width: 1280,
        height: 720,
        markers: vec![marker(130, 3.0)],
    });

    assert!(second.resolution_changed);
    assert_eq!(session.config().screens.count_configured(), second.added_count);
    assert_eq!(
        session.status(),
        &StatusMessage::ResolutionResetMapped { added: 1 }
    );
    assert_eq!(
        session.progress(),
        vec![
            ("A".to_string(), ScreenProgress::NotMapped),
            ("B".to_string(), ScreenProgress::OneDisplay),
        ]
    );
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_out_of_range_markers_leave_mapping_unchanged() {
    let (dir, path) = scratch_file();
    let mut session = open_session(&path);
    session.observe_assignment(&assigned(&["A", "B"]));
    session.acknowledge_save();
    session.merge(&Detection {
        width: 800,
        height: 600,
        markers: vec![marker(1, 1.0)],
    });

    let result = session.merge(&Detection {
        width: 800,
        height: 600,
        markers: [3u32, 50, 127, 128, 131, 255].map(|id| marker(id, 5.0)).to_vec(),
    });

    assert_eq!(result.added_count, 0);
    assert_eq!(result.ignored_count, 6);
    assert_eq!(session.status(), &StatusMessage::NoNewSlots { detected: 6 });
    let reopened = open_session(&path);
    assert_eq!(reopened.config().screens.count_configured(), 1);
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_replay_maps_wall_from_recorded_detections() {
    // Arrange
    let (dir, path) = scratch_file();
    let mut session = open_session(&path);
    session.observe_assignment(&assigned(&["A", "B"]));
    session.acknowledge_save();

    let recordings = [
        Detection {
            width: 800,
            height: 600,
            markers: vec![marker(1, 1.0)],
        },
        Detection {
            width: 800,
            height: 600,
            markers: vec![],
        },
        Detection {
            width: 800,
            height: 600,
            markers: vec![marker(2, 1.0), marker(129, 1.0), marker(130, 1.0), marker(7, 1.0)],
        },
    ];
    let detector = RecordedDetector::new(recordings);
    let source = ScriptedFrameSource::new(detector.frame_dimensions());
    let mut cycle = CaptureCycle::new(source, detector);
    let shared = Arc::new(Mutex::new(session));

    // Act
    let cycles = cycle.run(Arc::clone(&shared), NO_DELAY, None).await.expect("replay");

    // Assert
    assert_eq!(cycles, 3);
    let session = shared.lock().await;
    assert_eq!(session.config().screens.count_configured(), 4);
    assert_eq!(session.status(), &StatusMessage::CaptureStopped);
    assert_eq!(load_mapping(&path).unwrap().screens.count_configured(), 4);
    drop(session);
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_starting_capture_resumes_detection_after_reset() {
    let (dir, path) = scratch_file();
    let mut session = open_session(&path);
    session.observe_assignment(&assigned(&["A"]));
    session.reset_mapping();
    assert!(session.detection_paused());

    let detector = RecordedDetector::new([Detection {
        width: 320,
        height: 240,
        markers: vec![marker(1, 1.0)],
    }]);
    let source = ScriptedFrameSource::new([(320, 240)]);
    let mut cycle = CaptureCycle::new(source, detector);
    let shared = Arc::new(Mutex::new(session));

    let cycles = cycle.run(Arc::clone(&shared), NO_DELAY, Some(1)).await.unwrap();

    assert_eq!(cycles, 1);
    let session = shared.lock().await;
    assert!(!session.detection_paused());
    assert_eq!(session.config().screens.count_configured(), 1);
    drop(session);
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_replay_with_denied_camera_leaves_mapping_untouched() {
    let (dir, path) = scratch_file();
    let mut session = open_session(&path);
    session.observe_assignment(&assigned(&["A"]));

    let mut cycle = CaptureCycle::new(
        ScriptedFrameSource::denied("permission denied"),
        RecordedDetector::new([]),
    );
    let shared = Arc::new(Mutex::new(session));

    let result = cycle.run(Arc::clone(&shared), NO_DELAY, None).await;

    assert!(result.is_err());
    let session = shared.lock().await;
    assert!(matches!(
        session.status(),
        StatusMessage::CaptureUnavailable { reason } if reason.contains("permission denied")
    ));
    assert_eq!(session.config().screens.count_configured(), 0);
    drop(session);
    std::fs::remove_dir_all(&dir).ok();
}
