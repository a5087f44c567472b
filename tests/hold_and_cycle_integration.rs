//! Integration tests for time-based exercises
//!
//! Plank hold checks driven by the hold ticker, neck rotation cycle timing

use std::time::Duration;

use formcheck::core::submit::MemorySink;
use formcheck::core::synth::{demo_frames, neck_pose, plank_pose};
use formcheck::core::{Exercise, FrameRecord, NullUi, Replayer, SessionDriver};
use formcheck::types::{DiagnosticCode, ExerciseKind, LandmarkSet};
use pretty_assertions::assert_eq;

fn frames(poses: &[(u64, LandmarkSet)]) -> Vec<FrameRecord> {
    poses
        .iter()
        .map(|(t, pose)| FrameRecord {
            t_ms: *t as f64,
            landmarks: Some(pose.clone()),
        })
        .collect()
}

fn replay(kind: ExerciseKind, frames: Vec<FrameRecord>) -> SessionDriver {
    let mut driver = SessionDriver::new(Exercise::new(kind));
    let mut replayer = Replayer::new(Duration::from_millis(formcheck::HOLD_TICK_MS));
    driver.start();
    replayer
        .run(&mut driver, frames.into_iter().map(Ok), &mut NullUi)
        .unwrap();
    driver
}

#[test]
fn test_plank_five_checks_in_five_seconds() {
    let pose = plank_pose(175.0, 0.02);
    let poses: Vec<_> = (0..=50u64).map(|i| (i * 100, pose.clone())).collect();
    let driver = replay(ExerciseKind::Plank, frames(&poses));

    let agg = driver.aggregate();
    assert_eq!(agg.total_count, 5);
    assert_eq!(agg.correct_count, 5);
    assert_eq!(agg.hold_ms, 5000);
}

#[test]
fn test_plank_sparse_frames_fire_once_per_interval() {
    // A frame every 1.5 s: checks fire on the first frame past each boundary
    let pose = plank_pose(175.0, 0.02);
    let poses: Vec<_> = (0..=4u64).map(|i| (i * 1500, pose.clone())).collect();
    let driver = replay(ExerciseKind::Plank, frames(&poses));
    // Hold reaches 1.5, 3.0, 4.5, 6.0 seconds: intervals 1, 3, 4, 6
    assert_eq!(driver.aggregate().total_count, 4);
}

#[test]
fn test_plank_sagging_diagnostics() {
    let good = plank_pose(175.0, 0.02);
    let sag = plank_pose(140.0, 0.02);
    let poses: Vec<_> = (0..=30u64)
        .map(|i| (i * 100, if (15..25).contains(&i) { sag.clone() } else { good.clone() }))
        .collect();
    let mut driver = replay(ExerciseKind::Plank, frames(&poses));

    let agg = driver.aggregate().clone();
    assert_eq!((agg.total_count, agg.correct_count, agg.incorrect_count), (3, 2, 1));
    assert_eq!(agg.diagnostics.len(), 1);
    assert_eq!(agg.diagnostics[0].index, 2);
    assert_eq!(agg.diagnostics[0].message, "Body sagging at 2.0s");

    let result = driver.stop(&mut MemorySink::default()).unwrap();
    assert_eq!(result.time, Some(3.0));
    assert_eq!(result.score, 67);
}

fn neck_run(legs_ms: [u64; 3], last_offset: f64) -> SessionDriver {
    let mut t = 0;
    let mut poses = vec![(t, neck_pose(0.1))];
    for (ms, offset) in legs_ms.iter().zip([0.0, -0.1, last_offset]) {
        t += ms;
        poses.push((t, neck_pose(offset)));
    }
    replay(ExerciseKind::Neck, frames(&poses))
}

#[test]
fn test_neck_slow_cycle_is_correct() {
    let driver = neck_run([700, 700, 700], 0.0);
    let agg = driver.aggregate();
    assert_eq!((agg.total_count, agg.correct_count), (1, 1));
    assert!(agg.diagnostics.is_empty());
}

#[test]
fn test_neck_compressed_cycle() {
    let driver = neck_run([200, 200, 200], 0.0);
    let agg = driver.aggregate();
    assert_eq!((agg.total_count, agg.incorrect_count), (1, 1));
    assert!(agg
        .diagnostics
        .iter()
        .all(|d| d.code == DiagnosticCode::D601_NECK_TOO_FAST && d.index == 1));
    assert_eq!(agg.diagnostics.len(), 3);
}

#[test]
fn test_neck_fast_cycle_with_slow_enough_phases() {
    let driver = neck_run([600, 600, 600], 0.0);
    let agg = driver.aggregate();
    assert_eq!(agg.incorrect_count, 1);
    assert_eq!(agg.diagnostics.len(), 1);
    assert_eq!(agg.diagnostics[0].code, DiagnosticCode::D603_NECK_FAST_CYCLE);
}

#[test]
fn test_neck_skipped_center_is_penalised_immediately() {
    let driver = neck_run([700, 700, 700], 0.1);
    let agg = driver.aggregate();
    assert_eq!((agg.total_count, agg.incorrect_count), (1, 1));
    assert_eq!(agg.diagnostics[0].code, DiagnosticCode::D602_NECK_SKIPPED_CENTER);
}

#[test]
fn test_demo_scripts() {
    let expected = [
        (ExerciseKind::Squat, 3, 2),
        (ExerciseKind::Pushup, 3, 2),
        (ExerciseKind::Situp, 3, 2),
        (ExerciseKind::Plank, 8, 6),
        (ExerciseKind::Mountain, 5, 4),
        (ExerciseKind::Neck, 3, 2),
    ];
    for (kind, total, correct) in expected {
        let driver = replay(kind, demo_frames(kind));
        let agg = driver.aggregate();
        assert_eq!((kind, agg.total_count, agg.correct_count), (kind, total, correct));
    }
}
