//! Integration tests for the session driver
//!
//! JSON Lines replay → driver → submission sink

use std::io::Cursor;
use std::time::Duration;

use formcheck::config::FormcheckConfig;
use formcheck::core::synth::{squat_pose, situp_pose};
use formcheck::core::{
    load_result, FrameRecord, JsonFileSink, MemorySink, ReplaySource, Replayer, SessionDriver, UiSink,
};
use formcheck::types::{AnalysisResult, ExerciseKind, Notification, SessionAggregate};
use formcheck::FormcheckError;
use pretty_assertions::assert_eq;

#[derive(Default)]
struct CollectingUi {
    hints: Vec<String>,
    counter_updates: Vec<u32>,
    frames: Vec<AnalysisResult>,
}

impl UiSink for CollectingUi {
    fn notify(&mut self, notification: &Notification) {
        self.hints.push(notification.message.clone());
    }

    fn counters(&mut self, aggregate: &SessionAggregate) {
        self.counter_updates.push(aggregate.total_count);
    }

    fn frame(&mut self, result: &AnalysisResult) {
        self.frames.push(result.clone());
    }
}

fn jsonl(frames: &[FrameRecord]) -> String {
    frames
        .iter()
        .map(|f| serde_json::to_string(f).unwrap())
        .collect::<Vec<_>>()
        .join("\n")
}

fn squat_frames() -> Vec<FrameRecord> {
    let script = [
        Some(squat_pose(175.0, 0.2, 170.0)),
        Some(squat_pose(85.0, 0.0, 170.0)),
        None,
        Some(squat_pose(175.0, 0.2, 170.0)),
        Some(squat_pose(85.0, 0.0, 120.0)),
        Some(squat_pose(175.0, 0.2, 170.0)),
    ];
    script
        .into_iter()
        .enumerate()
        .map(|(i, landmarks)| FrameRecord {
            t_ms: i as f64 * 33.3,
            landmarks,
        })
        .collect()
}

fn squat_driver() -> SessionDriver {
    let config = FormcheckConfig::default();
    SessionDriver::new(config.exercise(ExerciseKind::Squat).unwrap())
}

#[test]
fn test_replay_counts_and_logs() {
    let input = jsonl(&squat_frames());
    let mut driver = squat_driver();
    let mut ui = CollectingUi::default();
    driver.start();

    let frames = Replayer::new(Duration::from_millis(100))
        .run(&mut driver, ReplaySource::new(Cursor::new(input)), &mut ui)
        .unwrap();
    assert_eq!(frames, 6);

    let agg = driver.aggregate();
    assert_eq!((agg.total_count, agg.correct_count, agg.incorrect_count), (2, 1, 1));
    assert_eq!(agg.diagnostics.len(), 1);
    assert_eq!(agg.diagnostics[0].index, 2);
    assert_eq!(agg.diagnostics[0].message, "Back bent");
    assert_eq!(ui.counter_updates, vec![1, 2]);
    assert!(ui.hints.contains(&"Keep your back straight!".to_string()));
}

#[test]
fn test_replay_stops_at_malformed_line() {
    let mut input = jsonl(&squat_frames()[..2]);
    input.push_str("\n\n{\"t_ms\": 99, \"landmarks\": [1, 2]}\n");
    let mut driver = squat_driver();
    driver.start();

    let err = Replayer::new(Duration::from_millis(100))
        .run(&mut driver, ReplaySource::new(Cursor::new(input)), &mut CollectingUi::default())
        .unwrap_err();
    match err {
        FormcheckError::MalformedFrame { line, .. } => assert_eq!(line, 4),
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(driver.aggregate().total_count, 1);
}

#[test]
fn test_hints_disabled() {
    let mut driver = squat_driver();
    let mut ui = CollectingUi::default();
    driver.set_hints_enabled(false);
    driver.start();
    for frame in squat_frames() {
        driver.process_frame(frame.landmarks.as_ref(), frame.now(), &mut ui);
    }
    assert!(ui.hints.is_empty());
    assert_eq!(driver.aggregate().total_count, 2);

    // The no-subject frame is skipped; the rest reach the UI without hints
    assert_eq!(ui.frames.len(), 5);
    assert!(ui.frames.iter().all(|r| r.notification.is_none()));
    assert_eq!(ui.frames.iter().filter(|r| r.counted).count(), 2);
}

#[test]
fn test_frames_before_start_and_after_stop_are_ignored() {
    let mut driver = SessionDriver::new(formcheck::core::Exercise::new(ExerciseKind::Situp));
    let mut ui = CollectingUi::default();
    let up = situp_pose(60.0);
    let down = situp_pose(160.0);

    assert!(driver.process_frame(Some(&up), Duration::ZERO, &mut ui).is_none());
    driver.start();
    assert!(driver.process_frame(Some(&up), Duration::ZERO, &mut ui).unwrap().counted);
    driver.stop(&mut MemorySink::default()).unwrap();
    driver.process_frame(Some(&down), Duration::ZERO, &mut ui);
    assert!(driver.process_frame(Some(&up), Duration::ZERO, &mut ui).is_none());
    assert_eq!(driver.aggregate().total_count, 1);
}

#[test]
fn test_result_written_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = squat_driver();
    driver.start();
    for frame in squat_frames() {
        driver.process_frame(frame.landmarks.as_ref(), frame.now(), &mut CollectingUi::default());
    }

    let mut sink = JsonFileSink::new(dir.path());
    let result = driver.stop(&mut sink).unwrap();
    assert_eq!(result.exercise_type, "squat");
    assert_eq!(result.repetitions, 2);
    assert_eq!(result.score, 50);
    assert_eq!(result.errors, vec!["Back bent".to_string()]);
    assert_eq!(result.time, None);

    let saved = load_result(sink.last_path().unwrap()).unwrap();
    assert_eq!(saved, result);

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(sink.last_path().unwrap()).unwrap()).unwrap();
    for key in ["exercise_type", "repetitions", "correct_count", "incorrect_count", "errors", "score", "time"] {
        assert!(raw.get(key).is_some(), "missing {}", key);
    }
}

#[test]
fn test_empty_session_scores_zero() {
    let mut driver = squat_driver();
    let mut sink = MemorySink::default();
    driver.start();
    let result = driver.stop(&mut sink).unwrap();
    assert_eq!(result.repetitions, 0);
    assert_eq!(result.score, 0);
    assert_eq!(sink.results, vec![result]);
}

#[test]
fn test_failed_submit_keeps_session_recording() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("taken");
    std::fs::write(&blocker, "not a directory").unwrap();

    let mut driver = squat_driver();
    driver.start();
    for frame in squat_frames() {
        driver.process_frame(frame.landmarks.as_ref(), frame.now(), &mut CollectingUi::default());
    }

    let err = driver.stop(&mut JsonFileSink::new(&blocker)).unwrap_err();
    assert!(matches!(err, FormcheckError::Io(_)));
    assert!(driver.is_recording());

    let mut sink = MemorySink::default();
    let result = driver.stop(&mut sink).unwrap();
    assert_eq!(result.repetitions, 2);
    assert_eq!(sink.results.len(), 1);
    assert!(!driver.is_recording());
}
