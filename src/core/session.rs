//! Session driver: owns the exercise state and the counters for one recording

use std::time::Duration;
use tracing::{debug, info};

use crate::core::exercise::{Exercise, FrameInput};
use crate::core::submit::SubmissionSink;
use crate::error::{FormcheckError, Result};
use crate::types::*;

/// Receives live updates while a session records
pub trait UiSink {
    fn notify(&mut self, notification: &Notification);

    fn status(&mut self, _status: &str) {}

    fn counters(&mut self, _aggregate: &SessionAggregate) {}

    /// Every analysed frame, after hint suppression
    fn frame(&mut self, _result: &AnalysisResult) {}
}

/// Sink that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullUi;

impl UiSink for NullUi {
    fn notify(&mut self, _notification: &Notification) {}
}

pub struct SessionDriver {
    exercise: Exercise,
    state: ExerciseState,
    aggregate: SessionAggregate,
    recording: bool,
    hints_enabled: bool,
}

impl SessionDriver {
    pub fn new(exercise: Exercise) -> Self {
        let state = exercise.initial_state();
        Self {
            exercise,
            state,
            aggregate: SessionAggregate::default(),
            recording: false,
            hints_enabled: true,
        }
    }

    /// Reset counters, log, hold time and state; start recording
    pub fn start(&mut self) {
        self.state = self.exercise.initial_state();
        self.aggregate = SessionAggregate::default();
        self.recording = true;
        info!(exercise = %self.exercise.kind(), target = self.meta().target, "recording started");
    }

    pub fn set_hints_enabled(&mut self, enabled: bool) {
        self.hints_enabled = enabled;
    }

    pub fn hints_enabled(&self) -> bool {
        self.hints_enabled
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn exercise(&self) -> &Exercise {
        &self.exercise
    }

    pub fn meta(&self) -> &ExerciseMeta {
        self.exercise.meta()
    }

    pub fn state(&self) -> &ExerciseState {
        &self.state
    }

    pub fn aggregate(&self) -> &SessionAggregate {
        &self.aggregate
    }

    /// Analyze one frame
    ///
    /// Returns `None` when not recording or when no subject was detected.
    pub fn process_frame(
        &mut self,
        landmarks: Option<&LandmarkSet>,
        now: Duration,
        ui: &mut dyn UiSink,
    ) -> Option<AnalysisResult> {
        if !self.recording {
            return None;
        }
        let landmarks = landmarks?;

        let mut frame = FrameInput::new(landmarks, now);
        if self.meta().is_hold() {
            frame = frame.with_hold(Duration::from_millis(self.aggregate.hold_ms));
        }
        let mut result = self.exercise.analyze(&frame, &mut self.state);

        let total_before = self.aggregate.total_count;
        if result.counted {
            self.aggregate.total_count += 1;
            if result.correct {
                self.aggregate.correct_count += 1;
            } else {
                self.aggregate.incorrect_count += 1;
            }
            debug!(
                total = self.aggregate.total_count,
                correct = result.correct,
                phase = %self.state.phase_label(),
                "unit counted"
            );
        }

        if let Some(diagnostic) = &result.diagnostic {
            debug!(code = diagnostic.code.code(), index = total_before + 1, "diagnostic");
            self.aggregate.diagnostics.push(DiagnosticEntry {
                index: total_before + 1,
                code: diagnostic.code,
                message: diagnostic.message.clone(),
            });
        }

        ui.status(&result.status);
        if !self.hints_enabled {
            result.notification = None;
        }
        if let Some(notification) = &result.notification {
            ui.notify(notification);
        }
        if result.counted {
            ui.counters(&self.aggregate);
        }
        ui.frame(&result);

        Some(result)
    }

    /// Advance the hold timer; only hold-based exercises accumulate
    pub fn tick(&mut self, period: Duration) {
        if self.recording && self.meta().is_hold() {
            self.aggregate.hold_ms += period.as_millis() as u64;
        }
    }

    /// Fraction of the target reached
    pub fn progress(&self) -> f64 {
        let target = self.meta().target.max(1) as f64;
        if self.meta().is_hold() {
            self.aggregate.hold_seconds() / target
        } else {
            self.aggregate.total_count as f64 / target
        }
    }

    /// Record for the counters so far
    pub fn result(&self) -> SessionResult {
        let meta = self.meta();
        SessionResult {
            exercise_type: meta.name.to_string(),
            repetitions: self.aggregate.total_count,
            correct_count: self.aggregate.correct_count,
            incorrect_count: self.aggregate.incorrect_count,
            errors: self.aggregate.diagnostics.iter().map(|d| d.message.clone()).collect(),
            score: self.aggregate.score(),
            time: meta.is_hold().then(|| self.aggregate.hold_seconds()),
        }
    }

    /// Stop recording and hand the result to `sink`
    pub fn stop(&mut self, sink: &mut dyn SubmissionSink) -> Result<SessionResult> {
        if !self.recording {
            return Err(FormcheckError::invalid_transition("session is not recording"));
        }

        // A failed submit leaves the session recording so the caller can retry
        let result = self.result();
        sink.submit(&result)?;
        self.recording = false;

        info!(
            exercise = %result.exercise_type,
            repetitions = result.repetitions,
            correct = result.correct_count,
            incorrect = result.incorrect_count,
            score = result.score,
            "recording stopped"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::submit::MemorySink;
    use crate::core::synth::{neck_pose, plank_pose, squat_pose};

    #[derive(Default)]
    struct RecordingUi {
        notes: Vec<String>,
        statuses: Vec<String>,
        counter_updates: usize,
    }

    impl UiSink for RecordingUi {
        fn notify(&mut self, notification: &Notification) {
            self.notes.push(notification.message.clone());
        }

        fn status(&mut self, status: &str) {
            self.statuses.push(status.to_string());
        }

        fn counters(&mut self, _aggregate: &SessionAggregate) {
            self.counter_updates += 1;
        }
    }

    fn squat_driver() -> SessionDriver {
        SessionDriver::new(Exercise::new(ExerciseKind::Squat))
    }

    #[test]
    fn test_frames_ignored_before_start() {
        let mut driver = squat_driver();
        let pose = squat_pose(85.0, 0.0, 170.0);
        assert!(driver.process_frame(Some(&pose), Duration::ZERO, &mut NullUi).is_none());
        assert_eq!(driver.aggregate().total_count, 0);
    }

    #[test]
    fn test_no_subject_is_skipped() {
        let mut driver = squat_driver();
        driver.start();
        assert!(driver.process_frame(None, Duration::ZERO, &mut NullUi).is_none());
    }

    #[test]
    fn test_counts_and_diagnostic_index() {
        let mut driver = squat_driver();
        let mut ui = RecordingUi::default();
        driver.start();
        let frames = [
            squat_pose(85.0, 0.0, 170.0),
            squat_pose(175.0, 0.2, 170.0),
            squat_pose(85.0, 0.15, 170.0),
        ];
        for pose in &frames {
            driver.process_frame(Some(pose), Duration::ZERO, &mut ui);
        }
        let agg = driver.aggregate();
        assert_eq!((agg.total_count, agg.correct_count, agg.incorrect_count), (2, 1, 1));
        assert_eq!(agg.diagnostics.len(), 1);
        assert_eq!(agg.diagnostics[0].index, 2);
        assert_eq!(agg.diagnostics[0].code, DiagnosticCode::D101_SQUAT_SHALLOW);
        assert_eq!(ui.counter_updates, 2);
        assert_eq!(ui.statuses.len(), 3);
    }

    #[test]
    fn test_uncounted_diagnostic_belongs_to_next_unit() {
        let mut driver = SessionDriver::new(Exercise::new(ExerciseKind::Neck));
        driver.start();
        driver.process_frame(Some(&neck_pose(0.1)), Duration::ZERO, &mut NullUi);
        let r = driver
            .process_frame(Some(&neck_pose(0.0)), Duration::from_millis(100), &mut NullUi)
            .unwrap();
        assert!(!r.counted);
        assert_eq!(driver.aggregate().diagnostics[0].index, 1);
        assert_eq!(driver.aggregate().total_count, 0);
    }

    #[test]
    fn test_hints_disabled_still_counts() {
        let mut driver = squat_driver();
        let mut ui = RecordingUi::default();
        driver.set_hints_enabled(false);
        driver.start();
        let r = driver
            .process_frame(Some(&squat_pose(85.0, 0.0, 170.0)), Duration::ZERO, &mut ui)
            .unwrap();
        assert!(r.counted);
        assert!(r.notification.is_none());
        assert!(ui.notes.is_empty());
        assert_eq!(driver.aggregate().total_count, 1);
    }

    #[test]
    fn test_start_resets() {
        let mut driver = squat_driver();
        driver.start();
        driver.process_frame(Some(&squat_pose(85.0, 0.0, 170.0)), Duration::ZERO, &mut NullUi);
        driver.start();
        assert_eq!(driver.aggregate(), &SessionAggregate::default());
        assert_eq!(driver.state(), &driver.exercise().initial_state());
    }

    #[test]
    fn test_tick_only_for_hold_exercises() {
        let mut squat = squat_driver();
        squat.start();
        squat.tick(Duration::from_millis(100));
        assert_eq!(squat.aggregate().hold_ms, 0);

        let mut plank = SessionDriver::new(Exercise::new(ExerciseKind::Plank));
        plank.tick(Duration::from_millis(100));
        assert_eq!(plank.aggregate().hold_ms, 0);
        plank.start();
        plank.tick(Duration::from_millis(100));
        assert_eq!(plank.aggregate().hold_ms, 100);
    }

    #[test]
    fn test_plank_session_result() {
        let mut driver = SessionDriver::new(Exercise::new(ExerciseKind::Plank));
        let pose = plank_pose(175.0, 0.02);
        driver.start();
        for i in 1..=30u64 {
            driver.tick(Duration::from_millis(100));
            driver.process_frame(Some(&pose), Duration::from_millis(i * 100), &mut NullUi);
        }
        assert_eq!(driver.aggregate().total_count, 3);
        assert!((driver.progress() - 3.0 / 60.0).abs() < 1e-9);

        let mut sink = MemorySink::default();
        let result = driver.stop(&mut sink).unwrap();
        assert_eq!(result.time, Some(3.0));
        assert_eq!(result.score, 100);
        assert_eq!(sink.results.len(), 1);
        assert!(!driver.is_recording());
    }

    #[test]
    fn test_stop_twice_is_invalid() {
        let mut driver = squat_driver();
        let mut sink = MemorySink::default();
        driver.start();
        let result = driver.stop(&mut sink).unwrap();
        assert_eq!(result.time, None);
        assert_eq!(result.score, 0);
        assert!(matches!(driver.stop(&mut sink), Err(FormcheckError::InvalidTransition { .. })));
    }
}
