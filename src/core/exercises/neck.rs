//! Neck rotation: one count per left → center → right → center cycle
//!
//! Works on the face mesh. The head offset is the nose tip's x position
//! relative to the midpoint of the two cheeks; positive means turned left.
//! Every inbound transition checks how long the previous phase lasted.

use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::core::exercise::{millis, FrameInput, RepDetector};
use crate::types::*;

static INSTRUCTIONS: [&str; 6] = [
    "Sit or stand up straight",
    "Slowly turn your head to the LEFT",
    "Return to center",
    "Slowly turn your head to the RIGHT",
    "Return to center",
    "Move smoothly, without jerks",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeckThresholds {
    pub left_offset: f64,
    pub right_offset: f64,
    pub center_tolerance: f64,
    /// Turned somewhat left but not far enough
    pub partial_left: f64,
    pub partial_right: f64,
    /// Minimum time spent in each phase
    pub min_phase_ms: f64,
    /// Minimum time for a full cycle
    pub min_cycle_ms: f64,
}

impl Default for NeckThresholds {
    fn default() -> Self {
        Self {
            left_offset: 0.08,
            right_offset: -0.08,
            center_tolerance: 0.04,
            partial_left: 0.05,
            partial_right: -0.05,
            min_phase_ms: 500.0,
            min_cycle_ms: 2000.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Neck {
    pub(crate) meta: ExerciseMeta,
    thresholds: NeckThresholds,
}

impl Default for Neck {
    fn default() -> Self {
        Self::new()
    }
}

impl Neck {
    pub fn new() -> Self {
        Self::with_thresholds(NeckThresholds::default())
    }

    pub fn with_thresholds(thresholds: NeckThresholds) -> Self {
        Self {
            meta: ExerciseMeta {
                kind: ExerciseKind::Neck,
                name: "neck",
                title: "Neck Rotation",
                target: 10,
                count_mode: CountMode::Repetitions,
                landmark_model: LandmarkModel::Face,
                instructions: &INSTRUCTIONS,
            },
            thresholds,
        }
    }

    fn head_offset(landmarks: &LandmarkSet) -> f64 {
        landmarks.get(FACE_NOSE_TIP).x - landmarks.mean_x(FACE_LEFT_CHEEK, FACE_RIGHT_CHEEK)
    }

    fn too_fast(&self, since: Duration, now: Duration) -> bool {
        millis(now.saturating_sub(since)) < self.thresholds.min_phase_ms
    }

    fn slow_down() -> Notification {
        Notification::new("Move SLOWER!", HintIcon::Warning)
            .with_background(HintColor::Amber)
            .with_duration(3000)
    }

    /// Enter `phase`, flagging the cycle when the previous phase was rushed
    fn advance(
        &self,
        state: &mut NeckState,
        phase: NeckPhase,
        now: Duration,
        status: &str,
        hint: Notification,
    ) -> AnalysisResult {
        let rushed = self.too_fast(state.last_change, now);
        state.phase = phase;
        state.last_change = now;
        if rushed {
            state.flawed = true;
            AnalysisResult::idle(status)
                .with_diagnostic(Diagnostic::new(DiagnosticCode::D601_NECK_TOO_FAST))
                .with_notification(Self::slow_down())
        } else {
            AnalysisResult::idle(status).with_notification(hint)
        }
    }

    /// Turned to the wrong side without passing center
    fn skipped_center(state: &mut NeckState, now: Duration) -> AnalysisResult {
        state.phase = NeckPhase::Complete;
        state.last_change = now;
        AnalysisResult::incorrect("Complete", Diagnostic::new(DiagnosticCode::D602_NECK_SKIPPED_CENTER))
            .with_notification(
                Notification::new("Back to CENTER first!", HintIcon::HeadCenter).with_background(HintColor::Crimson),
            )
    }

    fn finish_cycle(&self, state: &mut NeckState, now: Duration) -> AnalysisResult {
        let rushed = self.too_fast(state.last_change, now);
        let cycle_ms = millis(now.saturating_sub(state.cycle_start));
        let flawed = std::mem::take(&mut state.flawed);
        state.phase = NeckPhase::Complete;
        state.last_change = now;

        if rushed {
            AnalysisResult::incorrect("Complete", Diagnostic::new(DiagnosticCode::D601_NECK_TOO_FAST))
                .with_notification(Self::slow_down())
        } else if cycle_ms < self.thresholds.min_cycle_ms {
            AnalysisResult::incorrect("Complete", Diagnostic::new(DiagnosticCode::D603_NECK_FAST_CYCLE))
                .with_notification(
                    Notification::new("Do it SLOWER!", HintIcon::Warning)
                        .with_background(HintColor::Amber)
                        .with_duration(3000),
                )
        } else if flawed {
            // Already diagnosed when the rushed phase happened
            AnalysisResult {
                counted: true,
                correct: false,
                ..AnalysisResult::idle("Complete")
            }
        } else {
            AnalysisResult::correct("Complete").with_notification(
                Notification::new("REPETITION COMPLETE!", HintIcon::Check)
                    .with_background(HintColor::Green)
                    .with_duration(5000),
            )
        }
    }
}

impl RepDetector for Neck {
    type State = NeckState;
    type Thresholds = NeckThresholds;

    fn meta(&self) -> &ExerciseMeta {
        &self.meta
    }

    fn thresholds(&self) -> &NeckThresholds {
        &self.thresholds
    }

    fn analyze(&self, frame: &FrameInput<'_>, state: &mut NeckState) -> AnalysisResult {
        let t = &self.thresholds;
        let now = frame.now;
        let offset = Self::head_offset(frame.landmarks);
        let centered = offset.abs() < t.center_tolerance;

        match state.phase {
            NeckPhase::Idle | NeckPhase::Complete => {
                state.cycle_start = now;
                state.last_change = now;
                state.flawed = false;

                if offset > t.left_offset {
                    state.phase = NeckPhase::Left;
                    AnalysisResult::idle("Left done").with_notification(
                        Notification::new("Great! Back to center", HintIcon::HeadCenter)
                            .with_background(HintColor::Green)
                            .with_duration(4000),
                    )
                } else if offset > t.partial_left {
                    AnalysisResult::idle("Turn left").with_notification(
                        Notification::new("Turn FURTHER left!", HintIcon::HeadLeft).with_background(HintColor::Orange),
                    )
                } else {
                    AnalysisResult::idle("Turn left").with_notification(
                        Notification::new("Turn your head LEFT", HintIcon::HeadLeft)
                            .with_background(HintColor::Orange)
                            .with_duration(3000),
                    )
                }
            }
            NeckPhase::Left if centered => self.advance(
                state,
                NeckPhase::CenterAfterLeft,
                now,
                "Center",
                Notification::new("Great! Now turn RIGHT", HintIcon::HeadRight)
                    .with_background(HintColor::Blue)
                    .with_duration(4000),
            ),
            NeckPhase::Left if offset < -t.center_tolerance => Self::skipped_center(state, now),
            NeckPhase::Left => AnalysisResult::idle("Return to center"),
            NeckPhase::CenterAfterLeft if offset < t.right_offset => self.advance(
                state,
                NeckPhase::Right,
                now,
                "Right done",
                Notification::new("Great! Back to center", HintIcon::HeadCenter)
                    .with_background(HintColor::Green)
                    .with_duration(4000),
            ),
            NeckPhase::CenterAfterLeft if offset < t.partial_right => AnalysisResult::idle("Turn right")
                .with_notification(
                    Notification::new("Turn FURTHER right!", HintIcon::HeadRight).with_background(HintColor::Blue),
                ),
            NeckPhase::CenterAfterLeft => AnalysisResult::idle("Turn right").with_notification(
                Notification::new("Turn your head RIGHT", HintIcon::HeadRight)
                    .with_background(HintColor::Blue)
                    .with_duration(3000),
            ),
            NeckPhase::Right if centered => self.finish_cycle(state, now),
            NeckPhase::Right if offset > t.center_tolerance => Self::skipped_center(state, now),
            NeckPhase::Right => AnalysisResult::idle("Return to center"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::synth::neck_pose;

    fn run(neck: &Neck, frames: &[(u64, f64)]) -> Vec<AnalysisResult> {
        let mut state = neck.initial_state();
        frames
            .iter()
            .map(|(ms, offset)| neck.analyze(&FrameInput::new(&neck_pose(*offset), Duration::from_millis(*ms)), &mut state))
            .collect()
    }

    #[test]
    fn test_slow_cycle_is_correct() {
        let results = run(&Neck::new(), &[(0, 0.1), (700, 0.0), (1400, -0.1), (2100, 0.0)]);
        let last = &results[3];
        assert!(last.counted && last.correct);
        assert!(results.iter().all(|r| r.diagnostic.is_none()));
        assert_eq!(results.iter().filter(|r| r.counted).count(), 1);
    }

    #[test]
    fn test_rushed_phase_logs_once_and_fails_cycle() {
        let results = run(&Neck::new(), &[(0, 0.1), (200, 0.0), (1400, -0.1), (2100, 0.0)]);
        assert_eq!(results[1].diagnostic.as_ref().unwrap().code, DiagnosticCode::D601_NECK_TOO_FAST);
        assert!(!results[1].counted);
        let last = &results[3];
        assert!(last.counted && !last.correct);
        assert!(last.diagnostic.is_none());
    }

    #[test]
    fn test_rushed_final_return() {
        let results = run(&Neck::new(), &[(0, 0.1), (700, 0.0), (1400, -0.1), (1600, 0.0)]);
        let last = &results[3];
        assert!(last.counted && !last.correct);
        assert_eq!(last.diagnostic.as_ref().unwrap().code, DiagnosticCode::D601_NECK_TOO_FAST);
    }

    #[test]
    fn test_compressed_cycle() {
        let results = run(&Neck::new(), &[(0, 0.1), (550, 0.0), (1100, -0.1), (1650, 0.0)]);
        let last = &results[3];
        assert!(last.counted && !last.correct);
        assert_eq!(last.diagnostic.as_ref().unwrap().code, DiagnosticCode::D603_NECK_FAST_CYCLE);
    }

    #[test]
    fn test_skipped_center_from_left() {
        let results = run(&Neck::new(), &[(0, 0.1), (700, -0.1)]);
        let r = &results[1];
        assert!(r.counted && !r.correct);
        assert_eq!(r.diagnostic.as_ref().unwrap().code, DiagnosticCode::D602_NECK_SKIPPED_CENTER);
    }

    #[test]
    fn test_skipped_center_from_right() {
        let results = run(&Neck::new(), &[(0, 0.1), (700, 0.0), (1400, -0.1), (2100, 0.1)]);
        let r = &results[3];
        assert!(r.counted && !r.correct);
        assert_eq!(r.diagnostic.as_ref().unwrap().code, DiagnosticCode::D602_NECK_SKIPPED_CENTER);
    }

    #[test]
    fn test_partial_turn_hints() {
        let results = run(&Neck::new(), &[(0, 0.06)]);
        assert!(!results[0].counted);
        assert_eq!(results[0].notification.as_ref().unwrap().message, "Turn FURTHER left!");
    }

    #[test]
    fn test_complete_restarts_cycle() {
        let neck = Neck::new();
        let mut state = neck.initial_state();
        for (ms, offset) in [(0, 0.1), (700, 0.0), (1400, -0.1), (2100, 0.0)] {
            neck.analyze(&FrameInput::new(&neck_pose(offset), Duration::from_millis(ms)), &mut state);
        }
        assert_eq!(state.phase, NeckPhase::Complete);
        neck.analyze(&FrameInput::new(&neck_pose(0.1), Duration::from_millis(3000)), &mut state);
        assert_eq!(state.phase, NeckPhase::Left);
        assert_eq!(state.cycle_start, Duration::from_millis(3000));
    }
}
