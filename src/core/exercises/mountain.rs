//! Mountain climber: one count per leg switch
//!
//! A leg is driven when its knee is bent past knee_angle_bent and lifted
//! above the hips. A switch counts when exactly one leg is driven and it is
//! not the leg already recorded. Frames within min_time_between_ms of the
//! last switch are ignored.

use serde::{Deserialize, Serialize};
use crate::core::exercise::{millis, FrameInput, RepDetector};
use crate::core::geometry::angle_at;
use crate::types::*;

static INSTRUCTIONS: [&str; 6] = [
    "Start in a high plank on straight arms",
    "Hands directly under your shoulders",
    "Keep your body in one straight line",
    "Drive one knee toward your chest",
    "Alternate legs at a brisk pace",
    "Keep the plank, do not raise your hips",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountainThresholds {
    pub knee_angle_bent: f64,
    /// Anti-bounce interval between counted switches
    pub min_time_between_ms: f64,
    pub body_angle_min: f64,
    pub body_angle_max: f64,
}

impl Default for MountainThresholds {
    fn default() -> Self {
        Self {
            knee_angle_bent: 90.0,
            min_time_between_ms: 500.0,
            body_angle_min: 150.0,
            body_angle_max: 200.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Mountain {
    pub(crate) meta: ExerciseMeta,
    thresholds: MountainThresholds,
}

impl Default for Mountain {
    fn default() -> Self {
        Self::new()
    }
}

impl Mountain {
    pub fn new() -> Self {
        Self::with_thresholds(MountainThresholds::default())
    }

    pub fn with_thresholds(thresholds: MountainThresholds) -> Self {
        Self {
            meta: ExerciseMeta {
                kind: ExerciseKind::Mountain,
                name: "mountain",
                title: "Mountain Climbers",
                target: 30,
                count_mode: CountMode::Repetitions,
                landmark_model: LandmarkModel::Pose,
                instructions: &INSTRUCTIONS,
            },
            thresholds,
        }
    }

    fn switch_to(&self, leg: LegPosition, body: f64, frame: &FrameInput<'_>, state: &mut MountainState) -> AnalysisResult {
        let t = &self.thresholds;
        state.position = leg;
        state.last_change = Some(frame.now);

        let (status, code, hint) = match leg {
            LegPosition::Left => (
                "Left leg",
                DiagnosticCode::D501_MOUNTAIN_PLANK_LOST_LEFT,
                Notification::new("Left! Now right", HintIcon::LegRight),
            ),
            _ => (
                "Right leg",
                DiagnosticCode::D502_MOUNTAIN_PLANK_LOST_RIGHT,
                Notification::new("Right! Now left", HintIcon::LegLeft),
            ),
        };

        if body < t.body_angle_min || body > t.body_angle_max {
            AnalysisResult::incorrect(status, Diagnostic::new(code)).with_notification(Notification::new(
                "Hold the plank! Don't raise your hips",
                HintIcon::PlankPosition,
            ))
        } else {
            AnalysisResult::correct(status).with_notification(hint.with_background(HintColor::Emerald))
        }
    }
}

impl RepDetector for Mountain {
    type State = MountainState;
    type Thresholds = MountainThresholds;

    fn meta(&self) -> &ExerciseMeta {
        &self.meta
    }

    fn thresholds(&self) -> &MountainThresholds {
        &self.thresholds
    }

    fn analyze(&self, frame: &FrameInput<'_>, state: &mut MountainState) -> AnalysisResult {
        let t = &self.thresholds;

        if let Some(last) = state.last_change {
            if millis(frame.now.saturating_sub(last)) < t.min_time_between_ms {
                return AnalysisResult::idle("Switching...");
            }
        }

        let lm = frame.landmarks;
        let left_knee = angle_at(lm.get(LEFT_HIP), lm.get(LEFT_KNEE), lm.get(LEFT_ANKLE));
        let right_knee = angle_at(lm.get(RIGHT_HIP), lm.get(RIGHT_KNEE), lm.get(RIGHT_ANKLE));
        let hip_y = lm.mean_y(LEFT_HIP, RIGHT_HIP);
        let body = angle_at(lm.get(LEFT_SHOULDER), lm.get(LEFT_HIP), lm.get(LEFT_ANKLE));

        let left_driven = left_knee < t.knee_angle_bent && lm.get(LEFT_KNEE).y < hip_y;
        let right_driven = right_knee < t.knee_angle_bent && lm.get(RIGHT_KNEE).y < hip_y;

        if left_driven && !right_driven && state.position != LegPosition::Left {
            self.switch_to(LegPosition::Left, body, frame, state)
        } else if right_driven && !left_driven && state.position != LegPosition::Right {
            self.switch_to(LegPosition::Right, body, frame, state)
        } else if !left_driven && !right_driven {
            AnalysisResult::idle("Drive a knee to your chest")
        } else {
            AnalysisResult::idle("Alternate legs")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::synth::{mountain_pose, Leg};
    use std::time::Duration;

    fn step(m: &Mountain, state: &mut MountainState, pose: &LandmarkSet, ms: u64) -> AnalysisResult {
        m.analyze(&FrameInput::new(pose, Duration::from_millis(ms)), state)
    }

    #[test]
    fn test_alternation_counts_each_switch() {
        let m = Mountain::new();
        let mut state = m.initial_state();
        let left = mountain_pose(Leg::driven(60.0), Leg::straight(), 175.0);
        let right = mountain_pose(Leg::straight(), Leg::driven(60.0), 175.0);
        let neutral = mountain_pose(Leg::straight(), Leg::straight(), 175.0);

        assert!(!step(&m, &mut state, &neutral, 0).counted);
        let r = step(&m, &mut state, &left, 100);
        assert!(r.counted && r.correct);
        assert!(!step(&m, &mut state, &neutral, 700).counted);
        let r = step(&m, &mut state, &right, 800);
        assert!(r.counted && r.correct);
        assert_eq!(state.position, LegPosition::Right);
    }

    #[test]
    fn test_same_leg_twice_counts_once() {
        let m = Mountain::new();
        let mut state = m.initial_state();
        let left = mountain_pose(Leg::driven(60.0), Leg::straight(), 175.0);
        assert!(step(&m, &mut state, &left, 0).counted);
        assert!(!step(&m, &mut state, &left, 1000).counted);
    }

    #[test]
    fn test_debounce_window() {
        let m = Mountain::new();
        let mut state = m.initial_state();
        let left = mountain_pose(Leg::driven(60.0), Leg::straight(), 175.0);
        let right = mountain_pose(Leg::straight(), Leg::driven(60.0), 175.0);
        assert!(step(&m, &mut state, &left, 1000).counted);
        let r = step(&m, &mut state, &right, 1300);
        assert!(!r.counted);
        assert_eq!(r.status, "Switching...");
        assert!(step(&m, &mut state, &right, 1500).counted);
    }

    #[test]
    fn test_first_switch_not_debounced_at_session_start() {
        let m = Mountain::new();
        let mut state = m.initial_state();
        let left = mountain_pose(Leg::driven(60.0), Leg::straight(), 175.0);
        assert!(step(&m, &mut state, &left, 10).counted);
    }

    #[test]
    fn test_knee_below_hip_not_driven() {
        let m = Mountain::new();
        let mut state = m.initial_state();
        let low = mountain_pose(Leg::bent_low(60.0), Leg::straight(), 175.0);
        assert!(!step(&m, &mut state, &low, 0).counted);
    }

    #[test]
    fn test_lost_plank() {
        let m = Mountain::new();
        let mut state = m.initial_state();
        let left = mountain_pose(Leg::driven(60.0), Leg::straight(), 130.0);
        let r = step(&m, &mut state, &left, 0);
        assert!(r.counted && !r.correct);
        assert_eq!(r.diagnostic.unwrap().code, DiagnosticCode::D501_MOUNTAIN_PLANK_LOST_LEFT);
    }
}
