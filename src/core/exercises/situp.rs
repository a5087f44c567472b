//! Situp: counted when the torso comes up

use serde::{Deserialize, Serialize};
use crate::core::exercise::{FrameInput, RepDetector};
use crate::core::geometry::angle_at;
use crate::types::*;

static INSTRUCTIONS: [&str; 6] = [
    "Lie on your back with your knees bent",
    "Keep your feet flat on the floor",
    "Hands behind your head or across your chest",
    "Raise your torso toward your knees",
    "Reach your chin toward your knees",
    "Lower back down smoothly",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SitupThresholds {
    /// Hip angle that counts as raised
    pub hip_angle_up: f64,
    /// Hip angle that counts as lying down again
    pub hip_angle_down: f64,
    /// Full crunch reaches at least this hip angle
    pub hip_angle_good: f64,
}

impl Default for SitupThresholds {
    fn default() -> Self {
        Self {
            hip_angle_up: 90.0,
            hip_angle_down: 150.0,
            hip_angle_good: 65.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Situp {
    pub(crate) meta: ExerciseMeta,
    thresholds: SitupThresholds,
}

impl Default for Situp {
    fn default() -> Self {
        Self::new()
    }
}

impl Situp {
    pub fn new() -> Self {
        Self::with_thresholds(SitupThresholds::default())
    }

    pub fn with_thresholds(thresholds: SitupThresholds) -> Self {
        Self {
            meta: ExerciseMeta {
                kind: ExerciseKind::Situp,
                name: "situp",
                title: "Situps",
                target: 15,
                count_mode: CountMode::Repetitions,
                landmark_model: LandmarkModel::Pose,
                instructions: &INSTRUCTIONS,
            },
            thresholds,
        }
    }
}

impl RepDetector for Situp {
    type State = SitupState;
    type Thresholds = SitupThresholds;

    fn meta(&self) -> &ExerciseMeta {
        &self.meta
    }

    fn thresholds(&self) -> &SitupThresholds {
        &self.thresholds
    }

    fn analyze(&self, frame: &FrameInput<'_>, state: &mut SitupState) -> AnalysisResult {
        let lm = frame.landmarks;
        let t = &self.thresholds;
        let hip = angle_at(lm.get(LEFT_SHOULDER), lm.get(LEFT_HIP), lm.get(LEFT_KNEE));

        match state.phase {
            RepPhase::Down if hip < t.hip_angle_up => {
                state.phase = RepPhase::Up;
                if hip > t.hip_angle_good {
                    AnalysisResult::incorrect("Up", Diagnostic::new(DiagnosticCode::D301_SITUP_LOW))
                        .with_notification(Notification::new("Come up HIGHER! Chin to knees", HintIcon::BodyUp))
                } else {
                    AnalysisResult::correct("Up").with_notification(
                        Notification::new("Great! Lower back down", HintIcon::BodyDown)
                            .with_background(HintColor::Emerald),
                    )
                }
            }
            RepPhase::Up if hip > t.hip_angle_down => {
                state.phase = RepPhase::Down;
                AnalysisResult::idle("Ready")
                    .with_notification(Notification::new("Ready for the next one", HintIcon::TorsoUp))
            }
            RepPhase::Down => AnalysisResult::idle("Raise your torso"),
            RepPhase::Up => AnalysisResult::idle("Lower down"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::synth::situp_pose;
    use std::time::Duration;

    fn step(situp: &Situp, state: &mut SitupState, hip: f64) -> AnalysisResult {
        situp.analyze(&FrameInput::new(&situp_pose(hip), Duration::ZERO), state)
    }

    #[test]
    fn test_full_crunch() {
        let situp = Situp::new();
        let mut state = situp.initial_state();
        assert!(!step(&situp, &mut state, 160.0).counted);
        let r = step(&situp, &mut state, 60.0);
        assert!(r.counted && r.correct);
        assert_eq!(state.phase, RepPhase::Up);
    }

    #[test]
    fn test_partial_crunch() {
        let situp = Situp::new();
        let mut state = situp.initial_state();
        let r = step(&situp, &mut state, 80.0);
        assert!(r.counted && !r.correct);
        assert_eq!(r.diagnostic.unwrap().code, DiagnosticCode::D301_SITUP_LOW);
    }

    #[test]
    fn test_rearm_needs_lying_down() {
        let situp = Situp::new();
        let mut state = situp.initial_state();
        assert!(step(&situp, &mut state, 60.0).counted);
        assert!(!step(&situp, &mut state, 120.0).counted);
        assert!(!step(&situp, &mut state, 60.0).counted);
        assert!(!step(&situp, &mut state, 160.0).counted);
        assert!(step(&situp, &mut state, 60.0).counted);
    }
}
