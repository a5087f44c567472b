//! Squat: counted on the way down
//!
//! - UP → DOWN: mean knee angle < knee_angle_down (counted, verdict here)
//! - DOWN → UP: mean knee angle > knee_angle_up (re-arm)

use serde::{Deserialize, Serialize};
use crate::core::exercise::{FrameInput, RepDetector};
use crate::core::geometry::angle_at;
use crate::types::*;

static INSTRUCTIONS: [&str; 5] = [
    "Feet shoulder-width apart",
    "Lower until your thighs are parallel to the floor",
    "Keep your back straight, do not lean forward",
    "Knees stay behind your toes",
    "Return to the starting position",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SquatThresholds {
    /// Knee angle that counts as the bottom of a squat
    pub knee_angle_down: f64,
    /// Knee angle that counts as standing again
    pub knee_angle_up: f64,
    /// How far above the knees the hips may stay
    pub hip_knee_offset: f64,
    /// Minimum shoulder-hip-knee angle
    pub back_angle_min: f64,
}

impl Default for SquatThresholds {
    fn default() -> Self {
        Self {
            knee_angle_down: 90.0,
            knee_angle_up: 170.0,
            hip_knee_offset: 0.03,
            back_angle_min: 140.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Squat {
    pub(crate) meta: ExerciseMeta,
    thresholds: SquatThresholds,
}

impl Default for Squat {
    fn default() -> Self {
        Self::new()
    }
}

impl Squat {
    pub fn new() -> Self {
        Self::with_thresholds(SquatThresholds::default())
    }

    pub fn with_thresholds(thresholds: SquatThresholds) -> Self {
        Self {
            meta: ExerciseMeta {
                kind: ExerciseKind::Squat,
                name: "squat",
                title: "Squats",
                target: 15,
                count_mode: CountMode::Repetitions,
                landmark_model: LandmarkModel::Pose,
                instructions: &INSTRUCTIONS,
            },
            thresholds,
        }
    }
}

impl RepDetector for Squat {
    type State = SquatState;
    type Thresholds = SquatThresholds;

    fn meta(&self) -> &ExerciseMeta {
        &self.meta
    }

    fn thresholds(&self) -> &SquatThresholds {
        &self.thresholds
    }

    fn analyze(&self, frame: &FrameInput<'_>, state: &mut SquatState) -> AnalysisResult {
        let lm = frame.landmarks;
        let t = &self.thresholds;

        let knee = (angle_at(lm.get(LEFT_HIP), lm.get(LEFT_KNEE), lm.get(LEFT_ANKLE))
            + angle_at(lm.get(RIGHT_HIP), lm.get(RIGHT_KNEE), lm.get(RIGHT_ANKLE)))
            / 2.0;
        let hip_y = lm.mean_y(LEFT_HIP, RIGHT_HIP);
        let knee_y = lm.mean_y(LEFT_KNEE, RIGHT_KNEE);
        let back = angle_at(lm.get(LEFT_SHOULDER), lm.get(LEFT_HIP), lm.get(LEFT_KNEE));

        match state.phase {
            RepPhase::Up if knee < t.knee_angle_down => {
                state.phase = RepPhase::Down;

                if hip_y < knee_y - t.hip_knee_offset {
                    AnalysisResult::incorrect("Squat", Diagnostic::new(DiagnosticCode::D101_SQUAT_SHALLOW))
                        .with_notification(Notification::new(
                            "Squat DEEPER! Thighs parallel to the floor",
                            HintIcon::BodyDown,
                        ))
                } else if back < t.back_angle_min {
                    AnalysisResult::incorrect("Squat", Diagnostic::new(DiagnosticCode::D102_SQUAT_BACK_BENT))
                        .with_notification(Notification::new("Keep your back straight!", HintIcon::BodyStraight))
                } else {
                    AnalysisResult::correct("Squat").with_notification(
                        Notification::new("Great! Now stand up", HintIcon::BodyUp)
                            .with_background(HintColor::Emerald),
                    )
                }
            }
            RepPhase::Down if knee > t.knee_angle_up => {
                state.phase = RepPhase::Up;
                AnalysisResult::idle("Ready")
                    .with_notification(Notification::new("Ready for the next squat", HintIcon::BodyDown))
            }
            RepPhase::Down => AnalysisResult::idle("Stand up"),
            RepPhase::Up => AnalysisResult::idle("Ready"),
        }
    }
}
