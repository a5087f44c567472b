//! Pushup: counted on the way back up
//!
//! - UP → DOWN: mean elbow angle < elbow_angle_down
//! - DOWN: track the deepest elbow angle and any break in the body line
//! - DOWN → UP: mean elbow angle > elbow_angle_up (counted, verdict for the
//!   whole descent)

use serde::{Deserialize, Serialize};
use crate::core::exercise::{FrameInput, RepDetector};
use crate::core::geometry::angle_at;
use crate::types::*;

static INSTRUCTIONS: [&str; 5] = [
    "Start in a high plank on straight arms",
    "Keep your body in one straight line",
    "Lower your chest almost to the floor",
    "Bend your elbows to at least 90 degrees",
    "Straighten your arms fully",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushupThresholds {
    pub elbow_angle_down: f64,
    pub elbow_angle_up: f64,
    /// The descent must reach at least this elbow angle
    pub elbow_angle_good: f64,
    pub body_angle_min: f64,
    pub body_angle_max: f64,
}

impl Default for PushupThresholds {
    fn default() -> Self {
        Self {
            elbow_angle_down: 80.0,
            elbow_angle_up: 160.0,
            elbow_angle_good: 50.0,
            body_angle_min: 155.0,
            body_angle_max: 195.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pushup {
    pub(crate) meta: ExerciseMeta,
    thresholds: PushupThresholds,
}

impl Default for Pushup {
    fn default() -> Self {
        Self::new()
    }
}

impl Pushup {
    pub fn new() -> Self {
        Self::with_thresholds(PushupThresholds::default())
    }

    pub fn with_thresholds(thresholds: PushupThresholds) -> Self {
        Self {
            meta: ExerciseMeta {
                kind: ExerciseKind::Pushup,
                name: "pushup",
                title: "Pushups",
                target: 10,
                count_mode: CountMode::Repetitions,
                landmark_model: LandmarkModel::Pose,
                instructions: &INSTRUCTIONS,
            },
            thresholds,
        }
    }

    fn body_in_range(&self, body: f64) -> bool {
        (self.thresholds.body_angle_min..=self.thresholds.body_angle_max).contains(&body)
    }
}

impl RepDetector for Pushup {
    type State = PushupState;
    type Thresholds = PushupThresholds;

    fn meta(&self) -> &ExerciseMeta {
        &self.meta
    }

    fn thresholds(&self) -> &PushupThresholds {
        &self.thresholds
    }

    fn analyze(&self, frame: &FrameInput<'_>, state: &mut PushupState) -> AnalysisResult {
        let lm = frame.landmarks;
        let t = &self.thresholds;

        let elbow = (angle_at(lm.get(LEFT_SHOULDER), lm.get(LEFT_ELBOW), lm.get(LEFT_WRIST))
            + angle_at(lm.get(RIGHT_SHOULDER), lm.get(RIGHT_ELBOW), lm.get(RIGHT_WRIST)))
            / 2.0;
        let body = angle_at(lm.get(LEFT_SHOULDER), lm.get(LEFT_HIP), lm.get(LEFT_KNEE));
        let straight = self.body_in_range(body);

        match state.phase {
            RepPhase::Up if elbow < t.elbow_angle_down => {
                state.phase = RepPhase::Down;
                state.min_elbow = elbow;
                state.body_broken = !straight;

                let hint = if elbow > t.elbow_angle_good {
                    Notification::new("Go LOWER! Chest to the floor", HintIcon::BodyDown)
                } else if !straight {
                    Notification::new("Keep your body STRAIGHT!", HintIcon::BodyStraight)
                } else {
                    Notification::new("Perfect! Now straighten your arms", HintIcon::BodyUp)
                        .with_background(HintColor::Emerald)
                };
                AnalysisResult::idle("Pushup").with_notification(hint)
            }
            RepPhase::Down if elbow > t.elbow_angle_up => {
                state.phase = RepPhase::Up;
                let min_elbow = std::mem::replace(&mut state.min_elbow, 180.0);
                let body_broken = std::mem::take(&mut state.body_broken) || !straight;

                let result = if min_elbow > t.elbow_angle_good {
                    AnalysisResult::incorrect("Ready", Diagnostic::new(DiagnosticCode::D201_PUSHUP_SHALLOW))
                } else if body_broken {
                    AnalysisResult::incorrect(
                        "Ready",
                        Diagnostic::new(DiagnosticCode::D202_PUSHUP_BODY_NOT_STRAIGHT),
                    )
                } else {
                    AnalysisResult::correct("Ready")
                };
                result.with_notification(
                    Notification::new("Ready for the next one", HintIcon::BodyDown)
                        .with_background(HintColor::Emerald)
                        .with_duration(1500),
                )
            }
            RepPhase::Down => {
                state.min_elbow = state.min_elbow.min(elbow);
                let result = AnalysisResult::idle("Pushup");
                if !straight && !state.body_broken {
                    state.body_broken = true;
                    return result
                        .with_notification(Notification::new("Keep your body STRAIGHT!", HintIcon::BodyStraight));
                }
                result
            }
            RepPhase::Up => AnalysisResult::idle("Ready"),
        }
    }
}
