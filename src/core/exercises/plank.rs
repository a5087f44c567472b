//! Plank: one form check per elapsed check interval
//!
//! The hold time comes from the session's ticker, never from the frame
//! clock. A check fires the first time the hold time reaches each new
//! multiple of `check_interval_ms`.

use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::core::exercise::{FrameInput, RepDetector};
use crate::core::geometry::angle_at;
use crate::types::*;

static INSTRUCTIONS: [&str; 6] = [
    "Rest on your forearms and toes",
    "Elbows directly under your shoulders",
    "Keep your body in one straight line",
    "Brace your abs and glutes",
    "Do not let your hips sag or rise",
    "Breathe steadily and hold the position",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlankThresholds {
    pub body_angle_min: f64,
    pub body_angle_max: f64,
    /// Allowed vertical gap between shoulder and hip midpoints
    pub hip_shoulder_diff: f64,
    pub check_interval_ms: f64,
}

impl Default for PlankThresholds {
    fn default() -> Self {
        Self {
            body_angle_min: 155.0,
            body_angle_max: 205.0,
            hip_shoulder_diff: 0.12,
            check_interval_ms: 1000.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Plank {
    pub(crate) meta: ExerciseMeta,
    thresholds: PlankThresholds,
}

impl Default for Plank {
    fn default() -> Self {
        Self::new()
    }
}

impl Plank {
    pub fn new() -> Self {
        Self::with_thresholds(PlankThresholds::default())
    }

    pub fn with_thresholds(thresholds: PlankThresholds) -> Self {
        Self {
            meta: ExerciseMeta {
                kind: ExerciseKind::Plank,
                name: "plank",
                title: "Plank",
                target: 60,
                count_mode: CountMode::HoldSeconds,
                landmark_model: LandmarkModel::Pose,
                instructions: &INSTRUCTIONS,
            },
            thresholds,
        }
    }
}

impl RepDetector for Plank {
    type State = PlankState;
    type Thresholds = PlankThresholds;

    fn meta(&self) -> &ExerciseMeta {
        &self.meta
    }

    fn thresholds(&self) -> &PlankThresholds {
        &self.thresholds
    }

    fn analyze(&self, frame: &FrameInput<'_>, state: &mut PlankState) -> AnalysisResult {
        let lm = frame.landmarks;
        let t = &self.thresholds;
        let hold = frame.hold.unwrap_or(Duration::ZERO);
        let hold_secs = hold.as_secs_f64();
        let status = format!("Plank: {:.1}s", hold_secs);

        let check = (hold.as_millis() as f64 / t.check_interval_ms.max(1.0)).floor() as u64;
        if check <= state.last_check {
            return AnalysisResult::idle(status);
        }
        state.last_check = check;
        state.check_count += 1;

        let body = angle_at(lm.get(LEFT_SHOULDER), lm.get(LEFT_HIP), lm.get(LEFT_KNEE));
        let shoulder_y = lm.mean_y(LEFT_SHOULDER, RIGHT_SHOULDER);
        let hip_y = lm.mean_y(LEFT_HIP, RIGHT_HIP);

        if body < t.body_angle_min {
            AnalysisResult::incorrect(status, Diagnostic::at_hold(DiagnosticCode::D401_PLANK_SAGGING, hold_secs))
                .with_notification(Notification::new("Don't sag! Brace your core", HintIcon::BodyStraight))
        } else if body > t.body_angle_max {
            AnalysisResult::incorrect(status, Diagnostic::at_hold(DiagnosticCode::D402_PLANK_HIPS_HIGH, hold_secs))
                .with_notification(Notification::new("Lower your hips! Don't pike", HintIcon::HipsDown))
        } else if (shoulder_y - hip_y).abs() > t.hip_shoulder_diff {
            let hint = if shoulder_y < hip_y {
                Notification::new("Raise your hips to shoulder level!", HintIcon::HipsUp)
            } else {
                Notification::new("Lower your hips to shoulder level!", HintIcon::HipsDown)
            };
            AnalysisResult::incorrect(
                status,
                Diagnostic::at_hold(DiagnosticCode::D403_PLANK_HIPS_MISALIGNED, hold_secs),
            )
            .with_notification(hint)
        } else {
            AnalysisResult::correct(status)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::synth::plank_pose;

    fn check_at(plank: &Plank, state: &mut PlankState, pose: &LandmarkSet, hold_ms: u64) -> AnalysisResult {
        let frame = FrameInput::new(pose, Duration::from_millis(hold_ms))
            .with_hold(Duration::from_millis(hold_ms));
        plank.analyze(&frame, state)
    }

    #[test]
    fn test_one_check_per_second() {
        let plank = Plank::new();
        let mut state = plank.initial_state();
        let pose = plank_pose(175.0, 0.02);
        let fired: Vec<u64> = (0..=50u64)
            .map(|i| i * 100)
            .filter(|ms| check_at(&plank, &mut state, &pose, *ms).counted)
            .collect();
        assert_eq!(fired, vec![1000, 2000, 3000, 4000, 5000]);
        assert_eq!(state.check_count, 5);
    }

    #[test]
    fn test_repeated_frames_within_tick_fire_once() {
        let plank = Plank::new();
        let mut state = plank.initial_state();
        let pose = plank_pose(175.0, 0.02);
        assert!(check_at(&plank, &mut state, &pose, 1000).counted);
        assert!(!check_at(&plank, &mut state, &pose, 1000).counted);
        assert!(!check_at(&plank, &mut state, &pose, 1900).counted);
    }

    #[test]
    fn test_sagging_diagnostic_carries_time() {
        let plank = Plank::new();
        let mut state = plank.initial_state();
        let r = check_at(&plank, &mut state, &plank_pose(140.0, 0.02), 3000);
        assert!(r.counted && !r.correct);
        let d = r.diagnostic.unwrap();
        assert_eq!(d.code, DiagnosticCode::D401_PLANK_SAGGING);
        assert_eq!(d.message, "Body sagging at 3.0s");
    }

    #[test]
    fn test_hips_off_shoulder_line() {
        let plank = Plank::new();
        let mut state = plank.initial_state();
        let r = check_at(&plank, &mut state, &plank_pose(175.0, 0.2), 1000);
        assert!(r.counted && !r.correct);
        assert_eq!(r.diagnostic.unwrap().code, DiagnosticCode::D403_PLANK_HIPS_MISALIGNED);
        assert_eq!(r.notification.unwrap().icon, HintIcon::HipsUp);
    }

    #[test]
    fn test_no_hold_no_check() {
        let plank = Plank::new();
        let mut state = plank.initial_state();
        let pose = plank_pose(175.0, 0.02);
        let r = plank.analyze(&FrameInput::new(&pose, Duration::from_secs(5)), &mut state);
        assert!(!r.counted);
        assert_eq!(r.status, "Plank: 0.0s");
    }
}
