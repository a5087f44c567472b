//! Diagnostic codes for disqualified repetitions and hold checks

use serde::{Deserialize, Serialize};

/// Why a repetition or time-check was judged incorrect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum DiagnosticCode {
    // =========================================================================
    // D1xx: Squat
    // =========================================================================
    /// Hips stayed above knee level
    D101_SQUAT_SHALLOW,
    /// Torso folded forward
    D102_SQUAT_BACK_BENT,

    // =========================================================================
    // D2xx: Pushup
    // =========================================================================
    /// Elbows never bent far enough
    D201_PUSHUP_SHALLOW,
    /// Shoulder-hip-knee line broke during the descent
    D202_PUSHUP_BODY_NOT_STRAIGHT,

    // =========================================================================
    // D3xx: Situp
    // =========================================================================
    /// Torso not raised to a full crunch
    D301_SITUP_LOW,

    // =========================================================================
    // D4xx: Plank
    // =========================================================================
    /// Body angle below minimum
    D401_PLANK_SAGGING,
    /// Body angle above maximum
    D402_PLANK_HIPS_HIGH,
    /// Hips off the shoulder line
    D403_PLANK_HIPS_MISALIGNED,

    // =========================================================================
    // D5xx: Mountain climber
    // =========================================================================
    /// Plank lost while switching to the left leg
    D501_MOUNTAIN_PLANK_LOST_LEFT,
    /// Plank lost while switching to the right leg
    D502_MOUNTAIN_PLANK_LOST_RIGHT,

    // =========================================================================
    // D6xx: Neck rotation
    // =========================================================================
    /// A phase was left before the minimum dwell time
    D601_NECK_TOO_FAST,
    /// Head swung across without pausing at center
    D602_NECK_SKIPPED_CENTER,
    /// Whole cycle shorter than the minimum
    D603_NECK_FAST_CYCLE,
}

impl DiagnosticCode {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::D101_SQUAT_SHALLOW => "D101_SQUAT_SHALLOW",
            Self::D102_SQUAT_BACK_BENT => "D102_SQUAT_BACK_BENT",
            Self::D201_PUSHUP_SHALLOW => "D201_PUSHUP_SHALLOW",
            Self::D202_PUSHUP_BODY_NOT_STRAIGHT => "D202_PUSHUP_BODY_NOT_STRAIGHT",
            Self::D301_SITUP_LOW => "D301_SITUP_LOW",
            Self::D401_PLANK_SAGGING => "D401_PLANK_SAGGING",
            Self::D402_PLANK_HIPS_HIGH => "D402_PLANK_HIPS_HIGH",
            Self::D403_PLANK_HIPS_MISALIGNED => "D403_PLANK_HIPS_MISALIGNED",
            Self::D501_MOUNTAIN_PLANK_LOST_LEFT => "D501_MOUNTAIN_PLANK_LOST_LEFT",
            Self::D502_MOUNTAIN_PLANK_LOST_RIGHT => "D502_MOUNTAIN_PLANK_LOST_RIGHT",
            Self::D601_NECK_TOO_FAST => "D601_NECK_TOO_FAST",
            Self::D602_NECK_SKIPPED_CENTER => "D602_NECK_SKIPPED_CENTER",
            Self::D603_NECK_FAST_CYCLE => "D603_NECK_FAST_CYCLE",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::D101_SQUAT_SHALLOW => "Insufficient squat depth",
            Self::D102_SQUAT_BACK_BENT => "Back bent",
            Self::D201_PUSHUP_SHALLOW => "Insufficient pushup depth",
            Self::D202_PUSHUP_BODY_NOT_STRAIGHT => "Body not straight",
            Self::D301_SITUP_LOW => "Torso not raised high enough",
            Self::D401_PLANK_SAGGING => "Body sagging",
            Self::D402_PLANK_HIPS_HIGH => "Hips raised too high",
            Self::D403_PLANK_HIPS_MISALIGNED => "Hips not level with shoulders",
            Self::D501_MOUNTAIN_PLANK_LOST_LEFT => "Plank lost on switch to left leg",
            Self::D502_MOUNTAIN_PLANK_LOST_RIGHT => "Plank lost on switch to right leg",
            Self::D601_NECK_TOO_FAST => "Movement too fast",
            Self::D602_NECK_SKIPPED_CENTER => "Skipped center",
            Self::D603_NECK_FAST_CYCLE => "Fast cycle",
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}

/// A diagnostic raised by `analyze`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub message: String,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode) -> Self {
        Self {
            code,
            message: code.description().to_string(),
        }
    }

    /// Diagnostic stamped with the hold time it was observed at
    pub fn at_hold(code: DiagnosticCode, hold_secs: f64) -> Self {
        Self {
            code,
            message: format!("{} at {:.1}s", code.description(), hold_secs),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}
