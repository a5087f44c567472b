//! Exercise phases and per-session state

use std::time::Duration;
use serde::{Deserialize, Serialize};

/// Two-phase position for squat, pushup and situp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepPhase {
    Up,
    Down,
}

impl std::fmt::Display for RepPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RepPhase::Up => "UP",
            RepPhase::Down => "DOWN",
        };
        write!(f, "{}", name)
    }
}

/// Which leg is driven forward in a mountain climber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegPosition {
    Neutral,
    Left,
    Right,
}

impl std::fmt::Display for LegPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LegPosition::Neutral => "NEUTRAL",
            LegPosition::Left => "LEFT",
            LegPosition::Right => "RIGHT",
        };
        write!(f, "{}", name)
    }
}

/// Neck rotation cycle: left → center → right → center
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeckPhase {
    /// Waiting for the first left turn
    Idle,
    /// Head turned left
    Left,
    /// Back at center after the left turn
    CenterAfterLeft,
    /// Head turned right
    Right,
    /// Cycle finished; behaves as Idle on the next frame
    Complete,
}

impl std::fmt::Display for NeckPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NeckPhase::Idle => "IDLE",
            NeckPhase::Left => "LEFT",
            NeckPhase::CenterAfterLeft => "CENTER_AFTER_LEFT",
            NeckPhase::Right => "RIGHT",
            NeckPhase::Complete => "COMPLETE",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SquatState {
    pub phase: RepPhase,
}

impl Default for SquatState {
    fn default() -> Self {
        Self { phase: RepPhase::Up }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PushupState {
    pub phase: RepPhase,
    /// Smallest mean elbow angle seen during the current descent
    pub min_elbow: f64,
    /// Body angle left its range during the current descent
    pub body_broken: bool,
}

impl Default for PushupState {
    fn default() -> Self {
        Self {
            phase: RepPhase::Up,
            min_elbow: 180.0,
            body_broken: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SitupState {
    pub phase: RepPhase,
}

impl Default for SitupState {
    fn default() -> Self {
        Self { phase: RepPhase::Down }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlankState {
    /// Index of the last check interval that fired
    pub last_check: u64,
    pub check_count: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MountainState {
    pub position: LegPosition,
    /// When the last counted switch happened
    pub last_change: Option<Duration>,
}

impl Default for MountainState {
    fn default() -> Self {
        Self {
            position: LegPosition::Neutral,
            last_change: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NeckState {
    pub phase: NeckPhase,
    pub cycle_start: Duration,
    pub last_change: Duration,
    /// A sub-transition in this cycle was too fast
    pub flawed: bool,
}

impl Default for NeckState {
    fn default() -> Self {
        Self {
            phase: NeckPhase::Idle,
            cycle_start: Duration::ZERO,
            last_change: Duration::ZERO,
            flawed: false,
        }
    }
}

/// Running state of whichever exercise is active
#[derive(Debug, Clone, PartialEq)]
pub enum ExerciseState {
    Squat(SquatState),
    Pushup(PushupState),
    Situp(SitupState),
    Plank(PlankState),
    Mountain(MountainState),
    Neck(NeckState),
}

impl ExerciseState {
    /// Discrete phase label for logs and status displays
    pub fn phase_label(&self) -> String {
        match self {
            ExerciseState::Squat(s) => s.phase.to_string(),
            ExerciseState::Pushup(s) => s.phase.to_string(),
            ExerciseState::Situp(s) => s.phase.to_string(),
            ExerciseState::Plank(s) => format!("HOLD#{}", s.check_count),
            ExerciseState::Mountain(s) => s.position.to_string(),
            ExerciseState::Neck(s) => s.phase.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_phases() {
        assert_eq!(SquatState::default().phase, RepPhase::Up);
        assert_eq!(SitupState::default().phase, RepPhase::Down);
        assert_eq!(MountainState::default().last_change, None);
        assert_eq!(NeckState::default().phase, NeckPhase::Idle);
    }

    #[test]
    fn test_phase_label() {
        let state = ExerciseState::Neck(NeckState::default());
        assert_eq!(state.phase_label(), "IDLE");
    }
}
