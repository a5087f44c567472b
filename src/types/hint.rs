//! On-screen hints requested by the exercise state machines

use serde::{Deserialize, Serialize};
use crate::DEFAULT_HINT_DURATION_MS;

/// Opaque icon reference; the UI decides how to draw it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HintIcon {
    BodyDown,
    BodyUp,
    BodyStraight,
    TorsoUp,
    HipsUp,
    HipsDown,
    LegLeft,
    LegRight,
    PlankPosition,
    HeadLeft,
    HeadRight,
    HeadCenter,
    Check,
    Warning,
}

/// Hint background colours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HintColor {
    /// Default for corrections
    Red,
    /// Good repetition
    Emerald,
    /// Turn left prompts
    Orange,
    /// Turn right prompts
    Blue,
    /// Neck phase reached
    Green,
    /// Slow down
    Amber,
    /// Out-of-order movement
    Crimson,
}

impl HintColor {
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            HintColor::Red => (239, 68, 68),
            HintColor::Emerald => (16, 185, 129),
            HintColor::Orange => (255, 87, 34),
            HintColor::Blue => (33, 150, 243),
            HintColor::Green => (76, 175, 80),
            HintColor::Amber => (255, 152, 0),
            HintColor::Crimson => (244, 67, 54),
        }
    }
}

/// A fire-and-forget hint for the notification sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub icon: HintIcon,
    pub background: HintColor,
    pub duration_ms: u64,
}

impl Notification {
    /// Correction hint with the default colour and duration
    pub fn new(message: impl Into<String>, icon: HintIcon) -> Self {
        Self {
            message: message.into(),
            icon,
            background: HintColor::Red,
            duration_ms: DEFAULT_HINT_DURATION_MS,
        }
    }

    pub fn with_background(mut self, background: HintColor) -> Self {
        self.background = background;
        self
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let n = Notification::new("Keep your back straight!", HintIcon::BodyStraight);
        assert_eq!(n.background, HintColor::Red);
        assert_eq!(n.duration_ms, DEFAULT_HINT_DURATION_MS);
    }
}
