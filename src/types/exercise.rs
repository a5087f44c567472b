//! Exercise identity and metadata

use std::collections::BTreeMap;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::error::FormcheckError;
use crate::types::LandmarkModel;

/// The six supported exercises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseKind {
    Squat,
    Pushup,
    Situp,
    Plank,
    Mountain,
    Neck,
}

impl ExerciseKind {
    pub const ALL: [ExerciseKind; 6] = [
        ExerciseKind::Squat,
        ExerciseKind::Pushup,
        ExerciseKind::Situp,
        ExerciseKind::Plank,
        ExerciseKind::Mountain,
        ExerciseKind::Neck,
    ];

    /// Identifier used in config keys, API bodies and result records
    pub fn name(&self) -> &'static str {
        match self {
            ExerciseKind::Squat => "squat",
            ExerciseKind::Pushup => "pushup",
            ExerciseKind::Situp => "situp",
            ExerciseKind::Plank => "plank",
            ExerciseKind::Mountain => "mountain",
            ExerciseKind::Neck => "neck",
        }
    }
}

impl std::fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExerciseKind {
    type Err = FormcheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "squat" => Ok(ExerciseKind::Squat),
            "pushup" | "push-up" => Ok(ExerciseKind::Pushup),
            "situp" | "sit-up" => Ok(ExerciseKind::Situp),
            "plank" => Ok(ExerciseKind::Plank),
            "mountain" | "mountain-climber" => Ok(ExerciseKind::Mountain),
            "neck" | "neck-rotation" => Ok(ExerciseKind::Neck),
            _ => Err(FormcheckError::unknown_exercise(s)),
        }
    }
}

/// How progress toward the target is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountMode {
    /// Target is a number of repetitions
    Repetitions,
    /// Target is a number of seconds held
    HoldSeconds,
}

/// Named numeric thresholds of one exercise
///
/// Angles in degrees, offsets in normalized units, durations in milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Thresholds(BTreeMap<String, f64>);

impl Thresholds {
    pub fn new(values: BTreeMap<String, f64>) -> Self {
        Self(values)
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Static description of an exercise
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseMeta {
    pub kind: ExerciseKind,
    pub name: &'static str,
    pub title: &'static str,
    /// Repetitions or seconds, per `count_mode`
    pub target: u32,
    pub count_mode: CountMode,
    pub landmark_model: LandmarkModel,
    pub instructions: &'static [&'static str],
}

impl ExerciseMeta {
    pub fn is_hold(&self) -> bool {
        self.count_mode == CountMode::HoldSeconds
    }
}
