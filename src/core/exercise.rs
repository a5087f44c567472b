//! Exercise definitions: one contract, six state machines
//!
//! Every exercise exposes metadata, named thresholds, an initial-state
//! factory and a pure `analyze` transition. `Exercise` is the tagged union
//! the session driver works with, looked up by identifier.

use std::collections::BTreeMap;
use std::time::Duration;
use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::config::ExerciseConfig;
use crate::error::{FormcheckError, Result};
use crate::types::{
    AnalysisResult, ExerciseKind, ExerciseMeta, ExerciseState, LandmarkSet, Thresholds,
};
use super::exercises::{Mountain, Neck, Plank, Pushup, Situp, Squat};

/// Everything `analyze` sees for one frame
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    pub landmarks: &'a LandmarkSet,
    /// Monotonic frame timestamp
    pub now: Duration,
    /// Hold time so far, supplied for hold-based exercises
    pub hold: Option<Duration>,
}

impl<'a> FrameInput<'a> {
    pub fn new(landmarks: &'a LandmarkSet, now: Duration) -> Self {
        Self { landmarks, now, hold: None }
    }

    pub fn with_hold(mut self, hold: Duration) -> Self {
        self.hold = Some(hold);
        self
    }
}

/// The contract each exercise state machine implements
pub trait RepDetector {
    type State: Default + Clone + std::fmt::Debug;
    type Thresholds: Serialize + DeserializeOwned + Clone;

    fn meta(&self) -> &ExerciseMeta;

    fn thresholds(&self) -> &Self::Thresholds;

    fn initial_state(&self) -> Self::State {
        Self::State::default()
    }

    /// Advance `state` by one frame; never fails
    fn analyze(&self, frame: &FrameInput<'_>, state: &mut Self::State) -> AnalysisResult;
}

/// Flatten a typed thresholds struct into the named map
pub fn threshold_map<T: Serialize>(thresholds: &T) -> Thresholds {
    let values = match serde_json::to_value(thresholds) {
        Ok(serde_json::Value::Object(map)) => map
            .into_iter()
            .filter_map(|(name, value)| value.as_f64().map(|v| (name, v)))
            .collect(),
        _ => Default::default(),
    };
    Thresholds::new(values)
}

/// Apply named overrides to a typed thresholds struct
///
/// Names that the exercise does not define are rejected.
pub fn merge_thresholds<T: Serialize + DeserializeOwned>(
    kind: ExerciseKind,
    base: &T,
    overrides: &BTreeMap<String, f64>,
) -> Result<T> {
    let mut value = serde_json::to_value(base)?;
    if let serde_json::Value::Object(map) = &mut value {
        for (name, v) in overrides {
            if !map.contains_key(name) {
                return Err(FormcheckError::UnknownThreshold {
                    exercise: kind.name().to_string(),
                    name: name.clone(),
                });
            }
            map.insert(name.clone(), serde_json::Value::from(*v));
        }
    }
    Ok(serde_json::from_value(value)?)
}

/// Milliseconds as f64, for comparisons against threshold values
pub(crate) fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// One of the six exercises
#[derive(Debug, Clone)]
pub enum Exercise {
    Squat(Squat),
    Pushup(Pushup),
    Situp(Situp),
    Plank(Plank),
    Mountain(Mountain),
    Neck(Neck),
}

impl Exercise {
    /// Exercise with its default target and thresholds
    pub fn new(kind: ExerciseKind) -> Self {
        match kind {
            ExerciseKind::Squat => Exercise::Squat(Squat::new()),
            ExerciseKind::Pushup => Exercise::Pushup(Pushup::new()),
            ExerciseKind::Situp => Exercise::Situp(Situp::new()),
            ExerciseKind::Plank => Exercise::Plank(Plank::new()),
            ExerciseKind::Mountain => Exercise::Mountain(Mountain::new()),
            ExerciseKind::Neck => Exercise::Neck(Neck::new()),
        }
    }

    /// Look up by identifier
    pub fn from_name(name: &str) -> Result<Self> {
        Ok(Self::new(name.parse()?))
    }

    /// Exercise with target and threshold overrides applied
    pub fn configured(kind: ExerciseKind, config: &ExerciseConfig) -> Result<Self> {
        let overrides = &config.thresholds;
        let mut exercise = match kind {
            ExerciseKind::Squat => {
                let base = Squat::new();
                Exercise::Squat(Squat::with_thresholds(merge_thresholds(kind, base.thresholds(), overrides)?))
            }
            ExerciseKind::Pushup => {
                let base = Pushup::new();
                Exercise::Pushup(Pushup::with_thresholds(merge_thresholds(kind, base.thresholds(), overrides)?))
            }
            ExerciseKind::Situp => {
                let base = Situp::new();
                Exercise::Situp(Situp::with_thresholds(merge_thresholds(kind, base.thresholds(), overrides)?))
            }
            ExerciseKind::Plank => {
                let base = Plank::new();
                Exercise::Plank(Plank::with_thresholds(merge_thresholds(kind, base.thresholds(), overrides)?))
            }
            ExerciseKind::Mountain => {
                let base = Mountain::new();
                Exercise::Mountain(Mountain::with_thresholds(merge_thresholds(kind, base.thresholds(), overrides)?))
            }
            ExerciseKind::Neck => {
                let base = Neck::new();
                Exercise::Neck(Neck::with_thresholds(merge_thresholds(kind, base.thresholds(), overrides)?))
            }
        };
        if let Some(target) = config.target {
            exercise.meta_mut().target = target;
        }
        Ok(exercise)
    }

    pub fn kind(&self) -> ExerciseKind {
        self.meta().kind
    }

    pub fn meta(&self) -> &ExerciseMeta {
        match self {
            Exercise::Squat(e) => e.meta(),
            Exercise::Pushup(e) => e.meta(),
            Exercise::Situp(e) => e.meta(),
            Exercise::Plank(e) => e.meta(),
            Exercise::Mountain(e) => e.meta(),
            Exercise::Neck(e) => e.meta(),
        }
    }

    fn meta_mut(&mut self) -> &mut ExerciseMeta {
        match self {
            Exercise::Squat(e) => &mut e.meta,
            Exercise::Pushup(e) => &mut e.meta,
            Exercise::Situp(e) => &mut e.meta,
            Exercise::Plank(e) => &mut e.meta,
            Exercise::Mountain(e) => &mut e.meta,
            Exercise::Neck(e) => &mut e.meta,
        }
    }

    /// Named threshold values
    pub fn thresholds(&self) -> Thresholds {
        match self {
            Exercise::Squat(e) => threshold_map(e.thresholds()),
            Exercise::Pushup(e) => threshold_map(e.thresholds()),
            Exercise::Situp(e) => threshold_map(e.thresholds()),
            Exercise::Plank(e) => threshold_map(e.thresholds()),
            Exercise::Mountain(e) => threshold_map(e.thresholds()),
            Exercise::Neck(e) => threshold_map(e.thresholds()),
        }
    }

    /// Fresh state for a new recording
    pub fn initial_state(&self) -> ExerciseState {
        match self {
            Exercise::Squat(e) => ExerciseState::Squat(e.initial_state()),
            Exercise::Pushup(e) => ExerciseState::Pushup(e.initial_state()),
            Exercise::Situp(e) => ExerciseState::Situp(e.initial_state()),
            Exercise::Plank(e) => ExerciseState::Plank(e.initial_state()),
            Exercise::Mountain(e) => ExerciseState::Mountain(e.initial_state()),
            Exercise::Neck(e) => ExerciseState::Neck(e.initial_state()),
        }
    }

    /// Advance `state` by one frame
    ///
    /// A state that belongs to another exercise is replaced by a fresh one.
    pub fn analyze(&self, frame: &FrameInput<'_>, state: &mut ExerciseState) -> AnalysisResult {
        match (self, &mut *state) {
            (Exercise::Squat(e), ExerciseState::Squat(s)) => return e.analyze(frame, s),
            (Exercise::Pushup(e), ExerciseState::Pushup(s)) => return e.analyze(frame, s),
            (Exercise::Situp(e), ExerciseState::Situp(s)) => return e.analyze(frame, s),
            (Exercise::Plank(e), ExerciseState::Plank(s)) => return e.analyze(frame, s),
            (Exercise::Mountain(e), ExerciseState::Mountain(s)) => return e.analyze(frame, s),
            (Exercise::Neck(e), ExerciseState::Neck(s)) => return e.analyze(frame, s),
            _ => {}
        }
        warn!(exercise = %self.kind(), "state belongs to another exercise, resetting");
        *state = self.initial_state();
        self.analyze(frame, state)
    }
}

/// All six exercises with default settings
pub fn catalog() -> Vec<Exercise> {
    ExerciseKind::ALL.iter().map(|k| Exercise::new(*k)).collect()
}
