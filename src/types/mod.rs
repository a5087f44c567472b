//! Core types for Formcheck

mod landmark;
mod state;
mod output;
mod reason;
mod hint;
mod exercise;
mod session;

pub use landmark::*;
pub use state::{
    RepPhase, LegPosition, NeckPhase, ExerciseState,
    SquatState, PushupState, SitupState, PlankState, MountainState, NeckState,
};
pub use output::AnalysisResult;
pub use reason::{Diagnostic, DiagnosticCode};
pub use hint::{Notification, HintIcon, HintColor};
pub use exercise::{ExerciseKind, ExerciseMeta, CountMode, Thresholds};
pub use session::{score, DiagnosticEntry, SessionAggregate, SessionResult};
