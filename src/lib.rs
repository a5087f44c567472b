//! Formcheck: exercise form checker
//!
//! Landmark snapshots → exercise state machine → counted/correct verdicts.

pub mod config;
pub mod core;
pub mod error;
pub mod types;

pub use error::{FormcheckError, Result};

// =============================================================================
// LANDMARK MODELS - MediaPipe numbering
// =============================================================================

/// Number of keypoints in a pose snapshot
pub const POSE_LANDMARK_COUNT: usize = 33;

/// Number of keypoints in a face mesh snapshot (with irises)
pub const FACE_LANDMARK_COUNT: usize = 478;

// =============================================================================
// SESSION TIMING
// =============================================================================

/// Period of the hold ticker for hold-based exercises (milliseconds)
/// 100 ms - the plank check interval is a whole number of ticks
pub const HOLD_TICK_MS: u64 = 100;

/// Default lifetime of a hint on screen (milliseconds)
pub const DEFAULT_HINT_DURATION_MS: u64 = 2500;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
