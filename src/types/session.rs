//! Session counters, diagnostics log and the submitted result record

use serde::{Deserialize, Serialize};
use crate::types::DiagnosticCode;

/// Final score: share of correct units, 0 when nothing was evaluated
pub fn score(correct: u32, incorrect: u32) -> u8 {
    let total = correct + incorrect;
    if total == 0 {
        return 0;
    }
    (100.0 * correct as f64 / total as f64).round() as u8
}

/// One line of the diagnostics log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticEntry {
    /// 1-based index of the repetition / time-check it belongs to
    pub index: u32,
    pub code: DiagnosticCode,
    pub message: String,
}

/// Counters and log for one recording
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionAggregate {
    pub total_count: u32,
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub diagnostics: Vec<DiagnosticEntry>,
    /// Accumulated hold time (hold-based exercises only)
    pub hold_ms: u64,
}

impl SessionAggregate {
    pub fn hold_seconds(&self) -> f64 {
        self.hold_ms as f64 / 1000.0
    }

    pub fn score(&self) -> u8 {
        score(self.correct_count, self.incorrect_count)
    }
}

/// Flat record handed to the submission collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub exercise_type: String,
    pub repetitions: u32,
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub errors: Vec<String>,
    pub score: u8,
    /// Seconds held, hold-based exercises only
    pub time: Option<f64>,
}
