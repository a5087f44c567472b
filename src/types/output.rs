//! Per-frame analysis outcome

use serde::{Deserialize, Serialize};
use crate::types::{Diagnostic, Notification};

/// What one `analyze` call observed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// One rep / time-check just completed
    pub counted: bool,
    /// Verdict; only meaningful when `counted`
    pub correct: bool,
    /// Current phase label
    pub status: String,
    /// Appended to the session log when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<Diagnostic>,
    /// Hint for the UI when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
}

impl AnalysisResult {
    /// Nothing happened this frame
    pub fn idle(status: impl Into<String>) -> Self {
        Self {
            counted: false,
            correct: false,
            status: status.into(),
            diagnostic: None,
            notification: None,
        }
    }

    /// A unit completed with a good verdict
    pub fn correct(status: impl Into<String>) -> Self {
        Self {
            counted: true,
            correct: true,
            ..Self::idle(status)
        }
    }

    /// A unit completed but was disqualified
    pub fn incorrect(status: impl Into<String>, diagnostic: Diagnostic) -> Self {
        Self {
            counted: true,
            correct: false,
            diagnostic: Some(diagnostic),
            ..Self::idle(status)
        }
    }

    pub fn with_diagnostic(mut self, diagnostic: Diagnostic) -> Self {
        self.diagnostic = Some(diagnostic);
        self
    }

    pub fn with_notification(mut self, notification: Notification) -> Self {
        self.notification = Some(notification);
        self
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        let verdict = match (self.counted, self.correct) {
            (false, _) => "-",
            (true, true) => "correct",
            (true, false) => "incorrect",
        };
        match &self.diagnostic {
            Some(d) => format!(
                "status={} | counted={} | verdict={} | diagnostic={}",
                self.status, self.counted, verdict, d.code.code()
            ),
            None => format!(
                "status={} | counted={} | verdict={}",
                self.status, self.counted, verdict
            ),
        }
    }
}
