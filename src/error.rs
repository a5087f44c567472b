//! Error type for everything outside the state machines
//!
//! `analyze` never fails; these cover configuration, IO and session plumbing.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormcheckError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown exercise: {name}")]
    UnknownExercise { name: String },

    #[error("Unknown threshold '{name}' for exercise {exercise}")]
    UnknownThreshold { exercise: String, name: String },

    #[error("Malformed frame on line {line}: {message}")]
    MalformedFrame { line: usize, message: String },

    #[error("Frame has {found} landmarks, the {model} model needs {expected}")]
    IncompleteFrame {
        model: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Invalid session transition: {message}")]
    InvalidTransition { message: String },
}

impl FormcheckError {
    pub fn unknown_exercise<S: Into<String>>(name: S) -> Self {
        Self::UnknownExercise { name: name.into() }
    }

    pub fn invalid_transition<S: Into<String>>(message: S) -> Self {
        Self::InvalidTransition {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FormcheckError>;
