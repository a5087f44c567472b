//! Where finished session results go

use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Result;
use crate::types::SessionResult;

/// Receives the result record when a session stops
pub trait SubmissionSink {
    fn submit(&mut self, result: &SessionResult) -> Result<()>;
}

/// Keeps results in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub results: Vec<SessionResult>,
}

impl SubmissionSink for MemorySink {
    fn submit(&mut self, result: &SessionResult) -> Result<()> {
        self.results.push(result.clone());
        Ok(())
    }
}

/// Writes each result as pretty JSON into a directory
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
    last_path: Option<PathBuf>,
}

impl JsonFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            last_path: None,
        }
    }

    /// File written by the most recent submit
    pub fn last_path(&self) -> Option<&Path> {
        self.last_path.as_deref()
    }
}

impl SubmissionSink for JsonFileSink {
    fn submit(&mut self, result: &SessionResult) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S%3f");
        let path = self.dir.join(format!("{}_{}.json", result.exercise_type, timestamp));
        let json = serde_json::to_string_pretty(result)?;
        fs::write(&path, json)?;

        info!(path = %path.display(), score = result.score, "result saved");
        self.last_path = Some(path);
        Ok(())
    }
}

/// Read back a saved result
pub fn load_result(path: &Path) -> Result<SessionResult> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SessionResult {
        SessionResult {
            exercise_type: "squat".to_string(),
            repetitions: 3,
            correct_count: 2,
            incorrect_count: 1,
            errors: vec!["Squat not deep enough".to_string()],
            score: 67,
            time: None,
        }
    }

    #[test]
    fn test_file_sink_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = JsonFileSink::new(dir.path().join("results"));
        sink.submit(&sample()).unwrap();

        let path = sink.last_path().unwrap().to_path_buf();
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("squat_"));
        assert_eq!(load_result(&path).unwrap(), sample());
    }

    #[test]
    fn test_memory_sink() {
        let mut sink = MemorySink::default();
        sink.submit(&sample()).unwrap();
        assert_eq!(sink.results.len(), 1);
    }
}
