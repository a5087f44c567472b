//! Recorded landmark streams
//!
//! One JSON object per line: `{"t_ms": 1234.0, "landmarks": [...] | null}`.
//! `null` landmarks mean the detector found no subject in that frame.

use std::io::BufRead;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::session::{SessionDriver, UiSink};
use crate::error::{FormcheckError, Result};
use crate::types::{AnalysisResult, LandmarkSet};

/// One frame of a recorded stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Milliseconds since the stream began
    pub t_ms: f64,
    #[serde(default)]
    pub landmarks: Option<LandmarkSet>,
}

impl FrameRecord {
    pub fn now(&self) -> Duration {
        Duration::from_micros((self.t_ms.max(0.0) * 1000.0).round() as u64)
    }
}

/// Iterator over the frames of a JSON Lines stream
pub struct ReplaySource<R> {
    reader: R,
    line: usize,
    buf: String,
}

impl<R: BufRead> ReplaySource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }
}

impl<R: BufRead> Iterator for ReplaySource<R> {
    type Item = Result<FrameRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
            self.line += 1;

            let text = self.buf.trim();
            if text.is_empty() {
                continue;
            }
            trace!(line = self.line, "parsing frame");
            return Some(serde_json::from_str(text).map_err(|e| FormcheckError::MalformedFrame {
                line: self.line,
                message: e.to_string(),
            }));
        }
    }
}

/// Feeds recorded frames to a driver, deriving hold ticks from timestamps
///
/// One tick of `tick` length is issued for every tick boundary crossed since
/// the first frame, before that frame is analyzed.
pub struct Replayer {
    tick: Duration,
    start: Option<Duration>,
    ticks: u64,
}

impl Replayer {
    pub fn new(tick: Duration) -> Self {
        Self {
            tick: tick.max(Duration::from_millis(1)),
            start: None,
            ticks: 0,
        }
    }

    pub fn feed(
        &mut self,
        driver: &mut SessionDriver,
        frame: &FrameRecord,
        ui: &mut dyn UiSink,
    ) -> Option<AnalysisResult> {
        let now = frame.now();
        let start = *self.start.get_or_insert(now);
        let due = (now.saturating_sub(start).as_micros() / self.tick.as_micros()) as u64;
        while self.ticks < due {
            driver.tick(self.tick);
            self.ticks += 1;
        }
        driver.process_frame(frame.landmarks.as_ref(), now, ui)
    }

    /// Drive a whole stream; stops at the first malformed line
    pub fn run<I>(&mut self, driver: &mut SessionDriver, frames: I, ui: &mut dyn UiSink) -> Result<usize>
    where
        I: IntoIterator<Item = Result<FrameRecord>>,
    {
        let mut count = 0;
        for frame in frames {
            self.feed(driver, &frame?, ui);
            count += 1;
        }
        debug!(frames = count, ticks = self.ticks, "replay finished");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_skips_blank_lines() {
        let input = "{\"t_ms\": 0, \"landmarks\": null}\n\n   \n{\"t_ms\": 100, \"landmarks\": [{\"x\": 0.5, \"y\": 0.5}]}\n";
        let frames: Vec<FrameRecord> = ReplaySource::new(Cursor::new(input)).collect::<Result<_>>().unwrap();
        assert_eq!(frames.len(), 2);
        assert!(frames[0].landmarks.is_none());
        assert_eq!(frames[1].landmarks.as_ref().unwrap().len(), 1);
        assert_eq!(frames[1].now(), Duration::from_millis(100));
    }

    #[test]
    fn test_malformed_line_number() {
        let input = "{\"t_ms\": 0, \"landmarks\": null}\n\n{\"t_ms\": oops}\n";
        let results: Vec<Result<FrameRecord>> = ReplaySource::new(Cursor::new(input)).collect();
        assert!(results[0].is_ok());
        match &results[1] {
            Err(FormcheckError::MalformedFrame { line, .. }) => assert_eq!(*line, 3),
            other => panic!("expected malformed frame, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_landmarks_field_is_no_subject() {
        let frame: FrameRecord = serde_json::from_str("{\"t_ms\": 5}").unwrap();
        assert!(frame.landmarks.is_none());
    }
}
