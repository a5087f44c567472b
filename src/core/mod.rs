//! Core modules for Formcheck

pub mod geometry;
pub mod exercise;
pub mod exercises;
pub mod session;
pub mod replay;
pub mod submit;
pub mod synth;
pub mod api;

pub use geometry::angle_at;
pub use exercise::{catalog, Exercise, FrameInput, RepDetector};
pub use session::{NullUi, SessionDriver, UiSink};
pub use replay::{FrameRecord, ReplaySource, Replayer};
pub use submit::{load_result, JsonFileSink, MemorySink, SubmissionSink};
pub use synth::demo_frames;
pub use api::{create_router, run_server};
