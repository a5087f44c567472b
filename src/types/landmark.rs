//! Landmark snapshots as produced by the pose / face detector

use serde::{Deserialize, Serialize};

use crate::error::{FormcheckError, Result};

// Pose model indices
pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;
pub const LEFT_ELBOW: usize = 13;
pub const RIGHT_ELBOW: usize = 14;
pub const LEFT_WRIST: usize = 15;
pub const RIGHT_WRIST: usize = 16;
pub const LEFT_HIP: usize = 23;
pub const RIGHT_HIP: usize = 24;
pub const LEFT_KNEE: usize = 25;
pub const RIGHT_KNEE: usize = 26;
pub const LEFT_ANKLE: usize = 27;
pub const RIGHT_ANKLE: usize = 28;

// Face mesh indices
pub const FACE_NOSE_TIP: usize = 1;
pub const FACE_LEFT_CHEEK: usize = 234;
pub const FACE_RIGHT_CHEEK: usize = 454;

/// A single keypoint in normalized image coordinates (y grows downward)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }
}

/// Which detector produced a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LandmarkModel {
    Pose,
    Face,
}

impl LandmarkModel {
    /// Number of keypoints a full snapshot carries
    pub fn landmark_count(&self) -> usize {
        match self {
            LandmarkModel::Pose => crate::POSE_LANDMARK_COUNT,
            LandmarkModel::Face => crate::FACE_LANDMARK_COUNT,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LandmarkModel::Pose => "pose",
            LandmarkModel::Face => "face",
        }
    }

    /// Reject snapshots too short to hold every keypoint of this model
    pub fn check(&self, set: &LandmarkSet) -> Result<()> {
        let expected = self.landmark_count();
        if set.len() < expected {
            return Err(FormcheckError::IncompleteFrame {
                model: self.name(),
                expected,
                found: set.len(),
            });
        }
        Ok(())
    }
}

/// One detected subject's keypoints for one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    points: Vec<Landmark>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Landmark>) -> Self {
        Self { points }
    }

    /// All-zero snapshot of the given size
    pub fn zeroed(len: usize) -> Self {
        Self {
            points: vec![Landmark::default(); len],
        }
    }

    /// Keypoint at `index`; an absent index reads as the origin
    pub fn get(&self, index: usize) -> Landmark {
        self.points.get(index).copied().unwrap_or_default()
    }

    pub fn set(&mut self, index: usize, landmark: Landmark) {
        if index >= self.points.len() {
            self.points.resize(index + 1, Landmark::default());
        }
        self.points[index] = landmark;
    }

    /// Mean y of two keypoints
    pub fn mean_y(&self, a: usize, b: usize) -> f64 {
        (self.get(a).y + self.get(b).y) / 2.0
    }

    /// Mean x of two keypoints
    pub fn mean_x(&self, a: usize, b: usize) -> f64 {
        (self.get(a).x + self.get(b).x) / 2.0
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl From<Vec<Landmark>> for LandmarkSet {
    fn from(points: Vec<Landmark>) -> Self {
        Self::new(points)
    }
}
