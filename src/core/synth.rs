//! Synthetic landmark snapshots
//!
//! Builds poses with chosen joint angles so state machines can be driven
//! without a camera. Used by the `--demo` mode and by tests.

use crate::core::replay::FrameRecord;
use crate::types::*;
use crate::{FACE_LANDMARK_COUNT, POSE_LANDMARK_COUNT};

/// Frame spacing of the demo scripts
const DEMO_FRAME_MS: u64 = 100;

/// Point `len` away from `vertex`, `angle_deg` away from the ray to `toward`
pub fn rotate_from(vertex: Landmark, toward: Landmark, angle_deg: f64, len: f64) -> Landmark {
    let (dx, dy) = (toward.x - vertex.x, toward.y - vertex.y);
    let norm = (dx * dx + dy * dy).sqrt().max(f64::EPSILON);
    let (ux, uy) = (dx / norm, dy / norm);
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    Landmark::new(
        vertex.x + len * (cos * ux - sin * uy),
        vertex.y + len * (sin * ux + cos * uy),
    )
}

fn pose() -> LandmarkSet {
    LandmarkSet::zeroed(POSE_LANDMARK_COUNT)
}

fn set_pair(set: &mut LandmarkSet, left: usize, right: usize, point: Landmark) {
    set.set(left, point);
    set.set(right, point);
}

/// Standing/squatting figure with the given knee angle, hip height above
/// the knees and shoulder-hip-knee angle
pub fn squat_pose(knee_angle: f64, hip_above_knee: f64, back_angle: f64) -> LandmarkSet {
    let mut set = pose();
    for (dx, hip, knee, ankle, shoulder) in [
        (0.0, LEFT_HIP, LEFT_KNEE, LEFT_ANKLE, LEFT_SHOULDER),
        (0.04, RIGHT_HIP, RIGHT_KNEE, RIGHT_ANKLE, RIGHT_SHOULDER),
    ] {
        let k = Landmark::new(0.5 + dx, 0.7);
        let h = Landmark::new(0.38 + dx, 0.7 - hip_above_knee);
        set.set(knee, k);
        set.set(hip, h);
        set.set(ankle, rotate_from(k, h, knee_angle, 0.2));
        set.set(shoulder, rotate_from(h, k, back_angle, 0.3));
    }
    set
}

/// Pushup with the given elbow angle and shoulder-hip-knee angle
pub fn pushup_pose(elbow_angle: f64, body_angle: f64) -> LandmarkSet {
    let mut set = pose();
    let s = Landmark::new(0.3, 0.5);
    let e = Landmark::new(0.3, 0.65);
    let h = Landmark::new(0.55, 0.5);
    let k = rotate_from(h, s, body_angle, 0.2);
    set_pair(&mut set, LEFT_SHOULDER, RIGHT_SHOULDER, s);
    set_pair(&mut set, LEFT_ELBOW, RIGHT_ELBOW, e);
    set_pair(&mut set, LEFT_WRIST, RIGHT_WRIST, rotate_from(e, s, elbow_angle, 0.15));
    set_pair(&mut set, LEFT_HIP, RIGHT_HIP, h);
    set_pair(&mut set, LEFT_KNEE, RIGHT_KNEE, k);
    set_pair(&mut set, LEFT_ANKLE, RIGHT_ANKLE, rotate_from(k, h, 180.0, 0.2));
    set
}

/// Situp with the given shoulder-hip-knee angle
pub fn situp_pose(hip_angle: f64) -> LandmarkSet {
    let mut set = pose();
    let h = Landmark::new(0.5, 0.7);
    let k = Landmark::new(0.7, 0.7);
    set_pair(&mut set, LEFT_HIP, RIGHT_HIP, h);
    set_pair(&mut set, LEFT_KNEE, RIGHT_KNEE, k);
    set_pair(&mut set, LEFT_SHOULDER, RIGHT_SHOULDER, rotate_from(h, k, hip_angle, 0.25));
    set
}

/// Plank with the given body angle; positive `shoulder_above_hip` lifts the
/// shoulders above the hip line
pub fn plank_pose(body_angle: f64, shoulder_above_hip: f64) -> LandmarkSet {
    let mut set = pose();
    let h = Landmark::new(0.5, 0.5);
    let s = Landmark::new(0.25, 0.5 - shoulder_above_hip);
    set_pair(&mut set, LEFT_HIP, RIGHT_HIP, h);
    set_pair(&mut set, LEFT_SHOULDER, RIGHT_SHOULDER, s);
    set_pair(&mut set, LEFT_KNEE, RIGHT_KNEE, rotate_from(h, s, body_angle, 0.2));
    set
}

/// One leg of a mountain climber pose
#[derive(Debug, Clone, Copy)]
pub struct Leg {
    pub knee_angle: f64,
    /// Knee above the hip line
    pub raised: bool,
}

impl Leg {
    pub fn straight() -> Self {
        Self { knee_angle: 180.0, raised: false }
    }

    /// Knee bent and pulled toward the chest
    pub fn driven(knee_angle: f64) -> Self {
        Self { knee_angle, raised: true }
    }

    /// Knee bent but hanging below the hips
    pub fn bent_low(knee_angle: f64) -> Self {
        Self { knee_angle, raised: false }
    }
}

/// Mountain climber with both ankles on the body line
pub fn mountain_pose(left: Leg, right: Leg, body_angle: f64) -> LandmarkSet {
    let mut set = pose();
    let s = Landmark::new(0.25, 0.5);
    let h = Landmark::new(0.5, 0.5);
    let a = rotate_from(h, s, body_angle, 0.4);
    set_pair(&mut set, LEFT_SHOULDER, RIGHT_SHOULDER, s);
    set_pair(&mut set, LEFT_HIP, RIGHT_HIP, h);
    set_pair(&mut set, LEFT_ANKLE, RIGHT_ANKLE, a);

    let mid = Landmark::new((h.x + a.x) / 2.0, (h.y + a.y) / 2.0);
    let (vx, vy) = ((a.x - h.x) / 0.4, (a.y - h.y) / 0.4);
    // Unit normal of the hip-ankle line pointing up the image
    let (nx, ny) = if vx >= 0.0 { (vy, -vx) } else { (-vy, vx) };

    for (leg, knee) in [(left, LEFT_KNEE), (right, RIGHT_KNEE)] {
        let half = leg.knee_angle.clamp(1.0, 180.0).to_radians() / 2.0;
        let d = 0.2 / half.tan();
        let side = if leg.raised { 1.0 } else { -1.0 };
        set.set(knee, Landmark::new(mid.x + side * d * nx, mid.y + side * d * ny));
    }
    set
}

/// Face mesh with the nose tip `offset` left of the cheek midpoint
pub fn neck_pose(offset: f64) -> LandmarkSet {
    let mut set = LandmarkSet::zeroed(FACE_LANDMARK_COUNT);
    set.set(FACE_LEFT_CHEEK, Landmark::new(0.4, 0.5));
    set.set(FACE_RIGHT_CHEEK, Landmark::new(0.6, 0.5));
    set.set(FACE_NOSE_TIP, Landmark::new(0.5 + offset, 0.5));
    set
}

/// Spread poses over frames; each pose is held for its duration
fn script(segments: Vec<(Option<LandmarkSet>, u64)>) -> Vec<FrameRecord> {
    let mut frames = Vec::new();
    let mut t = 0;
    for (landmarks, duration) in segments {
        let end = t + duration.max(DEMO_FRAME_MS);
        while t < end {
            frames.push(FrameRecord {
                t_ms: t as f64,
                landmarks: landmarks.clone(),
            });
            t += DEMO_FRAME_MS;
        }
    }
    frames
}

fn each_frame(poses: impl IntoIterator<Item = LandmarkSet>) -> Vec<(Option<LandmarkSet>, u64)> {
    poses.into_iter().map(|p| (Some(p), DEMO_FRAME_MS)).collect()
}

/// Scripted session for one exercise: a few good units and one faulty one
pub fn demo_frames(kind: ExerciseKind) -> Vec<FrameRecord> {
    let segments = match kind {
        ExerciseKind::Squat => {
            let rep = |hip: f64| {
                [170.0, 150.0, 120.0, 100.0, 85.0, 85.0, 110.0, 140.0, 165.0, 175.0]
                    .into_iter()
                    .map(move |knee| squat_pose(knee, if knee < 90.0 { hip } else { 0.2 }, 170.0))
            };
            let mut segments = each_frame(rep(0.0).chain(rep(0.0)));
            segments.push((None, 300));
            segments.extend(each_frame(rep(0.15)));
            segments
        }
        ExerciseKind::Pushup => {
            let rep = |deepest: f64| {
                [170.0, 130.0, 90.0, 75.0, deepest, deepest, 90.0, 130.0, 165.0]
                    .into_iter()
                    .map(|elbow| pushup_pose(elbow, 175.0))
            };
            each_frame(rep(45.0).chain(rep(45.0)).chain(rep(65.0)))
        }
        ExerciseKind::Situp => {
            let rep = |top: f64| {
                [160.0, 130.0, 100.0, top, top, 110.0, 140.0, 160.0]
                    .into_iter()
                    .map(situp_pose)
            };
            each_frame(rep(55.0).chain(rep(55.0)).chain(rep(80.0)))
        }
        ExerciseKind::Plank => vec![
            (Some(plank_pose(175.0, 0.02)), 5_000),
            (Some(plank_pose(140.0, 0.02)), 2_000),
            (Some(plank_pose(175.0, 0.02)), 1_100),
        ],
        ExerciseKind::Mountain => {
            let neutral = mountain_pose(Leg::straight(), Leg::straight(), 175.0);
            let left = mountain_pose(Leg::driven(60.0), Leg::straight(), 175.0);
            let right = mountain_pose(Leg::straight(), Leg::driven(60.0), 175.0);
            let sloppy = mountain_pose(Leg::driven(60.0), Leg::straight(), 130.0);
            vec![
                (Some(neutral.clone()), 300),
                (Some(left.clone()), 300),
                (Some(neutral.clone()), 300),
                (Some(right.clone()), 300),
                (Some(neutral.clone()), 300),
                (Some(left), 300),
                (Some(neutral.clone()), 300),
                (Some(right), 300),
                (Some(neutral), 300),
                (Some(sloppy), 300),
            ]
        }
        ExerciseKind::Neck => {
            let cycle = |leg_ms: u64| {
                vec![
                    (Some(neck_pose(0.0)), 300),
                    (Some(neck_pose(0.1)), leg_ms),
                    (Some(neck_pose(0.0)), leg_ms),
                    (Some(neck_pose(-0.1)), leg_ms),
                    (Some(neck_pose(0.0)), 300),
                ]
            };
            let mut segments = cycle(700);
            segments.extend(cycle(700));
            segments.extend(cycle(300));
            segments
        }
    };
    script(segments)
}
