//! Joint-angle geometry

use crate::types::Landmark;

/// Angle in degrees at vertex `p2` between the rays to `p1` and `p3`
///
/// Always in [0, 180]. Coincident points yield whatever `atan2(0, 0)` gives,
/// which is deterministic.
pub fn angle_at(p1: Landmark, p2: Landmark, p3: Landmark) -> f64 {
    let radians = (p3.y - p2.y).atan2(p3.x - p2.x) - (p1.y - p2.y).atan2(p1.x - p2.x);
    let angle = radians.to_degrees().abs();
    if angle > 180.0 {
        360.0 - angle
    } else {
        angle
    }
}
