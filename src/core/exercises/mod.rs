//! The six exercise state machines

mod squat;
mod pushup;
mod situp;
mod plank;
mod mountain;
mod neck;

pub use squat::{Squat, SquatThresholds};
pub use pushup::{Pushup, PushupThresholds};
pub use situp::{Situp, SitupThresholds};
pub use plank::{Plank, PlankThresholds};
pub use mountain::{Mountain, MountainThresholds};
pub use neck::{Neck, NeckThresholds};
