//! Scales and angular layout shared by both renderers.

pub mod angles;
pub mod scales;

pub use angles::{label_flipped, normalize_angle, AngleAssignment, AngularSlot};
pub use scales::{polar_to_cartesian, LinearScale, MarkerScale, RadialScale};
