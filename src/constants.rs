//! Tuning constants shared across the movement core.
//!
//! Per-entity tuning lives in [`crate::stats`]; the values here are the fixed
//! tolerances and defaults the geometry layer relies on.

/// Lengths below this are treated as zero when normalising directions.
pub const DIRECTION_EPSILON: f32 = 1.0e-6;

/// Distance below which a point is considered to lie on a wall plane.
pub const WALL_PLANE_EPSILON: f32 = 1.0e-4;

/// Number of segments sampled when searching a curve for its nearest point.
pub const DEFAULT_PATH_RESOLUTION: usize = 128;

/// Normalised curve-parameter gap under which a pursuer holds position.
pub const PURSUIT_EPSILON: f32 = 0.01;

/// Default capacity of the fixed overlap buffers used by sensing.
pub const DEFAULT_OVERLAP_CAPACITY: usize = 1024;

/// Upper bound on transitions applied back to back from enter hooks.
pub const MAX_TRANSITION_CHAIN: usize = 8;

/// Speed at which a climbing entity is pressed into the wall.
pub const WALL_STICK_FORCE: f32 = 5.0;

/// Gap kept between a climbing capsule and the wall face.
pub const WALL_OFFSET: f32 = 0.01;

/// Normalised height at which upward climbing tries to mantle a ledge.
pub const LEDGE_GRAB_THRESHOLD: f32 = 0.98;

/// Normalised height under which downward climbing may dismount.
pub const CLIMB_DISMOUNT_THRESHOLD: f32 = 0.01;

/// Raw input magnitude treated as a deliberate direction by the aim cone.
pub const CONE_INPUT_DEADZONE: f32 = 0.1;

/// Fraction of pull speed kept as an impulse when a grapple is released.
pub const GRAPPLE_RELEASE_FACTOR: f32 = 0.5;

/// Multiple of the capsule radius at which a grapple pull completes.
pub const GRAPPLE_ARRIVAL_RADII: f32 = 2.0;

/// Seconds a grapple button must be held before it counts as a hold.
pub const GRAPPLE_HOLD_THRESHOLD: f32 = 0.25;
