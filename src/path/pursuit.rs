//! Ahead/behind resolution for two actors sharing a path.
//!
//! The comparison is on raw normalised parameters. On closed curves the gap
//! is not wrapped across the 0/1 seam, so a pursuer close to the seam may
//! take the long way round.
use glam::Vec3;

use super::Path;
use crate::constants::PURSUIT_EPSILON;

/// What a pursuer should do this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PursuitStep {
    /// Close enough; decelerate to a stop.
    Hold,
    /// Move along this unit direction.
    Advance(Vec3),
}

/// Sign along the curve's natural tangent that closes the gap, or `None`
/// when the parameters are within `epsilon`.
///
/// # Examples
/// ```
/// use grapnel::path::pursuit_sign;
/// assert_eq!(pursuit_sign(0.3, 0.7, 0.01), Some(1.0));
/// assert_eq!(pursuit_sign(0.7, 0.3, 0.01), Some(-1.0));
/// assert_eq!(pursuit_sign(0.5, 0.505, 0.01), None);
/// ```
#[must_use]
pub fn pursuit_sign(t_pursuer: f32, t_target: f32, epsilon: f32) -> Option<f32> {
    if (t_target - t_pursuer).abs() <= epsilon {
        None
    } else if t_target > t_pursuer {
        Some(1.0)
    } else {
        Some(-1.0)
    }
}

/// Resolves pursuit between two world positions on `path`.
///
/// The advance direction is the tangent at the pursuer's own nearest point.
#[must_use]
pub fn resolve_pursuit(path: &Path, pursuer: Vec3, target: Vec3) -> PursuitStep {
    let own = path.nearest_point_and_tangent(pursuer);
    let theirs = path.nearest_point_and_tangent(target);
    match pursuit_sign(own.t, theirs.t, PURSUIT_EPSILON) {
        Some(sign) => PursuitStep::Advance(own.tangent * sign),
        None => PursuitStep::Hold,
    }
}
