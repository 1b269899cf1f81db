//! Plane projection, bounded stepping and look rotations on `glam` types.
//!
//! Shared by the kinematic, surface and sensing layers.
use glam::{Mat3, Quat, Vec3};

use crate::constants::DIRECTION_EPSILON;

/// One of the three local axes of a box or frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Right.
    X,
    /// Up.
    Y,
    /// Forward.
    Z,
}

impl Axis {
    /// Index of the axis inside a `Vec3`.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// Unit vector along the axis.
    #[must_use]
    pub const fn unit(self) -> Vec3 {
        match self {
            Self::X => Vec3::X,
            Self::Y => Vec3::Y,
            Self::Z => Vec3::Z,
        }
    }
}

/// Returns the axis along which `v` has the largest absolute component.
///
/// Ties resolve in X, Y, Z order: the first axis whose magnitude is not
/// exceeded by a later one wins.
///
/// # Examples
/// ```
/// use glam::Vec3;
/// use grapnel::vector_math::{dominant_axis, Axis};
/// assert_eq!(dominant_axis(Vec3::new(0.2, -0.9, 0.1)), Axis::Y);
/// assert_eq!(dominant_axis(Vec3::new(1.0, 1.0, 1.0)), Axis::X);
/// ```
#[must_use]
pub fn dominant_axis(v: Vec3) -> Axis {
    let a = v.abs();
    if a.x >= a.y && a.x >= a.z {
        Axis::X
    } else if a.y >= a.z {
        Axis::Y
    } else {
        Axis::Z
    }
}

/// Returns the unit vector of `v`, or `None` for zero-length or non-finite
/// input.
///
/// # Examples
///
/// ```
/// use glam::Vec3;
/// use grapnel::vector_math::normalize_or_none;
/// let n = normalize_or_none(Vec3::new(3.0, 0.0, 4.0)).unwrap();
/// assert!((n.x - 0.6).abs() < 1e-6);
/// assert!((n.z - 0.8).abs() < 1e-6);
/// assert!(normalize_or_none(Vec3::ZERO).is_none());
/// assert!(normalize_or_none(Vec3::new(f32::NAN, 1.0, 0.0)).is_none());
/// ```
#[must_use]
pub fn normalize_or_none(v: Vec3) -> Option<Vec3> {
    if !v.is_finite() || v.length_squared() <= DIRECTION_EPSILON * DIRECTION_EPSILON {
        return None;
    }
    Some(v.normalize())
}

/// Removes the component of `v` along the unit vector `up`.
#[must_use]
pub fn flatten(v: Vec3, up: Vec3) -> Vec3 {
    v - up * v.dot(up)
}

/// Moves `current` toward `target` by at most `max_delta`, landing exactly on
/// `target` when it is within reach.
#[must_use]
pub fn move_towards(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let delta = target - current;
    let distance = delta.length();
    if distance <= max_delta || distance <= DIRECTION_EPSILON {
        return target;
    }
    current + delta / distance * max_delta
}

/// Scalar counterpart of [`move_towards`].
#[must_use]
pub fn approach(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

/// Position of `value` between `a` and `b` as a fraction clamped to `[0, 1]`.
///
/// A degenerate range reports the midpoint rather than dividing by zero.
///
/// # Examples
/// ```
/// use grapnel::vector_math::inverse_lerp;
/// assert_eq!(inverse_lerp(-2.0, 2.0, 1.0), 0.75);
/// assert_eq!(inverse_lerp(-2.0, 2.0, 9.0), 1.0);
/// assert_eq!(inverse_lerp(0.0, 0.0, 3.0), 0.5);
/// ```
#[must_use]
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    let span = b - a;
    if span.abs() <= f32::EPSILON {
        return 0.5;
    }
    ((value - a) / span).clamp(0.0, 1.0)
}

/// Rotation whose local +Z points along `forward` and whose local +Y is as
/// close to `up` as possible.
///
/// Degenerate `forward` yields the identity; `forward` parallel to `up`
/// falls back to an arbitrary perpendicular right axis.
#[must_use]
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let Some(f) = normalize_or_none(forward) else {
        return Quat::IDENTITY;
    };
    let right =
        normalize_or_none(up.cross(f)).unwrap_or_else(|| f.any_orthonormal_vector());
    let true_up = f.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, true_up, f)).normalize()
}

/// Rotates `from` toward `to` by at most `max_angle` radians without
/// overshooting.
#[must_use]
pub fn rotate_towards(from: Quat, to: Quat, max_angle: f32) -> Quat {
    let angle = from.angle_between(to);
    if angle <= max_angle || angle <= f32::EPSILON {
        return to;
    }
    from.slerp(to, max_angle / angle).normalize()
}

/// Shortest rotation carrying the unit vector `from` onto `to`.
#[must_use]
pub fn from_to_rotation(from: Vec3, to: Vec3) -> Quat {
    match (normalize_or_none(from), normalize_or_none(to)) {
        (Some(a), Some(b)) => Quat::from_rotation_arc(a, b),
        _ => Quat::IDENTITY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case::x(Vec3::new(-3.0, 1.0, 2.0), Axis::X)]
    #[case::y(Vec3::new(0.1, 0.5, -0.2), Axis::Y)]
    #[case::z(Vec3::new(0.1, 0.2, -0.3), Axis::Z)]
    #[case::tie_xy(Vec3::new(1.0, -1.0, 0.0), Axis::X)]
    #[case::tie_yz(Vec3::new(0.0, 1.0, -1.0), Axis::Y)]
    fn dominant_axis_prefers_earlier_axes(#[case] v: Vec3, #[case] expected: Axis) {
        assert_eq!(dominant_axis(v), expected);
    }

    #[test]
    fn move_towards_never_overshoots() {
        let start = Vec3::new(1.0, 0.0, 0.0);
        let step = move_towards(start, Vec3::ZERO, 0.4);
        assert_relative_eq!(step.x, 0.6);
        assert_eq!(move_towards(step, Vec3::ZERO, 5.0), Vec3::ZERO);
    }

    #[test]
    fn look_rotation_maps_forward_to_z() {
        let dir = Vec3::new(1.0, 0.0, 1.0).normalize();
        let rot = look_rotation(dir, Vec3::Y);
        let fwd = rot * Vec3::Z;
        assert_relative_eq!(fwd.x, dir.x, epsilon = 1e-5);
        assert_relative_eq!(fwd.z, dir.z, epsilon = 1e-5);
        let up = rot * Vec3::Y;
        assert_relative_eq!(up.y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn rotate_towards_is_bounded() {
        let from = Quat::IDENTITY;
        let to = Quat::from_rotation_y(1.0);
        let partial = rotate_towards(from, to, 0.25);
        assert_relative_eq!(from.angle_between(partial), 0.25, epsilon = 1e-4);
        assert_eq!(rotate_towards(from, to, 2.0), to);
    }
}
