//! Cone filtering for the side-on auto aim.
use glam::Vec3;
use ordered_float::OrderedFloat;

use crate::constants::CONE_INPUT_DEADZONE;
use crate::world::{ColliderInfo, OverlapBuffer};

/// Aim direction derived from the look stick in a side-on view.
///
/// Horizontal input picks `±path_forward`, vertical input `±up`; both
/// together give the normalised diagonal. Without input the cone faces
/// along `path_forward`.
///
/// # Examples
/// ```
/// use glam::Vec3;
/// use grapnel::sensing::cone_direction;
/// let dir = cone_direction(Vec3::new(1.0, 0.0, 1.0), Vec3::X, Vec3::Y);
/// assert!((dir - Vec3::new(1.0, 1.0, 0.0).normalize()).length() < 1e-6);
/// assert_eq!(cone_direction(Vec3::ZERO, Vec3::X, Vec3::Y), Vec3::X);
/// assert_eq!(cone_direction(Vec3::new(0.0, 0.0, -0.5), Vec3::X, Vec3::Y), Vec3::NEG_Y);
/// ```
#[must_use]
pub fn cone_direction(look: Vec3, path_forward: Vec3, up: Vec3) -> Vec3 {
    let horizontal = if look.x > CONE_INPUT_DEADZONE {
        path_forward
    } else if look.x < -CONE_INPUT_DEADZONE {
        -path_forward
    } else {
        Vec3::ZERO
    };
    let vertical = if look.z > CONE_INPUT_DEADZONE {
        up
    } else if look.z < -CONE_INPUT_DEADZONE {
        -up
    } else {
        Vec3::ZERO
    };

    match (horizontal == Vec3::ZERO, vertical == Vec3::ZERO) {
        (true, true) => path_forward,
        (false, true) => horizontal,
        (true, false) => vertical,
        (false, false) => (horizontal + vertical).normalize_or_zero(),
    }
}

/// The collider nearest to `origin` whose closest point lies within half
/// of `cone_angle` (radians) of `direction`.
///
/// Colliders whose closest point coincides with `origin` are skipped.
#[must_use]
pub fn nearest_in_cone<'a>(
    hits: &'a OverlapBuffer,
    origin: Vec3,
    direction: Vec3,
    cone_angle: f32,
    accept: impl Fn(&ColliderInfo) -> bool,
) -> Option<&'a ColliderInfo> {
    let half = cone_angle * 0.5;
    hits.iter()
        .filter(|hit| accept(*hit))
        .filter_map(|hit| {
            let offset = hit.closest_point - origin;
            let distance = offset.length();
            if distance <= f32::EPSILON {
                return None;
            }
            (direction.angle_between(offset) <= half).then_some((distance, hit))
        })
        .min_by_key(|(distance, _)| OrderedFloat(*distance))
        .map(|(_, hit)| hit)
}
