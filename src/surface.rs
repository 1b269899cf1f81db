//! Geometry of bounded climbable surfaces.
//!
//! A [`ClimbSurface`] is an oriented box. Its local +Z axis is the outward
//! normal of the climbable face, +Y the surface up and +X the surface right.
//! The "wall plane" is the +Z face of the box.
use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::constants::WALL_PLANE_EPSILON;
use crate::vector_math::{dominant_axis, inverse_lerp, look_rotation, Axis};

/// Direction and signed distance from a point to the wall plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallDirection {
    /// Unit vector along the wall normal pointing at the plane.
    pub direction: Vec3,
    /// Positive on the normal side of the plane, negative behind it.
    pub distance: f32,
}

/// Closest point on the box surface and the outward normal of its face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceContact {
    /// Closest point on the surface.
    pub point: Vec3,
    /// Outward normal of the face holding `point`.
    pub normal: Vec3,
}

/// An oriented box whose +Z face can be climbed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClimbSurface {
    /// Box centre in world space.
    pub center: Vec3,
    /// Box orientation.
    pub rotation: Quat,
    /// Half the box size along each local axis.
    pub half_extents: Vec3,
}

impl ClimbSurface {
    /// Normalises the rotation and takes absolute extents.
    #[must_use]
    pub fn new(center: Vec3, rotation: Quat, half_extents: Vec3) -> Self {
        Self {
            center,
            rotation: rotation.normalize(),
            half_extents: half_extents.abs(),
        }
    }

    /// Outward normal of the climbable face.
    #[must_use]
    pub fn normal(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// The surface's up axis.
    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// The surface's right axis.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// World point into box space.
    #[must_use]
    pub fn to_local(&self, point: Vec3) -> Vec3 {
        self.rotation.inverse() * (point - self.center)
    }

    /// Box-space point into world space.
    #[must_use]
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.center + self.rotation * local
    }

    /// Signed distance from `point` to the wall plane along the normal.
    #[must_use]
    pub fn plane_distance(&self, point: Vec3) -> f32 {
        self.to_local(point).z - self.half_extents.z
    }

    /// Unit vector from `point` toward the wall plane along the normal axis
    /// only, ignoring any lateral offset.
    ///
    /// A point lying on the plane gets `-normal` and a distance of zero.
    #[must_use]
    pub fn direction_to_wall(&self, point: Vec3) -> WallDirection {
        let distance = self.plane_distance(point);
        if distance.abs() <= WALL_PLANE_EPSILON {
            return WallDirection {
                direction: -self.normal(),
                distance: 0.0,
            };
        }
        WallDirection {
            direction: self.normal() * -distance.signum(),
            distance,
        }
    }

    /// Closest point on the box surface to `point` and that face's normal.
    ///
    /// Points inside the box are pushed out through the nearest face.
    #[must_use]
    pub fn closest_surface_info(&self, point: Vec3) -> SurfaceContact {
        let local = self.to_local(point);
        let half = self.half_extents;
        let clamped = local.clamp(-half, half);
        let outside = local - clamped;

        let (surface, normal) = if outside.length_squared() > 0.0 {
            let axis = dominant_axis(outside);
            (clamped, signed_axis(axis, outside))
        } else {
            let gap = half - local.abs();
            let axis = if gap.x <= gap.y && gap.x <= gap.z {
                Axis::X
            } else if gap.y <= gap.z {
                Axis::Y
            } else {
                Axis::Z
            };
            let mut surface = local;
            let side = if local[axis.index()] < 0.0 { -1.0 } else { 1.0 };
            surface[axis.index()] = half[axis.index()] * side;
            (surface, axis.unit() * side)
        };

        SurfaceContact {
            point: self.to_world(surface),
            normal: self.rotation * normal,
        }
    }

    /// Projects `point` onto the wall plane and offsets it by
    /// `stick_distance` along the normal.
    #[must_use]
    pub fn stick_point(&self, point: Vec3, stick_distance: f32) -> Vec3 {
        point - self.normal() * (self.plane_distance(point) - stick_distance)
    }

    /// Rotation facing into a face with outward `normal`, keeping the
    /// surface's up.
    #[must_use]
    pub fn face_rotation(&self, normal: Vec3) -> Quat {
        look_rotation(-normal, self.up())
    }

    /// Projects `point` onto the face selected by `normal` and clamps it
    /// inside that face's extent minus `padding`.
    ///
    /// The face is chosen by the dominant local axis of `normal`. The two
    /// in-plane axes are then `(Z, Y)` for an X face, `(X, Z)` for a Y face
    /// and `(X, Y)` for a Z face; `padding.x` and the first normalised
    /// coordinate belong to the first axis. Normalised coordinates are in
    /// `[0, 1]`, and a padded extent that collapses to nothing reports the
    /// face centre.
    ///
    /// # Examples
    /// ```
    /// use glam::{Quat, Vec2, Vec3};
    /// use grapnel::surface::ClimbSurface;
    /// let wall = ClimbSurface::new(Vec3::ZERO, Quat::IDENTITY, Vec3::new(2.0, 3.0, 0.5));
    /// let (point, t) =
    ///     wall.clamp_point_to_wall_face(Vec3::new(5.0, 0.0, 1.0), Vec3::Z, Vec2::splat(0.5));
    /// assert_eq!(point, Vec3::new(1.5, 0.0, 0.5));
    /// assert_eq!(t, Vec2::new(1.0, 0.5));
    /// ```
    #[must_use]
    pub fn clamp_point_to_wall_face(
        &self,
        point: Vec3,
        normal: Vec3,
        padding: Vec2,
    ) -> (Vec3, Vec2) {
        let local_normal = self.rotation.inverse() * normal;
        let axis = dominant_axis(local_normal);
        let (first, second) = face_axes(axis);
        let half = self.half_extents;

        let mut local = self.to_local(point);
        let side = if local_normal[axis.index()] < 0.0 { -1.0 } else { 1.0 };
        local[axis.index()] = half[axis.index()] * side;

        let mut normalized = Vec2::ZERO;
        let axes = [(first, padding.x), (second, padding.y)];
        for (slot, (face_axis, pad)) in axes.into_iter().enumerate() {
            let i = face_axis.index();
            let limit = (half[i] - pad).max(0.0);
            local[i] = local[i].clamp(-limit, limit);
            normalized[slot] = inverse_lerp(-limit, limit, local[i]);
        }

        (self.to_world(local), normalized)
    }
}

fn face_axes(normal_axis: Axis) -> (Axis, Axis) {
    match normal_axis {
        Axis::X => (Axis::Z, Axis::Y),
        Axis::Y => (Axis::X, Axis::Z),
        Axis::Z => (Axis::X, Axis::Y),
    }
}

fn signed_axis(axis: Axis, v: Vec3) -> Vec3 {
    if v[axis.index()] < 0.0 {
        -axis.unit()
    } else {
        axis.unit()
    }
}
