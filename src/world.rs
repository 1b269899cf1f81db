//! Interfaces to the collaborators the controller consumes but does not
//! implement: collision-aware movement, scene queries, the actor directory,
//! the aiming camera and optional abilities.
use glam::{Quat, Vec2, Vec3};

use crate::components::{ActorId, ColliderId, GrappleTargetId, LayerMask, PathId, Tag};
use crate::input::InputFrame;
use crate::surface::ClimbSurface;

/// Capsule extent of a moving body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule {
    /// Radius of the capsule.
    pub radius: f32,
    /// End-to-end height.
    pub height: f32,
}

/// A collider as reported by a scene query or a movement contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderInfo {
    /// The collider's id.
    pub id: ColliderId,
    /// Gameplay tag.
    pub tag: Tag,
    /// Layers the collider sits on.
    pub layers: LayerMask,
    /// Centre of the collider's bounds.
    pub center: Vec3,
    /// Point on the collider closest to the query origin.
    pub closest_point: Vec3,
    /// Owning actor, for actor capsules.
    pub actor: Option<ActorId>,
    /// Anchor id, for grapple targets.
    pub grapple: Option<GrappleTargetId>,
    /// Box geometry, for climbable walls.
    pub surface: Option<ClimbSurface>,
}

/// A blocking contact produced by a move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Contact point on the collider.
    pub point: Vec3,
    /// Normal pointing from the collider toward the mover.
    pub normal: Vec3,
    /// What was hit.
    pub collider: ColliderInfo,
}

/// Outcome of a collision-aware move.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveReport {
    /// Where the capsule ended up.
    pub position: Vec3,
    /// Whether it ended on walkable ground.
    pub grounded: bool,
    /// Every blocking contact met on the way.
    pub contacts: Vec<Contact>,
}

/// Moves capsules through the world and reports blocking contacts.
pub trait MovementExecutor {
    /// Sweeps `capsule` from `origin` by `delta`.
    fn move_by(&mut self, capsule: Capsule, origin: Vec3, delta: Vec3) -> MoveReport;

    /// Mirrors the actor's orientation into the physics world.
    fn set_rotation(&mut self, _actor: ActorId, _rotation: Quat) {}
}

/// A half-line with a unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start point.
    pub origin: Vec3,
    /// Unit direction, or zero for a degenerate ray.
    pub direction: Vec3,
}

impl Ray {
    /// Builds a ray with a normalised direction.
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Point `distance` along the ray.
    #[must_use]
    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

/// Where a ray struck a collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Hit point.
    pub point: Vec3,
    /// Distance from the ray origin.
    pub distance: f32,
    /// What was hit.
    pub collider: ColliderInfo,
}

/// Fixed-capacity collector for overlap results.
///
/// Results past the capacity are dropped without failing the query; the
/// number dropped since the last clear is kept for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapBuffer {
    hits: Vec<ColliderInfo>,
    capacity: usize,
    dropped: usize,
}

impl OverlapBuffer {
    /// An empty buffer keeping at most `capacity` results.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            hits: Vec::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// Forgets every result and the dropped count.
    pub fn clear(&mut self) {
        self.hits.clear();
        self.dropped = 0;
    }

    /// Stores `hit`, or counts it as dropped when full.
    pub fn push(&mut self, hit: ColliderInfo) -> bool {
        if self.hits.len() >= self.capacity {
            self.dropped += 1;
            return false;
        }
        self.hits.push(hit);
        true
    }

    /// Stored results in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ColliderInfo> {
        self.hits.iter()
    }

    /// Number of stored results.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// `true` when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Most results kept.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Results discarded since the last clear.
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.dropped
    }
}

/// Synchronous geometric queries against the scene.
pub trait SceneQuery {
    /// Writes colliders within `radius` of `center` into `out`, filtered by
    /// tag (when given) and layer mask. `out` is not cleared first.
    fn overlap_sphere(
        &self,
        center: Vec3,
        radius: f32,
        tag: Option<Tag>,
        layers: LayerMask,
        out: &mut OverlapBuffer,
    );

    /// Nearest hit along `ray` within `max_distance`.
    fn raycast(&self, ray: Ray, max_distance: f32, layers: LayerMask) -> Option<RayHit>;

    /// Returns `true` when something on `layers` blocks the segment.
    fn linecast(&self, from: Vec3, to: Vec3, layers: LayerMask) -> bool;
}

/// Read-only view of another actor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorSnapshot {
    /// The actor's id.
    pub id: ActorId,
    /// Capsule centre.
    pub position: Vec3,
    /// Whether any health remains.
    pub alive: bool,
    /// Whether it stands on the ground.
    pub grounded: bool,
    /// Capsule height.
    pub height: f32,
    /// Path it is glued to, if any.
    pub path: Option<PathId>,
}

/// Lookup of actors by id.
pub trait ActorDirectory {
    /// Snapshot of `id`, or `None` once it is gone.
    fn actor(&self, id: ActorId) -> Option<ActorSnapshot>;
}

/// Camera used for free aiming.
pub trait AimCamera {
    /// Ray through a screen point, in pixels from the bottom left.
    fn screen_point_to_ray(&self, point: Vec2) -> Ray;
    /// Screen size in pixels.
    fn screen_size(&self) -> Vec2;
}

/// Optional abilities triggered from ground states.
pub trait Abilities {
    /// Offered the tick's input once per grounded step.
    fn spin(&mut self, _actor: ActorId, _input: &InputFrame) {}
    /// Offered the tick's input once per grounded step.
    fn dash(&mut self, _actor: ActorId, _input: &InputFrame) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collider(id: u32) -> ColliderInfo {
        ColliderInfo {
            id: ColliderId(id),
            tag: Tag::Untagged,
            layers: LayerMask::OBSTACLE,
            center: Vec3::ZERO,
            closest_point: Vec3::ZERO,
            actor: None,
            grapple: None,
            surface: None,
        }
    }

    #[test]
    fn overlap_buffer_truncates_silently() {
        let mut buffer = OverlapBuffer::new(2);
        assert!(buffer.push(collider(1)));
        assert!(buffer.push(collider(2)));
        assert!(!buffer.push(collider(3)));
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.dropped(), 1);
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.dropped(), 0);
    }
}
