//! The kinematic body shared by players and enemies, plus the narrow
//! capability traits states and paths depend on.
use glam::{Quat, Vec3};

use crate::components::{ActorId, Health, PathId};
use crate::events::{ControllerEvent, EventSink};
use crate::vector_math::{flatten, from_to_rotation, look_rotation, normalize_or_none};
use crate::world::{Capsule, MoveReport};

/// Position, orientation and velocity of a capsule-shaped actor.
///
/// `position` is the capsule centre. The local frame follows the usual
/// convention of +X right, +Y up and +Z forward. Velocity is stored whole;
/// the lateral and vertical parts are derived from it against the current up
/// axis, so `lateral + vertical == velocity` always holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Capsule centre in world space.
    pub position: Vec3,
    /// Orientation of the local frame.
    pub rotation: Quat,
    /// Whole velocity in units per second.
    pub velocity: Vec3,
    /// Capsule radius.
    pub radius: f32,
    /// Capsule height, end to end.
    pub height: f32,
    /// Whether the last move ended on walkable ground.
    pub grounded: bool,
}

impl Body {
    /// An airborne, upright body at rest.
    #[must_use]
    pub const fn new(position: Vec3, radius: f32, height: f32) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            radius,
            height,
            grounded: false,
        }
    }

    /// Local +Y in world space.
    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Local +Z in world space.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Local +X in world space.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Velocity inside the plane orthogonal to [`Body::up`].
    #[must_use]
    pub fn lateral_velocity(&self) -> Vec3 {
        flatten(self.velocity, self.up())
    }

    /// Signed speed along [`Body::up`].
    #[must_use]
    pub fn vertical_speed(&self) -> f32 {
        self.velocity.dot(self.up())
    }

    /// The vertical part of the velocity as a vector.
    #[must_use]
    pub fn vertical_velocity(&self) -> Vec3 {
        self.up() * self.vertical_speed()
    }

    /// Replaces the lateral part of the velocity, keeping the vertical part.
    pub fn set_lateral_velocity(&mut self, lateral: Vec3) {
        let up = self.up();
        self.velocity = flatten(lateral, up) + up * self.vertical_speed();
    }

    /// Replaces the vertical part of the velocity, keeping the lateral part.
    pub fn set_vertical_speed(&mut self, speed: f32) {
        self.velocity = self.lateral_velocity() + self.up() * speed;
    }

    /// Shape handed to the movement executor.
    #[must_use]
    pub const fn capsule(&self) -> Capsule {
        Capsule {
            radius: self.radius,
            height: self.height,
        }
    }

    /// World position of the capsule's lowest point.
    #[must_use]
    pub fn bottom(&self) -> Vec3 {
        self.position - self.up() * (self.height * 0.5)
    }

    /// World position of the capsule's highest point.
    #[must_use]
    pub fn top(&self) -> Vec3 {
        self.position + self.up() * (self.height * 0.5)
    }

    /// Takes the resolved position and grounded flag from a movement report.
    pub fn apply_move(&mut self, report: &MoveReport) {
        self.position = report.position;
        self.grounded = report.grounded;
    }

    /// Turns instantly so that forward points along `direction` flattened
    /// against up. Degenerate directions leave the rotation untouched.
    pub fn face_direction(&mut self, direction: Vec3) {
        let up = self.up();
        if let Some(flat) = normalize_or_none(flatten(direction, up)) {
            self.rotation = look_rotation(flat, up);
        }
    }

    /// Rotates the body so its up axis matches world up again.
    pub fn reset_up_alignment(&mut self) {
        self.rotation = (from_to_rotation(self.up(), Vec3::Y) * self.rotation).normalize();
    }
}

/// Anything with a stable actor identity.
pub trait Actor {
    /// Stable identity of this actor.
    fn actor_id(&self) -> ActorId;
}

/// Access to the kinematic body.
pub trait Movable: Actor {
    /// The actor's body.
    fn body(&self) -> &Body;
    /// Mutable access to the actor's body.
    fn body_mut(&mut self) -> &mut Body;
}

/// Health bookkeeping with the damage, death and revive notifications.
pub trait Damageable: Actor {
    /// Current health.
    fn health(&self) -> &Health;
    /// Mutable access to the health pool.
    fn health_mut(&mut self) -> &mut Health;

    /// `true` while any health remains.
    fn is_alive(&self) -> bool {
        !self.health().is_empty()
    }

    /// Applies damage to a living actor outside its recovery window.
    /// Returns `true` if the hit was fatal.
    fn take_damage(&mut self, amount: i32, events: &mut dyn EventSink) -> bool {
        if !self.is_alive() || amount <= 0 || self.health().is_recovering() {
            return false;
        }
        let actor = self.actor_id();
        let remaining = self.health_mut().damage(amount);
        events.publish(ControllerEvent::Damaged {
            actor,
            amount,
            remaining,
        });
        if remaining > 0 {
            return false;
        }
        log::info!("{actor} died");
        events.publish(ControllerEvent::Died { actor });
        true
    }

    /// Restores a dead actor to full health. Living actors are untouched.
    fn revive(&mut self, events: &mut dyn EventSink) -> bool {
        if self.is_alive() {
            return false;
        }
        self.health_mut().reset();
        let actor = self.actor_id();
        log::info!("{actor} revived");
        events.publish(ControllerEvent::Revived { actor });
        true
    }
}

/// Membership bookkeeping needed by [`crate::path::Path`].
pub trait PathFollower: Movable + Damageable {
    /// Path the actor is glued to, if any.
    fn current_path(&self) -> Option<PathId>;
    /// Records the path the actor is glued to.
    fn set_current_path(&mut self, path: Option<PathId>);

    /// Forward cached from the last path left, zero when never set.
    fn cached_path_forward(&self) -> Vec3;
    /// Replaces the cached forward.
    fn set_cached_path_forward(&mut self, forward: Vec3);

    /// The cached forward, falling back to the body's facing when unset.
    fn path_forward_hint(&self) -> Vec3 {
        normalize_or_none(self.cached_path_forward()).unwrap_or_else(|| self.body().forward())
    }
}

/// Actors that hold a sight target.
pub trait Sensing: Actor {
    /// The actor currently held in sight.
    fn held_target(&self) -> Option<ActorId>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn velocity_splits_along_up() {
        let mut body = Body::new(Vec3::ZERO, 0.5, 2.0);
        body.velocity = Vec3::new(3.0, -2.0, 4.0);
        assert_eq!(body.lateral_velocity(), Vec3::new(3.0, 0.0, 4.0));
        assert_relative_eq!(body.vertical_speed(), -2.0);
        assert_eq!(
            body.lateral_velocity() + body.vertical_velocity(),
            body.velocity
        );

        body.set_vertical_speed(1.0);
        assert_eq!(body.velocity, Vec3::new(3.0, 1.0, 4.0));
        body.set_lateral_velocity(Vec3::new(0.0, 9.0, 1.0));
        assert_eq!(body.velocity, Vec3::new(0.0, 1.0, 1.0));
    }

    #[test]
    fn reset_up_alignment_restores_world_up() {
        let mut body = Body::new(Vec3::ZERO, 0.5, 2.0);
        body.rotation = Quat::from_rotation_x(0.7);
        body.reset_up_alignment();
        assert_relative_eq!(body.up().y, 1.0, epsilon = 1e-5);
    }
}
