//! Plain data shared between the controller layers.
//! Includes identifiers, health, collider tags and layer masks.
use std::fmt;
use std::ops::BitOr;

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(
            /// Raw numeric id.
            pub u32,
        );

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

id_type!(
    /// Identifies a player or enemy.
    ActorId,
    "actor"
);
id_type!(
    /// Identifies a path inside a [`crate::path::PathSet`].
    PathId,
    "path"
);
id_type!(
    /// Identifies a collider known to the scene.
    ColliderId,
    "collider"
);
id_type!(
    /// Identifies a grapple anchor.
    GrappleTargetId,
    "grapple"
);

/// Hit points of a damageable actor.
///
/// A hit may open a recovery window during which further hits are ignored.
/// The window is zero unless set with [`Health::with_recovery`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    current: i32,
    max: i32,
    #[serde(default)]
    recovery_time: f32,
    #[serde(default)]
    recovering: f32,
}

impl Health {
    /// Creates a full health pool. Non-positive maxima are raised to one.
    #[must_use]
    pub fn new(max: i32) -> Self {
        let clamped = max.max(1);
        Self {
            current: clamped,
            max: clamped,
            recovery_time: 0.0,
            recovering: 0.0,
        }
    }

    /// Sets how many seconds of invulnerability follow each hit.
    #[must_use]
    pub const fn with_recovery(mut self, seconds: f32) -> Self {
        self.recovery_time = seconds.max(0.0);
        self
    }

    /// Points left.
    #[must_use]
    pub const fn current(&self) -> i32 {
        self.current
    }

    /// Points when full.
    #[must_use]
    pub const fn max(&self) -> i32 {
        self.max
    }

    /// `true` once every point is gone.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.current <= 0
    }

    /// `true` while the window opened by the last hit is still running.
    #[must_use]
    pub const fn is_recovering(&self) -> bool {
        self.recovering > 0.0
    }

    /// Removes `amount` points, saturating at zero, and returns what is left.
    /// Starts the recovery window.
    pub fn damage(&mut self, amount: i32) -> i32 {
        self.current = (self.current - amount.max(0)).max(0);
        self.recovering = self.recovery_time;
        self.current
    }

    /// Counts the recovery window down by `dt` seconds.
    pub const fn recover(&mut self, dt: f32) {
        self.recovering = (self.recovering - dt).max(0.0);
    }

    /// Refills every point and ends any recovery window.
    pub const fn reset(&mut self) {
        self.current = self.max;
        self.recovering = 0.0;
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(3)
    }
}

/// Gameplay tag attached to a collider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tag {
    /// The player's capsule.
    Player,
    /// An enemy's capsule.
    Enemy,
    /// A box the player may climb.
    ClimbableWall,
    /// A grapple anchor.
    GrappleTarget,
    /// Scenery with no gameplay role.
    #[default]
    Untagged,
}

/// Bit set of collision layers used to filter scene queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl LayerMask {
    /// Matches nothing.
    pub const NONE: Self = Self(0);
    /// Grapple anchors.
    pub const GRAPPLE: Self = Self(1 << 0);
    /// Geometry that blocks grapple lines.
    pub const OBSTACLE: Self = Self(1 << 1);
    /// Walkable ground.
    pub const GROUND: Self = Self(1 << 2);
    /// Player and enemy capsules.
    pub const ACTOR: Self = Self(1 << 3);
    /// Matches everything.
    pub const ALL: Self = Self(u32::MAX);

    /// Returns `true` when the two masks share at least one layer.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Layers present in either mask.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl BitOr for LayerMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_saturates_at_zero() {
        let mut health = Health::new(3);
        assert_eq!(health.damage(2), 1);
        assert_eq!(health.damage(5), 0);
        assert!(health.is_empty());
        health.reset();
        assert_eq!(health.current(), 3);
    }

    #[test]
    fn recovery_window_runs_down() {
        let mut health = Health::new(3).with_recovery(0.5);
        assert!(!health.is_recovering());

        health.damage(1);
        assert!(health.is_recovering());
        health.recover(0.3);
        assert!(health.is_recovering());
        health.recover(0.3);
        assert!(!health.is_recovering());
    }

    #[test]
    fn layer_masks_combine() {
        let mask = LayerMask::GRAPPLE | LayerMask::OBSTACLE;
        assert!(mask.intersects(LayerMask::OBSTACLE));
        assert!(!mask.intersects(LayerMask::GROUND));
        assert_eq!(ActorId(4).to_string(), "actor#4");
    }
}
