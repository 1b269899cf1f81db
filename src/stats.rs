//! Per-entity tuning loaded from JSON.
//!
//! Every field has a default so partial documents are accepted. A
//! [`StatsProvider`] holds one or more forms (for example a powered-up
//! variant) and exposes the active one.
use glam::Vec2;
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::components::LayerMask;
use crate::constants::{DEFAULT_OVERLAP_CAPACITY, GRAPPLE_HOLD_THRESHOLD, GRAPPLE_RELEASE_FACTOR};
use crate::error::ConfigError;

/// Validation applied after a stats document has been parsed.
pub trait Validate {
    /// # Errors
    /// Returns the first invalid field found.
    fn validate(&self) -> Result<(), ConfigError>;
}

const fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

/// Player tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStats {
    /// Downward acceleration while airborne.
    pub gravity: f32,
    /// Terminal falling speed.
    pub gravity_top_speed: f32,
    /// Downward speed that keeps a grounded body on slopes.
    pub snap_force: f32,
    /// Radians per second.
    pub rotation_speed: f32,
    /// Lateral deceleration with no input.
    pub friction: f32,
    /// Deceleration applied above top speed.
    pub deceleration: f32,
    /// How fast sideways speed bleeds off when turning.
    pub turning_drag: f32,
    /// Ground acceleration toward the input.
    pub acceleration: f32,
    /// Maximum running speed.
    pub top_speed: f32,
    /// Acceleration toward the input while falling.
    pub air_acceleration: f32,
    /// Input against velocity below this dot product brakes.
    pub brake_threshold: f32,
    /// Deceleration while braking.
    pub brake_deceleration: f32,
    /// Vertical speed given by a jump.
    pub jump_height: f32,
    /// Jumps allowed before landing again.
    pub multi_jumps: u32,

    /// Maximum climbing speed upward.
    pub climb_up_top_speed: f32,
    /// Maximum climbing speed downward.
    pub climb_down_top_speed: f32,
    /// Maximum climbing speed sideways.
    pub climb_lateral_top_speed: f32,
    /// Acceleration while climbing.
    pub climb_acceleration: f32,
    /// Deceleration while climbing with no input.
    pub climb_friction: f32,
    /// Added to `(radius, height / 2)` to form the wall clamping padding.
    pub climb_padding_offset: Vec2,
    /// Vertical speed of a jump off a wall.
    pub wall_jump_height: f32,
    /// Speed away from the wall on a wall jump.
    pub wall_jump_distance: f32,

    /// Longest free-aim ray.
    pub grapple_range: f32,
    /// Speed while reeled toward an anchor.
    pub pull_speed: f32,
    /// Fraction of pull speed kept when letting go early.
    pub release_impulse_factor: f32,
    /// Radius searched for auto-aim anchors.
    pub auto_aim_radius: f32,
    /// Full cone angle in degrees.
    pub auto_aim_cone_angle: f32,
    /// Seconds the grapple button must be held to aim by hand.
    pub grapple_hold_threshold: f32,
    /// Scale applied to crosshair motion.
    pub crosshair_sensitivity: f32,
    /// Layers holding grapple anchors.
    pub grapple_layers: LayerMask,
    /// Layers that block grapple lines and ledge checks.
    pub obstacle_layers: LayerMask,
    /// Largest number of overlap results kept per query.
    pub overlap_capacity: usize,
    /// Speed of the pull back onto the current path.
    pub snap_to_path_force: f32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            gravity: 38.0,
            gravity_top_speed: 50.0,
            snap_force: 15.0,
            rotation_speed: 17.0,
            friction: 16.0,
            deceleration: 28.0,
            turning_drag: 28.0,
            acceleration: 13.0,
            top_speed: 6.0,
            air_acceleration: 32.0,
            brake_threshold: -0.8,
            brake_deceleration: 40.0,
            jump_height: 17.0,
            multi_jumps: 1,

            climb_up_top_speed: 3.0,
            climb_down_top_speed: 6.0,
            climb_lateral_top_speed: 3.0,
            climb_acceleration: 30.0,
            climb_friction: 30.0,
            climb_padding_offset: Vec2::new(-0.25, -1.3),
            wall_jump_height: 12.0,
            wall_jump_distance: 8.0,

            grapple_range: 150.0,
            pull_speed: 20.0,
            release_impulse_factor: GRAPPLE_RELEASE_FACTOR,
            auto_aim_radius: 15.0,
            auto_aim_cone_angle: 90.0,
            grapple_hold_threshold: GRAPPLE_HOLD_THRESHOLD,
            crosshair_sensitivity: 1.0,
            grapple_layers: LayerMask::GRAPPLE,
            obstacle_layers: LayerMask::OBSTACLE | LayerMask::GROUND,
            overlap_capacity: DEFAULT_OVERLAP_CAPACITY,
            snap_to_path_force: 10.0,
        }
    }
}

impl Validate for PlayerStats {
    fn validate(&self) -> Result<(), ConfigError> {
        positive("top_speed", self.top_speed)?;
        positive("acceleration", self.acceleration)?;
        positive("gravity_top_speed", self.gravity_top_speed)?;
        positive("rotation_speed", self.rotation_speed)?;
        positive("climb_up_top_speed", self.climb_up_top_speed)?;
        positive("climb_down_top_speed", self.climb_down_top_speed)?;
        positive("climb_lateral_top_speed", self.climb_lateral_top_speed)?;
        positive("grapple_range", self.grapple_range)?;
        positive("pull_speed", self.pull_speed)?;
        positive("auto_aim_radius", self.auto_aim_radius)?;
        positive("auto_aim_cone_angle", self.auto_aim_cone_angle)?;
        if self.overlap_capacity == 0 {
            warn!("overlap_capacity of 0 disables auto aim");
        }
        Ok(())
    }
}

/// Enemy tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyStats {
    /// Downward acceleration while airborne.
    pub gravity: f32,
    /// Downward speed that keeps a grounded body on slopes.
    pub snap_force: f32,
    /// Radians per second.
    pub rotation_speed: f32,
    /// Lateral deceleration when idle.
    pub friction: f32,
    /// Deceleration after losing the target.
    pub deceleration: f32,
    /// How fast sideways speed bleeds off when turning.
    pub turning_drag: f32,
    /// Acceleration toward the target.
    pub follow_acceleration: f32,
    /// Maximum chasing speed.
    pub follow_top_speed: f32,
    /// Range at which a target is picked up.
    pub spot_range: f32,
    /// Range at which a held target is dropped.
    pub view_range: f32,
    /// Idle enemies chase held targets within this range.
    pub follow_range: f32,
    /// Start chasing as soon as a target is spotted.
    pub follow_target_on_sight: bool,
    /// Revert to the previous state after losing the target.
    pub return_to_last_state_when_lost_target: bool,
    /// Seconds to wait before reverting.
    pub return_to_last_state_delay: f32,
    /// Damage dealt by touching.
    pub contact_damage: i32,
    /// How far below the top a stomp may land.
    pub contact_stepping_tolerance: f32,
    /// Bounce back after a contact attack.
    pub contact_pushback: bool,
    /// Speed of the bounce.
    pub contact_pushback_force: f32,
    /// Speed of the pull back onto the current path.
    pub snap_to_path_force: f32,
    /// Largest number of overlap results kept per query.
    pub overlap_capacity: usize,
}

impl Default for EnemyStats {
    fn default() -> Self {
        Self {
            gravity: 35.0,
            snap_force: 15.0,
            rotation_speed: 17.0,
            friction: 16.0,
            deceleration: 28.0,
            turning_drag: 28.0,
            follow_acceleration: 10.0,
            follow_top_speed: 2.5,
            spot_range: 5.0,
            view_range: 8.0,
            follow_range: 100.0,
            follow_target_on_sight: true,
            return_to_last_state_when_lost_target: false,
            return_to_last_state_delay: 1.0,
            contact_damage: 1,
            contact_stepping_tolerance: 0.5,
            contact_pushback: true,
            contact_pushback_force: 18.0,
            snap_to_path_force: 10.0,
            overlap_capacity: DEFAULT_OVERLAP_CAPACITY,
        }
    }
}

impl Validate for EnemyStats {
    fn validate(&self) -> Result<(), ConfigError> {
        positive("spot_range", self.spot_range)?;
        positive("view_range", self.view_range)?;
        positive("follow_top_speed", self.follow_top_speed)?;
        positive("rotation_speed", self.rotation_speed)?;
        if self.view_range <= self.spot_range {
            return Err(ConfigError::SightRange {
                spot: self.spot_range,
                view: self.view_range,
            });
        }
        Ok(())
    }
}

/// The set of stat forms available to one entity and the active one.
///
/// There is always at least one form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsProvider<T> {
    first: T,
    others: Vec<T>,
    current: usize,
}

#[derive(Deserialize)]
struct StatsDocument<T> {
    forms: Vec<T>,
    #[serde(default)]
    current: usize,
}

impl<T: Default> Default for StatsProvider<T> {
    fn default() -> Self {
        Self::single(T::default())
    }
}

impl<T> StatsProvider<T> {
    /// Wraps a single form.
    #[must_use]
    pub const fn single(stats: T) -> Self {
        Self {
            first: stats,
            others: Vec::new(),
            current: 0,
        }
    }

    /// Index of the active form.
    #[must_use]
    pub const fn form_index(&self) -> usize {
        self.current
    }

    /// Number of forms, at least one.
    #[must_use]
    pub fn form_count(&self) -> usize {
        self.others.len() + 1
    }

    /// The active form.
    #[must_use]
    pub fn current(&self) -> &T {
        self.current
            .checked_sub(1)
            .and_then(|i| self.others.get(i))
            .unwrap_or(&self.first)
    }

    /// Selects the active form.
    ///
    /// # Errors
    /// Returns [`ConfigError::UnknownForm`] if `index` is out of range.
    pub fn change(&mut self, index: usize) -> Result<(), ConfigError> {
        let count = self.form_count();
        if index >= count {
            return Err(ConfigError::UnknownForm { index, count });
        }
        self.current = index;
        Ok(())
    }
}

impl<T: Validate> StatsProvider<T> {
    /// Builds a provider from validated forms, starting at the first.
    ///
    /// # Errors
    /// Fails on an empty list or an invalid form.
    pub fn new(forms: Vec<T>) -> Result<Self, ConfigError> {
        Self::from_forms(forms, 0)
    }

    fn from_forms(forms: Vec<T>, current: usize) -> Result<Self, ConfigError> {
        forms.iter().try_for_each(Validate::validate)?;
        let mut rest = forms.into_iter();
        let first = rest.next().ok_or(ConfigError::EmptyForms)?;
        let mut provider = Self {
            first,
            others: rest.collect(),
            current: 0,
        };
        provider.change(current)?;
        Ok(provider)
    }
}

impl<T: Validate + DeserializeOwned> StatsProvider<T> {
    /// Parses and validates a `{ "forms": [...], "current": n }` document.
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] for malformed JSON and the validation
    /// error for out-of-range values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let document: StatsDocument<T> = serde_json::from_str(json)?;
        Self::from_forms(document.forms, document.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_documents_use_defaults() {
        let provider = StatsProvider::<EnemyStats>::from_json(
            r#"{ "forms": [ { "spot_range": 3.0 }, { "follow_top_speed": 9.0 } ], "current": 1 }"#,
        )
        .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(provider.form_index(), 1);
        assert_eq!(provider.current().follow_top_speed, 9.0);
        assert_eq!(provider.current().view_range, EnemyStats::default().view_range);
    }

    #[test]
    fn sight_ranges_must_leave_hysteresis() {
        let result = StatsProvider::<EnemyStats>::from_json(
            r#"{ "forms": [ { "spot_range": 8.0, "view_range": 8.0 } ] }"#,
        );
        assert!(matches!(result, Err(ConfigError::SightRange { .. })));
    }

    #[test]
    fn empty_forms_are_rejected() {
        let result = StatsProvider::<PlayerStats>::from_json(r#"{ "forms": [] }"#);
        assert!(matches!(result, Err(ConfigError::EmptyForms)));
    }

    #[test]
    fn change_rejects_missing_forms() {
        let mut provider = StatsProvider::single(PlayerStats::default());
        assert!(matches!(
            provider.change(3),
            Err(ConfigError::UnknownForm { index: 3, count: 1 })
        ));
        assert!(provider.change(0).is_ok());
    }
}
