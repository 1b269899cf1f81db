//! Per-tick input snapshot and grapple button classification.
use glam::{Vec2, Vec3};

use crate::constants::GRAPPLE_HOLD_THRESHOLD;

/// Result of classifying the grapple button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrapplePress {
    /// Pressed and released before the hold threshold.
    Tap,
    /// Held past the threshold; reported once per press.
    HoldStarted,
}

/// Everything the controller reads from the input device for one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputFrame {
    /// Camera-relative world movement direction, magnitude in `[0, 1]`.
    pub movement: Vec3,
    /// Raw movement stick: x is right, y is up/forward.
    pub stick: Vec2,
    /// Raw look stick: x is right, z is up.
    pub look: Vec3,
    /// Crosshair motion this tick in screen units.
    pub aim_delta: Vec2,
    /// Absolute pointer position when a mouse is in use.
    pub pointer: Option<Vec2>,
    /// Jump pressed this tick.
    pub jump_down: bool,
    /// Crouch pressed this tick.
    pub crouch_down: bool,
    /// Grapple fire pressed this tick while aiming.
    pub grapple_fire: bool,
    /// Classified grapple button press, if one completed this tick.
    pub grapple: Option<GrapplePress>,
}

impl InputFrame {
    /// Sets the world movement direction.
    #[must_use]
    pub const fn with_movement(mut self, movement: Vec3) -> Self {
        self.movement = movement;
        self
    }

    /// Sets the raw movement stick.
    #[must_use]
    pub const fn with_stick(mut self, stick: Vec2) -> Self {
        self.stick = stick;
        self
    }

    /// Sets the raw look stick.
    #[must_use]
    pub const fn with_look(mut self, look: Vec3) -> Self {
        self.look = look;
        self
    }

    /// Presses jump.
    #[must_use]
    pub const fn with_jump(mut self) -> Self {
        self.jump_down = true;
        self
    }

    /// Presses crouch.
    #[must_use]
    pub const fn with_crouch(mut self) -> Self {
        self.crouch_down = true;
        self
    }

    /// Presses grapple fire.
    #[must_use]
    pub const fn with_fire(mut self) -> Self {
        self.grapple_fire = true;
        self
    }

    /// Reports a classified grapple press.
    #[must_use]
    pub const fn with_grapple(mut self, press: GrapplePress) -> Self {
        self.grapple = Some(press);
        self
    }

    /// Places the mouse pointer.
    #[must_use]
    pub const fn with_pointer(mut self, pointer: Vec2) -> Self {
        self.pointer = Some(pointer);
        self
    }

    /// `true` when the movement direction is non-zero.
    #[must_use]
    pub fn has_movement(&self) -> bool {
        self.movement.length_squared() > 0.0
    }
}

/// Turns the raw grapple button level into tap/hold presses.
#[derive(Debug, Clone, PartialEq)]
pub struct TapHoldClassifier {
    threshold: f32,
    held_for: Option<f32>,
    hold_reported: bool,
}

impl Default for TapHoldClassifier {
    fn default() -> Self {
        Self::new(GRAPPLE_HOLD_THRESHOLD)
    }
}

impl TapHoldClassifier {
    /// Classifier that turns presses longer than `threshold` seconds into
    /// holds.
    #[must_use]
    pub const fn new(threshold: f32) -> Self {
        Self {
            threshold,
            held_for: None,
            hold_reported: false,
        }
    }

    /// Feeds the button level for one tick of length `dt`.
    ///
    /// A tap is reported on release, a hold as soon as the threshold is
    /// crossed. A press that became a hold reports nothing on release.
    pub fn update(&mut self, pressed: bool, dt: f32) -> Option<GrapplePress> {
        if pressed {
            let held = self.held_for.map_or(0.0, |so_far| so_far + dt);
            self.held_for = Some(held);
            if held >= self.threshold && !self.hold_reported {
                self.hold_reported = true;
                return Some(GrapplePress::HoldStarted);
            }
            return None;
        }

        let was_held = self.held_for.take().is_some();
        let was_hold = std::mem::replace(&mut self.hold_reported, false);
        (was_held && !was_hold).then_some(GrapplePress::Tap)
    }
}
