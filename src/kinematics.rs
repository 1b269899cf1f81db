//! Kinematic primitives every locomotion state composes from.
//!
//! All functions take the tick length explicitly and operate on a [`Body`].
//! Lateral math always happens in the plane orthogonal to the body's up
//! axis. Degenerate input directions are treated as no-ops.
use glam::Vec3;

use crate::entity::Body;
use crate::vector_math::{
    approach, flatten, look_rotation, move_towards, normalize_or_none, rotate_towards,
};

impl Body {
    /// Accelerates the lateral velocity along `direction`.
    ///
    /// The component aligned with `direction` grows by `acceleration * dt`
    /// while the lateral speed is below `top_speed` (or while the body moves
    /// against `direction`), clamped to `±top_speed`. The perpendicular
    /// component bleeds toward zero by `turning_drag * dt`. The resulting
    /// lateral speed never exceeds the larger of `top_speed` and the speed
    /// before the call.
    ///
    /// # Examples
    /// ```
    /// use glam::Vec3;
    /// use grapnel::entity::Body;
    /// let mut body = Body::new(Vec3::ZERO, 0.5, 2.0);
    /// body.accelerate(Vec3::Z, 10.0, 5.0, 10.0, 0.5);
    /// assert!((body.lateral_velocity().z - 2.5).abs() < 1e-6);
    /// ```
    pub fn accelerate(
        &mut self,
        direction: Vec3,
        turning_drag: f32,
        acceleration: f32,
        top_speed: f32,
        dt: f32,
    ) {
        let up = self.up();
        let Some(heading) = normalize_or_none(flatten(direction, up)) else {
            return;
        };
        let lateral = self.lateral_velocity();
        let previous = lateral.length();

        let mut speed = lateral.dot(heading);
        let turning = lateral - heading * speed;

        if previous < top_speed || speed < 0.0 {
            speed = (speed + acceleration * dt).clamp(-top_speed, top_speed);
        }

        let damped = move_towards(turning, Vec3::ZERO, turning_drag * dt);
        let limit = top_speed.max(previous);
        self.set_lateral_velocity((heading * speed + damped).clamp_length_max(limit));
    }

    /// Moves the lateral speed toward zero by `rate * dt`, keeping its
    /// direction and stopping exactly at zero.
    pub fn decelerate(&mut self, rate: f32, dt: f32) {
        let lateral = move_towards(self.lateral_velocity(), Vec3::ZERO, rate * dt);
        self.set_lateral_velocity(lateral);
    }

    /// Bleeds lateral speed above `top_speed` back down by `deceleration * dt`.
    pub fn decelerate_to_top_speed(&mut self, top_speed: f32, deceleration: f32, dt: f32) {
        let lateral = self.lateral_velocity();
        let speed = lateral.length();
        if speed <= top_speed {
            return;
        }
        let reduced = approach(speed, top_speed, deceleration * dt);
        self.set_lateral_velocity(lateral / speed * reduced);
    }

    /// Integrates gravity into the vertical speed while airborne.
    pub fn gravity(&mut self, gravity: f32, dt: f32) {
        if self.grounded {
            return;
        }
        let speed = self.vertical_speed() - gravity * dt;
        self.set_vertical_speed(speed);
    }

    /// Limits the downward vertical speed to `top_speed`.
    pub fn clamp_fall_speed(&mut self, top_speed: f32) {
        if self.vertical_speed() < -top_speed {
            self.set_vertical_speed(-top_speed);
        }
    }

    /// Presses a grounded, non-rising body into the ground at `force`.
    pub fn snap_to_ground(&mut self, force: f32) {
        if self.grounded && self.vertical_speed() <= 0.0 {
            self.set_vertical_speed(-force);
        }
    }

    /// Rotates forward toward `direction` by at most `rotation_speed * dt`
    /// radians. The direction is flattened against up first.
    pub fn face_direction_smooth(&mut self, direction: Vec3, rotation_speed: f32, dt: f32) {
        let up = self.up();
        let Some(flat) = normalize_or_none(flatten(direction, up)) else {
            return;
        };
        let target = look_rotation(flat, up);
        self.rotation = rotate_towards(self.rotation, target, rotation_speed * dt);
    }

    /// Launches the body away along `direction` with the given height and
    /// lateral distance speeds.
    pub fn directional_jump(&mut self, direction: Vec3, height: f32, distance: f32) {
        let up = self.up();
        let lateral = normalize_or_none(flatten(direction, up)).unwrap_or(Vec3::ZERO);
        self.velocity = lateral * distance + up * height;
        self.grounded = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn body() -> Body {
        Body::new(Vec3::new(0.0, 1.0, 0.0), 0.5, 2.0)
    }

    #[rstest]
    fn zero_direction_is_ignored(mut body: Body) {
        body.velocity = Vec3::new(1.0, 0.0, 0.0);
        body.accelerate(Vec3::ZERO, 10.0, 10.0, 5.0, 0.1);
        body.accelerate(Vec3::Y, 10.0, 10.0, 5.0, 0.1);
        assert_eq!(body.velocity, Vec3::new(1.0, 0.0, 0.0));
    }

    #[rstest]
    fn turning_drag_bleeds_perpendicular_speed(mut body: Body) {
        body.velocity = Vec3::new(2.0, 0.0, 0.0);
        body.accelerate(Vec3::Z, 10.0, 1.0, 5.0, 0.1);
        let lateral = body.lateral_velocity();
        assert_relative_eq!(lateral.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(lateral.z, 0.1, epsilon = 1e-5);
    }

    #[rstest]
    fn decelerate_lands_on_zero(mut body: Body) {
        body.velocity = Vec3::new(0.0, -3.0, 1.0);
        body.decelerate(4.0, 0.2);
        assert_relative_eq!(body.velocity.z, 0.2, epsilon = 1e-6);
        body.decelerate(4.0, 0.2);
        assert_eq!(body.lateral_velocity(), Vec3::ZERO);
        assert_relative_eq!(body.vertical_speed(), -3.0);
    }

    #[rstest]
    #[case::airborne(false, -1.0)]
    #[case::grounded(true, 0.0)]
    fn gravity_only_applies_in_the_air(mut body: Body, #[case] grounded: bool, #[case] expected: f32) {
        body.grounded = grounded;
        body.gravity(10.0, 0.1);
        assert_relative_eq!(body.vertical_speed(), expected);
    }

    #[rstest]
    fn snap_does_not_fight_a_jump(mut body: Body) {
        body.grounded = true;
        body.set_vertical_speed(4.0);
        body.snap_to_ground(15.0);
        assert_relative_eq!(body.vertical_speed(), 4.0);
        body.set_vertical_speed(0.0);
        body.snap_to_ground(15.0);
        assert_relative_eq!(body.vertical_speed(), -15.0);
    }

    #[rstest]
    fn smooth_facing_stops_at_the_target(mut body: Body) {
        body.face_direction_smooth(Vec3::X, 1.0, 0.5);
        assert_relative_eq!(body.forward().angle_between(Vec3::Z), 0.5, epsilon = 1e-4);
        for _ in 0..10 {
            body.face_direction_smooth(Vec3::X, 1.0, 0.5);
        }
        assert_relative_eq!(body.forward().x, 1.0, epsilon = 1e-4);
    }

    #[rstest]
    fn speed_above_top_bleeds_down(mut body: Body) {
        body.velocity = Vec3::new(0.0, 0.0, 9.0);
        body.decelerate_to_top_speed(6.0, 10.0, 0.1);
        assert_relative_eq!(body.velocity.z, 8.0, epsilon = 1e-5);
        body.decelerate_to_top_speed(6.0, 100.0, 0.1);
        assert_relative_eq!(body.velocity.z, 6.0, epsilon = 1e-5);
    }
}
