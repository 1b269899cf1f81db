use glam::{Vec2, Vec3};

use crate::constants::{
    CLIMB_DISMOUNT_THRESHOLD, LEDGE_GRAB_THRESHOLD, WALL_OFFSET, WALL_STICK_FORCE,
};
use crate::error::ControllerError;
use crate::events::LocomotionIntent;
use crate::player::{Player, PlayerStateKind};
use crate::state_machine::{Next, State, Tick};
use crate::surface::ClimbSurface;
use crate::vector_math::approach;

/// Distance used to test whether the clamped face point can still move.
const ROOM_STEP: f32 = 0.01;

/// Traversal across a climbable surface.
///
/// Climbing speeds are tracked in the wall's frame: `vertical` along the
/// body's up and `lateral` along its right, both relative to a body that
/// faces into the wall. The body is pinned to the face every tick and pressed
/// into it at [`WALL_STICK_FORCE`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClimbState {
    normal: Vec3,
    vertical: f32,
    lateral: f32,
    normalized: Vec2,
}

impl WallClimbState {
    /// Last clamped position on the face, each axis in `[0, 1]`. The second
    /// coordinate is the height on side faces.
    #[must_use]
    pub const fn normalized(&self) -> Vec2 {
        self.normalized
    }

    fn padding(player: &Player) -> Vec2 {
        let offset = player.stats().climb_padding_offset;
        Vec2::new(
            player.body.radius + offset.x,
            player.body.height * 0.5 + offset.y,
        )
    }
}

fn has_room(wall: &ClimbSurface, point: Vec3, normal: Vec3, padding: Vec2, direction: Vec3) -> bool {
    let (from, _) = wall.clamp_point_to_wall_face(point, normal, padding);
    let (to, _) = wall.clamp_point_to_wall_face(point + direction * ROOM_STEP, normal, padding);
    (to - from).dot(direction) > ROOM_STEP * 0.5
}

/// Integrates one climbing speed toward `input * top`, or bleeds it off when
/// there is no input or no room to move that way.
fn integrate(speed: f32, input: f32, top: f32, room: bool, acceleration: f32, friction: f32, dt: f32) -> f32 {
    if input != 0.0 && room {
        approach(speed, input.clamp(-1.0, 1.0) * top, acceleration * dt)
    } else {
        approach(speed, 0.0, friction * dt)
    }
}

impl State<Player> for WallClimbState {
    fn intent(&self) -> LocomotionIntent {
        LocomotionIntent::WallClimb
    }

    fn on_enter(
        &mut self,
        player: &mut Player,
        _tick: &mut Tick<'_>,
        next: &mut Next<PlayerStateKind>,
    ) -> Result<(), ControllerError> {
        let Some(wall) = player.climb_wall else {
            next.change(PlayerStateKind::Fall);
            return Ok(());
        };
        player.reset_jumps();
        self.vertical = 0.0;
        self.lateral = 0.0;

        let body = &mut player.body;
        body.velocity = Vec3::ZERO;
        let contact = wall.closest_surface_info(body.position);
        self.normal = contact.normal;
        body.rotation = wall.face_rotation(contact.normal);
        body.position = contact.point + contact.normal * (body.radius + WALL_OFFSET);
        Ok(())
    }

    fn on_step(
        &mut self,
        player: &mut Player,
        tick: &mut Tick<'_>,
        next: &mut Next<PlayerStateKind>,
    ) -> Result<(), ControllerError> {
        let Some(wall) = player.climb_wall else {
            next.change(PlayerStateKind::Fall);
            return Ok(());
        };
        let dt = tick.dt;
        let stats = player.stats().clone();

        if tick.input.jump_down {
            player.body.directional_jump(
                self.normal,
                stats.wall_jump_height,
                stats.wall_jump_distance,
            );
            next.change(PlayerStateKind::Fall);
            return Ok(());
        }

        self.normal = wall.closest_surface_info(player.body.position).normal;
        let padding = Self::padding(player);
        let (face_point, normalized) =
            wall.clamp_point_to_wall_face(player.body.position, self.normal, padding);
        self.normalized = normalized;
        let stand_off = player.body.radius + WALL_OFFSET;
        player.body.position = face_point + self.normal * stand_off;

        let up = player.body.up();
        let right = player.body.right();
        let stick = tick.input.stick;

        let vertical_top = if stick.y >= 0.0 {
            stats.climb_up_top_speed
        } else {
            stats.climb_down_top_speed
        };
        let vertical_room = has_room(&wall, face_point, self.normal, padding, up * stick.y.signum());
        self.vertical = integrate(
            self.vertical,
            stick.y,
            vertical_top,
            vertical_room,
            stats.climb_acceleration,
            stats.climb_friction,
            dt,
        );
        let lateral_room = has_room(&wall, face_point, self.normal, padding, right * stick.x.signum());
        self.lateral = integrate(
            self.lateral,
            stick.x,
            stats.climb_lateral_top_speed,
            lateral_room,
            stats.climb_acceleration,
            stats.climb_friction,
            dt,
        );
        self.vertical = self
            .vertical
            .clamp(-stats.climb_down_top_speed, stats.climb_up_top_speed);
        self.lateral = self.lateral.clamp(
            -stats.climb_lateral_top_speed,
            stats.climb_lateral_top_speed,
        );

        let height = normalized.y;
        if stick.y > 0.0 && height >= LEDGE_GRAB_THRESHOLD && player.try_mantle(tick) {
            next.change(PlayerStateKind::Idle);
            return Ok(());
        }
        if stick.y < 0.0 && height <= CLIMB_DISMOUNT_THRESHOLD && player.body.grounded {
            player.body.velocity = Vec3::ZERO;
            next.change(PlayerStateKind::Idle);
            return Ok(());
        }

        player.body.velocity =
            up * self.vertical + right * self.lateral - self.normal * WALL_STICK_FORCE;
        Ok(())
    }

    fn on_exit(&mut self, player: &mut Player, _tick: &mut Tick<'_>) -> Result<(), ControllerError> {
        player.leave_wall();
        self.vertical = 0.0;
        self.lateral = 0.0;
        Ok(())
    }
}
