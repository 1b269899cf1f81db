use glam::Vec3;

use crate::entity::Movable;
use crate::error::ControllerError;
use crate::events::LocomotionIntent;
use crate::player::{Player, PlayerStateKind};
use crate::state_machine::{Next, State, Tick};
use crate::world::Contact;

/// Ground movement toward the input direction.
///
/// Input pointing sharply against the current velocity (below the brake
/// threshold) hands over to [`super::BrakeState`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkState;

impl State<Player> for WalkState {
    fn intent(&self) -> LocomotionIntent {
        LocomotionIntent::Walk
    }

    fn on_step(
        &mut self,
        player: &mut Player,
        tick: &mut Tick<'_>,
        next: &mut Next<PlayerStateKind>,
    ) -> Result<(), ControllerError> {
        let dt = tick.dt;
        player.gravity(dt);
        player.snap_to_ground();
        if player.jump(tick.input, next) || player.fall(next) {
            return Ok(());
        }
        player.abilities(tick);
        player.decelerate_to_top_speed(dt);

        if player.grapple(tick, next)? {
            return Ok(());
        }

        let input = tick.input.movement;
        if tick.input.has_movement() {
            let heading = player.body().lateral_velocity().normalize_or_zero();
            if input.dot(heading) >= player.stats().brake_threshold {
                player.accelerate(input, dt);
                player.face_velocity(dt);
            } else {
                next.change(PlayerStateKind::Brake);
            }
        } else {
            player.friction(dt);
            if player.body().lateral_velocity() == Vec3::ZERO {
                next.change(PlayerStateKind::Idle);
            }
        }
        Ok(())
    }

    fn on_contact(
        &mut self,
        player: &mut Player,
        contact: &Contact,
        tick: &mut Tick<'_>,
        next: &mut Next<PlayerStateKind>,
    ) -> Result<(), ControllerError> {
        player.grab_wall(contact, tick.input, next);
        Ok(())
    }
}
