use glam::Vec3;

use crate::entity::Movable;
use crate::error::ControllerError;
use crate::events::LocomotionIntent;
use crate::player::{Player, PlayerStateKind};
use crate::state_machine::{Next, State, Tick};
use crate::world::Contact;

/// Airborne: terminal-speed gravity with air control.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallState;

impl State<Player> for FallState {
    fn intent(&self) -> LocomotionIntent {
        LocomotionIntent::Fall
    }

    fn on_step(
        &mut self,
        player: &mut Player,
        tick: &mut Tick<'_>,
        next: &mut Next<PlayerStateKind>,
    ) -> Result<(), ControllerError> {
        let dt = tick.dt;
        player.fall_gravity(dt);
        if player.jump(tick.input, next) {
            return Ok(());
        }
        if tick.input.has_movement() {
            player.air_accelerate(tick.input.movement, dt);
            player.face_velocity(dt);
        }

        let body = player.body();
        if body.grounded && body.vertical_speed() <= 0.0 {
            let moving = tick.input.has_movement() || body.lateral_velocity() != Vec3::ZERO;
            next.change(if moving {
                PlayerStateKind::Walk
            } else {
                PlayerStateKind::Idle
            });
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
