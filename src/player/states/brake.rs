use glam::Vec3;

use crate::entity::Movable;
use crate::error::ControllerError;
use crate::events::LocomotionIntent;
use crate::player::{Player, PlayerStateKind};
use crate::state_machine::{Next, State, Tick};

/// Hard stop after reversing direction.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrakeState;

impl State<Player> for BrakeState {
    fn intent(&self) -> LocomotionIntent {
        LocomotionIntent::Brake
    }

    fn on_step(
        &mut self,
        player: &mut Player,
        tick: &mut Tick<'_>,
        next: &mut Next<PlayerStateKind>,
    ) -> Result<(), ControllerError> {
        player.gravity(tick.dt);
        player.snap_to_ground();
        if player.jump(tick.input, next) || player.fall(next) {
            return Ok(());
        }
        player.brake(tick.dt);
        if player.body().lateral_velocity() == Vec3::ZERO {
            next.change(PlayerStateKind::Idle);
        }
        Ok(())
    }
}
