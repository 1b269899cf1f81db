use glam::Vec3;

use crate::entity::Movable;
use crate::error::ControllerError;
use crate::events::LocomotionIntent;
use crate::player::{Player, PlayerStateKind};
use crate::state_machine::{Next, State, Tick};

/// Standing still: friction only, waiting for input.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleState;

impl State<Player> for IdleState {
    fn intent(&self) -> LocomotionIntent {
        LocomotionIntent::Idle
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
        player.abilities(tick);
        player.friction(tick.dt);

        if player.grapple(tick, next)? {
            return Ok(());
        }
        if tick.input.has_movement() || player.body().lateral_velocity() != Vec3::ZERO {
            next.change(PlayerStateKind::Walk);
        }
        Ok(())
    }
}
