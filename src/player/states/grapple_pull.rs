use glam::Vec3;
use log::error;

use crate::constants::GRAPPLE_ARRIVAL_RADII;
use crate::entity::Actor;
use crate::error::ControllerError;
use crate::events::LocomotionIntent;
use crate::player::{Player, PlayerStateKind};
use crate::state_machine::{Next, State, Tick};

/// Reels the player toward the active grapple target.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrapplePullState;

impl State<Player> for GrapplePullState {
    fn intent(&self) -> LocomotionIntent {
        LocomotionIntent::GrapplePull
    }

    fn on_enter(
        &mut self,
        player: &mut Player,
        _tick: &mut Tick<'_>,
        next: &mut Next<PlayerStateKind>,
    ) -> Result<(), ControllerError> {
        if player.grapple_target.is_none() {
            error!("{} entered grapple pull without a target", player.actor_id());
            next.change(PlayerStateKind::Idle);
            return Ok(());
        }
        player.body.velocity = Vec3::ZERO;
        player.body.grounded = false;
        Ok(())
    }

    fn on_step(
        &mut self,
        player: &mut Player,
        tick: &mut Tick<'_>,
        next: &mut Next<PlayerStateKind>,
    ) -> Result<(), ControllerError> {
        let Some(target) = player.grapple_target else {
            next.change(PlayerStateKind::Idle);
            return Ok(());
        };
        let stats = player.stats();
        let pull_speed = stats.pull_speed;
        let release = stats.release_impulse_factor;
        let rotation_speed = stats.rotation_speed;

        let body = &mut player.body;
        let offset = target.point - body.position;
        let distance = offset.length();
        if distance <= body.radius * GRAPPLE_ARRIVAL_RADII {
            body.velocity = Vec3::ZERO;
            next.change(PlayerStateKind::Fall);
            return Ok(());
        }
        let direction = offset / distance;
        if tick.input.jump_down {
            body.velocity = direction * pull_speed * release;
            next.change(PlayerStateKind::Fall);
            return Ok(());
        }
        body.velocity = direction * pull_speed;
        body.face_direction_smooth(direction, rotation_speed, tick.dt);
        Ok(())
    }

    fn on_exit(&mut self, player: &mut Player, tick: &mut Tick<'_>) -> Result<(), ControllerError> {
        player.release_grapple(tick);
        Ok(())
    }
}
