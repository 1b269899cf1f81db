use log::warn;

use crate::entity::Actor;
use crate::error::ControllerError;
use crate::events::LocomotionIntent;
use crate::player::{Player, PlayerStateKind};
use crate::sensing::{resolve_free_aim, AimSession};
use crate::state_machine::{Next, State, Tick};

/// Free aiming with an on-screen crosshair.
///
/// The session (crosshair, cursor lock and highlighted candidate) lives only
/// as long as the state is active.
#[derive(Debug, Clone, Default)]
pub struct GrappleAimState {
    session: Option<AimSession>,
}

impl GrappleAimState {
    /// Live aiming session, if the state is active.
    #[must_use]
    pub const fn session(&self) -> Option<&AimSession> {
        self.session.as_ref()
    }
}

impl State<Player> for GrappleAimState {
    fn intent(&self) -> LocomotionIntent {
        LocomotionIntent::GrappleAim
    }

    fn on_enter(
        &mut self,
        player: &mut Player,
        tick: &mut Tick<'_>,
        next: &mut Next<PlayerStateKind>,
    ) -> Result<(), ControllerError> {
        let Some(camera) = tick.camera else {
            warn!("{} cannot aim without a camera", player.actor_id());
            next.revert();
            return Ok(());
        };
        self.session = Some(AimSession::begin(
            player.actor_id(),
            camera.screen_size(),
            tick.events,
        ));
        Ok(())
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
        player.friction(dt);

        let (Some(camera), Some(session)) = (tick.camera, self.session.as_mut()) else {
            next.revert();
            return Ok(());
        };
        let screen = camera.screen_size();
        match tick.input.pointer {
            Some(pointer) => session.point_at(pointer, screen),
            None => session.move_crosshair(
                tick.input.aim_delta,
                player.stats().crosshair_sensitivity,
                screen,
            ),
        }

        let found = resolve_free_aim(
            tick.scene,
            camera,
            session.crosshair(),
            player.launch_point(),
            &player.aim_settings(),
        );
        session.highlight(found, tick.events);

        if tick.input.crouch_down {
            next.revert();
            return Ok(());
        }
        if tick.input.grapple_fire {
            if let Some(target) = session.take_candidate() {
                player.fire_grapple(target, tick);
                next.change(PlayerStateKind::GrapplePull);
            }
        }
        Ok(())
    }

    fn on_exit(&mut self, _player: &mut Player, tick: &mut Tick<'_>) -> Result<(), ControllerError> {
        if let Some(session) = self.session.take() {
            session.end(tick.events);
        }
        Ok(())
    }
}
