use log::debug;

use crate::enemy::{Enemy, EnemyStateKind};
use crate::error::ControllerError;
use crate::events::LocomotionIntent;
use crate::path::{resolve_pursuit, PursuitStep};
use crate::state_machine::{Next, State, Tick};
use crate::vector_math::{flatten, normalize_or_none};
use crate::world::ActorSnapshot;

/// Chases the held target, along a shared path when there is one.
///
/// Once the target is lost the enemy slows to a stop and, if configured,
/// returns to its previous state after a delay.
#[derive(Debug, Clone, Copy, Default)]
pub struct FollowState {
    lost_for: f32,
}

impl FollowState {
    fn pursue(
        enemy: &mut Enemy,
        target: &ActorSnapshot,
        tick: &Tick<'_>,
    ) -> Result<(), ControllerError> {
        let dt = tick.dt;
        match (enemy.path, target.path) {
            (Some(ours), Some(theirs)) if ours == theirs => {
                let path = tick.paths.path(ours)?;
                match resolve_pursuit(path, enemy.body.position, target.position) {
                    PursuitStep::Advance(direction) => enemy.chase(direction, dt),
                    PursuitStep::Hold => enemy.decelerate(dt),
                }
            }
            _ => {
                let heading = flatten(target.position - enemy.body.position, enemy.body.up());
                match normalize_or_none(heading) {
                    Some(direction) => enemy.chase(direction, dt),
                    None => enemy.decelerate(dt),
                }
            }
        }
        Ok(())
    }
}

impl State<Enemy> for FollowState {
    fn intent(&self) -> LocomotionIntent {
        LocomotionIntent::Chase
    }

    fn on_enter(
        &mut self,
        _enemy: &mut Enemy,
        _tick: &mut Tick<'_>,
        _next: &mut Next<EnemyStateKind>,
    ) -> Result<(), ControllerError> {
        self.lost_for = 0.0;
        Ok(())
    }

    fn on_step(
        &mut self,
        enemy: &mut Enemy,
        tick: &mut Tick<'_>,
        next: &mut Next<EnemyStateKind>,
    ) -> Result<(), ControllerError> {
        let dt = tick.dt;
        enemy.gravity(dt);
        enemy.snap_to_ground();

        let held = enemy
            .sight
            .target()
            .map(|id| tick.actors.actor(id).ok_or(ControllerError::StaleTarget(id)))
            .transpose()?;
        if let Some(target) = held.filter(|snapshot| snapshot.alive) {
            self.lost_for = 0.0;
            return Self::pursue(enemy, &target, tick);
        }

        enemy.decelerate(dt);
        if !enemy.stats().return_to_last_state_when_lost_target {
            return Ok(());
        }
        self.lost_for += dt;
        if self.lost_for >= enemy.stats().return_to_last_state_delay {
            debug!("{} gave up the chase", enemy.id);
            next.revert();
        }
        Ok(())
    }
}
