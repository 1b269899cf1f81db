use crate::enemy::{Enemy, EnemyStateKind};
use crate::error::ControllerError;
use crate::events::LocomotionIntent;
use crate::state_machine::{Next, State, Tick};

/// Waits in place until a held target comes within follow range.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnemyIdleState;

impl State<Enemy> for EnemyIdleState {
    fn intent(&self) -> LocomotionIntent {
        LocomotionIntent::Idle
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
        enemy.friction(dt);

        let Some(target) = enemy.sight.target() else {
            return Ok(());
        };
        let snapshot = tick
            .actors
            .actor(target)
            .ok_or(ControllerError::StaleTarget(target))?;
        if snapshot.position.distance(enemy.body.position) <= enemy.stats().follow_range {
            next.change(EnemyStateKind::Follow);
        }
        Ok(())
    }
}
