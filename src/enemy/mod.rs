//! Enemy entity: sight-driven pursuit and contact attacks.
pub mod states;

use glam::Vec3;
use log::debug;

use crate::components::{ActorId, Health, PathId, Tag};
use crate::entity::{Actor, Body, Damageable, Movable, PathFollower, Sensing};
use crate::error::{ControllerError, PathError};
use crate::events::{ControllerEvent, EventSink};
use crate::path::{glue_to_path, PathSet};
use crate::sensing::{SightChange, SightSensor};
use crate::state_machine::{Controlled, Controller, StateHost, StateMachine, Tick};
use crate::stats::{EnemyStats, StatsProvider};

use self::states::{EnemyIdleState, FollowState};

/// Registered enemy states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyStateKind {
    /// Waiting for a target to come within follow range.
    Idle,
    /// Chasing the held target.
    Follow,
}

/// An enemy host: body, health, stats and sight.
#[derive(Debug, Clone)]
pub struct Enemy {
    id: ActorId,
    body: Body,
    health: Health,
    stats: StatsProvider<EnemyStats>,
    sight: SightSensor,
    path: Option<PathId>,
    path_forward: Vec3,
}

impl Enemy {
    /// Full health, no path and a sight sensor looking for players.
    #[must_use]
    pub fn new(id: ActorId, body: Body, stats: StatsProvider<EnemyStats>) -> Self {
        let capacity = stats.current().overlap_capacity;
        Self {
            id,
            body,
            health: Health::default(),
            stats,
            sight: SightSensor::new(Tag::Player, capacity),
            path: None,
            path_forward: Vec3::ZERO,
        }
    }

    /// Replaces the default health pool.
    #[must_use]
    pub const fn with_health(mut self, health: Health) -> Self {
        self.health = health;
        self
    }

    /// Wraps the enemy in a controller with every enemy state registered.
    #[must_use]
    pub fn into_controller(self) -> Controller<Self> {
        let machine = StateMachine::new()
            .with_state(EnemyStateKind::Idle, EnemyIdleState)
            .with_state(EnemyStateKind::Follow, FollowState::default());
        Controller::new(self, machine)
    }

    /// The active stat form.
    #[must_use]
    pub fn stats(&self) -> &EnemyStats {
        self.stats.current()
    }

    /// Every stat form, for switching.
    pub const fn stats_mut(&mut self) -> &mut StatsProvider<EnemyStats> {
        &mut self.stats
    }

    /// The sight sensor and its held target.
    #[must_use]
    pub const fn sight(&self) -> &SightSensor {
        &self.sight
    }

    pub(crate) fn gravity(&mut self, dt: f32) {
        self.body.gravity(self.stats.current().gravity, dt);
    }

    pub(crate) fn snap_to_ground(&mut self) {
        self.body.snap_to_ground(self.stats.current().snap_force);
    }

    pub(crate) fn friction(&mut self, dt: f32) {
        self.body.decelerate(self.stats.current().friction, dt);
    }

    pub(crate) fn decelerate(&mut self, dt: f32) {
        self.body.decelerate(self.stats.current().deceleration, dt);
    }

    /// Accelerates and turns toward `direction` at follow speed.
    pub(crate) fn chase(&mut self, direction: Vec3, dt: f32) {
        let stats = self.stats.current();
        self.body.accelerate(
            direction,
            stats.turning_drag,
            stats.follow_acceleration,
            stats.follow_top_speed,
            dt,
        );
        self.body
            .face_direction_smooth(direction, stats.rotation_speed, dt);
    }

    /// Applies damage and, on death, drops the enemy's sight target and path
    /// membership. Returns `true` if the hit was fatal.
    ///
    /// # Errors
    /// Fails if the enemy references a path that is not registered.
    pub fn apply_damage(
        &mut self,
        amount: i32,
        paths: &mut PathSet,
        events: &mut dyn EventSink,
    ) -> Result<bool, PathError> {
        if !self.take_damage(amount, events) {
            return Ok(false);
        }
        self.sight.forget();
        self.body.velocity = Vec3::ZERO;
        if let Some(path) = self.path {
            paths.trigger_exit(path, self)?;
        }
        Ok(true)
    }

    /// Touch damage against `victim`.
    ///
    /// An airborne victim coming down onto the enemy, with its lowest point
    /// within the stepping tolerance of the enemy's top, is stomping and
    /// takes no damage. Grounded victims are always hit. Otherwise the enemy optionally bounces back and the
    /// victim is hurt. Returns `true` if damage was dealt.
    pub fn contact_attack<V: Damageable + Movable>(
        &mut self,
        victim: &mut V,
        events: &mut dyn EventSink,
    ) -> bool {
        if !self.is_alive() || !victim.is_alive() {
            return false;
        }
        let stats = self.stats.current();
        let victim_body = victim.body();
        let stepping = self.body.top().y - stats.contact_stepping_tolerance;
        let stomping = !victim_body.grounded
            && victim_body.vertical_speed() <= 0.0
            && victim_body.bottom().y >= stepping;
        if stomping {
            debug!("{} stomped by {}", self.id, victim.actor_id());
            return false;
        }
        if stats.contact_pushback {
            let pushback = -self.body.forward() * stats.contact_pushback_force;
            self.body.set_lateral_velocity(pushback);
        }
        events.publish(ControllerEvent::Contact {
            actor: self.id,
            other: victim.actor_id(),
        });
        victim.take_damage(stats.contact_damage, events);
        true
    }
}

impl Actor for Enemy {
    fn actor_id(&self) -> ActorId {
        self.id
    }
}

impl Movable for Enemy {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

impl Damageable for Enemy {
    fn health(&self) -> &Health {
        &self.health
    }

    fn health_mut(&mut self) -> &mut Health {
        &mut self.health
    }
}

impl PathFollower for Enemy {
    fn current_path(&self) -> Option<PathId> {
        self.path
    }

    fn set_current_path(&mut self, path: Option<PathId>) {
        self.path = path;
    }

    fn cached_path_forward(&self) -> Vec3 {
        self.path_forward
    }

    fn set_cached_path_forward(&mut self, forward: Vec3) {
        self.path_forward = forward;
    }
}

impl Sensing for Enemy {
    fn held_target(&self) -> Option<ActorId> {
        self.sight.target()
    }
}

impl StateHost for Enemy {
    type Kind = EnemyStateKind;
}

impl Controlled for Enemy {
    fn is_active(&self) -> bool {
        self.is_alive()
    }

    fn before_step(&mut self, tick: &mut Tick<'_>) -> Result<Option<EnemyStateKind>, ControllerError> {
        self.health.recover(tick.dt);
        let stats = self.stats.current();
        let change = self.sight.update(
            self.body.position,
            stats.spot_range,
            stats.view_range,
            tick.scene,
            tick.actors,
        )?;
        match change {
            SightChange::Spotted(target) => {
                tick.events.publish(ControllerEvent::Spotted {
                    actor: self.id,
                    target,
                });
                Ok(stats.follow_target_on_sight.then_some(EnemyStateKind::Follow))
            }
            SightChange::Escaped(target) => {
                tick.events.publish(ControllerEvent::Escaped {
                    actor: self.id,
                    target,
                });
                Ok(None)
            }
            SightChange::Unchanged => Ok(None),
        }
    }

    fn after_move(&mut self, tick: &mut Tick<'_>) -> Result<(), ControllerError> {
        let force = self.stats.current().snap_to_path_force;
        glue_to_path(tick.paths, self, &mut *tick.mover, force, tick.dt)?;
        Ok(())
    }
}
