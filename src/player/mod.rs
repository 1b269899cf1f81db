//! The player entity and the helpers its locomotion states share.
pub mod states;

use glam::Vec3;
use log::info;

use crate::components::{ActorId, Health, PathId, Tag};
use crate::entity::{Actor, Body, Damageable, Movable, PathFollower};
use crate::error::ControllerError;
use crate::events::ControllerEvent;
use crate::input::{GrapplePress, InputFrame};
use crate::path::{glue_to_path, PathSet};
use crate::sensing::{resolve_auto_aim, AimSettings, GrappleTarget};
use crate::state_machine::{Controlled, Controller, Next, StateHost, StateMachine, Tick};
use crate::stats::{PlayerStats, StatsProvider};
use crate::surface::ClimbSurface;
use crate::world::{Contact, OverlapBuffer, Ray};

use self::states::{
    BrakeState, FallState, GrappleAimState, GrapplePullState, IdleState, WallClimbState,
    WalkState,
};

/// Registered player states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerStateKind {
    /// Standing on the ground.
    Idle,
    /// Running under stick control.
    Walk,
    /// Skidding after reversing direction.
    Brake,
    /// Airborne.
    Fall,
    /// Clinging to a climbable surface.
    WallClimb,
    /// Aiming the grapple by hand.
    GrappleAim,
    /// Reeling toward a grapple anchor.
    GrapplePull,
}

/// The player-controlled character.
#[derive(Debug, Clone)]
pub struct Player {
    id: ActorId,
    body: Body,
    health: Health,
    stats: StatsProvider<PlayerStats>,
    path: Option<PathId>,
    path_forward: Vec3,
    climb_wall: Option<ClimbSurface>,
    grapple_target: Option<GrappleTarget>,
    jumps: u32,
    overlap: OverlapBuffer,
}

impl Player {
    /// Full health, on no path and holding nothing.
    #[must_use]
    pub fn new(id: ActorId, body: Body, stats: StatsProvider<PlayerStats>) -> Self {
        let capacity = stats.current().overlap_capacity;
        Self {
            id,
            body,
            health: Health::default(),
            stats,
            path: None,
            path_forward: Vec3::ZERO,
            climb_wall: None,
            grapple_target: None,
            jumps: 0,
            overlap: OverlapBuffer::new(capacity),
        }
    }

    /// Replaces the default health pool.
    #[must_use]
    pub const fn with_health(mut self, health: Health) -> Self {
        self.health = health;
        self
    }

    /// Wraps the player in a controller with every player state registered.
    #[must_use]
    pub fn into_controller(self) -> Controller<Self> {
        let machine = StateMachine::new()
            .with_state(PlayerStateKind::Idle, IdleState)
            .with_state(PlayerStateKind::Walk, WalkState)
            .with_state(PlayerStateKind::Brake, BrakeState)
            .with_state(PlayerStateKind::Fall, FallState)
            .with_state(PlayerStateKind::WallClimb, WallClimbState::default())
            .with_state(PlayerStateKind::GrappleAim, GrappleAimState::default())
            .with_state(PlayerStateKind::GrapplePull, GrapplePullState);
        Controller::new(self, machine)
    }

    /// The active stat form.
    #[must_use]
    pub fn stats(&self) -> &PlayerStats {
        self.stats.current()
    }

    /// Every stat form, for switching.
    pub const fn stats_mut(&mut self) -> &mut StatsProvider<PlayerStats> {
        &mut self.stats
    }

    /// Jumps used since last touching the ground.
    #[must_use]
    pub const fn jumps(&self) -> u32 {
        self.jumps
    }

    /// The anchor being pulled toward.
    #[must_use]
    pub const fn grapple_target(&self) -> Option<GrappleTarget> {
        self.grapple_target
    }

    /// The surface being climbed.
    #[must_use]
    pub const fn climb_wall(&self) -> Option<&ClimbSurface> {
        self.climb_wall.as_ref()
    }

    /// Grapple query settings from the active form.
    #[must_use]
    pub fn aim_settings(&self) -> AimSettings {
        let stats = self.stats.current();
        AimSettings {
            grapple_layers: stats.grapple_layers,
            obstacle_layers: stats.obstacle_layers,
            range: stats.grapple_range,
            auto_aim_radius: stats.auto_aim_radius,
            cone_angle: stats.auto_aim_cone_angle.to_radians(),
        }
    }

    /// Where the grapple line leaves the body.
    #[must_use]
    pub const fn launch_point(&self) -> Vec3 {
        self.body.position
    }

    /// Forward along the current path, or the cached forward off path.
    ///
    /// # Errors
    /// Fails if the current path is unknown or does not list the player.
    pub fn path_forward(&self, paths: &PathSet) -> Result<Vec3, ControllerError> {
        match self.path {
            Some(id) => Ok(paths.path_forward(id, self.id, self.body.position)?),
            None => Ok(self.path_forward_hint()),
        }
    }

    pub(crate) fn gravity(&mut self, dt: f32) {
        self.body.gravity(self.stats.current().gravity, dt);
    }

    pub(crate) fn fall_gravity(&mut self, dt: f32) {
        let stats = self.stats.current();
        self.body.gravity(stats.gravity, dt);
        self.body.clamp_fall_speed(stats.gravity_top_speed);
    }

    pub(crate) fn snap_to_ground(&mut self) {
        self.body.snap_to_ground(self.stats.current().snap_force);
    }

    pub(crate) fn friction(&mut self, dt: f32) {
        self.body.decelerate(self.stats.current().friction, dt);
    }

    pub(crate) fn brake(&mut self, dt: f32) {
        self.body.decelerate(self.stats.current().brake_deceleration, dt);
    }

    pub(crate) fn decelerate_to_top_speed(&mut self, dt: f32) {
        let stats = self.stats.current();
        self.body
            .decelerate_to_top_speed(stats.top_speed, stats.deceleration, dt);
    }

    pub(crate) fn accelerate(&mut self, direction: Vec3, dt: f32) {
        let stats = self.stats.current();
        self.body.accelerate(
            direction,
            stats.turning_drag,
            stats.acceleration,
            stats.top_speed,
            dt,
        );
    }

    pub(crate) fn air_accelerate(&mut self, direction: Vec3, dt: f32) {
        let stats = self.stats.current();
        self.body.accelerate(
            direction,
            stats.turning_drag,
            stats.air_acceleration,
            stats.top_speed,
            dt,
        );
    }

    pub(crate) fn face_velocity(&mut self, dt: f32) {
        let lateral = self.body.lateral_velocity();
        self.body
            .face_direction_smooth(lateral, self.stats.current().rotation_speed, dt);
    }

    /// Jumps on a fresh jump press while jumps remain.
    pub(crate) fn jump(&mut self, input: &InputFrame, next: &mut Next<PlayerStateKind>) -> bool {
        if !input.jump_down || self.jumps >= self.stats.current().multi_jumps {
            return false;
        }
        self.jumps += 1;
        self.body.set_vertical_speed(self.stats.current().jump_height);
        self.body.grounded = false;
        next.change(PlayerStateKind::Fall);
        true
    }

    /// Starts falling once the ground is lost.
    pub(crate) fn fall(&self, next: &mut Next<PlayerStateKind>) -> bool {
        if self.body.grounded {
            return false;
        }
        next.change(PlayerStateKind::Fall);
        true
    }

    pub(crate) fn abilities(&self, tick: &mut Tick<'_>) {
        if let Some(abilities) = tick.abilities.as_deref_mut() {
            abilities.spin(self.id, tick.input);
            abilities.dash(self.id, tick.input);
        }
    }

    /// Grapple button handling shared by the ground states: a tap fires at
    /// the auto-aim target, a hold opens free aim.
    ///
    /// # Errors
    /// Fails if the player's path bookkeeping is inconsistent.
    pub(crate) fn grapple(
        &mut self,
        tick: &mut Tick<'_>,
        next: &mut Next<PlayerStateKind>,
    ) -> Result<bool, ControllerError> {
        match tick.input.grapple {
            Some(GrapplePress::Tap) => {
                let path_forward = self.path_forward(tick.paths)?;
                let settings = self.aim_settings();
                let found = resolve_auto_aim(
                    tick.scene,
                    self.launch_point(),
                    tick.input.look,
                    path_forward,
                    self.body.up(),
                    &settings,
                    &mut self.overlap,
                );
                let Some(target) = found else {
                    return Ok(false);
                };
                tick.events.publish(ControllerEvent::Highlight {
                    target: target.id,
                    highlighted: true,
                });
                self.fire_grapple(target, tick);
                next.change(PlayerStateKind::GrapplePull);
                Ok(true)
            }
            Some(GrapplePress::HoldStarted) => {
                next.change(PlayerStateKind::GrappleAim);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Takes ownership of `target` as the active grapple target.
    pub(crate) fn fire_grapple(&mut self, target: GrappleTarget, tick: &mut Tick<'_>) {
        info!("{} fired grapple at {}", self.id, target.id);
        tick.events.publish(ControllerEvent::GrappleFired {
            actor: self.id,
            target: target.id,
        });
        self.grapple_target = Some(target);
    }

    pub(crate) fn release_grapple(&mut self, tick: &mut Tick<'_>) {
        if let Some(target) = self.grapple_target.take() {
            tick.events.publish(ControllerEvent::Highlight {
                target: target.id,
                highlighted: false,
            });
        }
    }

    /// Starts climbing when a climbable contact is pushed into.
    pub(crate) fn grab_wall(
        &mut self,
        contact: &Contact,
        input: &InputFrame,
        next: &mut Next<PlayerStateKind>,
    ) -> bool {
        if contact.collider.tag != Tag::ClimbableWall {
            return false;
        }
        let Some(surface) = contact.collider.surface else {
            return false;
        };
        if input.movement.dot(-contact.normal) <= 0.0 {
            return false;
        }
        self.climb_wall = Some(surface);
        next.change(PlayerStateKind::WallClimb);
        true
    }

    pub(crate) fn leave_wall(&mut self) {
        self.climb_wall = None;
        self.body.reset_up_alignment();
    }

    pub(crate) const fn reset_jumps(&mut self) {
        self.jumps = 0;
    }

    /// Looks for a ledge top ahead of and above the body and stands on it.
    pub(crate) fn try_mantle(&mut self, tick: &Tick<'_>) -> bool {
        let up = self.body.up();
        let forward = self.body.forward();
        let height = self.body.height;
        let origin = self.body.position + up * height + forward * (self.body.radius * 2.0);
        let ray = Ray::new(origin, -up);
        let Some(hit) = tick
            .scene
            .raycast(ray, height * 1.5, self.stats.current().obstacle_layers)
        else {
            return false;
        };
        self.body.position = hit.point + up * (height * 0.5);
        self.body.velocity = Vec3::ZERO;
        true
    }
}

impl Actor for Player {
    fn actor_id(&self) -> ActorId {
        self.id
    }
}

impl Movable for Player {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

impl Damageable for Player {
    fn health(&self) -> &Health {
        &self.health
    }

    fn health_mut(&mut self) -> &mut Health {
        &mut self.health
    }
}

impl PathFollower for Player {
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

impl StateHost for Player {
    type Kind = PlayerStateKind;
}

impl Controlled for Player {
    fn before_step(&mut self, tick: &mut Tick<'_>) -> Result<Option<PlayerStateKind>, ControllerError> {
        self.health.recover(tick.dt);
        if self.body.grounded {
            self.reset_jumps();
        }
        Ok(None)
    }

    fn after_move(&mut self, tick: &mut Tick<'_>) -> Result<(), ControllerError> {
        if self.climb_wall.is_some() || self.grapple_target.is_some() {
            return Ok(());
        }
        let force = self.stats.current().snap_to_path_force;
        glue_to_path(tick.paths, self, &mut *tick.mover, force, tick.dt)?;
        Ok(())
    }
}
