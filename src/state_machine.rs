//! Finite state machine driving an entity's locomotion.
//!
//! States are boxed trait objects keyed by a small `Copy` kind enum owned by
//! the host type. A state never switches the machine directly: it files a
//! request in a [`Next`] slot, and the machine applies it once the hook has
//! returned. Requests filed from `on_enter` are applied in turn, up to
//! [`MAX_TRANSITION_CHAIN`] deep.
//!
//! [`Controller`] pairs a host with its machine and runs the per-tick order:
//! pre-step sensing, state step, collision-aware move, contact routing and
//! post-move adjustment.
use std::fmt::Debug;
use std::hash::Hash;

use hashbrown::HashMap;
use log::debug;

use crate::constants::MAX_TRANSITION_CHAIN;
use crate::entity::{Actor, Movable};
use crate::error::ControllerError;
use crate::events::{ControllerEvent, EventSink, LocomotionIntent};
use crate::input::InputFrame;
use crate::path::PathSet;
use crate::world::{Abilities, ActorDirectory, AimCamera, Contact, MovementExecutor, SceneQuery};

/// Everything a state may read or drive during one tick.
pub struct Tick<'a> {
    /// Tick length in seconds.
    pub dt: f32,
    /// Input sampled for this tick.
    pub input: &'a InputFrame,
    /// Overlap and ray queries.
    pub scene: &'a dyn SceneQuery,
    /// Lookup of other actors by id.
    pub actors: &'a dyn ActorDirectory,
    /// Every path in the scene.
    pub paths: &'a PathSet,
    /// Collision-aware movement.
    pub mover: &'a mut dyn MovementExecutor,
    /// Where events go.
    pub events: &'a mut dyn EventSink,
    /// Camera for free aiming, when one exists.
    pub camera: Option<&'a dyn AimCamera>,
    /// Spin and dash hooks, when installed.
    pub abilities: Option<&'a mut dyn Abilities>,
}

impl<'a> Tick<'a> {
    /// A tick with no camera and no abilities.
    #[must_use]
    pub const fn new(
        dt: f32,
        input: &'a InputFrame,
        scene: &'a dyn SceneQuery,
        actors: &'a dyn ActorDirectory,
        paths: &'a PathSet,
        mover: &'a mut dyn MovementExecutor,
        events: &'a mut dyn EventSink,
    ) -> Self {
        Self {
            dt,
            input,
            scene,
            actors,
            paths,
            mover,
            events,
            camera: None,
            abilities: None,
        }
    }

    /// Supplies the aim camera.
    #[must_use]
    pub const fn with_camera(mut self, camera: &'a dyn AimCamera) -> Self {
        self.camera = Some(camera);
        self
    }

    /// Installs spin and dash hooks.
    #[must_use]
    pub const fn with_abilities(mut self, abilities: &'a mut dyn Abilities) -> Self {
        self.abilities = Some(abilities);
        self
    }
}

/// An entity type that owns a set of states.
pub trait StateHost: Actor {
    /// Names the host's states.
    type Kind: Copy + Eq + Hash + Debug;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Request<K> {
    Change(K),
    Revert,
}

/// Transition slot handed to every state hook. The last request wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Next<K> {
    request: Option<Request<K>>,
}

impl<K> Default for Next<K> {
    fn default() -> Self {
        Self { request: None }
    }
}

impl<K: Copy> Next<K> {
    /// Asks for `kind` to become active once the hook returns.
    pub fn change(&mut self, kind: K) {
        self.request = Some(Request::Change(kind));
    }

    /// Asks to return to the previously active state.
    pub fn revert(&mut self) {
        self.request = Some(Request::Revert);
    }

    /// `true` when a transition has been requested.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.request.is_some()
    }

    fn take(&mut self) -> Option<Request<K>> {
        self.request.take()
    }
}

/// One locomotion mode.
///
/// States own only their per-activation scratch; everything persistent lives
/// on the host.
pub trait State<H: StateHost>: Send {
    /// What the animation layer should play while this state is active.
    fn intent(&self) -> LocomotionIntent;

    /// # Errors
    /// Propagates precondition violations.
    fn on_enter(
        &mut self,
        _host: &mut H,
        _tick: &mut Tick<'_>,
        _next: &mut Next<H::Kind>,
    ) -> Result<(), ControllerError> {
        Ok(())
    }

    /// # Errors
    /// Propagates precondition violations.
    fn on_step(
        &mut self,
        host: &mut H,
        tick: &mut Tick<'_>,
        next: &mut Next<H::Kind>,
    ) -> Result<(), ControllerError>;

    /// # Errors
    /// Propagates precondition violations.
    fn on_exit(&mut self, _host: &mut H, _tick: &mut Tick<'_>) -> Result<(), ControllerError> {
        Ok(())
    }

    /// # Errors
    /// Propagates precondition violations.
    fn on_contact(
        &mut self,
        _host: &mut H,
        _contact: &Contact,
        _tick: &mut Tick<'_>,
        _next: &mut Next<H::Kind>,
    ) -> Result<(), ControllerError> {
        Ok(())
    }
}

/// Registered states plus the active and previously active kinds.
pub struct StateMachine<H: StateHost> {
    states: HashMap<H::Kind, Box<dyn State<H>>>,
    current: Option<H::Kind>,
    last: Option<H::Kind>,
}

impl<H: StateHost> Default for StateMachine<H> {
    fn default() -> Self {
        Self {
            states: HashMap::new(),
            current: None,
            last: None,
        }
    }
}

impl<H: StateHost> Debug for StateMachine<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateMachine")
            .field("states", &self.states.keys().collect::<Vec<_>>())
            .field("current", &self.current)
            .field("last", &self.last)
            .finish()
    }
}

impl<H: StateHost> StateMachine<H> {
    /// A machine with no states.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `state` under `kind`, replacing any previous registration.
    #[must_use]
    pub fn with_state(mut self, kind: H::Kind, state: impl State<H> + 'static) -> Self {
        self.states.insert(kind, Box::new(state));
        self
    }

    /// The active state.
    #[must_use]
    pub const fn current(&self) -> Option<H::Kind> {
        self.current
    }

    /// The state active before the current one.
    #[must_use]
    pub const fn last(&self) -> Option<H::Kind> {
        self.last
    }

    /// `true` once a state has been activated.
    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.current.is_some()
    }

    /// Activates the initial state. Only its enter hook runs.
    ///
    /// Starting an already running machine behaves like [`StateMachine::change`].
    ///
    /// # Errors
    /// Returns [`ControllerError::UnknownState`] for an unregistered kind and
    /// propagates errors from the enter chain.
    pub fn start(
        &mut self,
        kind: H::Kind,
        host: &mut H,
        tick: &mut Tick<'_>,
    ) -> Result<(), ControllerError> {
        if self.current.is_some() {
            return self.change(kind, host, tick);
        }
        self.ensure_registered(kind)?;
        self.current = Some(kind);
        let next = self.enter(kind, host, tick)?;
        self.settle(next, host, tick)
    }

    /// Exits the active state and enters `kind`. Changing to the active
    /// state does nothing.
    ///
    /// # Errors
    /// Returns [`ControllerError::NotStarted`] before [`StateMachine::start`],
    /// [`ControllerError::UnknownState`] for an unregistered kind, and
    /// propagates errors from the hooks.
    pub fn change(
        &mut self,
        kind: H::Kind,
        host: &mut H,
        tick: &mut Tick<'_>,
    ) -> Result<(), ControllerError> {
        let mut next = Next::default();
        next.change(kind);
        self.settle(next, host, tick)
    }

    /// Runs the active state's step once and applies its request.
    ///
    /// # Errors
    /// Returns [`ControllerError::NotStarted`] before [`StateMachine::start`]
    /// and propagates errors from the hooks.
    pub fn step(&mut self, host: &mut H, tick: &mut Tick<'_>) -> Result<(), ControllerError> {
        let kind = self.current.ok_or(ControllerError::NotStarted)?;
        let mut next = Next::default();
        self.state_mut(kind)?.on_step(host, tick, &mut next)?;
        self.settle(next, host, tick)
    }

    /// Forwards a movement contact to the active state.
    ///
    /// # Errors
    /// Returns [`ControllerError::NotStarted`] before [`StateMachine::start`]
    /// and propagates errors from the hooks.
    pub fn contact(
        &mut self,
        host: &mut H,
        contact: &Contact,
        tick: &mut Tick<'_>,
    ) -> Result<(), ControllerError> {
        let kind = self.current.ok_or(ControllerError::NotStarted)?;
        let mut next = Next::default();
        self.state_mut(kind)?
            .on_contact(host, contact, tick, &mut next)?;
        self.settle(next, host, tick)
    }

    fn ensure_registered(&self, kind: H::Kind) -> Result<(), ControllerError> {
        if self.states.contains_key(&kind) {
            Ok(())
        } else {
            Err(ControllerError::UnknownState(format!("{kind:?}")))
        }
    }

    fn state_mut(&mut self, kind: H::Kind) -> Result<&mut Box<dyn State<H>>, ControllerError> {
        self.states
            .get_mut(&kind)
            .ok_or_else(|| ControllerError::UnknownState(format!("{kind:?}")))
    }

    fn enter(
        &mut self,
        kind: H::Kind,
        host: &mut H,
        tick: &mut Tick<'_>,
    ) -> Result<Next<H::Kind>, ControllerError> {
        let actor = host.actor_id();
        let state = self.state_mut(kind)?;
        let intent = state.intent();
        debug!("{actor} entering {kind:?}");
        tick.events
            .publish(ControllerEvent::StateChanged { actor, intent });
        let mut next = Next::default();
        state.on_enter(host, tick, &mut next)?;
        Ok(next)
    }

    fn switch(
        &mut self,
        kind: H::Kind,
        host: &mut H,
        tick: &mut Tick<'_>,
    ) -> Result<Next<H::Kind>, ControllerError> {
        let from = self.current.ok_or(ControllerError::NotStarted)?;
        self.ensure_registered(kind)?;
        self.state_mut(from)?.on_exit(host, tick)?;
        self.last = Some(from);
        self.current = Some(kind);
        self.enter(kind, host, tick)
    }

    fn settle(
        &mut self,
        mut next: Next<H::Kind>,
        host: &mut H,
        tick: &mut Tick<'_>,
    ) -> Result<(), ControllerError> {
        for _ in 0..MAX_TRANSITION_CHAIN {
            let Some(request) = next.take() else {
                return Ok(());
            };
            let target = match request {
                Request::Change(kind) => kind,
                Request::Revert => self.last.ok_or(ControllerError::NoPreviousState)?,
            };
            let current = self.current.ok_or(ControllerError::NotStarted)?;
            if target == current {
                return Ok(());
            }
            next = self.switch(target, host, tick)?;
        }
        if next.is_pending() {
            return Err(ControllerError::TransitionLoop(MAX_TRANSITION_CHAIN));
        }
        Ok(())
    }
}

/// A host that can be driven by a [`Controller`].
pub trait Controlled: StateHost + Movable {
    /// Inactive hosts (for example dead enemies) are skipped entirely.
    fn is_active(&self) -> bool {
        true
    }

    /// Sensing run before the state step. A returned kind is changed to
    /// before stepping.
    ///
    /// # Errors
    /// Propagates precondition violations.
    fn before_step(&mut self, _tick: &mut Tick<'_>) -> Result<Option<Self::Kind>, ControllerError> {
        Ok(None)
    }

    /// Runs after the move and contact routing.
    ///
    /// # Errors
    /// Propagates precondition violations.
    fn after_move(&mut self, _tick: &mut Tick<'_>) -> Result<(), ControllerError> {
        Ok(())
    }
}

/// A host entity and the state machine driving it.
#[derive(Debug)]
pub struct Controller<H: Controlled> {
    host: H,
    machine: StateMachine<H>,
}

impl<H: Controlled> Controller<H> {
    /// Pairs `host` with `machine`. Call [`Controller::start`] before ticking.
    #[must_use]
    pub const fn new(host: H, machine: StateMachine<H>) -> Self {
        Self { host, machine }
    }

    /// The driven entity.
    #[must_use]
    pub const fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the driven entity.
    pub const fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The machine driving the host.
    #[must_use]
    pub const fn machine(&self) -> &StateMachine<H> {
        &self.machine
    }

    /// The host's active state.
    #[must_use]
    pub const fn current(&self) -> Option<H::Kind> {
        self.machine.current()
    }

    /// # Errors
    /// See [`StateMachine::start`].
    pub fn start(&mut self, kind: H::Kind, tick: &mut Tick<'_>) -> Result<(), ControllerError> {
        self.machine.start(kind, &mut self.host, tick)
    }

    /// # Errors
    /// See [`StateMachine::change`].
    pub fn change(&mut self, kind: H::Kind, tick: &mut Tick<'_>) -> Result<(), ControllerError> {
        self.machine.change(kind, &mut self.host, tick)
    }

    /// Advances the host by one tick.
    ///
    /// # Errors
    /// Propagates any precondition violation raised along the way.
    pub fn tick(&mut self, tick: &mut Tick<'_>) -> Result<(), ControllerError> {
        if !self.host.is_active() {
            return Ok(());
        }
        if let Some(kind) = self.host.before_step(tick)? {
            self.machine.change(kind, &mut self.host, tick)?;
        }
        self.machine.step(&mut self.host, tick)?;

        let body = self.host.body();
        let report = tick
            .mover
            .move_by(body.capsule(), body.position, body.velocity * tick.dt);
        self.host.body_mut().apply_move(&report);
        tick.mover
            .set_rotation(self.host.actor_id(), self.host.body().rotation);

        for contact in &report.contacts {
            self.machine.contact(&mut self.host, contact, tick)?;
        }
        self.host.after_move(tick)
    }
}
