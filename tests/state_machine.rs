//! Transition rules of the generic state machine, driven by a host that
//! records every hook it sees.

use grapnel::constants::MAX_TRANSITION_CHAIN;
use grapnel::events::ControllerEvent;
use grapnel::sandbox::{SandboxMover, SandboxWorld};
use grapnel::{
    Actor, ActorId, ControllerError, EventLog, InputFrame, LocomotionIntent, Next, PathSet,
    State, StateHost, StateMachine, Tick,
};
use rstest::{fixture, rstest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Phase {
    A,
    B,
    C,
    Unregistered,
}

#[derive(Debug, Default)]
struct Recorder {
    log: Vec<String>,
}

impl Actor for Recorder {
    fn actor_id(&self) -> ActorId {
        ActorId(1)
    }
}

impl StateHost for Recorder {
    type Kind = Phase;
}

#[derive(Debug, Clone, Copy)]
enum StepAction {
    Stay,
    Change(Phase),
    Revert,
}

#[derive(Debug, Clone, Copy)]
struct Scripted {
    phase: Phase,
    enter_goes_to: Option<Phase>,
    step: StepAction,
}

impl Scripted {
    const fn new(phase: Phase) -> Self {
        Self {
            phase,
            enter_goes_to: None,
            step: StepAction::Stay,
        }
    }

    const fn entering_into(mut self, phase: Phase) -> Self {
        self.enter_goes_to = Some(phase);
        self
    }

    const fn stepping(mut self, step: StepAction) -> Self {
        self.step = step;
        self
    }
}

impl State<Recorder> for Scripted {
    fn intent(&self) -> LocomotionIntent {
        LocomotionIntent::Idle
    }

    fn on_enter(
        &mut self,
        host: &mut Recorder,
        _tick: &mut Tick<'_>,
        next: &mut Next<Phase>,
    ) -> Result<(), ControllerError> {
        host.log.push(format!("enter {:?}", self.phase));
        if let Some(phase) = self.enter_goes_to {
            next.change(phase);
        }
        Ok(())
    }

    fn on_step(
        &mut self,
        host: &mut Recorder,
        _tick: &mut Tick<'_>,
        next: &mut Next<Phase>,
    ) -> Result<(), ControllerError> {
        host.log.push(format!("step {:?}", self.phase));
        match self.step {
            StepAction::Stay => {}
            StepAction::Change(phase) => next.change(phase),
            StepAction::Revert => next.revert(),
        }
        Ok(())
    }

    fn on_exit(&mut self, host: &mut Recorder, _tick: &mut Tick<'_>) -> Result<(), ControllerError> {
        host.log.push(format!("exit {:?}", self.phase));
        Ok(())
    }
}

/// Collaborators for a tick; none of them are exercised by the recorder.
#[derive(Default)]
struct Harness {
    input: InputFrame,
    world: SandboxWorld,
    paths: PathSet,
    mover: SandboxMover,
    events: EventLog,
}

impl Harness {
    fn run<T>(
        &mut self,
        f: impl FnOnce(&mut Tick<'_>) -> Result<T, ControllerError>,
    ) -> Result<T, ControllerError> {
        let mut tick = Tick::new(
            0.02,
            &self.input,
            &self.world,
            &self.world,
            &self.paths,
            &mut self.mover,
            &mut self.events,
        );
        f(&mut tick)
    }
}

#[fixture]
fn harness() -> Harness {
    Harness::default()
}

fn abc() -> StateMachine<Recorder> {
    StateMachine::new()
        .with_state(Phase::A, Scripted::new(Phase::A))
        .with_state(Phase::B, Scripted::new(Phase::B).stepping(StepAction::Revert))
        .with_state(Phase::C, Scripted::new(Phase::C).stepping(StepAction::Change(Phase::A)))
}

#[rstest]
fn start_only_enters(mut harness: Harness) {
    let mut machine = abc();
    let mut host = Recorder::default();

    harness
        .run(|tick| machine.start(Phase::A, &mut host, tick))
        .unwrap_or_else(|e| panic!("{e}"));

    assert_eq!(host.log, ["enter A"]);
    assert_eq!(machine.current(), Some(Phase::A));
    assert_eq!(machine.last(), None);
    assert_eq!(
        harness.events.events(),
        [ControllerEvent::StateChanged {
            actor: ActorId(1),
            intent: LocomotionIntent::Idle,
        }]
    );
}

#[rstest]
fn changing_to_the_active_state_is_a_no_op(mut harness: Harness) {
    let mut machine = abc();
    let mut host = Recorder::default();

    harness
        .run(|tick| {
            machine.start(Phase::A, &mut host, tick)?;
            machine.change(Phase::A, &mut host, tick)
        })
        .unwrap_or_else(|e| panic!("{e}"));

    assert_eq!(host.log, ["enter A"]);
    assert_eq!(harness.events.len(), 1);
}

#[rstest]
fn change_exits_before_entering(mut harness: Harness) {
    let mut machine = abc();
    let mut host = Recorder::default();

    harness
        .run(|tick| {
            machine.start(Phase::A, &mut host, tick)?;
            machine.change(Phase::B, &mut host, tick)
        })
        .unwrap_or_else(|e| panic!("{e}"));

    assert_eq!(host.log, ["enter A", "exit A", "enter B"]);
    assert_eq!(machine.current(), Some(Phase::B));
    assert_eq!(machine.last(), Some(Phase::A));
}

#[rstest]
fn revert_returns_to_the_previous_state(mut harness: Harness) {
    let mut machine = abc();
    let mut host = Recorder::default();

    harness
        .run(|tick| {
            machine.start(Phase::A, &mut host, tick)?;
            machine.change(Phase::B, &mut host, tick)?;
            machine.step(&mut host, tick)
        })
        .unwrap_or_else(|e| panic!("{e}"));

    assert_eq!(
        host.log,
        ["enter A", "exit A", "enter B", "step B", "exit B", "enter A"]
    );
    assert_eq!(machine.current(), Some(Phase::A));
    assert_eq!(machine.last(), Some(Phase::B));
}

#[rstest]
fn step_requests_apply_after_the_hook(mut harness: Harness) {
    let mut machine = abc();
    let mut host = Recorder::default();

    harness
        .run(|tick| {
            machine.start(Phase::C, &mut host, tick)?;
            machine.step(&mut host, tick)
        })
        .unwrap_or_else(|e| panic!("{e}"));

    assert_eq!(host.log, ["enter C", "step C", "exit C", "enter A"]);
}

#[rstest]
fn revert_without_history_fails(mut harness: Harness) {
    let mut machine = abc();
    let mut host = Recorder::default();

    let result = harness.run(|tick| {
        machine.start(Phase::B, &mut host, tick)?;
        machine.step(&mut host, tick)
    });

    assert_eq!(result, Err(ControllerError::NoPreviousState));
}

#[rstest]
fn stepping_before_start_fails(mut harness: Harness) {
    let mut machine = abc();
    let mut host = Recorder::default();

    assert!(!machine.is_started());
    let step = harness.run(|tick| machine.step(&mut host, tick));
    let change = harness.run(|tick| machine.change(Phase::B, &mut host, tick));

    assert_eq!(step, Err(ControllerError::NotStarted));
    assert_eq!(change, Err(ControllerError::NotStarted));
    assert!(host.log.is_empty());
}

#[rstest]
fn unregistered_kinds_are_rejected(mut harness: Harness) {
    let mut machine = abc();
    let mut host = Recorder::default();

    let result = harness.run(|tick| machine.start(Phase::Unregistered, &mut host, tick));

    assert_eq!(
        result,
        Err(ControllerError::UnknownState("Unregistered".to_owned()))
    );
    assert!(!machine.is_started());
}

#[rstest]
fn enter_requests_chain(mut harness: Harness) {
    let mut machine = StateMachine::new()
        .with_state(Phase::A, Scripted::new(Phase::A).entering_into(Phase::B))
        .with_state(Phase::B, Scripted::new(Phase::B));
    let mut host = Recorder::default();

    harness
        .run(|tick| machine.start(Phase::A, &mut host, tick))
        .unwrap_or_else(|e| panic!("{e}"));

    assert_eq!(host.log, ["enter A", "exit A", "enter B"]);
    assert_eq!(machine.current(), Some(Phase::B));
    assert_eq!(machine.last(), Some(Phase::A));
}

#[rstest]
fn enter_cycles_are_cut_off(mut harness: Harness) {
    let mut machine = StateMachine::new()
        .with_state(Phase::A, Scripted::new(Phase::A).entering_into(Phase::B))
        .with_state(Phase::B, Scripted::new(Phase::B).entering_into(Phase::A));
    let mut host = Recorder::default();

    let result = harness.run(|tick| machine.start(Phase::A, &mut host, tick));

    assert_eq!(
        result,
        Err(ControllerError::TransitionLoop(MAX_TRANSITION_CHAIN))
    );
}
