//! Observable controller events.
//!
//! The core publishes these without knowing who listens: animation, UI and
//! effects layers consume them through an [`EventSink`].
use serde::Serialize;

use crate::components::{ActorId, GrappleTargetId};

/// What a state asks the animation layer to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LocomotionIntent {
    /// Standing still.
    Idle,
    /// Moving on the ground.
    Walk,
    /// Skidding to a halt.
    Brake,
    /// Airborne.
    Fall,
    /// Clinging to a wall.
    WallClimb,
    /// Choosing a grapple anchor.
    GrappleAim,
    /// Being reeled toward an anchor.
    GrapplePull,
    /// An enemy running after its target.
    Chase,
}

/// Everything the core reports to outer layers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ControllerEvent {
    /// A state was activated.
    StateChanged {
        /// Whose machine changed.
        actor: ActorId,
        /// What the new state wants animated.
        intent: LocomotionIntent,
    },
    /// Health was lost.
    Damaged {
        /// Who was hurt.
        actor: ActorId,
        /// Points removed.
        amount: i32,
        /// Points left.
        remaining: i32,
    },
    /// Health ran out.
    Died {
        /// Who died.
        actor: ActorId,
    },
    /// A dead actor came back at full health.
    Revived {
        /// Who came back.
        actor: ActorId,
    },
    /// A sight sensor picked up a target.
    Spotted {
        /// The watcher.
        actor: ActorId,
        /// The actor now held.
        target: ActorId,
    },
    /// A held target was dropped.
    Escaped {
        /// The watcher.
        actor: ActorId,
        /// The actor let go.
        target: ActorId,
    },
    /// `actor` touched `other` with a contact attack.
    Contact {
        /// The attacker.
        actor: ActorId,
        /// The actor touched.
        other: ActorId,
    },
    /// A grapple anchor's highlight was toggled.
    Highlight {
        /// The anchor.
        target: GrappleTargetId,
        /// Its new highlight state.
        highlighted: bool,
    },
    /// Free aiming started or stopped.
    AimSession {
        /// The aiming player.
        actor: ActorId,
        /// Whether aiming is now under way.
        active: bool,
        /// Whether the cursor is locked to the screen centre.
        cursor_locked: bool,
    },
    /// A grapple line was fired.
    GrappleFired {
        /// The player firing.
        actor: ActorId,
        /// The anchor hit.
        target: GrappleTargetId,
    },
}

/// Receiver of controller events.
pub trait EventSink {
    /// Accepts one event.
    fn publish(&mut self, event: ControllerEvent);
}

/// Collects published events until drained.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Vec<ControllerEvent>,
}

impl EventLog {
    /// An empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events recorded so far, oldest first.
    #[must_use]
    pub fn events(&self) -> &[ControllerEvent] {
        &self.events
    }

    /// `true` when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Takes every event recorded so far, leaving the log empty.
    pub fn drain(&mut self) -> Vec<ControllerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Intents of the recorded state changes for `actor`, in order.
    #[must_use]
    pub fn intents_for(&self, actor: ActorId) -> Vec<LocomotionIntent> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ControllerEvent::StateChanged { actor: a, intent } if *a == actor => Some(*intent),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for EventLog {
    fn publish(&mut self, event: ControllerEvent) {
        self.events.push(event);
    }
}

impl Extend<ControllerEvent> for EventLog {
    fn extend<T: IntoIterator<Item = ControllerEvent>>(&mut self, iter: T) {
        self.events.extend(iter);
    }
}
