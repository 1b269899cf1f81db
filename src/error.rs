//! Error types returned by the controller, path and configuration layers.
use thiserror::Error;

use crate::components::{ActorId, PathId};

/// Failures raised by path membership queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// A per-member query named an actor that never joined.
    #[error("{actor} is not a member of {path}")]
    NotAMember {
        /// The path queried.
        path: PathId,
        /// The actor that is not on it.
        actor: ActorId,
    },
    /// A path id with no registered path.
    #[error("{0} is not registered")]
    UnknownPath(PathId),
    /// Curves are built from at least two control points.
    #[error("a curve needs at least two control points, got {0}")]
    TooFewPoints(usize),
}

/// Precondition violations surfaced by a controller tick.
///
/// These are programming errors. They are propagated out of the tick rather
/// than replaced with a default.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    /// The machine was stepped or changed before `start`.
    #[error("state machine has no active state")]
    NotStarted,
    /// No state is registered under the requested kind.
    #[error("state {0} is not registered")]
    UnknownState(String),
    /// A revert was requested with no state to return to.
    #[error("no previous state to return to")]
    NoPreviousState,
    /// Enter hooks kept requesting transitions past the limit.
    #[error("transition chain exceeded {0} steps")]
    TransitionLoop(usize),
    /// The held sight target vanished from the actor directory.
    #[error("held target {0} no longer exists")]
    StaleTarget(ActorId),
    /// A path query failed.
    #[error(transparent)]
    Path(#[from] PathError),
}

/// Problems found while loading or validating stats.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid stats JSON.
    #[error("failed to parse stats: {0}")]
    Parse(#[from] serde_json::Error),
    /// A rate, speed or range that must be positive was not.
    #[error("{field} must be positive, got {value}")]
    NotPositive {
        /// Name of the offending field.
        field: &'static str,
        /// The value found.
        value: f32,
    },
    /// Targets would be dropped as soon as they were spotted.
    #[error("view range {view} must exceed spot range {spot}")]
    SightRange {
        /// Range at which targets are picked up.
        spot: f32,
        /// Range at which held targets are dropped.
        view: f32,
    },
    /// The document lists no forms.
    #[error("stats must define at least one form")]
    EmptyForms,
    /// The selected form does not exist.
    #[error("form {index} is out of range for {count} forms")]
    UnknownForm {
        /// Requested form.
        index: usize,
        /// Forms available.
        count: usize,
    },
}
