#![cfg_attr(docsrs, feature(doc_cfg))]
//! Movement core for a 3D platforming character.
//!
//! A [`state_machine::Controller`] turns per-tick input and world queries into
//! velocity and orientation changes for [`Player`] and [`Enemy`] hosts. The
//! locomotion states are built from the primitives in [`kinematics`], the
//! wall geometry in [`surface`], the curve tracking in [`path`] and the
//! target acquisition in [`sensing`]. Physics, cameras and scene queries are
//! consumed through the traits in [`world`]; [`sandbox`] provides a headless
//! implementation of them.
pub mod components;
pub mod constants;
pub mod enemy;
pub mod entity;
pub mod error;
pub mod events;
pub mod input;
pub mod kinematics;
pub mod logging;
pub mod path;
pub mod player;
pub mod sandbox;
pub mod sensing;
pub mod state_machine;
pub mod stats;
pub mod surface;
pub mod vector_math;
pub mod world;

// Re-export commonly used items
pub use components::{ActorId, ColliderId, GrappleTargetId, Health, LayerMask, PathId, Tag};
pub use enemy::{Enemy, EnemyStateKind};
pub use entity::{Actor, Body, Damageable, Movable, PathFollower, Sensing};
pub use error::{ConfigError, ControllerError, PathError};
pub use events::{ControllerEvent, EventLog, EventSink, LocomotionIntent};
pub use input::{GrapplePress, InputFrame, TapHoldClassifier};
pub use logging::init as init_logging;
pub use path::{CatmullRom, Path, PathSet, TraversalSign};
pub use player::{Player, PlayerStateKind};
pub use state_machine::{Controlled, Controller, Next, State, StateHost, StateMachine, Tick};
pub use stats::{EnemyStats, PlayerStats, StatsProvider};
pub use surface::ClimbSurface;

pub mod prelude {
    //! Prelude exports used in documentation examples.
    //!
    //! ```rust,no_run
    //! use grapnel::prelude::*;
    //! ```

    pub use crate::sandbox::Sandbox;
    pub use crate::world::{ActorDirectory, AimCamera, MovementExecutor, SceneQuery};
    pub use crate::{
        ActorId, Body, Controller, Enemy, EnemyStateKind, InputFrame, Player, PlayerStateKind,
        StatsProvider, Tag,
    };
    pub use glam::{Vec2, Vec3};
}
